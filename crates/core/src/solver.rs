use crate::error::SolverError;
use crate::model::Model;
use std::time::Instant;

/// What a backend reports for a pure 0/1 model.
#[derive(Clone, Debug, PartialEq)]
pub enum SolveOutcome {
    /// One value per model variable, in [`VarId`](crate::model::VarId) order.
    Optimal { values: Vec<bool>, objective: f64 },
    Infeasible,
    Unbounded,
}

/// Opaque integer-optimization capability.
///
/// Implementations must return assignments that satisfy every submitted
/// constraint exactly. When `deadline` passes before the search completes
/// they give up with [`SolverError::Timeout`].
pub trait Backend: Send + Sync {
    fn name(&self) -> &'static str;

    fn solve(&self, model: &Model, deadline: Option<Instant>) -> Result<SolveOutcome, SolverError>;
}

impl<B: Backend + ?Sized> Backend for &B {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn solve(&self, model: &Model, deadline: Option<Instant>) -> Result<SolveOutcome, SolverError> {
        (**self).solve(model, deadline)
    }
}
