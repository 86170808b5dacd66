pub mod builder;
pub mod catalog;
pub mod decode;
pub mod engine;
pub mod error;
pub mod model;
pub mod report;
pub mod scoring;
pub mod solver;

use async_trait::async_trait;

pub use catalog::{Catalog, TimeGrid};
pub use error::{
    ConfigurationError, DecodeInconsistencyError, ScheduleError, SolverError, ValidationError,
};
pub use model::{Constraint, ConstraintClass, Layout, Model, Relation, VarId, VarKey};
pub use solver::{Backend, SolveOutcome};
pub use types::{
    Aircraft, Flight, FlightAssignment, Instance, MaintenancePolicy, MaintenanceSlots,
    SolveEnvelope, SolveParams, SolveResult, SolveStatus,
};

/// Reports every configuration problem in `inst` at once.
pub fn validate(inst: &Instance) -> Result<(), ValidationError> {
    let mut errors = catalog::check(inst);
    if errors.is_empty() {
        match Catalog::new(inst) {
            Ok(c) => errors.extend(builder::precheck(&c, &inst.maintenance)),
            Err(e) => errors.push(e),
        }
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationError(errors))
    }
}

#[async_trait]
pub trait Solver: Send + Sync + 'static {
    async fn solve(&self, env: SolveEnvelope) -> anyhow::Result<SolveResult>;
}
