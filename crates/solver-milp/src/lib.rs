#[cfg(feature = "with-milp")]
mod milp_core;

use async_trait::async_trait;
use sched_core::{
    engine, Backend, Model, SolveEnvelope, SolveOutcome, SolveResult, Solver, SolverError,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Extra time granted to the backend past its own limit before the request
/// is abandoned.
const TIMEOUT_GRACE: Duration = Duration::from_secs(2);

/// Integer-programming backend on top of good_lp and CBC. Builds without
/// `with-milp` have no CBC and run the exact search backend instead.
#[derive(Clone, Copy, Debug, Default)]
pub struct MilpBackend;

impl Backend for MilpBackend {
    #[cfg(feature = "with-milp")]
    fn name(&self) -> &'static str {
        "milp"
    }

    #[cfg(not(feature = "with-milp"))]
    fn name(&self) -> &'static str {
        "search"
    }

    #[cfg(feature = "with-milp")]
    fn solve(&self, model: &Model, deadline: Option<Instant>) -> Result<SolveOutcome, SolverError> {
        milp_core::solve(model, deadline)
    }

    #[cfg(not(feature = "with-milp"))]
    fn solve(&self, model: &Model, deadline: Option<Instant>) -> Result<SolveOutcome, SolverError> {
        tracing::debug!("built without with-milp, using search backend");
        solver_search::SearchBackend::new().solve(model, deadline)
    }
}

pub struct MilpSolver {
    backend: Arc<MilpBackend>,
}

impl MilpSolver {
    pub fn new() -> Self {
        Self {
            backend: Arc::new(MilpBackend),
        }
    }
}

impl Default for MilpSolver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Solver for MilpSolver {
    async fn solve(&self, env: SolveEnvelope) -> anyhow::Result<SolveResult> {
        info!("received instance with {} flights", env.instance.flights.len());
        let limit = env.params.time_limit_sec.map(Duration::from_secs);
        let backend = self.backend.clone();
        let task = tokio::task::spawn_blocking(move || engine::solve_envelope(&env, backend.as_ref()));

        match limit {
            None => task.await?,
            Some(limit) => {
                let grace = limit.saturating_add(TIMEOUT_GRACE);
                match tokio::time::timeout(grace, task).await {
                    Ok(joined) => joined?,
                    Err(_) => {
                        warn!(?limit, "milp solve abandoned after time limit");
                        Ok(engine::solver_failure(
                            MilpBackend.name(),
                            &SolverError::Timeout.to_string(),
                        ))
                    }
                }
            }
        }
    }
}
