use async_trait::async_trait;
use jobs::InMemJobs;
use sched_core::{SolveEnvelope, SolveResult, Solver};
use solver_milp::MilpSolver;
use solver_search::SearchSolver;
use std::sync::Arc;
use types::SolverKind;

#[derive(Clone)]
pub struct AppState {
    pub jobs: Arc<InMemJobs<DispatchSolver>>,
}

/// Routes each envelope to the backend named in its params.
#[derive(Clone)]
pub struct DispatchSolver {
    milp: Arc<MilpSolver>,
    search: Arc<SearchSolver>,
}

impl DispatchSolver {
    pub fn new() -> Self {
        Self {
            milp: Arc::new(MilpSolver::new()),
            search: Arc::new(SearchSolver::new()),
        }
    }
}

#[async_trait]
impl Solver for DispatchSolver {
    async fn solve(&self, env: SolveEnvelope) -> anyhow::Result<SolveResult> {
        match env.params.solver {
            SolverKind::Milp => self.milp.solve(env).await,
            SolverKind::Search => self.search.solve(env).await,
        }
    }
}

impl AppState {
    pub fn new_default() -> Self {
        let jobs = InMemJobs::new(DispatchSolver::new());
        Self {
            jobs: Arc::new(jobs),
        }
    }
}
