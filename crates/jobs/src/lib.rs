use parking_lot::RwLock;
use sched_core::{SolveEnvelope, SolveResult, SolveStatus, Solver};
use std::collections::HashMap;
use tracing::{error, info};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize, ToSchema)]
pub struct JobId(pub String);

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize, ToSchema)]
#[serde(tag = "status")]
pub enum JobStatus {
    Queued,
    Running,
    Solved {
        result: SolveResult,
    },
    Infeasible {
        result: SolveResult,
    },
    Failed {
        message: String,
        #[serde(default)]
        result: Option<SolveResult>,
    },
}

impl JobStatus {
    fn from_result(result: SolveResult) -> Self {
        match result.status {
            SolveStatus::Optimal => JobStatus::Solved { result },
            SolveStatus::Infeasible | SolveStatus::Unbounded => JobStatus::Infeasible { result },
            SolveStatus::Error => JobStatus::Failed {
                message: result
                    .stats
                    .get("error")
                    .and_then(|e| e.as_str())
                    .unwrap_or("solver error")
                    .to_string(),
                result: Some(result),
            },
        }
    }

    pub fn is_finished(&self) -> bool {
        !matches!(self, JobStatus::Queued | JobStatus::Running)
    }

    /// The solver's result, once there is one.
    pub fn result(&self) -> Option<&SolveResult> {
        match self {
            JobStatus::Solved { result } | JobStatus::Infeasible { result } => Some(result),
            JobStatus::Failed { result, .. } => result.as_ref(),
            JobStatus::Queued | JobStatus::Running => None,
        }
    }
}

/// Each job solves its own envelope; nothing is shared between jobs except
/// the solver handle.
#[derive(Clone)]
pub struct InMemJobs<S: Solver> {
    inner: std::sync::Arc<RwLock<HashMap<String, JobStatus>>>,
    solver: std::sync::Arc<S>,
}

impl<S: Solver> InMemJobs<S> {
    pub fn new(solver: S) -> Self {
        Self {
            inner: Default::default(),
            solver: std::sync::Arc::new(solver),
        }
    }

    pub fn enqueue(&self, env: SolveEnvelope) -> JobId {
        let id = Uuid::new_v4().to_string();
        self.inner.write().insert(id.clone(), JobStatus::Queued);

        let map = self.inner.clone();
        let solver = self.solver.clone();
        let id_for_task = id.clone();

        tokio::spawn(async move {
            {
                let mut w = map.write();
                w.insert(id_for_task.clone(), JobStatus::Running);
            }
            // A panicking solve must still leave the job in a final state.
            let joined = tokio::spawn(async move { solver.solve(env).await }).await;
            let status = match joined {
                Ok(Ok(res)) => {
                    info!(job = %id_for_task, status = %res.status, "job finished");
                    JobStatus::from_result(res)
                }
                Ok(Err(e)) => {
                    error!(?e, job = %id_for_task, "job failed");
                    JobStatus::Failed {
                        message: e.to_string(),
                        result: None,
                    }
                }
                Err(e) => {
                    error!(%e, job = %id_for_task, "solver task aborted");
                    JobStatus::Failed {
                        message: format!("solver task aborted: {e}"),
                        result: None,
                    }
                }
            };
            map.write().insert(id_for_task, status);
        });

        JobId(id)
    }

    pub fn get(&self, id: &str) -> Option<JobStatus> {
        self.inner.read().get(id).cloned()
    }
}
