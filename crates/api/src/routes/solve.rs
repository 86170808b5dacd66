use crate::{error::ApiError, state::AppState};
use axum::{extract::State, Json};
use sched_core::validate;
use types::SolveEnvelope;
use utoipa::ToSchema;

#[derive(Debug, serde::Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JobCreated {
    pub job_id: String,
    pub status: &'static str,
}

#[utoipa::path(
        post,
        path = "/v1/solve",
        request_body = SolveEnvelope,
        responses(
            (status = 200, description = "Job enqueued", body = JobCreated),
            (status = 400, description = "Instance failed validation")
        )
    )]
pub async fn solve(
    State(state): State<AppState>,
    Json(env): Json<SolveEnvelope>,
) -> Result<Json<JobCreated>, ApiError> {
    validate(&env.instance)?;
    tracing::info!(
        flights = env.instance.flights.len(),
        aircraft = env.instance.aircraft.len(),
        horizon = env.instance.horizon,
        solver = ?env.params.solver,
        "enqueueing solve"
    );
    let id = state.jobs.enqueue(env);
    Ok(Json(JobCreated {
        job_id: id.0,
        status: "queued",
    }))
}
