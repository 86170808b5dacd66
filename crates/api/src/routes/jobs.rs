use crate::{error::ApiError, state::AppState};
use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
    Json,
};
use jobs::JobStatus;
use sched_core::report;
use types::SolveResult;

fn lookup(state: &AppState, id: &str) -> Result<JobStatus, ApiError> {
    state.jobs.get(id).ok_or_else(|| ApiError::not_found("job", id))
}

#[utoipa::path(
        get,
        path = "/v1/jobs/{id}",
        params(("id" = String, Path, description = "Job ID")),
        responses(
            (status = 200, description = "Job status", body = JobStatus),
            (status = 404, description = "Unknown job")
        )
    )]
pub async fn status(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<JobStatus>, ApiError> {
    lookup(&state, &id).map(Json)
}

#[utoipa::path(
        get,
        path = "/v1/jobs/{id}/result",
        params(("id" = String, Path, description = "Job ID")),
        responses(
            (status = 200, description = "Solve result (if ready)", body = SolveResult),
            (status = 404, description = "Unknown job")
        )
    )]
pub async fn result(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let st = lookup(&state, &id)?;
    Ok(match st.result() {
        Some(r) => Json(r).into_response(),
        None => Json(serde_json::json!({ "status": "not_ready" })).into_response(),
    })
}

#[utoipa::path(
        get,
        path = "/v1/jobs/{id}/report",
        params(("id" = String, Path, description = "Job ID")),
        responses(
            (status = 200, description = "Plain-text report", body = String, content_type = "text/plain"),
            (status = 404, description = "Unknown job"),
            (status = 409, description = "Job has no result yet")
        )
    )]
pub async fn report(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<String, ApiError> {
    let st = lookup(&state, &id)?;
    st.result()
        .map(report::render)
        .ok_or_else(|| ApiError::not_ready(&id))
}
