use crate::error::ApiError;
use axum::Json;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use sched_core::{scoring, Catalog};
use types::{FlightAssignment, Instance, MaintenanceSlots, Violation};

#[derive(Deserialize, ToSchema)]
pub struct ExplainIn {
    pub instance: Instance,
    pub assignments: Vec<FlightAssignment>,
    #[serde(default)]
    pub maintenance: Vec<MaintenanceSlots>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ExplainOut {
    pub cost: f64,
    pub feasible: bool,
    pub violations: Vec<Violation>,
}

#[utoipa::path(
    post,
    path = "/v1/explain",
    request_body = ExplainIn,
    responses(
    (status = 200, description = "Realized cost and violations of the provided schedule", body = ExplainOut),
    (status = 400, description = "Instance is not well formed")
    )
)]
pub async fn explain(Json(input): Json<ExplainIn>) -> Result<Json<ExplainOut>, ApiError> {
    let catalog = Catalog::new(&input.instance)?;
    let s = scoring::evaluate(&catalog, &input.assignments, &input.maintenance);
    Ok(Json(ExplainOut {
        cost: s.cost,
        feasible: s.is_feasible(),
        violations: s.violations,
    }))
}
