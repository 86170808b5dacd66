use axum::Json;
use sched_core::validate;
use serde::Serialize;
use types::Instance;

#[derive(Serialize, utoipa::ToSchema)]
pub struct ValidationReport {
    pub ok: bool,
    #[serde(default)]
    pub errors: Vec<String>,
}

#[utoipa::path(
    post,
    path = "/v1/validate",
    request_body = Instance,
    responses(
    (status = 200, description = "Every configuration problem found in the instance", body = ValidationReport)
    )
)]
pub async fn validate_handler(Json(inst): Json<Instance>) -> Json<ValidationReport> {
    match validate(&inst) {
        Ok(()) => Json(ValidationReport {
            ok: true,
            errors: vec![],
        }),
        Err(e) => Json(ValidationReport {
            ok: false,
            errors: e.0.iter().map(ToString::to_string).collect(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::{Aircraft, Flight, MaintenancePolicy};

    #[tokio::test]
    async fn lists_each_problem_separately() {
        let inst = Instance {
            flights: vec![
                Flight {
                    id: "F1".into(),
                    duration: 1.0,
                    costs: vec![1.0],
                },
                Flight {
                    id: "F1".into(),
                    duration: -1.0,
                    costs: vec![1.0],
                },
            ],
            aircraft: vec![Aircraft { id: "A1".into() }],
            horizon: 3,
            maintenance: MaintenancePolicy::None,
        };
        let Json(report) = validate_handler(Json(inst)).await;
        assert!(!report.ok);
        assert_eq!(report.errors.len(), 2);
    }
}
