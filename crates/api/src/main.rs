mod error;
mod state;
mod telemetry;
pub mod routes {
    pub mod explain;
    pub mod health;
    pub mod jobs;
    pub mod solve;
    pub mod validate;
}

use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;

use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

const PORT_VAR: &str = "FLEETSCHED__SERVER__PORT";

#[derive(OpenApi)]
#[openapi(
        paths(
            routes::health::health,
            routes::validate::validate_handler,
            routes::solve::solve,
            routes::jobs::status,
            routes::jobs::result,
            routes::jobs::report,
            routes::explain::explain,
        ),
        components(schemas(
            types::FlightId, types::AircraftId, types::Flight, types::Aircraft,
            types::MaintenancePolicy, types::Instance, types::SolverKind, types::SolveParams,
            types::SolveEnvelope, types::FlightAssignment, types::MaintenanceSlots,
            types::Violation, types::SolveStatus, types::SolveResult,
            jobs::JobId, jobs::JobStatus,
            routes::validate::ValidationReport,
            routes::solve::JobCreated,
            routes::explain::ExplainIn,
            routes::explain::ExplainOut,
        )),
        tags(
            (name = "fleetsched", description = "Flight assignment API")
        )
    )]
struct ApiDoc;

fn app(state: state::AppState) -> Router {
    Router::new()
        .route("/v1/health", get(routes::health::health))
        .route("/v1/validate", post(routes::validate::validate_handler))
        .route("/v1/solve", post(routes::solve::solve))
        .route("/v1/explain", post(routes::explain::explain))
        .route("/v1/jobs/:id", get(routes::jobs::status))
        .route("/v1/jobs/:id/result", get(routes::jobs::result))
        .route("/v1/jobs/:id/report", get(routes::jobs::report))
        .merge(SwaggerUi::new("/docs").url("/openapi.json", ApiDoc::openapi()))
        .with_state(state)
}

fn listen_addr() -> anyhow::Result<SocketAddr> {
    let port = std::env::var(PORT_VAR).unwrap_or_else(|_| "8080".into());
    let port: u16 = port
        .parse()
        .map_err(|e| anyhow::anyhow!("invalid {PORT_VAR} {port:?}: {e}"))?;
    Ok(SocketAddr::from(([0, 0, 0, 0], port)))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init();

    let app = telemetry::layered(app(state::AppState::new_default()));

    let addr = listen_addr()?;
    tracing::info!(%addr, "listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
