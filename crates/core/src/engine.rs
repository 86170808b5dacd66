//! Catalog → model → backend → decoded schedule, for one request.

use crate::builder;
use crate::catalog::Catalog;
use crate::decode::decode;
use crate::error::{ConfigurationError, ScheduleError};
use crate::model::Model;
use crate::solver::Backend;
use std::time::{Duration, Instant};
use tracing::{info, warn};
use types::{Instance, SolveEnvelope, SolveParams, SolveResult, SolveStatus, Violation};

/// A built model together with what it was built from.
#[derive(Debug)]
pub struct Prepared {
    pub catalog: Catalog,
    pub model: Model,
    pub warnings: Vec<Violation>,
}

pub fn prepare(inst: &Instance) -> Result<Prepared, ConfigurationError> {
    let catalog = Catalog::new(inst)?;
    let warnings = builder::maintenance_diagnostics(&catalog, &inst.maintenance);
    let model = builder::build(&catalog, &inst.maintenance)?;
    Ok(Prepared {
        catalog,
        model,
        warnings,
    })
}

/// `None` when there is no limit or the limit is too far out to represent.
pub fn deadline(params: &SolveParams) -> Option<Instant> {
    params
        .time_limit_sec
        .and_then(|s| Instant::now().checked_add(Duration::from_secs(s)))
}

/// Runs one scheduling request. Backend failures come back as
/// [`ScheduleError::Solver`].
pub fn run<B: Backend + ?Sized>(
    inst: &Instance,
    params: &SolveParams,
    backend: &B,
) -> Result<SolveResult, ScheduleError> {
    info!(
        flights = inst.flights.len(),
        aircraft = inst.aircraft.len(),
        horizon = inst.horizon,
        backend = backend.name(),
        "scheduling request"
    );
    let prepared = prepare(inst)?;
    let outcome = backend.solve(&prepared.model, deadline(params))?;
    let decoded = decode(&prepared.catalog, &prepared.model, outcome)?;

    if decoded.status == SolveStatus::Optimal
        && (decoded.objective - decoded.schedule.cost).abs() > 1e-6
    {
        warn!(
            reported = decoded.objective,
            realized = decoded.schedule.cost,
            "backend objective differs from realized cost"
        );
    }
    info!(status = %decoded.status, objective = decoded.objective, "scheduling finished");

    Ok(SolveResult {
        status: decoded.status,
        objective: decoded.objective,
        assignments: decoded.schedule.assignments,
        maintenance: decoded.schedule.maintenance,
        warnings: prepared.warnings,
        stats: stats(backend.name(), inst, &prepared.model),
    })
}

/// Like [`run`], but reports backend failures as an `ERROR` result.
/// Configuration and decode errors still fail the request.
pub fn solve_envelope<B: Backend + ?Sized>(
    env: &SolveEnvelope,
    backend: &B,
) -> anyhow::Result<SolveResult> {
    match run(&env.instance, &env.params, backend) {
        Ok(r) => Ok(r),
        Err(ScheduleError::Solver(e)) => {
            warn!(error = %e, backend = backend.name(), "solver failed");
            Ok(solver_failure(backend.name(), &e.to_string()))
        }
        Err(e) => Err(e.into()),
    }
}

pub fn solver_failure(method: &str, reason: &str) -> SolveResult {
    SolveResult::empty(
        SolveStatus::Error,
        vec![],
        serde_json::json!({ "method": method, "error": reason }),
    )
}

fn stats(method: &str, inst: &Instance, model: &Model) -> serde_json::Value {
    serde_json::json!({
        "method": method,
        "vars": model.num_vars(),
        "constraints": model.constraints().len(),
        "flights": inst.flights.len(),
        "aircraft": inst.aircraft.len(),
        "horizon": inst.horizon,
    })
}
