//! Translates a [`Catalog`] and a [`MaintenancePolicy`] into a 0/1 [`Model`].

use crate::catalog::Catalog;
use crate::error::ConfigurationError;
use crate::model::{ConstraintClass, Layout, Model, Relation, VarId};
use tracing::{debug, warn};
use types::{MaintenancePolicy, Violation};

/// Builds an independent model for one scheduling request.
pub fn build(catalog: &Catalog, policy: &MaintenancePolicy) -> Result<Model, ConfigurationError> {
    if let Some(err) = precheck(catalog, policy).into_iter().next() {
        return Err(err);
    }

    let layout = Layout {
        flights: catalog.flights().len(),
        aircraft: catalog.aircraft().len(),
        horizon: catalog.horizon(),
        maintenance: policy.is_active(),
    };
    let mut model = Model::new(layout);

    model = add_objective(model, catalog);
    model = add_coverage_constraints(model, catalog);
    model = add_completion_constraints(model, catalog);
    model = add_occupancy_constraints(model, catalog);
    model = match policy {
        MaintenancePolicy::None => model,
        MaintenancePolicy::Fixed { schedule, .. } => add_fixed_maintenance(model, schedule),
        MaintenancePolicy::Chosen {
            min_per_aircraft,
            max_simultaneous,
        } => add_chosen_maintenance(model, *min_per_aircraft, *max_simultaneous),
    };

    debug!(
        vars = model.num_vars(),
        constraints = model.constraints().len(),
        "model built"
    );
    Ok(model)
}

/// Problems that make the model unsatisfiable or malformed before solving.
pub fn precheck(catalog: &Catalog, policy: &MaintenancePolicy) -> Vec<ConfigurationError> {
    let mut errors = Vec::new();
    let horizon = catalog.horizon();
    let grid = catalog.grid();

    for f in catalog.flights() {
        let starts = grid.feasible_starts(f.duration).len() * catalog.aircraft().len();
        if starts == 0 {
            errors.push(ConfigurationError::NoFeasibleStart {
                flight: f.id.clone(),
            });
        }
    }

    match policy {
        MaintenancePolicy::None => {}
        MaintenancePolicy::Fixed { schedule, .. } => {
            if schedule.len() != catalog.aircraft().len() {
                errors.push(ConfigurationError::FixedScheduleRows {
                    expected: catalog.aircraft().len(),
                    found: schedule.len(),
                });
            }
            for (a, row) in catalog.aircraft().iter().zip(schedule) {
                if row.len() != horizon as usize {
                    errors.push(ConfigurationError::FixedScheduleLength {
                        aircraft: a.id.clone(),
                        expected: horizon as usize,
                        found: row.len(),
                    });
                }
            }
        }
        MaintenancePolicy::Chosen {
            min_per_aircraft,
            max_simultaneous,
        } => {
            if *min_per_aircraft > horizon {
                errors.push(ConfigurationError::MaintenanceExceedsHorizon {
                    required: *min_per_aircraft,
                    horizon,
                });
            } else if let Some(cap) = max_simultaneous {
                let required = u64::from(*min_per_aircraft) * catalog.aircraft().len() as u64;
                let capacity = u64::from(*cap) * u64::from(horizon);
                if required > capacity {
                    errors.push(ConfigurationError::MaintenanceCapacityExceeded {
                        required,
                        capacity,
                    });
                }
            }
        }
    }

    errors
}

/// Slots where a fixed maintenance schedule exceeds its simultaneous cap.
/// Reported, never corrected.
pub fn maintenance_diagnostics(catalog: &Catalog, policy: &MaintenancePolicy) -> Vec<Violation> {
    let MaintenancePolicy::Fixed {
        schedule,
        max_simultaneous: Some(cap),
    } = policy
    else {
        return vec![];
    };

    let mut out = Vec::new();
    for t in catalog.grid().slots() {
        let count = schedule
            .iter()
            .filter(|row| row.get(t as usize).copied().unwrap_or(false))
            .count() as u32;
        if count > *cap {
            warn!(slot = t, count, cap, "fixed maintenance exceeds simultaneous cap");
            out.push(Violation {
                r#type: "maintenance_cap_exceeded".into(),
                weight: i64::from(count - cap),
                details: serde_json::json!({ "slot": t, "count": count, "cap": cap }),
            });
        }
    }
    out
}

fn add_objective(mut model: Model, catalog: &Catalog) -> Model {
    let layout = *model.layout();
    for (fi, f) in catalog.flights().iter().enumerate() {
        for (ai, &cost) in f.costs.iter().enumerate() {
            for t in catalog.grid().slots() {
                model.add_cost(layout.start(fi, ai, t), cost);
            }
        }
    }
    model
}

fn add_coverage_constraints(mut model: Model, catalog: &Catalog) -> Model {
    let layout = *model.layout();
    for fi in 0..catalog.flights().len() {
        let mut terms = Vec::with_capacity(catalog.aircraft().len() * catalog.horizon() as usize);
        for ai in 0..catalog.aircraft().len() {
            for t in catalog.grid().slots() {
                terms.push((layout.start(fi, ai, t), 1.0));
            }
        }
        model.add_constraint(
            ConstraintClass::Coverage { flight: fi },
            terms,
            Relation::Eq,
            1.0,
        );
    }
    model
}

/// Pins every start that would run past the horizon to zero.
fn add_completion_constraints(mut model: Model, catalog: &Catalog) -> Model {
    let layout = *model.layout();
    let grid = catalog.grid();
    for (fi, f) in catalog.flights().iter().enumerate() {
        let first_excluded = grid.feasible_starts(f.duration).end;
        for ai in 0..catalog.aircraft().len() {
            for t in first_excluded..grid.horizon() {
                debug_assert!(!grid.can_complete(t, f.duration));
                model.add_constraint(
                    ConstraintClass::Completion {
                        flight: fi,
                        aircraft: ai,
                        slot: t,
                    },
                    vec![(layout.start(fi, ai, t), 1.0)],
                    Relation::Eq,
                    0.0,
                );
            }
        }
    }
    model
}

/// One constraint per (aircraft, slot): every start whose interval covers the
/// slot, plus the maintenance indicator when the layout has one, sums to at
/// most one.
fn add_occupancy_constraints(mut model: Model, catalog: &Catalog) -> Model {
    let layout = *model.layout();
    let grid = catalog.grid();
    for ai in 0..catalog.aircraft().len() {
        for s in grid.slots() {
            let mut terms: Vec<(VarId, f64)> = Vec::new();
            for (fi, f) in catalog.flights().iter().enumerate() {
                for t in grid.covering_starts(s, f.duration) {
                    terms.push((layout.start(fi, ai, t), 1.0));
                }
            }
            if let Some(m) = layout.maintenance(ai, s) {
                terms.push((m, 1.0));
            }
            model.add_constraint(
                ConstraintClass::Occupancy { aircraft: ai, slot: s },
                terms,
                Relation::Le,
                1.0,
            );
        }
    }
    model
}

fn add_fixed_maintenance(mut model: Model, schedule: &[Vec<bool>]) -> Model {
    let layout = *model.layout();
    for (ai, row) in schedule.iter().enumerate() {
        for (t, &on) in row.iter().enumerate() {
            let t = t as u32;
            let Some(m) = layout.maintenance(ai, t) else {
                continue;
            };
            model.add_constraint(
                ConstraintClass::FixedMaintenance { aircraft: ai, slot: t },
                vec![(m, 1.0)],
                Relation::Eq,
                if on { 1.0 } else { 0.0 },
            );
        }
    }
    model
}

fn add_chosen_maintenance(mut model: Model, min_per_aircraft: u32, cap: Option<u32>) -> Model {
    let layout = *model.layout();
    for ai in 0..layout.aircraft {
        let terms = (0..layout.horizon)
            .filter_map(|t| layout.maintenance(ai, t))
            .map(|m| (m, 1.0))
            .collect();
        model.add_constraint(
            ConstraintClass::MaintenanceMinimum { aircraft: ai },
            terms,
            Relation::Ge,
            f64::from(min_per_aircraft),
        );
    }
    if let Some(cap) = cap {
        for t in 0..layout.horizon {
            let terms = (0..layout.aircraft)
                .filter_map(|ai| layout.maintenance(ai, t))
                .map(|m| (m, 1.0))
                .collect();
            model.add_constraint(
                ConstraintClass::MaintenanceCap { slot: t },
                terms,
                Relation::Le,
                f64::from(cap),
            );
        }
    }
    model
}
