//! Maps a backend outcome back to flights, aircraft and slots.

use crate::catalog::Catalog;
use crate::error::DecodeInconsistencyError;
use crate::model::{ConstraintClass, Model};
use crate::scoring;
use crate::solver::SolveOutcome;
use types::{FlightAssignment, MaintenanceSlots, SolveStatus};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Schedule {
    /// In catalog flight order.
    pub assignments: Vec<FlightAssignment>,
    /// One entry per aircraft when the model has maintenance indicators.
    pub maintenance: Vec<MaintenanceSlots>,
    /// Cost recomputed from the catalog, not taken from the backend.
    pub cost: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Decoded {
    pub status: SolveStatus,
    pub schedule: Schedule,
    /// Objective reported by the backend.
    pub objective: f64,
}

pub fn decode(
    catalog: &Catalog,
    model: &Model,
    outcome: SolveOutcome,
) -> Result<Decoded, DecodeInconsistencyError> {
    match outcome {
        SolveOutcome::Optimal { values, objective } => Ok(Decoded {
            status: SolveStatus::Optimal,
            schedule: decode_values(catalog, model, &values)?,
            objective,
        }),
        SolveOutcome::Infeasible => Ok(Decoded {
            status: SolveStatus::Infeasible,
            schedule: Schedule::default(),
            objective: 0.0,
        }),
        SolveOutcome::Unbounded => Ok(Decoded {
            status: SolveStatus::Unbounded,
            schedule: Schedule::default(),
            objective: 0.0,
        }),
    }
}

/// Decodes raw values, rejecting anything that breaks the schedule
/// invariants instead of passing it on.
pub fn decode_values(
    catalog: &Catalog,
    model: &Model,
    values: &[bool],
) -> Result<Schedule, DecodeInconsistencyError> {
    let layout = model.layout();
    if values.len() != layout.len() {
        return Err(DecodeInconsistencyError::ValueCount {
            expected: layout.len(),
            found: values.len(),
        });
    }
    let horizon = catalog.horizon();

    let mut assignments = Vec::with_capacity(catalog.flights().len());
    for (fi, f) in catalog.flights().iter().enumerate() {
        let mut chosen = Vec::new();
        for ai in 0..catalog.aircraft().len() {
            for t in catalog.grid().slots() {
                if values[layout.start(fi, ai, t).index()] {
                    chosen.push((ai, t));
                }
            }
        }
        let (ai, start) = match chosen.as_slice() {
            [] => {
                return Err(DecodeInconsistencyError::MissingAssignment {
                    flight: f.id.clone(),
                })
            }
            [one] => *one,
            many => {
                return Err(DecodeInconsistencyError::MultipleAssignments {
                    flight: f.id.clone(),
                    count: many.len(),
                })
            }
        };
        let end = start.saturating_add(f.duration);
        if end > horizon {
            return Err(DecodeInconsistencyError::ExceedsHorizon {
                flight: f.id.clone(),
                end,
                horizon,
            });
        }
        assignments.push(FlightAssignment {
            flight_id: f.id.clone(),
            aircraft_id: catalog.aircraft()[ai].id.clone(),
            start,
            end,
        });
    }

    let mut maintenance = Vec::new();
    if layout.maintenance {
        for (ai, a) in catalog.aircraft().iter().enumerate() {
            let slots = catalog
                .grid()
                .slots()
                .filter(|&t| layout.maintenance(ai, t).is_some_and(|m| values[m.index()]))
                .collect();
            maintenance.push(MaintenanceSlots {
                aircraft_id: a.id.clone(),
                slots,
            });
        }
    }

    let pinned = model.constraints().iter().find_map(|c| match c.class {
        ConstraintClass::FixedMaintenance { aircraft, slot } if !c.is_satisfied(values) => {
            Some((aircraft, slot, c.rhs > 0.5))
        }
        _ => None,
    });
    if let Some((ai, slot, scheduled)) = pinned {
        return Err(DecodeInconsistencyError::MaintenanceMismatch {
            aircraft: catalog.aircraft()[ai].id.clone(),
            slot,
            scheduled,
        });
    }

    let scores = scoring::evaluate(catalog, &assignments, &maintenance);
    if let Some((ai, slot, cell)) = scores.occupancy.conflicts().next() {
        return Err(DecodeInconsistencyError::Overlap {
            aircraft: catalog.aircraft()[ai].id.clone(),
            slot,
            occupancy: cell.load(),
        });
    }

    Ok(Schedule {
        assignments,
        maintenance,
        cost: scores.cost,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::build;
    use types::{Aircraft, AircraftId, Flight, FlightId, Instance, MaintenancePolicy};

    fn setup(policy: MaintenancePolicy) -> (Catalog, Model) {
        let inst = Instance {
            flights: vec![
                Flight {
                    id: "F1".into(),
                    duration: 2.0,
                    costs: vec![10.0, 15.0],
                },
                Flight {
                    id: "F2".into(),
                    duration: 0.5,
                    costs: vec![12.0, 18.0],
                },
            ],
            aircraft: vec![Aircraft { id: "A1".into() }, Aircraft { id: "A2".into() }],
            horizon: 3,
            maintenance: policy.clone(),
        };
        let c = Catalog::new(&inst).unwrap();
        let m = build(&c, &policy).unwrap();
        (c, m)
    }

    fn values(model: &Model, on: &[usize]) -> Vec<bool> {
        let mut v = vec![false; model.num_vars()];
        for &i in on {
            v[i] = true;
        }
        v
    }

    #[test]
    fn decodes_unique_starts() {
        let (c, m) = setup(MaintenancePolicy::None);
        let l = *m.layout();
        let v = values(&m, &[l.start(0, 0, 1).index(), l.start(1, 0, 0).index()]);
        assert!(m.first_violation(&v).is_none());
        let d = decode(&c, &m, SolveOutcome::Optimal { values: v, objective: 22.0 }).unwrap();
        assert_eq!(d.status, SolveStatus::Optimal);
        assert_eq!(d.objective, 22.0);
        assert_eq!(d.schedule.cost, 22.0);
        assert_eq!(
            d.schedule.assignments,
            vec![
                FlightAssignment {
                    flight_id: FlightId::from("F1"),
                    aircraft_id: AircraftId::from("A1"),
                    start: 1,
                    end: 3
                },
                FlightAssignment {
                    flight_id: FlightId::from("F2"),
                    aircraft_id: AircraftId::from("A1"),
                    start: 0,
                    end: 1
                },
            ]
        );
        assert!(d.schedule.maintenance.is_empty());
    }

    #[test]
    fn missing_start_is_inconsistent() {
        let (c, m) = setup(MaintenancePolicy::None);
        let v = values(&m, &[m.layout().start(0, 1, 0).index()]);
        assert_eq!(
            decode_values(&c, &m, &v).unwrap_err(),
            DecodeInconsistencyError::MissingAssignment {
                flight: FlightId::from("F2")
            }
        );
    }

    #[test]
    fn duplicate_start_is_inconsistent() {
        let (c, m) = setup(MaintenancePolicy::None);
        let l = *m.layout();
        let v = values(
            &m,
            &[l.start(0, 0, 0).index(), l.start(0, 1, 0).index(), l.start(1, 1, 2).index()],
        );
        assert_eq!(
            decode_values(&c, &m, &v).unwrap_err(),
            DecodeInconsistencyError::MultipleAssignments {
                flight: FlightId::from("F1"),
                count: 2
            }
        );
    }

    #[test]
    fn late_start_is_inconsistent() {
        let (c, m) = setup(MaintenancePolicy::None);
        let l = *m.layout();
        let v = values(&m, &[l.start(0, 0, 2).index(), l.start(1, 1, 0).index()]);
        assert_eq!(
            decode_values(&c, &m, &v).unwrap_err(),
            DecodeInconsistencyError::ExceedsHorizon {
                flight: FlightId::from("F1"),
                end: 4,
                horizon: 3
            }
        );
    }

    #[test]
    fn overlap_is_inconsistent() {
        let (c, m) = setup(MaintenancePolicy::None);
        let l = *m.layout();
        let v = values(&m, &[l.start(0, 1, 0).index(), l.start(1, 1, 1).index()]);
        assert_eq!(
            decode_values(&c, &m, &v).unwrap_err(),
            DecodeInconsistencyError::Overlap {
                aircraft: AircraftId::from("A2"),
                slot: 1,
                occupancy: 2
            }
        );
    }

    #[test]
    fn wrong_value_count_is_inconsistent() {
        let (c, m) = setup(MaintenancePolicy::None);
        assert_eq!(
            decode_values(&c, &m, &[true]).unwrap_err(),
            DecodeInconsistencyError::ValueCount {
                expected: m.num_vars(),
                found: 1
            }
        );
    }

    #[test]
    fn extracts_chosen_maintenance_in_slot_order() {
        let (c, m) = setup(MaintenancePolicy::Chosen {
            min_per_aircraft: 1,
            max_simultaneous: None,
        });
        let l = *m.layout();
        let v = values(
            &m,
            &[
                l.start(0, 0, 0).index(),
                l.start(1, 1, 0).index(),
                l.maintenance(0, 2).unwrap().index(),
                l.maintenance(1, 2).unwrap().index(),
                l.maintenance(1, 1).unwrap().index(),
            ],
        );
        assert!(m.first_violation(&v).is_none());
        let s = decode_values(&c, &m, &v).unwrap();
        assert_eq!(s.maintenance.len(), 2);
        assert_eq!(s.maintenance[0].slots, vec![2]);
        assert_eq!(s.maintenance[1].slots, vec![1, 2]);
        assert_eq!(s.cost, 28.0);
    }

    #[test]
    fn fixed_maintenance_must_match_the_schedule() {
        let (c, m) = setup(MaintenancePolicy::Fixed {
            schedule: vec![vec![false, false, true], vec![false; 3]],
            max_simultaneous: None,
        });
        let l = *m.layout();
        let starts = [l.start(0, 1, 0).index(), l.start(1, 1, 2).index()];
        let v = values(&m, &starts);
        assert_eq!(
            decode_values(&c, &m, &v).unwrap_err(),
            DecodeInconsistencyError::MaintenanceMismatch {
                aircraft: AircraftId::from("A1"),
                slot: 2,
                scheduled: true
            }
        );

        let mut on = starts.to_vec();
        on.push(l.maintenance(0, 2).unwrap().index());
        let s = decode_values(&c, &m, &values(&m, &on)).unwrap();
        assert_eq!(s.maintenance[0].slots, vec![2]);
        assert!(s.maintenance[1].slots.is_empty());
    }

    #[test]
    fn infeasible_outcome_yields_empty_schedule() {
        let (c, m) = setup(MaintenancePolicy::None);
        let d = decode(&c, &m, SolveOutcome::Infeasible).unwrap();
        assert_eq!(d.status, SolveStatus::Infeasible);
        assert_eq!(d.schedule, Schedule::default());
    }
}
