use proptest::prelude::*;
use sched_core::{engine, scoring, Catalog, ScheduleError};
use solver_search::SearchBackend;
use types::{
    Aircraft, AircraftId, Flight, FlightAssignment, FlightId, Instance, MaintenancePolicy,
    MaintenanceSlots, SolveParams, SolveStatus,
};

fn policy(aircraft: usize, horizon: u32) -> impl Strategy<Value = MaintenancePolicy> {
    let row = prop::collection::vec(prop::bool::weighted(0.3), horizon as usize);
    prop_oneof![
        Just(MaintenancePolicy::None),
        (prop::collection::vec(row, aircraft), prop::option::of(0u32..3)).prop_map(
            |(schedule, cap)| MaintenancePolicy::Fixed {
                schedule,
                max_simultaneous: cap,
            }
        ),
        (0..=horizon, prop::option::of(1u32..=2)).prop_map(|(min, cap)| {
            MaintenancePolicy::Chosen {
                min_per_aircraft: min,
                max_simultaneous: cap,
            }
        }),
    ]
}

fn instances() -> impl Strategy<Value = Instance> {
    (1usize..=3, 1usize..=2, 1u32..=4).prop_flat_map(|(nf, na, h)| {
        let flight = (0.2f64..=f64::from(h), prop::collection::vec(0u8..20, na));
        (prop::collection::vec(flight, nf), policy(na, h)).prop_map(move |(fs, maintenance)| {
            Instance {
                flights: fs
                    .into_iter()
                    .enumerate()
                    .map(|(i, (duration, costs))| Flight {
                        id: FlightId(format!("F{i}")),
                        duration,
                        costs: costs.into_iter().map(f64::from).collect(),
                    })
                    .collect(),
                aircraft: (0..na)
                    .map(|a| Aircraft {
                        id: AircraftId(format!("A{a}")),
                    })
                    .collect(),
                horizon: h,
                maintenance,
            }
        })
    })
}

fn fixed_slots(catalog: &Catalog, policy: &MaintenancePolicy) -> Vec<MaintenanceSlots> {
    let MaintenancePolicy::Fixed { schedule, .. } = policy else {
        return vec![];
    };
    catalog
        .aircraft()
        .iter()
        .zip(schedule)
        .map(|(a, row)| MaintenanceSlots {
            aircraft_id: a.id.clone(),
            slots: (0..row.len() as u32).filter(|&t| row[t as usize]).collect(),
        })
        .collect()
}

/// Cheapest feasible schedule by enumerating every (aircraft, start) per flight.
fn brute_force(catalog: &Catalog, maintenance: &[MaintenanceSlots]) -> Option<f64> {
    fn go(
        catalog: &Catalog,
        maintenance: &[MaintenanceSlots],
        partial: &mut Vec<FlightAssignment>,
        best: &mut Option<f64>,
    ) {
        let fi = partial.len();
        if fi == catalog.flights().len() {
            let s = scoring::evaluate(catalog, partial, maintenance);
            if s.is_feasible() && best.map_or(true, |b| s.cost < b) {
                *best = Some(s.cost);
            }
            return;
        }
        let f = &catalog.flights()[fi];
        for a in catalog.aircraft() {
            for t in catalog.grid().feasible_starts(f.duration) {
                partial.push(FlightAssignment {
                    flight_id: f.id.clone(),
                    aircraft_id: a.id.clone(),
                    start: t,
                    end: t + f.duration,
                });
                go(catalog, maintenance, partial, best);
                partial.pop();
            }
        }
    }
    let mut best = None;
    go(catalog, maintenance, &mut Vec::new(), &mut best);
    best
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn decoded_schedules_respect_invariants(inst in instances()) {
        let result = engine::run(&inst, &SolveParams::default(), &SearchBackend::new());
        let r = match result {
            Ok(r) => r,
            Err(ScheduleError::Configuration(_)) => {
                let chosen = matches!(inst.maintenance, MaintenancePolicy::Chosen { .. });
                prop_assert!(chosen);
                return Ok(());
            }
            Err(e) => return Err(TestCaseError::fail(e.to_string())),
        };
        let catalog = Catalog::new(&inst).unwrap();

        if matches!(inst.maintenance, MaintenancePolicy::Chosen { .. }) {
            prop_assert_ne!(r.status, SolveStatus::Unbounded);
        } else {
            let fixed = fixed_slots(&catalog, &inst.maintenance);
            match brute_force(&catalog, &fixed) {
                None => prop_assert_eq!(r.status, SolveStatus::Infeasible),
                Some(best) => {
                    prop_assert_eq!(r.status, SolveStatus::Optimal);
                    prop_assert_eq!(r.objective, best);
                    prop_assert_eq!(&r.maintenance, &fixed);
                }
            }
        }

        if r.status != SolveStatus::Optimal {
            prop_assert!(r.assignments.is_empty());
            return Ok(());
        }

        // Every flight exactly once, in catalog order, inside the horizon.
        prop_assert_eq!(r.assignments.len(), inst.flights.len());
        for (a, f) in r.assignments.iter().zip(&inst.flights) {
            prop_assert_eq!(&a.flight_id, &f.id);
            prop_assert!(a.end <= inst.horizon);
        }

        // Occupancy rebuilt from the output never exceeds one.
        let scores = scoring::evaluate(&catalog, &r.assignments, &r.maintenance);
        prop_assert!(scores.is_feasible(), "{:?}", scores.violations);
        prop_assert!((scores.cost - r.objective).abs() < 1e-9);

        if let MaintenancePolicy::Chosen { min_per_aircraft, max_simultaneous } = inst.maintenance {
            prop_assert_eq!(r.maintenance.len(), inst.aircraft.len());
            for m in &r.maintenance {
                prop_assert!(m.slots.len() as u32 >= min_per_aircraft);
            }
            if let Some(cap) = max_simultaneous {
                for t in 0..inst.horizon {
                    let n = r.maintenance.iter().filter(|m| m.slots.contains(&t)).count();
                    prop_assert!(n as u32 <= cap);
                }
            }
        }
    }

    #[test]
    fn resolving_keeps_the_objective(inst in instances()) {
        let params = SolveParams::default();
        let backend = SearchBackend::new();
        if let (Ok(a), Ok(b)) = (engine::run(&inst, &params, &backend), engine::run(&inst, &params, &backend)) {
            prop_assert_eq!(a.status, b.status);
            prop_assert_eq!(a.objective, b.objective);
        }
    }
}
