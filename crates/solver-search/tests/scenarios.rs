use sched_core::{
    engine, report, scoring, Catalog, ConfigurationError, ScheduleError, Solver, SolverError,
};
use solver_search::{SearchBackend, SearchSolver};
use types::{
    Aircraft, AircraftId, Flight, FlightId, Instance, MaintenancePolicy, SolveEnvelope, SolveParams,
    SolveStatus,
};

fn instance(durations: &[f64], costs: &[&[f64]], horizon: u32, maintenance: MaintenancePolicy) -> Instance {
    let aircraft = costs.first().map_or(0, |c| c.len());
    Instance {
        flights: durations
            .iter()
            .zip(costs)
            .enumerate()
            .map(|(i, (&d, c))| Flight {
                id: FlightId(format!("{}", i + 1)),
                duration: d,
                costs: c.to_vec(),
            })
            .collect(),
        aircraft: (0..aircraft)
            .map(|i| Aircraft {
                id: AircraftId(format!("{}", i + 1)),
            })
            .collect(),
        horizon,
        maintenance,
    }
}

fn solve(inst: &Instance) -> Result<types::SolveResult, ScheduleError> {
    engine::run(inst, &SolveParams::default(), &SearchBackend::new())
}

#[test]
fn single_flight_fits_on_single_aircraft() {
    let inst = instance(&[2.0], &[&[7.0]], 3, MaintenancePolicy::None);
    let r = solve(&inst).unwrap();
    assert_eq!(r.status, SolveStatus::Optimal);
    assert_eq!(r.objective, 7.0);
    assert_eq!(r.assignments.len(), 1);
    let a = &r.assignments[0];
    assert!(a.start == 0 || a.start == 1, "start {}", a.start);
    assert_eq!(a.end, a.start + 2);
    assert!(r.maintenance.is_empty());
}

#[test]
fn flight_spanning_horizon_starts_at_zero() {
    let inst = instance(&[2.4], &[&[3.0, 1.0]], 3, MaintenancePolicy::None);
    let r = solve(&inst).unwrap();
    assert_eq!(r.status, SolveStatus::Optimal);
    assert_eq!(r.assignments[0].start, 0);
    assert_eq!(r.assignments[0].end, 3);
    assert_eq!(r.assignments[0].aircraft_id, AircraftId::from("2"));
    assert_eq!(r.objective, 1.0);
}

#[test]
fn aircraft_always_in_maintenance_is_infeasible() {
    let inst = instance(
        &[1.0],
        &[&[5.0]],
        3,
        MaintenancePolicy::Fixed {
            schedule: vec![vec![true; 3]],
            max_simultaneous: None,
        },
    );
    let r = solve(&inst).unwrap();
    assert_eq!(r.status, SolveStatus::Infeasible);
    assert!(r.assignments.is_empty());
    assert!(r.maintenance.is_empty());
}

#[test]
fn maintenance_minimum_beyond_horizon_is_a_configuration_error() {
    let inst = instance(
        &[1.0],
        &[&[5.0]],
        3,
        MaintenancePolicy::Chosen {
            min_per_aircraft: 4,
            max_simultaneous: None,
        },
    );
    match solve(&inst) {
        Err(ScheduleError::Configuration(ConfigurationError::MaintenanceExceedsHorizon {
            required: 4,
            horizon: 3,
        })) => {}
        other => panic!("unexpected {other:?}"),
    }
}

fn fixed_fleet() -> Instance {
    instance(
        &[2.0, 1.0, 3.0],
        &[&[10.0, 15.0, 20.0], &[12.0, 18.0, 22.0], &[11.0, 14.0, 17.0]],
        7,
        MaintenancePolicy::Fixed {
            schedule: vec![
                vec![false, false, true, true, true, false, false],
                vec![true, false, true, false, true, true, false],
                vec![false, true, true, false, false, false, true],
            ],
            max_simultaneous: Some(2),
        },
    )
}

#[test]
fn fixed_maintenance_routes_flights_around_it() {
    let inst = fixed_fleet();
    let r = solve(&inst).unwrap();
    assert_eq!(r.status, SolveStatus::Optimal);
    // The 3-slot flight only fits on aircraft 3 at slots 3..6; the others
    // take aircraft 1 around its maintenance block.
    assert_eq!(r.objective, 39.0);
    let third = &r.assignments[2];
    assert_eq!((third.aircraft_id.0.as_str(), third.start, third.end), ("3", 3, 6));

    let catalog = Catalog::new(&inst).unwrap();
    let scores = scoring::evaluate(&catalog, &r.assignments, &r.maintenance);
    assert!(scores.is_feasible(), "{:?}", scores.violations);
    assert_eq!(scores.cost, r.objective);
    assert_eq!(r.maintenance[0].slots, vec![2, 3, 4]);
    assert_eq!(r.maintenance[1].slots, vec![0, 2, 4, 5]);

    // Slot 2 has all three aircraft in maintenance against a cap of two.
    assert_eq!(r.warnings.len(), 1);
    assert_eq!(r.warnings[0].details["slot"], 2);
}

#[test]
fn chosen_maintenance_meets_minimum_and_cap() {
    let inst = instance(
        &[2.0, 1.5],
        &[&[4.0, 9.0], &[6.0, 5.0]],
        4,
        MaintenancePolicy::Chosen {
            min_per_aircraft: 2,
            max_simultaneous: Some(1),
        },
    );
    let r = solve(&inst).unwrap();
    assert_eq!(r.status, SolveStatus::Optimal);
    assert_eq!(r.objective, 9.0);
    assert_eq!(r.maintenance.len(), 2);
    for m in &r.maintenance {
        assert!(m.slots.len() >= 2);
    }
    for t in 0..4 {
        let n = r.maintenance.iter().filter(|m| m.slots.contains(&t)).count();
        assert!(n <= 1, "slot {t} has {n} aircraft in maintenance");
    }
    let catalog = Catalog::new(&inst).unwrap();
    assert!(scoring::evaluate(&catalog, &r.assignments, &r.maintenance).is_feasible());
}

#[test]
fn resolving_gives_the_same_objective() {
    let inst = fixed_fleet();
    let first = solve(&inst).unwrap();
    let second = solve(&inst).unwrap();
    assert_eq!(first.objective, second.objective);
}

#[test]
fn backend_timeout_is_reported_as_error_status() {
    let env = SolveEnvelope {
        instance: fixed_fleet(),
        params: SolveParams::default(),
    };
    let prepared = engine::prepare(&env.instance).unwrap();
    let err = sched_core::Backend::solve(
        &SearchBackend::new(),
        &prepared.model,
        Some(std::time::Instant::now()),
    )
    .unwrap_err();
    assert_eq!(err, SolverError::Timeout);

    let r = engine::solve_envelope(&env, &SearchBackend::new().with_max_nodes(2)).unwrap();
    assert_eq!(r.status, SolveStatus::Error);
    assert_eq!(r.stats["error"], "backend failure: node limit 2 reached");
    assert!(r.assignments.is_empty());
}

#[test]
fn report_lists_every_flight() {
    let r = solve(&fixed_fleet()).unwrap();
    let text = report::render(&r);
    assert!(text.starts_with("status=OPTIMAL\n"));
    assert_eq!(text.lines().filter(|l| l.starts_with("flight=")).count(), 3);
    assert!(text.contains("flight=3 aircraft=3 start=3 end=6\n"));
    assert!(text.contains("objective=39\n"));
}

#[tokio::test]
async fn async_solver_runs_the_pipeline() {
    let env = SolveEnvelope {
        instance: instance(&[1.0, 1.0], &[&[2.0], &[3.0]], 2, MaintenancePolicy::None),
        params: SolveParams::default(),
    };
    let r = SearchSolver::new().solve(env).await.unwrap();
    assert_eq!(r.status, SolveStatus::Optimal);
    assert_eq!(r.objective, 5.0);
    assert_eq!(r.stats["method"], "search");

    let bad = SolveEnvelope {
        instance: instance(&[1.0], &[&[2.0]], 0, MaintenancePolicy::None),
        params: SolveParams::default(),
    };
    assert!(SearchSolver::new().solve(bad).await.is_err());
}

#[tokio::test]
async fn unrepresentable_time_limit_runs_without_deadline() {
    let env = SolveEnvelope {
        instance: fixed_fleet(),
        params: SolveParams {
            time_limit_sec: Some(u64::MAX),
            ..SolveParams::default()
        },
    };
    let r = SearchSolver::new().solve(env).await.unwrap();
    assert_eq!(r.status, SolveStatus::Optimal);
    assert_eq!(r.objective, 39.0);
}
