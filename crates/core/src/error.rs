use thiserror::Error;
use types::{AircraftId, FlightId};

/// Malformed input, or input that is infeasible before a model is ever
/// submitted. Always fatal to the current request.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigurationError {
    #[error("horizon must be positive")]
    NonPositiveHorizon,
    #[error("duplicate flight id: {0}")]
    DuplicateFlight(FlightId),
    #[error("duplicate aircraft id: {0}")]
    DuplicateAircraft(AircraftId),
    #[error("flight {flight} has invalid duration {duration}")]
    InvalidDuration { flight: FlightId, duration: f64 },
    #[error("flight {flight} has invalid cost {cost} on aircraft {aircraft}")]
    InvalidCost {
        flight: FlightId,
        aircraft: AircraftId,
        cost: f64,
    },
    #[error("flight {flight} has {found} cost entries, expected one per aircraft ({expected})")]
    CostRowMismatch {
        flight: FlightId,
        expected: usize,
        found: usize,
    },
    #[error("flight {flight} needs {slots} slots but the horizon is {horizon}")]
    DurationExceedsHorizon {
        flight: FlightId,
        slots: u32,
        horizon: u32,
    },
    #[error("fixed maintenance schedule has {found} rows, expected one per aircraft ({expected})")]
    FixedScheduleRows { expected: usize, found: usize },
    #[error("fixed maintenance row for aircraft {aircraft} has {found} slots, expected {expected}")]
    FixedScheduleLength {
        aircraft: AircraftId,
        expected: usize,
        found: usize,
    },
    #[error("each aircraft needs {required} maintenance slots but the horizon is {horizon}")]
    MaintenanceExceedsHorizon { required: u32, horizon: u32 },
    #[error(
        "{required} maintenance slots are required in total but at most {capacity} fit under the simultaneous cap"
    )]
    MaintenanceCapacityExceeded { required: u64, capacity: u64 },
    #[error("flight {flight} has no feasible start slot")]
    NoFeasibleStart { flight: FlightId },
}

/// Failure of the optimization backend. Reported to the caller, never
/// retried here.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SolverError {
    #[error("timeout")]
    Timeout,
    #[error("backend failure: {0}")]
    Backend(String),
}

/// A supposedly optimal result that does not decode into a valid schedule.
/// Signals a model or backend bug.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DecodeInconsistencyError {
    #[error("backend returned {found} values for a model with {expected} variables")]
    ValueCount { expected: usize, found: usize },
    #[error("flight {flight} has no start in the solution")]
    MissingAssignment { flight: FlightId },
    #[error("flight {flight} starts {count} times in the solution")]
    MultipleAssignments { flight: FlightId, count: usize },
    #[error("flight {flight} ends at slot {end}, past the horizon {horizon}")]
    ExceedsHorizon {
        flight: FlightId,
        end: u32,
        horizon: u32,
    },
    #[error("aircraft {aircraft} maintenance at slot {slot} disagrees with the fixed schedule (scheduled: {scheduled})")]
    MaintenanceMismatch {
        aircraft: AircraftId,
        slot: u32,
        scheduled: bool,
    },
    #[error("aircraft {aircraft} is double-booked at slot {slot} (occupancy {occupancy})")]
    Overlap {
        aircraft: AircraftId,
        slot: u32,
        occupancy: u32,
    },
}

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error(transparent)]
    Solver(#[from] SolverError),
    #[error(transparent)]
    Decode(#[from] DecodeInconsistencyError),
}

/// All configuration problems found in one instance.
#[derive(Debug, Error)]
#[error("invalid instance: {}", join(.0))]
pub struct ValidationError(pub Vec<ConfigurationError>);

fn join(errors: &[ConfigurationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
