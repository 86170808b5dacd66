use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(
            Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema, Eq, PartialEq, Hash, PartialOrd, Ord,
        )]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }
    };
}
id_newtype!(FlightId);
id_newtype!(AircraftId);

/// A flight to be placed on one aircraft.
///
/// `duration` is measured in real time units and is rounded up to whole
/// slots when the catalog is built. `costs` holds one entry per aircraft,
/// in the order of [`Instance::aircraft`].
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema, PartialEq)]
pub struct Flight {
    pub id: FlightId,
    pub duration: f64,
    pub costs: Vec<f64>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema, Eq, PartialEq)]
pub struct Aircraft {
    pub id: AircraftId,
}

/// How maintenance slots enter the model.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema, PartialEq, Default)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum MaintenancePolicy {
    /// Aircraft never go into maintenance.
    #[default]
    None,
    /// Maintenance is dictated from outside: `schedule[a][t]` marks aircraft
    /// `a` as unavailable at slot `t`. A cap on simultaneous maintenance is
    /// only checked and reported, never enforced.
    #[serde(rename_all = "camelCase")]
    Fixed {
        schedule: Vec<Vec<bool>>,
        #[serde(default)]
        max_simultaneous: Option<u32>,
    },
    /// The solver decides when each aircraft is maintained.
    #[serde(rename_all = "camelCase")]
    Chosen {
        min_per_aircraft: u32,
        #[serde(default)]
        max_simultaneous: Option<u32>,
    },
}

impl MaintenancePolicy {
    pub fn is_active(&self) -> bool {
        !matches!(self, MaintenancePolicy::None)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema, PartialEq)]
pub struct Instance {
    pub flights: Vec<Flight>,
    pub aircraft: Vec<Aircraft>,
    pub horizon: u32,
    #[serde(default)]
    pub maintenance: MaintenancePolicy,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, ToSchema, JsonSchema, Eq, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SolverKind {
    #[default]
    Milp,
    Search,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct SolveParams {
    #[serde(default)]
    pub solver: SolverKind,
    #[serde(default)]
    pub time_limit_sec: Option<u64>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
pub struct SolveEnvelope {
    pub instance: Instance,
    #[serde(default)]
    pub params: SolveParams,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FlightAssignment {
    pub flight_id: FlightId,
    pub aircraft_id: AircraftId,
    pub start: u32,
    pub end: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceSlots {
    pub aircraft_id: AircraftId,
    pub slots: Vec<u32>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema, PartialEq)]
pub struct Violation {
    pub r#type: String,
    pub weight: i64,
    pub details: serde_json::Value,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, ToSchema, JsonSchema, Eq, PartialEq)]
#[serde(rename_all = "UPPERCASE")]
pub enum SolveStatus {
    Optimal,
    Infeasible,
    Unbounded,
    Error,
}

impl fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SolveStatus::Optimal => "OPTIMAL",
            SolveStatus::Infeasible => "INFEASIBLE",
            SolveStatus::Unbounded => "UNBOUNDED",
            SolveStatus::Error => "ERROR",
        };
        f.write_str(s)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
pub struct SolveResult {
    pub status: SolveStatus,
    pub objective: f64,
    pub assignments: Vec<FlightAssignment>,
    #[serde(default)]
    pub maintenance: Vec<MaintenanceSlots>,
    /// Pre-solve diagnostics. These never fail a solve.
    #[serde(default)]
    pub warnings: Vec<Violation>,
    pub stats: serde_json::Value,
}

impl SolveResult {
    /// Result without a schedule, e.g. for infeasible models or backend failures.
    pub fn empty(status: SolveStatus, warnings: Vec<Violation>, stats: serde_json::Value) -> Self {
        Self {
            status,
            objective: 0.0,
            assignments: vec![],
            maintenance: vec![],
            warnings,
            stats,
        }
    }
}
