//! Entity catalog and time grid.
//!
//! Both are built once from an [`Instance`] and are read-only afterwards, so
//! a single catalog can be shared by concurrent model builds.

use crate::error::ConfigurationError;
use std::collections::HashSet;
use std::ops::Range;
use types::{AircraftId, FlightId, Instance};

/// Discretized horizon: slots `0..horizon`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimeGrid {
    horizon: u32,
}

impl TimeGrid {
    pub fn new(horizon: u32) -> Result<Self, ConfigurationError> {
        if horizon == 0 {
            return Err(ConfigurationError::NonPositiveHorizon);
        }
        Ok(Self { horizon })
    }

    pub fn horizon(&self) -> u32 {
        self.horizon
    }

    pub fn slots(&self) -> Range<u32> {
        0..self.horizon
    }

    /// A flight of `duration` slots may start at `start` iff it completes
    /// inside the horizon: `start + duration <= horizon`.
    pub fn can_complete(&self, start: u32, duration: u32) -> bool {
        start
            .checked_add(duration)
            .is_some_and(|end| end <= self.horizon)
    }

    /// Start slots of a flight of `duration` slots that finish in time.
    pub fn feasible_starts(&self, duration: u32) -> Range<u32> {
        0..(self.horizon + 1).saturating_sub(duration)
    }

    /// Occupancy window: start slots whose interval `[t, t + duration)`
    /// covers `slot`, i.e. `max(0, slot - duration + 1) ..= slot`.
    pub fn covering_starts(&self, slot: u32, duration: u32) -> Range<u32> {
        (slot + 1).saturating_sub(duration)..slot + 1
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct CatalogFlight {
    pub id: FlightId,
    /// Whole slots, rounded up from the real duration.
    pub duration: u32,
    /// Indexed like [`Catalog::aircraft`].
    pub costs: Vec<f64>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CatalogAircraft {
    pub id: AircraftId,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Catalog {
    grid: TimeGrid,
    flights: Vec<CatalogFlight>,
    aircraft: Vec<CatalogAircraft>,
}

/// Rounds a real duration up to whole slots. Never rounds down.
pub fn duration_slots(duration: f64) -> Option<u32> {
    if !duration.is_finite() || duration <= 0.0 {
        return None;
    }
    let slots = duration.ceil();
    if slots > f64::from(u32::MAX) {
        return None;
    }
    Some(slots as u32)
}

impl Catalog {
    /// Builds the catalog, failing on the first configuration problem.
    pub fn new(inst: &Instance) -> Result<Self, ConfigurationError> {
        if let Some(err) = check(inst).into_iter().next() {
            return Err(err);
        }
        let grid = TimeGrid::new(inst.horizon)?;
        let flights = inst
            .flights
            .iter()
            .map(|f| {
                let duration =
                    duration_slots(f.duration).ok_or_else(|| ConfigurationError::InvalidDuration {
                        flight: f.id.clone(),
                        duration: f.duration,
                    })?;
                Ok(CatalogFlight {
                    id: f.id.clone(),
                    duration,
                    costs: f.costs.clone(),
                })
            })
            .collect::<Result<_, ConfigurationError>>()?;
        let aircraft = inst
            .aircraft
            .iter()
            .map(|a| CatalogAircraft { id: a.id.clone() })
            .collect();
        Ok(Self {
            grid,
            flights,
            aircraft,
        })
    }

    pub fn grid(&self) -> &TimeGrid {
        &self.grid
    }

    pub fn horizon(&self) -> u32 {
        self.grid.horizon()
    }

    pub fn flights(&self) -> &[CatalogFlight] {
        &self.flights
    }

    pub fn aircraft(&self) -> &[CatalogAircraft] {
        &self.aircraft
    }

    pub fn flight_index(&self, id: &FlightId) -> Option<usize> {
        self.flights.iter().position(|f| &f.id == id)
    }

    pub fn aircraft_index(&self, id: &AircraftId) -> Option<usize> {
        self.aircraft.iter().position(|a| &a.id == id)
    }
}

/// Collects every catalog-level problem in `inst`.
pub fn check(inst: &Instance) -> Vec<ConfigurationError> {
    let mut errors = Vec::new();

    if inst.horizon == 0 {
        errors.push(ConfigurationError::NonPositiveHorizon);
    }

    let mut seen = HashSet::new();
    for f in &inst.flights {
        if !seen.insert(&f.id) {
            errors.push(ConfigurationError::DuplicateFlight(f.id.clone()));
        }
    }
    let mut seen = HashSet::new();
    for a in &inst.aircraft {
        if !seen.insert(&a.id) {
            errors.push(ConfigurationError::DuplicateAircraft(a.id.clone()));
        }
    }

    for f in &inst.flights {
        if f.costs.len() != inst.aircraft.len() {
            errors.push(ConfigurationError::CostRowMismatch {
                flight: f.id.clone(),
                expected: inst.aircraft.len(),
                found: f.costs.len(),
            });
        } else if let Some((a, &cost)) = inst
            .aircraft
            .iter()
            .zip(&f.costs)
            .find(|(_, c)| !c.is_finite())
        {
            errors.push(ConfigurationError::InvalidCost {
                flight: f.id.clone(),
                aircraft: a.id.clone(),
                cost,
            });
        }

        match duration_slots(f.duration) {
            None => errors.push(ConfigurationError::InvalidDuration {
                flight: f.id.clone(),
                duration: f.duration,
            }),
            Some(slots) if inst.horizon > 0 && slots > inst.horizon => {
                errors.push(ConfigurationError::DurationExceedsHorizon {
                    flight: f.id.clone(),
                    slots,
                    horizon: inst.horizon,
                })
            }
            Some(_) => {}
        }
    }

    errors
}
