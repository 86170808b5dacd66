//! Evaluation of a concrete schedule against the catalog: realized cost and
//! hard-constraint violations, reconstructed from the decoded output.

use crate::catalog::Catalog;
use std::collections::{BTreeMap, HashMap};
use types::{FlightAssignment, MaintenanceSlots, Violation};

/// Per (aircraft, slot) usage. Aircraft are catalog indices.
#[derive(Clone, Debug, Default)]
pub struct Occupancy {
    cells: BTreeMap<(usize, u32), Cell>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Cell {
    pub flights: u32,
    pub maintenance: bool,
}

impl Cell {
    pub fn load(&self) -> u32 {
        self.flights + u32::from(self.maintenance)
    }
}

impl Occupancy {
    pub fn add_flight(&mut self, aircraft: usize, start: u32, end: u32) {
        for s in start..end {
            self.cells.entry((aircraft, s)).or_default().flights += 1;
        }
    }

    pub fn add_maintenance(&mut self, aircraft: usize, slot: u32) {
        self.cells.entry((aircraft, slot)).or_default().maintenance = true;
    }

    pub fn get(&self, aircraft: usize, slot: u32) -> Cell {
        self.cells.get(&(aircraft, slot)).copied().unwrap_or_default()
    }

    /// Cells whose load exceeds one, in (aircraft, slot) order.
    pub fn conflicts(&self) -> impl Iterator<Item = (usize, u32, Cell)> + '_ {
        self.cells
            .iter()
            .filter(|(_, c)| c.load() > 1)
            .map(|(&(a, s), &c)| (a, s, c))
    }
}

#[derive(Clone, Debug, Default)]
pub struct Scores {
    pub cost: f64,
    pub occupancy: Occupancy,
    pub violations: Vec<Violation>,
}

impl Scores {
    pub fn is_feasible(&self) -> bool {
        self.violations.is_empty()
    }
}

fn violation(kind: &str, details: serde_json::Value) -> Violation {
    Violation {
        r#type: kind.into(),
        weight: 1,
        details,
    }
}

pub fn evaluate(
    catalog: &Catalog,
    assignments: &[FlightAssignment],
    maintenance: &[MaintenanceSlots],
) -> Scores {
    let horizon = catalog.horizon();
    let mut occupancy = Occupancy::default();
    let mut violations = Vec::new();
    let mut cost = 0.0;
    let mut seen: HashMap<usize, usize> = HashMap::new();

    for m in maintenance {
        let Some(ai) = catalog.aircraft_index(&m.aircraft_id) else {
            violations.push(violation(
                "unknown_aircraft",
                serde_json::json!({ "aircraft": m.aircraft_id }),
            ));
            continue;
        };
        for &s in &m.slots {
            occupancy.add_maintenance(ai, s);
        }
    }

    for a in assignments {
        let Some(fi) = catalog.flight_index(&a.flight_id) else {
            violations.push(violation(
                "unknown_flight",
                serde_json::json!({ "flight": a.flight_id }),
            ));
            continue;
        };
        let Some(ai) = catalog.aircraft_index(&a.aircraft_id) else {
            violations.push(violation(
                "unknown_aircraft",
                serde_json::json!({ "aircraft": a.aircraft_id, "flight": a.flight_id }),
            ));
            continue;
        };
        *seen.entry(fi).or_default() += 1;

        let f = &catalog.flights()[fi];
        cost += f.costs[ai];
        if a.start.checked_add(f.duration) != Some(a.end) {
            violations.push(violation(
                "duration_mismatch",
                serde_json::json!({
                    "flight": a.flight_id,
                    "start": a.start,
                    "end": a.end,
                    "duration": f.duration
                }),
            ));
        }
        if a.end > horizon || a.start >= horizon {
            violations.push(violation(
                "exceeds_horizon",
                serde_json::json!({ "flight": a.flight_id, "end": a.end, "horizon": horizon }),
            ));
        }
        occupancy.add_flight(ai, a.start, a.end.min(horizon));
    }

    for (fi, f) in catalog.flights().iter().enumerate() {
        match seen.get(&fi).copied().unwrap_or(0) {
            1 => {}
            0 => violations.push(violation(
                "unassigned_flight",
                serde_json::json!({ "flight": f.id }),
            )),
            n => violations.push(violation(
                "duplicate_assignment",
                serde_json::json!({ "flight": f.id, "count": n }),
            )),
        }
    }

    for (ai, slot, cell) in occupancy.conflicts() {
        let aircraft = &catalog.aircraft()[ai].id;
        let kind = if cell.maintenance {
            "maintenance_conflict"
        } else {
            "double_booking"
        };
        violations.push(Violation {
            r#type: kind.into(),
            weight: i64::from(cell.load() - 1),
            details: serde_json::json!({ "aircraft": aircraft, "slot": slot, "flights": cell.flights }),
        });
    }

    Scores {
        cost,
        occupancy,
        violations,
    }
}
