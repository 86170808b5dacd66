//! Solver-independent 0/1 model: tagged variables, structured linear
//! constraints and a linear objective to minimise.

use std::fmt;

/// What a boolean variable stands for. Indices refer to the catalog.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VarKey {
    /// Flight `flight` starts on aircraft `aircraft` at slot `slot`.
    Start {
        flight: usize,
        aircraft: usize,
        slot: u32,
    },
    /// Aircraft `aircraft` is in maintenance at slot `slot`.
    Maintenance { aircraft: usize, slot: u32 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarId(pub usize);

impl VarId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Relation {
    Le,
    Eq,
    Ge,
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Relation::Le => "<=",
            Relation::Eq => "==",
            Relation::Ge => ">=",
        })
    }
}

/// Which family a constraint belongs to, with the entity it is about.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ConstraintClass {
    /// Every flight starts exactly once.
    Coverage { flight: usize },
    /// Flights covering `slot` on `aircraft`, plus maintenance, at most one.
    Occupancy { aircraft: usize, slot: u32 },
    /// Start that would run past the horizon.
    Completion {
        flight: usize,
        aircraft: usize,
        slot: u32,
    },
    /// Maintenance pinned to an externally supplied value.
    FixedMaintenance { aircraft: usize, slot: u32 },
    /// Minimum number of maintenance slots for an aircraft.
    MaintenanceMinimum { aircraft: usize },
    /// Cap on aircraft simultaneously in maintenance.
    MaintenanceCap { slot: u32 },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Constraint {
    pub class: ConstraintClass,
    pub terms: Vec<(VarId, f64)>,
    pub relation: Relation,
    pub rhs: f64,
}

impl Constraint {
    pub fn lhs(&self, values: &[bool]) -> f64 {
        self.terms
            .iter()
            .filter(|(v, _)| values[v.index()])
            .map(|&(_, c)| c)
            .sum()
    }

    pub fn is_satisfied(&self, values: &[bool]) -> bool {
        let lhs = self.lhs(values);
        match self.relation {
            Relation::Le => lhs <= self.rhs,
            Relation::Eq => lhs == self.rhs,
            Relation::Ge => lhs >= self.rhs,
        }
    }
}

/// Dense indexing of the variable space.
///
/// Start variables come first, ordered by flight, aircraft and slot; the
/// maintenance block (when present) follows, ordered by aircraft and slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Layout {
    pub flights: usize,
    pub aircraft: usize,
    pub horizon: u32,
    pub maintenance: bool,
}

impl Layout {
    fn h(&self) -> usize {
        self.horizon as usize
    }

    pub fn start_count(&self) -> usize {
        self.flights * self.aircraft * self.h()
    }

    pub fn maintenance_count(&self) -> usize {
        if self.maintenance {
            self.aircraft * self.h()
        } else {
            0
        }
    }

    pub fn len(&self) -> usize {
        self.start_count() + self.maintenance_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn start(&self, flight: usize, aircraft: usize, slot: u32) -> VarId {
        debug_assert!(flight < self.flights && aircraft < self.aircraft && slot < self.horizon);
        VarId((flight * self.aircraft + aircraft) * self.h() + slot as usize)
    }

    pub fn maintenance(&self, aircraft: usize, slot: u32) -> Option<VarId> {
        if !self.maintenance {
            return None;
        }
        debug_assert!(aircraft < self.aircraft && slot < self.horizon);
        Some(VarId(self.start_count() + aircraft * self.h() + slot as usize))
    }

    pub fn key(&self, id: VarId) -> VarKey {
        let h = self.h();
        let i = id.index();
        if i < self.start_count() {
            let slot = (i % h) as u32;
            let rest = i / h;
            VarKey::Start {
                flight: rest / self.aircraft,
                aircraft: rest % self.aircraft,
                slot,
            }
        } else {
            let j = i - self.start_count();
            VarKey::Maintenance {
                aircraft: j / h,
                slot: (j % h) as u32,
            }
        }
    }
}

/// One model-build result. Consumed once by a backend.
#[derive(Clone, Debug)]
pub struct Model {
    layout: Layout,
    objective: Vec<(VarId, f64)>,
    constraints: Vec<Constraint>,
}

impl Model {
    pub fn new(layout: Layout) -> Self {
        Self {
            layout,
            objective: Vec::new(),
            constraints: Vec::new(),
        }
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn num_vars(&self) -> usize {
        self.layout.len()
    }

    pub fn variables(&self) -> impl Iterator<Item = (VarId, VarKey)> + '_ {
        (0..self.num_vars()).map(|i| (VarId(i), self.layout.key(VarId(i))))
    }

    pub fn objective(&self) -> &[(VarId, f64)] {
        &self.objective
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn add_cost(&mut self, var: VarId, cost: f64) {
        if cost != 0.0 {
            self.objective.push((var, cost));
        }
    }

    pub fn add_constraint(
        &mut self,
        class: ConstraintClass,
        terms: Vec<(VarId, f64)>,
        relation: Relation,
        rhs: f64,
    ) {
        self.constraints.push(Constraint {
            class,
            terms,
            relation,
            rhs,
        });
    }

    pub fn objective_value(&self, values: &[bool]) -> f64 {
        self.objective
            .iter()
            .filter(|(v, _)| values[v.index()])
            .map(|&(_, c)| c)
            .sum()
    }

    /// First constraint violated by `values`, if any.
    pub fn first_violation(&self, values: &[bool]) -> Option<&Constraint> {
        self.constraints.iter().find(|c| !c.is_satisfied(values))
    }
}
