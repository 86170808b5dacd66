//! Exact depth-first branch and bound for small pure 0/1 models.
//!
//! Each constraint keeps its fixed left-hand side plus the positive and
//! negative mass of its unassigned terms, so a partial assignment is pruned
//! as soon as some constraint can no longer be met.

use async_trait::async_trait;
use sched_core::{
    engine, Backend, Model, Relation, SolveEnvelope, SolveOutcome, SolveResult, Solver,
    SolverError,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

const EPS: f64 = 1e-9;
const DEADLINE_CHECK_INTERVAL: u64 = 4096;

#[derive(Clone, Debug, Default)]
pub struct SearchBackend {
    max_nodes: Option<u64>,
}

impl SearchBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Gives up with a backend error after visiting `n` nodes.
    pub fn with_max_nodes(mut self, n: u64) -> Self {
        self.max_nodes = Some(n);
        self
    }
}

impl Backend for SearchBackend {
    fn name(&self) -> &'static str {
        "search"
    }

    fn solve(&self, model: &Model, deadline: Option<Instant>) -> Result<SolveOutcome, SolverError> {
        let mut s = Search::new(model, deadline, self.max_nodes);
        let outcome = s.run()?;
        debug!(nodes = s.nodes, "search finished");
        Ok(outcome)
    }
}

struct Search {
    n: usize,
    /// Branching order: maintenance indicators first, then starts.
    order: Vec<usize>,
    cost: Vec<f64>,
    /// Constraints touched by each variable, with the coefficient.
    occ: Vec<Vec<(usize, f64)>>,
    relation: Vec<Relation>,
    rhs: Vec<f64>,
    lhs: Vec<f64>,
    pos_rem: Vec<f64>,
    neg_rem: Vec<f64>,
    /// Sum of negative objective coefficients from depth `i` on.
    neg_cost_suffix: Vec<f64>,
    values: Vec<bool>,
    cur_cost: f64,
    best: Option<(f64, Vec<bool>)>,
    nodes: u64,
    deadline: Option<Instant>,
    max_nodes: Option<u64>,
}

impl Search {
    fn new(model: &Model, deadline: Option<Instant>, max_nodes: Option<u64>) -> Self {
        let n = model.num_vars();
        let mut cost = vec![0.0; n];
        for &(v, c) in model.objective() {
            cost[v.index()] += c;
        }

        let m = model.constraints().len();
        let mut occ = vec![Vec::new(); n];
        let mut pos_rem = vec![0.0; m];
        let mut neg_rem = vec![0.0; m];
        for (ci, c) in model.constraints().iter().enumerate() {
            for &(v, coef) in &c.terms {
                occ[v.index()].push((ci, coef));
                if coef > 0.0 {
                    pos_rem[ci] += coef;
                } else {
                    neg_rem[ci] += coef;
                }
            }
        }

        let starts = model.layout().start_count().min(n);
        let order: Vec<usize> = (starts..n).chain(0..starts).collect();
        let mut neg_cost_suffix = vec![0.0; n + 1];
        for d in (0..n).rev() {
            neg_cost_suffix[d] = neg_cost_suffix[d + 1] + cost[order[d]].min(0.0);
        }

        Self {
            n,
            order,
            cost,
            occ,
            relation: model.constraints().iter().map(|c| c.relation).collect(),
            rhs: model.constraints().iter().map(|c| c.rhs).collect(),
            lhs: vec![0.0; m],
            pos_rem,
            neg_rem,
            neg_cost_suffix,
            values: vec![false; n],
            cur_cost: 0.0,
            best: None,
            nodes: 0,
            deadline,
            max_nodes,
        }
    }

    fn satisfiable(&self, ci: usize) -> bool {
        let lo = self.lhs[ci] + self.neg_rem[ci];
        let hi = self.lhs[ci] + self.pos_rem[ci];
        match self.relation[ci] {
            Relation::Le => lo <= self.rhs[ci] + EPS,
            Relation::Ge => hi >= self.rhs[ci] - EPS,
            Relation::Eq => lo <= self.rhs[ci] + EPS && hi >= self.rhs[ci] - EPS,
        }
    }

    /// Fixes the variable at `depth` and reports whether every touched
    /// constraint and the objective bound still allow an improving completion.
    fn assign(&mut self, depth: usize, x: bool) -> bool {
        let v = self.order[depth];
        self.values[v] = x;
        if x {
            self.cur_cost += self.cost[v];
        }
        let mut ok = true;
        for k in 0..self.occ[v].len() {
            let (ci, coef) = self.occ[v][k];
            if coef > 0.0 {
                self.pos_rem[ci] -= coef;
            } else {
                self.neg_rem[ci] -= coef;
            }
            if x {
                self.lhs[ci] += coef;
            }
            ok &= self.satisfiable(ci);
        }
        ok && self
            .best
            .as_ref()
            .map_or(true, |(b, _)| self.cur_cost + self.neg_cost_suffix[depth + 1] < b - EPS)
    }

    fn unassign(&mut self, depth: usize) {
        let v = self.order[depth];
        let x = self.values[v];
        if x {
            self.cur_cost -= self.cost[v];
        }
        for &(ci, coef) in &self.occ[v] {
            if coef > 0.0 {
                self.pos_rem[ci] += coef;
            } else {
                self.neg_rem[ci] += coef;
            }
            if x {
                self.lhs[ci] -= coef;
            }
        }
        self.values[v] = false;
    }

    fn tick(&mut self) -> Result<(), SolverError> {
        self.nodes += 1;
        if let Some(max) = self.max_nodes {
            if self.nodes > max {
                return Err(SolverError::Backend(format!("node limit {max} reached")));
            }
        }
        if self.nodes % DEADLINE_CHECK_INTERVAL == 0 {
            self.check_deadline()?;
        }
        Ok(())
    }

    fn check_deadline(&self) -> Result<(), SolverError> {
        match self.deadline {
            Some(d) if Instant::now() >= d => Err(SolverError::Timeout),
            _ => Ok(()),
        }
    }

    fn run(&mut self) -> Result<SolveOutcome, SolverError> {
        self.check_deadline()?;
        if !(0..self.rhs.len()).all(|ci| self.satisfiable(ci)) {
            return Ok(SolveOutcome::Infeasible);
        }

        // 0: untried, 1: tried `true`, 2: tried both.
        let mut tried = vec![0u8; self.n];
        let mut depth = 0usize;
        loop {
            if depth == self.n {
                self.best = Some((self.cur_cost, self.values.clone()));
                if depth == 0 {
                    break;
                }
                depth -= 1;
                continue;
            }
            let ok = match tried[depth] {
                0 => {
                    tried[depth] = 1;
                    self.tick()?;
                    self.assign(depth, true)
                }
                1 => {
                    self.unassign(depth);
                    tried[depth] = 2;
                    self.tick()?;
                    self.assign(depth, false)
                }
                _ => {
                    self.unassign(depth);
                    tried[depth] = 0;
                    if depth == 0 {
                        break;
                    }
                    depth -= 1;
                    continue;
                }
            };
            if ok {
                depth += 1;
            }
        }

        Ok(match self.best.take() {
            Some((objective, values)) => SolveOutcome::Optimal { values, objective },
            None => SolveOutcome::Infeasible,
        })
    }
}

pub struct SearchSolver {
    backend: Arc<SearchBackend>,
}

impl SearchSolver {
    pub fn new() -> Self {
        Self {
            backend: Arc::new(SearchBackend::new()),
        }
    }
}

impl Default for SearchSolver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Solver for SearchSolver {
    async fn solve(&self, env: SolveEnvelope) -> anyhow::Result<SolveResult> {
        info!("received instance with {} flights", env.instance.flights.len());
        let backend = self.backend.clone();
        tokio::task::spawn_blocking(move || engine::solve_envelope(&env, backend.as_ref())).await?
    }
}
