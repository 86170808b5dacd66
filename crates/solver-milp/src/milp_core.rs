use good_lp::solvers::coin_cbc::coin_cbc;
use good_lp::{
    variable, Expression, ProblemVariables, ResolutionError, Solution, SolverModel, Variable,
};
use sched_core::{Model, Relation, SolveOutcome, SolverError};
use std::time::Instant;
use tracing::debug;

pub(crate) fn declare_vars(model: &Model, pvars: &mut ProblemVariables) -> Vec<Variable> {
    (0..model.num_vars())
        .map(|_| pvars.add(variable().binary()))
        .collect()
}

pub(crate) fn build_objective(model: &Model, vars: &[Variable]) -> Expression {
    let mut objective = Expression::from(0.0);
    for &(v, c) in model.objective() {
        objective = objective + c * vars[v.index()];
    }
    objective
}

pub(crate) fn add_constraints<M: SolverModel>(mut lp: M, model: &Model, vars: &[Variable]) -> M {
    for c in model.constraints() {
        let mut lhs = Expression::from(0.0);
        for &(v, coef) in &c.terms {
            lhs = lhs + coef * vars[v.index()];
        }
        lp = lp.with(match c.relation {
            Relation::Le => lhs.leq(c.rhs),
            Relation::Eq => lhs.eq(c.rhs),
            Relation::Ge => lhs.geq(c.rhs),
        });
    }
    lp
}

pub(crate) fn solve(model: &Model, deadline: Option<Instant>) -> Result<SolveOutcome, SolverError> {
    let seconds = match deadline {
        Some(d) => {
            let left = d.saturating_duration_since(Instant::now());
            if left.is_zero() {
                return Err(SolverError::Timeout);
            }
            Some(left.as_secs_f64().ceil().max(1.0))
        }
        None => None,
    };

    let mut pvars = ProblemVariables::new();
    let vars = declare_vars(model, &mut pvars);
    let objective = build_objective(model, &vars);

    let mut lp = pvars.minimise(objective.clone()).using(coin_cbc);
    lp.set_parameter("log", "0");
    if let Some(s) = seconds {
        lp.set_parameter("sec", &s.to_string());
    }
    let lp = add_constraints(lp, model, &vars);
    debug!(
        vars = vars.len(),
        constraints = model.constraints().len(),
        "submitting model to cbc"
    );

    match lp.solve() {
        Ok(sol) => Ok(SolveOutcome::Optimal {
            values: vars.iter().map(|&v| sol.value(v) > 0.5).collect(),
            objective: sol.eval(objective.clone()),
        }),
        Err(ResolutionError::Infeasible) => Ok(SolveOutcome::Infeasible),
        Err(ResolutionError::Unbounded) => Ok(SolveOutcome::Unbounded),
        Err(ResolutionError::Other(reason)) if seconds.is_some() && reason == "Stopped" => {
            Err(SolverError::Timeout)
        }
        Err(e) => Err(SolverError::Backend(e.to_string())),
    }
}
