//! [`MilpBackend`] implementations on top of `good_lp` and its pure-Rust
//! `microlp` solver.

use good_lp::solvers::microlp::microlp;
use good_lp::{Expression, ProblemVariables, ResolutionError, SolverModel, Variable, variable};
// Brings `value()` into scope without clashing with our own `Solution`.
use good_lp::Solution as _;

use crate::backend::MilpBackend;
use crate::problem::{ConstraintOp, IntegerProgram};
use crate::solution::Solution;

const DEFAULT_TOLERANCE: f64 = 1e-6;

/// Exact backend: the program is handed to the solver with its integrality intact
pub struct BranchAndBoundSolver {
    /// Tolerance for feasibility checks on the returned point
    tolerance: f64,
}

impl Default for BranchAndBoundSolver {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
        }
    }
}

impl BranchAndBoundSolver {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MilpBackend for BranchAndBoundSolver {
    fn name(&self) -> &'static str {
        "milp"
    }

    fn solve(&self, problem: &IntegerProgram) -> Solution {
        if let Some(early) = precheck(problem, self.tolerance) {
            return early;
        }

        let raw = match solve_with_microlp(problem, true) {
            Ok(values) => values,
            Err(e) => return from_resolution_error(e),
        };

        let values = snap_integers(problem, &raw, f64::round);
        let violations = problem.find_violations(&values, self.tolerance);
        if !violations.is_empty() {
            tracing::warn!(count = violations.len(), "solver returned a point that violates constraints");
            return Solution {
                violations,
                values,
                ..Solution::error("solver returned a point that violates the constraints")
            };
        }

        let objective = problem.evaluate_objective(&values);
        tracing::debug!(objective, "branch-and-bound solve finished");
        Solution::optimal(values, objective)
    }
}

/// Relaxation backend: integrality is dropped, the LP relaxation is solved and
/// the integer columns are rounded back
pub struct RelaxationSolver {
    tolerance: f64,
}

impl Default for RelaxationSolver {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
        }
    }
}

impl RelaxationSolver {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MilpBackend for RelaxationSolver {
    fn name(&self) -> &'static str {
        "relaxed"
    }

    fn solve(&self, problem: &IntegerProgram) -> Solution {
        if let Some(early) = precheck(problem, self.tolerance) {
            return early;
        }

        let relaxed = match solve_with_microlp(problem, false) {
            Ok(values) => values,
            Err(e) => return from_resolution_error(e),
        };
        let bound = problem.evaluate_objective(&relaxed);
        tracing::debug!(bound, "relaxation solved");

        let tol = self.tolerance;
        let nearest = snap_integers(problem, &relaxed, f64::round);
        let upward = snap_integers(problem, &relaxed, |x| (x - tol).ceil());

        let nearest_violations = problem.find_violations(&nearest, tol);
        let candidate = if nearest_violations.is_empty() {
            Some(nearest.clone())
        } else if problem.find_violations(&upward, tol).is_empty() {
            Some(upward)
        } else {
            None
        };

        match candidate {
            Some(values) => {
                let objective = problem.evaluate_objective(&values);
                let reaches_bound = if problem.objective.minimize {
                    objective <= bound + tol
                } else {
                    objective >= bound - tol
                };
                if reaches_bound {
                    Solution::optimal(values, objective)
                } else {
                    Solution::feasible(values, objective)
                }
            }
            None => {
                tracing::debug!(
                    violated = nearest_violations.len(),
                    "rounding the relaxation did not give a feasible point"
                );
                Solution::unknown_with_relaxed(relaxed, bound, nearest_violations)
            }
        }
    }
}

/// Decide what can be decided without calling the solver: malformed input,
/// programs without variables, and rows in which no variable appears.
fn precheck(problem: &IntegerProgram, tolerance: f64) -> Option<Solution> {
    let n = problem.num_variables();
    if problem.objective.coefficients.len() != n {
        return Some(Solution::error(format!(
            "objective has {} coefficients for {} variables",
            problem.objective.coefficients.len(),
            n
        )));
    }
    if let Some(c) = problem.constraints.iter().find(|c| c.coefficients.len() != n) {
        return Some(Solution::error(format!(
            "constraint {} has {} coefficients for {} variables",
            c.name,
            c.coefficients.len(),
            n
        )));
    }

    let violations: Vec<_> = problem
        .constraints
        .iter()
        .filter(|c| c.is_empty() && !c.holds(0.0, tolerance))
        .map(|c| c.violation(0.0))
        .collect();
    if !violations.is_empty() {
        tracing::debug!(rows = violations.len(), "program has unsatisfiable empty rows");
        return Some(Solution::infeasible_with_violations(violations));
    }

    if n == 0 {
        return Some(Solution::optimal(Vec::new(), 0.0));
    }

    None
}

fn solve_with_microlp(problem: &IntegerProgram, keep_integrality: bool) -> Result<Vec<f64>, ResolutionError> {
    tracing::debug!(
        variables = problem.num_variables(),
        constraints = problem.num_constraints(),
        keep_integrality,
        "building good_lp model"
    );

    let mut vars = ProblemVariables::new();
    let columns: Vec<Variable> = (0..problem.num_variables())
        .map(|j| {
            let mut definition = variable().min(problem.lower_bounds[j]);
            if let Some(upper) = problem.upper_bounds[j] {
                definition = definition.max(upper);
            }
            if keep_integrality && problem.is_integer(j) {
                definition = definition.integer();
            }
            vars.add(definition)
        })
        .collect();

    let objective = linear_expression(&problem.objective.coefficients, &columns);
    let unsolved = if problem.objective.minimize {
        vars.minimise(objective)
    } else {
        vars.maximise(objective)
    };
    let mut model = unsolved.using(microlp);

    for c in problem.constraints.iter().filter(|c| !c.is_empty()) {
        let lhs = linear_expression(&c.coefficients, &columns);
        let row = match c.op {
            ConstraintOp::Le => lhs.leq(c.rhs),
            ConstraintOp::Ge => lhs.geq(c.rhs),
            ConstraintOp::Eq => lhs.eq(c.rhs),
        };
        model = model.with(row);
    }

    let solution = model.solve()?;
    Ok(columns.iter().map(|&v| solution.value(v)).collect())
}

fn linear_expression(coefficients: &[f64], columns: &[Variable]) -> Expression {
    let mut expr = Expression::with_capacity(columns.len());
    for (&coef, &column) in coefficients.iter().zip(columns) {
        if coef != 0.0 {
            expr.add_mul(coef, column);
        }
    }
    expr
}

/// Apply `round` to every integer column, leaving continuous columns untouched
fn snap_integers(problem: &IntegerProgram, values: &[f64], round: impl Fn(f64) -> f64) -> Vec<f64> {
    values
        .iter()
        .enumerate()
        .map(|(j, &x)| {
            if problem.is_integer(j) {
                // -0.0 would leak into reports as "-0"
                round(x) + 0.0
            } else {
                x
            }
        })
        .collect()
}

fn from_resolution_error(error: ResolutionError) -> Solution {
    tracing::debug!(%error, "solver did not return a point");
    match error {
        ResolutionError::Infeasible => Solution::infeasible(),
        ResolutionError::Unbounded => Solution::unbounded(),
        other => Solution::error(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solution::SolutionStatus;

    /// Two patterns for a single item of length 5 on a roll of 12:
    /// one cut (waste 7) and two cuts (waste 2).
    fn single_item_program(op: ConstraintOp, demand: f64) -> IntegerProgram {
        let mut problem = IntegerProgram::new(vec!["one".to_string(), "two".to_string()]);
        problem.set_objective(vec![7.0, 2.0], true);
        problem.add_constraint("item_0", vec![1.0, 2.0], op, demand);
        problem.set_all_integer();
        problem
    }

    #[test]
    fn test_branch_and_bound_exact_demand() {
        let solution = BranchAndBoundSolver::new().solve(&single_item_program(ConstraintOp::Eq, 3.0));

        assert_eq!(solution.status, SolutionStatus::Optimal);
        assert_eq!(solution.values, vec![1.0, 1.0]);
        assert!((solution.objective_value - 9.0).abs() < 1e-9);
    }

    #[test]
    fn test_branch_and_bound_fractional_demand_is_infeasible() {
        let solution = BranchAndBoundSolver::new().solve(&single_item_program(ConstraintOp::Eq, 2.5));

        assert_eq!(solution.status, SolutionStatus::Infeasible);
        assert!(solution.values.is_empty());
    }

    #[test]
    fn test_branch_and_bound_at_least_overproduces() {
        let solution = BranchAndBoundSolver::new().solve(&single_item_program(ConstraintOp::Ge, 2.5));

        assert_eq!(solution.status, SolutionStatus::Optimal);
        assert_eq!(solution.values, vec![0.0, 2.0]);
        assert!((solution.objective_value - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_row_is_infeasible_without_solving() {
        let mut problem = single_item_program(ConstraintOp::Ge, 1.0);
        problem.add_constraint("item_1", vec![0.0, 0.0], ConstraintOp::Ge, 2.0);

        for backend in [&BranchAndBoundSolver::new() as &dyn MilpBackend, &RelaxationSolver::new()] {
            let solution = backend.solve(&problem);
            assert_eq!(solution.status, SolutionStatus::Infeasible);
            assert_eq!(solution.violations.len(), 1);
            assert_eq!(solution.violations[0].constraint, "item_1");
        }
    }

    #[test]
    fn test_empty_row_with_zero_demand_is_ignored() {
        let mut problem = single_item_program(ConstraintOp::Eq, 2.0);
        problem.add_constraint("item_1", vec![0.0, 0.0], ConstraintOp::Eq, 0.0);

        let solution = BranchAndBoundSolver::new().solve(&problem);
        assert_eq!(solution.status, SolutionStatus::Optimal);
        assert_eq!(solution.values, vec![0.0, 1.0]);
    }

    #[test]
    fn test_mismatched_dimensions_are_an_error() {
        let mut problem = single_item_program(ConstraintOp::Eq, 2.0);
        problem.add_constraint("short", vec![1.0], ConstraintOp::Eq, 1.0);

        let solution = BranchAndBoundSolver::new().solve(&problem);
        assert_eq!(solution.status, SolutionStatus::Error);
        assert!(solution.message.unwrap().contains("short"));
    }

    #[test]
    fn test_relaxation_integral_optimum_is_optimal() {
        // LP optimum is two = 2, already integral
        let solution = RelaxationSolver::new().solve(&single_item_program(ConstraintOp::Ge, 4.0));

        assert_eq!(solution.status, SolutionStatus::Optimal);
        assert_eq!(solution.values, vec![0.0, 2.0]);
        assert!((solution.objective_value - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_relaxation_rounds_up_under_at_least() {
        // LP optimum is two = 1.5 (objective 3); rounding gives two = 2 (objective 4)
        let solution = RelaxationSolver::new().solve(&single_item_program(ConstraintOp::Ge, 3.0));

        assert_eq!(solution.status, SolutionStatus::Feasible);
        assert_eq!(solution.values, vec![0.0, 2.0]);
        assert!((solution.objective_value - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_relaxation_exact_rounding_failure_is_unknown() {
        // LP optimum is two = 1.5; neither rounding hits exactly 3
        let solution = RelaxationSolver::new().solve(&single_item_program(ConstraintOp::Eq, 3.0));

        assert_eq!(solution.status, SolutionStatus::Unknown);
        assert!(!solution.violations.is_empty());
        assert_eq!(solution.values.len(), 2);
        assert!((solution.objective_value - 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_maximization() {
        // Maximize: 3x + 2y s.t. x + y <= 4, x <= 3 => x=3, y=1, obj=11
        let mut problem = IntegerProgram::new(vec!["x".to_string(), "y".to_string()]);
        problem.set_objective(vec![3.0, 2.0], false);
        problem.add_constraint("sum", vec![1.0, 1.0], ConstraintOp::Le, 4.0);
        problem.add_constraint("x_max", vec![1.0, 0.0], ConstraintOp::Le, 3.0);
        problem.set_all_integer();

        let solution = BranchAndBoundSolver::new().solve(&problem);
        assert_eq!(solution.status, SolutionStatus::Optimal);
        assert_eq!(solution.values, vec![3.0, 1.0]);
        assert!((solution.objective_value - 11.0).abs() < 1e-9);
    }

    #[test]
    fn test_unbounded() {
        let mut problem = IntegerProgram::new(vec!["x".to_string()]);
        problem.set_objective(vec![1.0], false);
        problem.add_constraint("x_min", vec![1.0], ConstraintOp::Ge, 1.0);

        let solution = BranchAndBoundSolver::new().solve(&problem);
        assert_eq!(solution.status, SolutionStatus::Unbounded);
    }

    #[test]
    fn test_program_without_variables() {
        let problem = IntegerProgram::new(Vec::new());
        let solution = RelaxationSolver::new().solve(&problem);
        assert_eq!(solution.status, SolutionStatus::Optimal);
        assert!(solution.values.is_empty());
    }
}
