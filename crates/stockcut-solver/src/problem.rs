use crate::solution::ConstraintViolation;

/// A linear program whose variables may be marked integral
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone)]
pub struct IntegerProgram {
    /// Variable names
    pub variables: Vec<String>,
    /// Objective function coefficients (costs)
    pub objective: Objective,
    /// Constraints
    pub constraints: Vec<Constraint>,
    /// Integrality flag for each variable
    pub integrality: Vec<bool>,
    /// Lower bound for each variable
    pub lower_bounds: Vec<f64>,
    /// Upper bound for each variable, `None` when unbounded above
    pub upper_bounds: Vec<Option<f64>>,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone)]
pub struct Objective {
    /// Coefficients for each variable
    pub coefficients: Vec<f64>,
    /// Whether to minimize or maximize
    pub minimize: bool,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone)]
pub struct Constraint {
    /// Name/label for the constraint (for diagnostics)
    pub name: String,
    /// Coefficients for each variable
    pub coefficients: Vec<f64>,
    /// Comparison operator
    pub op: ConstraintOp,
    /// Right-hand side value
    pub rhs: f64,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintOp {
    /// Less than or equal (<=)
    Le,
    /// Greater than or equal (>=)
    Ge,
    /// Equal (=)
    Eq,
}

impl Constraint {
    /// Evaluate the left-hand side at `values`
    pub fn lhs(&self, values: &[f64]) -> f64 {
        self.coefficients
            .iter()
            .zip(values)
            .map(|(coef, value)| coef * value)
            .sum()
    }

    /// True when no variable appears in this row
    pub fn is_empty(&self) -> bool {
        self.coefficients.iter().all(|&c| c == 0.0)
    }

    /// Check the constraint against an already evaluated left-hand side
    pub fn holds(&self, lhs: f64, tolerance: f64) -> bool {
        match self.op {
            ConstraintOp::Le => lhs <= self.rhs + tolerance,
            ConstraintOp::Ge => lhs >= self.rhs - tolerance,
            ConstraintOp::Eq => (lhs - self.rhs).abs() <= tolerance,
        }
    }

    pub(crate) fn violation(&self, lhs: f64) -> ConstraintViolation {
        let (amount, description) = match self.op {
            ConstraintOp::Le => {
                let amt = lhs - self.rhs;
                (amt, format!("{} exceeds maximum of {} by {}", self.name, self.rhs, amt))
            }
            ConstraintOp::Ge => {
                let amt = self.rhs - lhs;
                (amt, format!("{} is below minimum of {} by {}", self.name, self.rhs, amt))
            }
            ConstraintOp::Eq => {
                let amt = (lhs - self.rhs).abs();
                (amt, format!("{} requires exactly {} but got {}", self.name, self.rhs, lhs))
            }
        };

        ConstraintViolation {
            constraint: self.name.clone(),
            required: self.rhs,
            actual: lhs,
            violation_amount: amount,
            description,
        }
    }
}

impl IntegerProgram {
    /// Create a program over `variables`, all continuous and bounded below by zero
    pub fn new(variables: Vec<String>) -> Self {
        let n = variables.len();
        Self {
            variables,
            objective: Objective {
                coefficients: vec![0.0; n],
                minimize: true,
            },
            constraints: Vec::new(),
            integrality: vec![false; n],
            lower_bounds: vec![0.0; n],
            upper_bounds: vec![None; n],
        }
    }

    pub fn set_objective(&mut self, coefficients: Vec<f64>, minimize: bool) {
        self.objective = Objective { coefficients, minimize };
    }

    pub fn add_constraint(&mut self, name: impl Into<String>, coefficients: Vec<f64>, op: ConstraintOp, rhs: f64) {
        self.constraints.push(Constraint {
            name: name.into(),
            coefficients,
            op,
            rhs,
        });
    }

    /// Mark a single variable as integral or continuous
    pub fn set_integrality(&mut self, variable: usize, integer: bool) {
        if let Some(flag) = self.integrality.get_mut(variable) {
            *flag = integer;
        }
    }

    /// Mark every variable as integral, turning the program into a pure integer program
    pub fn set_all_integer(&mut self) {
        self.integrality.iter_mut().for_each(|flag| *flag = true);
    }

    pub fn set_bounds(&mut self, variable: usize, lower: f64, upper: Option<f64>) {
        if variable < self.variables.len() {
            self.lower_bounds[variable] = lower;
            self.upper_bounds[variable] = upper;
        }
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    pub fn is_integer(&self, variable: usize) -> bool {
        self.integrality.get(variable).copied().unwrap_or(false)
    }

    /// Objective value at `values`
    pub fn evaluate_objective(&self, values: &[f64]) -> f64 {
        self.objective
            .coefficients
            .iter()
            .zip(values)
            .map(|(c, x)| c * x)
            .sum()
    }

    /// Find which constraints and bounds are violated by a given point
    pub fn find_violations(&self, values: &[f64], tolerance: f64) -> Vec<ConstraintViolation> {
        let mut violations: Vec<ConstraintViolation> = self
            .constraints
            .iter()
            .filter_map(|c| {
                let lhs = c.lhs(values);
                (!c.holds(lhs, tolerance)).then(|| c.violation(lhs))
            })
            .collect();

        for (j, &value) in values.iter().enumerate() {
            let lower = self.lower_bounds.get(j).copied().unwrap_or(f64::NEG_INFINITY);
            if value < lower - tolerance {
                violations.push(ConstraintViolation {
                    constraint: format!("{}_lower", self.variables[j]),
                    required: lower,
                    actual: value,
                    violation_amount: lower - value,
                    description: format!("{} is below its lower bound of {}", self.variables[j], lower),
                });
            }
            if let Some(Some(upper)) = self.upper_bounds.get(j)
                && value > upper + tolerance
            {
                violations.push(ConstraintViolation {
                    constraint: format!("{}_upper", self.variables[j]),
                    required: *upper,
                    actual: value,
                    violation_amount: value - upper,
                    description: format!("{} exceeds its upper bound of {}", self.variables[j], upper),
                });
            }
        }

        violations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_variable_program() -> IntegerProgram {
        let mut program = IntegerProgram::new(vec!["x".to_string(), "y".to_string()]);
        program.set_objective(vec![2.0, 3.0], true);
        program.add_constraint("sum", vec![1.0, 1.0], ConstraintOp::Ge, 4.0);
        program.add_constraint("x_max", vec![1.0, 0.0], ConstraintOp::Le, 3.0);
        program.add_constraint("y_exact", vec![0.0, 1.0], ConstraintOp::Eq, 1.0);
        program
    }

    #[test]
    fn test_new_program_is_continuous_and_nonnegative() {
        let program = IntegerProgram::new(vec!["a".to_string(), "b".to_string()]);
        assert_eq!(program.num_variables(), 2);
        assert_eq!(program.num_constraints(), 0);
        assert_eq!(program.integrality, vec![false, false]);
        assert_eq!(program.lower_bounds, vec![0.0, 0.0]);
        assert!(program.objective.minimize);
    }

    #[test]
    fn test_integrality_flags() {
        let mut program = two_variable_program();
        program.set_integrality(1, true);
        assert!(!program.is_integer(0));
        assert!(program.is_integer(1));

        program.set_all_integer();
        assert!(program.is_integer(0));

        // Out of range indices are ignored
        program.set_integrality(7, false);
        assert!(!program.is_integer(7));
    }

    #[test]
    fn test_evaluate_objective() {
        let program = two_variable_program();
        assert_eq!(program.evaluate_objective(&[3.0, 1.0]), 9.0);
    }

    #[test]
    fn test_no_violations_at_feasible_point() {
        let program = two_variable_program();
        assert!(program.find_violations(&[3.0, 1.0], 1e-9).is_empty());
    }

    #[test]
    fn test_violations_report_each_operator() {
        let program = two_variable_program();
        let violations = program.find_violations(&[4.0, 2.0], 1e-9);
        let names: Vec<&str> = violations.iter().map(|v| v.constraint.as_str()).collect();
        assert_eq!(names, vec!["x_max", "y_exact"]);
        assert_eq!(violations[0].violation_amount, 1.0);
        assert!(violations[1].description.contains("requires exactly"));

        let below = program.find_violations(&[1.0, 1.0], 1e-9);
        assert_eq!(below.len(), 1);
        assert_eq!(below[0].constraint, "sum");
        assert_eq!(below[0].violation_amount, 2.0);
    }

    #[test]
    fn test_bound_violations() {
        let mut program = IntegerProgram::new(vec!["x".to_string()]);
        program.set_bounds(0, 1.0, Some(2.0));
        assert_eq!(program.find_violations(&[0.5], 1e-9)[0].constraint, "x_lower");
        assert_eq!(program.find_violations(&[2.5], 1e-9)[0].constraint, "x_upper");
        assert!(program.find_violations(&[1.5], 1e-9).is_empty());
    }

    #[test]
    fn test_empty_row() {
        let mut program = IntegerProgram::new(vec!["x".to_string()]);
        program.add_constraint("nothing", vec![0.0], ConstraintOp::Ge, 1.0);
        assert!(program.constraints[0].is_empty());
        assert!(!program.constraints[0].holds(0.0, 1e-9));
    }
}
