use std::fmt;

/// The result of solving an integer program
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone)]
pub struct Solution {
    /// Solution status
    pub status: SolutionStatus,
    /// Values for each variable (empty unless the backend produced a point)
    pub values: Vec<f64>,
    /// Objective value at `values`
    pub objective_value: f64,
    /// Constraint violations (populated when no feasible point was recovered)
    pub violations: Vec<ConstraintViolation>,
    /// Backend message for error statuses
    pub message: Option<String>,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolutionStatus {
    /// An optimal solution was found
    Optimal,
    /// A feasible solution was found, but its optimality is not proven
    Feasible,
    /// The problem is infeasible (no solution exists)
    Infeasible,
    /// The problem is unbounded
    Unbounded,
    /// The backend stopped without a feasible point and without proving infeasibility
    Unknown,
    /// Solver encountered an error
    Error,
}

impl SolutionStatus {
    /// Whether the solution carries a usable point
    pub fn has_point(self) -> bool {
        matches!(self, SolutionStatus::Optimal | SolutionStatus::Feasible)
    }
}

impl fmt::Display for SolutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SolutionStatus::Optimal => "optimal",
            SolutionStatus::Feasible => "feasible",
            SolutionStatus::Infeasible => "infeasible",
            SolutionStatus::Unbounded => "unbounded",
            SolutionStatus::Unknown => "unknown",
            SolutionStatus::Error => "error",
        };
        f.write_str(name)
    }
}

/// Information about a violated constraint
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone)]
pub struct ConstraintViolation {
    /// Constraint name
    pub constraint: String,
    /// Required value (from constraint RHS)
    pub required: f64,
    /// Actual value achieved
    pub actual: f64,
    /// How much the constraint is violated by
    pub violation_amount: f64,
    /// Human-readable description of what's wrong
    pub description: String,
}

impl Solution {
    pub fn optimal(values: Vec<f64>, objective_value: f64) -> Self {
        Self {
            status: SolutionStatus::Optimal,
            values,
            objective_value,
            violations: Vec::new(),
            message: None,
        }
    }

    pub fn feasible(values: Vec<f64>, objective_value: f64) -> Self {
        Self {
            status: SolutionStatus::Feasible,
            ..Self::optimal(values, objective_value)
        }
    }

    pub fn infeasible() -> Self {
        Self {
            status: SolutionStatus::Infeasible,
            values: Vec::new(),
            objective_value: f64::INFINITY,
            violations: Vec::new(),
            message: None,
        }
    }

    pub fn infeasible_with_violations(violations: Vec<ConstraintViolation>) -> Self {
        Self {
            violations,
            ..Self::infeasible()
        }
    }

    /// A relaxed point that could not be turned into a feasible integer point
    pub fn unknown_with_relaxed(
        values: Vec<f64>,
        objective_value: f64,
        violations: Vec<ConstraintViolation>,
    ) -> Self {
        Self {
            status: SolutionStatus::Unknown,
            values,
            objective_value,
            violations,
            message: None,
        }
    }

    pub fn unbounded() -> Self {
        Self {
            status: SolutionStatus::Unbounded,
            values: Vec::new(),
            objective_value: f64::NEG_INFINITY,
            violations: Vec::new(),
            message: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: SolutionStatus::Error,
            values: Vec::new(),
            objective_value: f64::NAN,
            violations: Vec::new(),
            message: Some(message.into()),
        }
    }

    pub fn is_optimal(&self) -> bool {
        self.status == SolutionStatus::Optimal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_display_is_lowercase() {
        assert_eq!(SolutionStatus::Optimal.to_string(), "optimal");
        assert_eq!(SolutionStatus::Infeasible.to_string(), "infeasible");
        assert_eq!(SolutionStatus::Unknown.to_string(), "unknown");
    }

    #[test]
    fn test_only_optimal_and_feasible_have_points() {
        assert!(SolutionStatus::Optimal.has_point());
        assert!(SolutionStatus::Feasible.has_point());
        assert!(!SolutionStatus::Infeasible.has_point());
        assert!(!SolutionStatus::Unbounded.has_point());
        assert!(!SolutionStatus::Unknown.has_point());
        assert!(!SolutionStatus::Error.has_point());
    }

    #[test]
    fn test_constructors() {
        let sol = Solution::feasible(vec![1.0], 2.0);
        assert_eq!(sol.status, SolutionStatus::Feasible);
        assert!(!sol.is_optimal());
        assert_eq!(sol.values, vec![1.0]);

        let err = Solution::error("boom");
        assert_eq!(err.message.as_deref(), Some("boom"));
        assert!(err.values.is_empty());

        assert!(Solution::infeasible().objective_value.is_infinite());
    }
}
