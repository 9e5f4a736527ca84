use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::backends::{BranchAndBoundSolver, RelaxationSolver};
use crate::problem::IntegerProgram;
use crate::solution::Solution;

/// Something that can solve an [`IntegerProgram`]
pub trait MilpBackend {
    /// Short name used in logs and reports
    fn name(&self) -> &'static str;

    /// Solve the program. Failures are reported through the solution status.
    fn solve(&self, problem: &IntegerProgram) -> Solution;
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unsupported solver '{0}', must be one of: milp (glpk), relaxed (ecos)")]
pub struct UnsupportedSolver(pub String);

/// The backends that can be selected by name
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SolverKind {
    /// Branch-and-bound over integer variables
    #[default]
    #[cfg_attr(feature = "serde", serde(alias = "glpk", alias = "GLPK"))]
    Milp,
    /// Continuous relaxation followed by rounding
    #[cfg_attr(feature = "serde", serde(alias = "ecos", alias = "ECOS"))]
    Relaxed,
}

impl SolverKind {
    pub const ALL: [SolverKind; 2] = [SolverKind::Milp, SolverKind::Relaxed];

    pub fn name(self) -> &'static str {
        match self {
            SolverKind::Milp => "milp",
            SolverKind::Relaxed => "relaxed",
        }
    }

    /// Instantiate the backend with its default settings
    pub fn backend(self) -> Box<dyn MilpBackend> {
        match self {
            SolverKind::Milp => Box::new(BranchAndBoundSolver::new()),
            SolverKind::Relaxed => Box::new(RelaxationSolver::new()),
        }
    }
}

impl FromStr for SolverKind {
    type Err = UnsupportedSolver;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "milp" | "glpk" => Ok(SolverKind::Milp),
            "relaxed" | "ecos" => Ok(SolverKind::Relaxed),
            _ => Err(UnsupportedSolver(s.to_string())),
        }
    }
}

impl fmt::Display for SolverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
