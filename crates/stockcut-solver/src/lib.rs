mod backend;
mod backends;
mod problem;
mod solution;

pub use backend::{MilpBackend, SolverKind, UnsupportedSolver};
pub use backends::{BranchAndBoundSolver, RelaxationSolver};
pub use problem::{Constraint, ConstraintOp, IntegerProgram, Objective};
pub use solution::{ConstraintViolation, Solution, SolutionStatus};
