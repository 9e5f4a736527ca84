pub mod config;
pub mod error;
pub mod formulate;
pub mod pattern;
pub mod plan;
pub mod precision;

pub use config::{CutConfig, DemandMode};
pub use error::CutError;
pub use formulate::build_program;
pub use pattern::{IncidenceMatrix, Pattern, PatternSet};
pub use plan::{CutPlan, ItemCut, LowerBound, PatternUsage, lower_bound, solve, solve_with_backend};
pub use precision::{Precision, decimal_places};

pub use stockcut_solver::{SolutionStatus, SolverKind};
