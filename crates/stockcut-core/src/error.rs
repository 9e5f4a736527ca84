use stockcut_solver::UnsupportedSolver;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CutError {
    #[error("Roll length must be a positive number, got {0}")]
    InvalidRollLength(f64),
    #[error("At least one item length is required")]
    NoItems,
    #[error("Item {index} has length {length}, lengths must be positive numbers")]
    InvalidLength { index: usize, length: f64 },
    #[error("Must have the same number of lengths and quantities (got {lengths} lengths and {quantities} quantities)")]
    QuantityMismatch { lengths: usize, quantities: usize },
    #[error("Item {index} has quantity {quantity}, quantities must be non-negative numbers")]
    InvalidQuantity { index: usize, quantity: f64 },
    #[error("No item fits in a roll of length {roll_length} (shortest item is {shortest})")]
    InfeasibleConfiguration { roll_length: f64, shortest: f64 },
    #[error("Pattern enumeration exceeded the limit of {limit} patterns")]
    PatternLimitExceeded { limit: usize },
    #[error(transparent)]
    UnsupportedSolver(#[from] UnsupportedSolver),
}
