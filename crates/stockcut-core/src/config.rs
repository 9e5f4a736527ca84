use stockcut_solver::{ConstraintOp, SolverKind};

use crate::error::CutError;

/// How produced quantities relate to the demand
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DemandMode {
    /// Every demand must be met exactly; surplus pieces have no value
    #[default]
    Exact,
    /// Producing more than the demand is allowed
    AtLeast,
}

impl DemandMode {
    pub fn from_ge_required(ge_required: bool) -> Self {
        if ge_required { DemandMode::AtLeast } else { DemandMode::Exact }
    }

    pub fn constraint_op(self) -> ConstraintOp {
        match self {
            DemandMode::Exact => ConstraintOp::Eq,
            DemandMode::AtLeast => ConstraintOp::Ge,
        }
    }
}

/// Input of one cutting stock run.
///
/// The defaults are the demonstration instance: a roll of 12 with items of
/// length 3.4, 3.0 and 2.7 demanded 34, 13 and 5 times, solved exactly with the
/// branch-and-bound backend.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq)]
pub struct CutConfig {
    /// Length of one stock roll
    pub roll_length: f64,
    /// Required item lengths; the order fixes item indices
    pub lengths: Vec<f64>,
    /// Demand for each item, same order as `lengths`
    pub quantities: Vec<f64>,
    /// Backend used to solve the program
    pub solver: SolverKind,
    pub mode: DemandMode,
    /// Stop enumerating and fail once more patterns than this are found
    pub max_patterns: Option<usize>,
}

impl Default for CutConfig {
    fn default() -> Self {
        Self {
            roll_length: 12.0,
            lengths: vec![3.4, 3.0, 2.7],
            quantities: vec![34.0, 13.0, 5.0],
            solver: SolverKind::default(),
            mode: DemandMode::default(),
            max_patterns: None,
        }
    }
}

impl CutConfig {
    pub fn new(roll_length: f64, lengths: Vec<f64>, quantities: Vec<f64>) -> Self {
        Self {
            roll_length,
            lengths,
            quantities,
            ..Self::default()
        }
    }

    pub fn with_solver(mut self, solver: SolverKind) -> Self {
        self.solver = solver;
        self
    }

    /// Select the backend by name, failing on names no backend answers to
    pub fn with_solver_name(self, name: &str) -> Result<Self, CutError> {
        Ok(self.with_solver(name.parse()?))
    }

    pub fn with_mode(mut self, mode: DemandMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_max_patterns(mut self, limit: usize) -> Self {
        self.max_patterns = Some(limit);
        self
    }

    /// Reject inputs that cannot describe a cutting stock instance
    pub fn validate(&self) -> Result<(), CutError> {
        if !(self.roll_length.is_finite() && self.roll_length > 0.0) {
            return Err(CutError::InvalidRollLength(self.roll_length));
        }
        if self.lengths.is_empty() {
            return Err(CutError::NoItems);
        }
        if self.lengths.len() != self.quantities.len() {
            return Err(CutError::QuantityMismatch {
                lengths: self.lengths.len(),
                quantities: self.quantities.len(),
            });
        }
        if let Some((index, &length)) = self
            .lengths
            .iter()
            .enumerate()
            .find(|(_, l)| !(l.is_finite() && **l > 0.0))
        {
            return Err(CutError::InvalidLength { index, length });
        }
        if let Some((index, &quantity)) = self
            .quantities
            .iter()
            .enumerate()
            .find(|(_, q)| !(q.is_finite() && **q >= 0.0))
        {
            return Err(CutError::InvalidQuantity { index, quantity });
        }
        Ok(())
    }
}
