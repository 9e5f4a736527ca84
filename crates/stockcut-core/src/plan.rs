use stockcut_solver::{ConstraintViolation, MilpBackend, Solution, SolutionStatus};

use crate::config::{CutConfig, DemandMode};
use crate::error::CutError;
use crate::formulate::build_program;
use crate::pattern::{Pattern, PatternSet};
use crate::precision::Precision;

/// Absolute slack before rounding the roll bound up, so float drift on an
/// exact multiple of the roll does not add a roll
const LOWER_BOUND_SLACK: f64 = 1e-9;

/// Rolls needed if material could be spliced: total demanded length over roll length
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LowerBound {
    /// Σ length × quantity / roll length
    pub raw: f64,
    /// `raw` rounded up
    pub rolls: u64,
}

pub fn lower_bound(lengths: &[f64], quantities: &[f64], roll_length: f64) -> LowerBound {
    let demanded: f64 = lengths.iter().zip(quantities).map(|(l, q)| l * q).sum();
    let raw = demanded / roll_length;
    let rolls = (raw - LOWER_BOUND_SLACK).ceil().max(0.0) as u64;
    LowerBound { raw, rolls }
}

/// Outcome of one run: the solver status, the usage of every pattern when a
/// point was found, and what is needed to explain it
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone)]
pub struct CutPlan {
    pub status: SolutionStatus,
    /// Name of the backend that produced the status
    pub backend: String,
    pub mode: DemandMode,
    pub lengths: Vec<f64>,
    pub quantities: Vec<f64>,
    pub precision: Precision,
    pub lower_bound: LowerBound,
    pub patterns: PatternSet,
    /// Rolls cut with each pattern; `None` unless the status carries a point
    pub usage: Option<Vec<u64>>,
    /// Total waste of `usage`
    pub objective: Option<f64>,
    /// Constraints the best point found violates, when there is no feasible one
    pub violations: Vec<ConstraintViolation>,
    pub message: Option<String>,
}

/// One pattern of a plan that is actually cut
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct PatternUsage {
    /// Index of the pattern in generation order
    pub index: usize,
    /// Rolls cut with this pattern
    pub times: u64,
    /// Waste of one roll cut with this pattern
    pub waste: f64,
    /// `waste × times`
    pub total_waste: f64,
    /// Pieces of every item in one roll
    pub cuts: Vec<ItemCut>,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ItemCut {
    pub item: usize,
    pub length: f64,
    pub count: u32,
}

impl CutPlan {
    fn from_solution(config: &CutConfig, backend: &str, patterns: PatternSet, solution: Solution) -> Self {
        let usage: Option<Vec<u64>> = solution
            .status
            .has_point()
            .then(|| solution.values.iter().map(|&v| v.round().max(0.0) as u64).collect());
        let objective = usage.as_ref().map(|usage| total_waste(&patterns, usage));

        Self {
            status: solution.status,
            backend: backend.to_string(),
            mode: config.mode,
            lengths: config.lengths.clone(),
            quantities: config.quantities.clone(),
            precision: patterns.precision(),
            lower_bound: lower_bound(&config.lengths, &config.quantities, config.roll_length),
            patterns,
            usage,
            objective,
            violations: solution.violations,
            message: solution.message,
        }
    }

    pub fn is_optimal(&self) -> bool {
        self.status == SolutionStatus::Optimal
    }

    pub fn roll_length(&self) -> f64 {
        self.patterns.roll_length()
    }

    /// Number of rolls the plan cuts
    pub fn total_rolls(&self) -> Option<u64> {
        self.usage.as_ref().map(|usage| usage.iter().sum())
    }

    /// Pieces of each item the plan produces
    pub fn produced(&self) -> Option<Vec<u64>> {
        self.usage
            .as_ref()
            .map(|usage| self.patterns.incidence().produced(usage))
    }

    /// Breakdown of the patterns with non-zero usage, in pattern order
    pub fn used_patterns(&self) -> Vec<PatternUsage> {
        let Some(usage) = &self.usage else {
            return Vec::new();
        };

        self.patterns
            .iter()
            .zip(usage)
            .enumerate()
            .filter(|(_, (_, times))| **times > 0)
            .map(|(index, (pattern, &times))| PatternUsage {
                index,
                times,
                waste: pattern.waste,
                total_waste: self.precision.round(pattern.waste * times as f64),
                cuts: self.item_cuts(pattern),
            })
            .collect()
    }

    fn item_cuts(&self, pattern: &Pattern) -> Vec<ItemCut> {
        pattern
            .counts
            .iter()
            .zip(&self.lengths)
            .enumerate()
            .map(|(item, (&count, &length))| ItemCut { item, length, count })
            .collect()
    }
}

fn total_waste(patterns: &PatternSet, usage: &[u64]) -> f64 {
    let sum: f64 = patterns
        .iter()
        .zip(usage)
        .map(|(pattern, &times)| pattern.waste * times as f64)
        .sum();
    patterns.precision().round(sum)
}

/// Solve `config` with the backend it names
pub fn solve(config: &CutConfig) -> Result<CutPlan, CutError> {
    let backend = config.solver.backend();
    solve_with_backend(config, backend.as_ref())
}

/// Solve `config` with a caller supplied backend, ignoring `config.solver`
pub fn solve_with_backend(config: &CutConfig, backend: &dyn MilpBackend) -> Result<CutPlan, CutError> {
    config.validate()?;

    let precision = Precision::resolve(&config.lengths, config.roll_length);
    tracing::info!(places = precision.places(), "resolved decimal precision");

    let patterns = PatternSet::enumerate_with_limit(
        &config.lengths,
        config.roll_length,
        precision,
        config.max_patterns,
    )?;
    tracing::info!(patterns = patterns.len(), "enumerated cutting patterns");

    let program = build_program(&patterns, &config.quantities, config.mode);
    let solution = backend.solve(&program);
    tracing::info!(
        backend = backend.name(),
        status = %solution.status,
        objective = solution.objective_value,
        "solver finished"
    );

    Ok(CutPlan::from_solution(config, backend.name(), patterns, solution))
}
