//! Exhaustive enumeration of cutting patterns.
//!
//! A pattern is one way to cut a single roll: a count for every item such that
//! the cuts fit. Every multiset of items of size `1..=K` is visited, where `K`
//! is how many of the shortest item fit in a roll, so no pattern can be larger.
//! Multisets are walked as non-decreasing index sequences, which visits each
//! one exactly once.

use crate::error::CutError;
use crate::precision::Precision;

/// Relative slack on `roll / shortest` so a quotient like `2.9999999999999996`
/// still yields a bound of 3.
const BOUND_SLACK: f64 = 1e-9;

/// One feasible way to cut a roll
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Pattern {
    /// How many pieces of each item the pattern cuts
    pub counts: Vec<u32>,
    /// Total length cut, rounded to the resolved precision
    pub used_length: f64,
    /// Unused remainder of the roll, rounded to the resolved precision
    pub waste: f64,
}

impl Pattern {
    /// Number of pieces cut
    pub fn pieces(&self) -> u32 {
        self.counts.iter().sum()
    }
}

/// All patterns for one instance, in generation order
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone)]
pub struct PatternSet {
    patterns: Vec<Pattern>,
    item_count: usize,
    roll_length: f64,
    precision: Precision,
}

impl PatternSet {
    /// Enumerate every pattern of `lengths` that fits in `roll_length`
    pub fn enumerate(lengths: &[f64], roll_length: f64, precision: Precision) -> Result<Self, CutError> {
        Self::enumerate_with_limit(lengths, roll_length, precision, None)
    }

    /// Like [`PatternSet::enumerate`], failing as soon as more than `limit` patterns are accepted
    pub fn enumerate_with_limit(
        lengths: &[f64],
        roll_length: f64,
        precision: Precision,
        limit: Option<usize>,
    ) -> Result<Self, CutError> {
        let max_size = max_pattern_size(lengths, roll_length, precision)?;
        tracing::debug!(items = lengths.len(), max_size, "enumerating patterns");

        let mut patterns = Vec::new();
        let mut candidates = 0usize;
        let mut multisets = Multisets::new(lengths.len(), max_size);
        while let Some(indices) = multisets.advance() {
            candidates += 1;

            let used: f64 = indices.iter().map(|&i| lengths[i]).sum();
            if !precision.fits(used, roll_length) {
                continue;
            }
            let used_length = precision.round(used);

            if let Some(limit) = limit
                && patterns.len() >= limit
            {
                return Err(CutError::PatternLimitExceeded { limit });
            }

            let mut counts = vec![0u32; lengths.len()];
            for &i in indices {
                counts[i] += 1;
            }
            let waste = precision.round(roll_length - used);
            patterns.push(Pattern {
                counts,
                used_length,
                waste: if waste > 0.0 { waste } else { 0.0 },
            });
        }

        tracing::debug!(candidates, accepted = patterns.len(), "pattern enumeration finished");
        Ok(Self {
            patterns,
            item_count: lengths.len(),
            roll_length,
            precision,
        })
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Pattern> {
        self.patterns.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Pattern> {
        self.patterns.iter()
    }

    pub fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }

    pub fn item_count(&self) -> usize {
        self.item_count
    }

    pub fn roll_length(&self) -> f64 {
        self.roll_length
    }

    pub fn precision(&self) -> Precision {
        self.precision
    }

    /// Waste of each pattern, indexed like the patterns
    pub fn wastes(&self) -> Vec<f64> {
        self.patterns.iter().map(|p| p.waste).collect()
    }

    /// Items × patterns matrix of piece counts
    pub fn incidence(&self) -> IncidenceMatrix {
        let cols = self.patterns.len();
        let mut data = vec![0u32; self.item_count * cols];
        for (p, pattern) in self.patterns.iter().enumerate() {
            for (i, &count) in pattern.counts.iter().enumerate() {
                data[i * cols + p] = count;
            }
        }
        IncidenceMatrix {
            items: self.item_count,
            patterns: cols,
            data,
        }
    }
}

impl<'a> IntoIterator for &'a PatternSet {
    type Item = &'a Pattern;
    type IntoIter = std::slice::Iter<'a, Pattern>;

    fn into_iter(self) -> Self::IntoIter {
        self.patterns.iter()
    }
}

/// Row-major items × patterns matrix, `A[item][pattern]` = pieces of the item in the pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncidenceMatrix {
    items: usize,
    patterns: usize,
    data: Vec<u32>,
}

impl IncidenceMatrix {
    pub fn items(&self) -> usize {
        self.items
    }

    pub fn patterns(&self) -> usize {
        self.patterns
    }

    pub fn get(&self, item: usize, pattern: usize) -> u32 {
        self.data[item * self.patterns + pattern]
    }

    /// Counts of one item across all patterns
    pub fn row(&self, item: usize) -> &[u32] {
        &self.data[item * self.patterns..(item + 1) * self.patterns]
    }

    /// `A · usage`: pieces of each item produced by a usage vector
    pub fn produced(&self, usage: &[u64]) -> Vec<u64> {
        (0..self.items)
            .map(|i| {
                self.row(i)
                    .iter()
                    .zip(usage)
                    .map(|(&count, &times)| count as u64 * times)
                    .sum()
            })
            .collect()
    }
}

/// Upper bound on the number of pieces in any pattern.
///
/// Fails when not even the shortest item fits in a roll.
fn max_pattern_size(lengths: &[f64], roll_length: f64, precision: Precision) -> Result<usize, CutError> {
    if lengths.is_empty() {
        return Err(CutError::NoItems);
    }
    let shortest = lengths.iter().copied().fold(f64::INFINITY, f64::min);
    if !precision.fits(shortest, roll_length) {
        return Err(CutError::InfeasibleConfiguration { roll_length, shortest });
    }

    let bound = ((roll_length / shortest) * (1.0 + BOUND_SLACK)).floor();
    if !bound.is_finite() {
        return Err(CutError::InfeasibleConfiguration { roll_length, shortest });
    }
    Ok((bound as usize).max(1))
}

/// Walks all multisets over `0..n` as non-decreasing index sequences, size 1
/// first and lexicographically within a size, reusing one index buffer.
struct Multisets {
    n: usize,
    max_size: usize,
    indices: Vec<usize>,
    started: bool,
}

impl Multisets {
    fn new(n: usize, max_size: usize) -> Self {
        Self {
            n,
            max_size,
            indices: Vec::new(),
            started: false,
        }
    }

    fn advance(&mut self) -> Option<&[usize]> {
        if self.n == 0 || self.max_size == 0 {
            return None;
        }
        if !self.started {
            self.started = true;
            self.indices.push(0);
            return Some(&self.indices);
        }

        let last = self.n - 1;
        match self.indices.iter().rposition(|&i| i < last) {
            Some(pos) => {
                let next = self.indices[pos] + 1;
                self.indices[pos..].iter_mut().for_each(|slot| *slot = next);
            }
            None => {
                let size = self.indices.len();
                if size >= self.max_size {
                    return None;
                }
                self.indices.clear();
                self.indices.resize(size + 1, 0);
            }
        }
        Some(&self.indices)
    }
}
