//! Rounding precision derived from the decimal digits of the input data.
//!
//! Waste values are differences of sums of floats. Rounding them to the number
//! of decimals the inputs were written with keeps equal wastes equal and keeps
//! distinct wastes apart.

use std::fmt;

/// Upper limit on resolved decimal places, about what an `f64` can carry.
///
/// Inputs written with more places than this cannot be rounded faithfully, so
/// a precision resolved from them is marked truncated and [`Precision::fits`]
/// compares raw sums instead.
pub const MAX_DECIMAL_PLACES: u32 = 15;

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Precision {
    places: u32,
    truncated: bool,
}

impl Precision {
    pub fn new(places: u32) -> Self {
        Self {
            places: places.min(MAX_DECIMAL_PLACES),
            truncated: places > MAX_DECIMAL_PLACES,
        }
    }

    /// The largest number of decimal places among the item lengths and the roll length
    pub fn resolve(lengths: &[f64], roll_length: f64) -> Self {
        let places = lengths
            .iter()
            .chain(std::iter::once(&roll_length))
            .map(|&value| decimal_places(value))
            .max()
            .unwrap_or(0);
        Self::new(places)
    }

    pub fn places(self) -> u32 {
        self.places
    }

    /// True when some input had more decimal places than [`MAX_DECIMAL_PLACES`]
    pub fn is_truncated(self) -> bool {
        self.truncated
    }

    /// Whether a total cut length of `used` fits in `roll_length`.
    ///
    /// The rounded total is compared so that float drift in a sum such as
    /// `0.1 + 0.1 + 0.1` does not reject an exact fit. A truncated precision
    /// would hide a real overrun, so then the raw total is compared.
    pub fn fits(self, used: f64, roll_length: f64) -> bool {
        if self.truncated {
            used <= roll_length
        } else {
            self.round(used) <= roll_length
        }
    }

    /// Round half away from zero to this many decimal places
    pub fn round(self, value: f64) -> f64 {
        let scale = 10f64.powi(self.places as i32);
        (value * scale).round() / scale
    }
}

impl fmt::Display for Precision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.places)
    }
}

/// Digits after the decimal point in the shortest text form of `value`.
///
/// `3.0` prints as `3` and counts as zero places. Not capped; see
/// [`Precision::new`].
pub fn decimal_places(value: f64) -> u32 {
    if !value.is_finite() {
        return 0;
    }
    let text = value.to_string();
    match text.split_once('.') {
        Some((_, fraction)) => fraction.len() as u32,
        None => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decimal_places() {
        assert_eq!(decimal_places(3.4), 1);
        assert_eq!(decimal_places(3.0), 0);
        assert_eq!(decimal_places(12.0), 0);
        assert_eq!(decimal_places(0.125), 3);
        assert_eq!(decimal_places(1e-7), 7);
        assert_eq!(decimal_places(f64::NAN), 0);
    }

    #[test]
    fn test_resolve_mixed_lengths() {
        let precision = Precision::resolve(&[3.4, 3.0, 2.7], 12.0);
        assert_eq!(precision.places(), 1);
    }

    #[test]
    fn test_resolve_integer_lengths() {
        let precision = Precision::resolve(&[3.0, 4.0, 5.0], 12.0);
        assert_eq!(precision.places(), 0);
    }

    #[test]
    fn test_roll_length_counts() {
        let precision = Precision::resolve(&[3.0, 4.5], 12.25);
        assert_eq!(precision.places(), 2);
    }

    #[test]
    fn test_places_are_capped() {
        // 0.1 + 0.2 prints as 0.30000000000000004
        assert_eq!(decimal_places(0.1 + 0.2), 17);
        let precision = Precision::resolve(&[0.1 + 0.2], 1.0);
        assert_eq!(precision.places(), MAX_DECIMAL_PLACES);
        assert!(precision.is_truncated());

        assert_eq!(Precision::new(40).places(), MAX_DECIMAL_PLACES);
        assert!(!Precision::new(MAX_DECIMAL_PLACES).is_truncated());
    }

    #[test]
    fn test_fits_absorbs_sum_drift() {
        let precision = Precision::resolve(&[0.1], 0.3);
        assert!(!precision.is_truncated());
        assert!(precision.fits(0.1 + 0.1 + 0.1, 0.3));
        assert!(!precision.fits(0.4, 0.3));
    }

    #[test]
    fn test_fits_compares_raw_total_when_truncated() {
        // One ulp above 1.0 rounds to 1.0 at 15 places
        let length = 1.0000000000000002;
        let precision = Precision::resolve(&[length], 1.0);
        assert!(precision.is_truncated());
        assert_eq!(precision.round(length), 1.0);
        assert!(!precision.fits(length, 1.0));
        assert!(precision.fits(1.0, 1.0));
    }

    #[test]
    fn test_round_removes_float_drift() {
        let precision = Precision::new(1);
        let waste = 12.0 - (3.4 + 3.4 + 3.4);
        assert_ne!(waste, 1.8);
        assert_eq!(precision.round(waste), 1.8);
        assert_eq!(Precision::new(0).round(2.5), 3.0);
    }
}
