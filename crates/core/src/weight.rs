//! Fixed-point weight value object.
//!
//! Weights are the quantity this whole system reconciles on, so they must not
//! drift: `Grams` stores whole milligrams (i64) and parses/formats a decimal
//! with exactly three places ("10.500"). Signed, because customer balances and
//! raw-gold adjustments can be negative.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::value_object::ValueObject;

/// A weight in whole milligrams.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Grams(i64);

impl Grams {
    pub const ZERO: Grams = Grams(0);

    pub const fn from_milligrams(mg: i64) -> Self {
        Self(mg)
    }

    pub const fn milligrams(&self) -> i64 {
        self.0
    }

    pub fn is_positive(&self) -> bool {
        self.0 > 0
    }

    pub fn is_negative(&self) -> bool {
        self.0 < 0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checked addition; `None` on overflow.
    pub fn checked_add(self, other: Grams) -> Option<Grams> {
        self.0.checked_add(other.0).map(Grams)
    }

    /// Checked subtraction; `None` on overflow.
    pub fn checked_sub(self, other: Grams) -> Option<Grams> {
        self.0.checked_sub(other.0).map(Grams)
    }

    /// Saturating addition, for report folds where overflow would mean
    /// astronomically wrong input anyway.
    pub fn saturating_add(self, other: Grams) -> Grams {
        Grams(self.0.saturating_add(other.0))
    }

    pub fn saturating_sub(self, other: Grams) -> Grams {
        Grams(self.0.saturating_sub(other.0))
    }

    pub fn neg(self) -> Grams {
        Grams(-self.0)
    }
}

impl ValueObject for Grams {}

impl core::fmt::Display for Grams {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:03}", abs / 1000, abs % 1000)
    }
}

impl FromStr for Grams {
    type Err = DomainError;

    /// Parse a decimal gram value with up to three fractional digits.
    ///
    /// Accepts "10", "10.5", "10.500", "-3.2". More than three fractional
    /// digits is rejected rather than silently rounded: operators type the
    /// scale reading verbatim and a fourth digit is a typo.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(DomainError::validation("weight cannot be empty"));
        }

        let (sign, rest) = match s.strip_prefix('-') {
            Some(rest) => (-1i64, rest),
            None => (1i64, s),
        };

        let (whole, frac) = match rest.split_once('.') {
            Some((w, f)) => (w, f),
            None => (rest, ""),
        };

        if whole.is_empty() && frac.is_empty() {
            return Err(DomainError::validation(format!("invalid weight: {s:?}")));
        }
        if frac.len() > 3 {
            return Err(DomainError::validation(format!(
                "weight has more than 3 decimal places: {s:?}"
            )));
        }
        if !whole.chars().all(|c| c.is_ascii_digit()) || !frac.chars().all(|c| c.is_ascii_digit()) {
            return Err(DomainError::validation(format!("invalid weight: {s:?}")));
        }

        let whole: i64 = if whole.is_empty() {
            0
        } else {
            whole
                .parse()
                .map_err(|_| DomainError::validation(format!("weight out of range: {s:?}")))?
        };

        let mut frac_mg: i64 = if frac.is_empty() { 0 } else { frac.parse().unwrap_or(0) };
        for _ in frac.len()..3 {
            frac_mg *= 10;
        }

        whole
            .checked_mul(1000)
            .and_then(|mg| mg.checked_add(frac_mg))
            .map(|mg| Grams(sign * mg))
            .ok_or_else(|| DomainError::validation(format!("weight out of range: {s:?}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_formats_three_decimal_places() {
        let w: Grams = "10.500".parse().unwrap();
        assert_eq!(w.milligrams(), 10_500);
        assert_eq!(w.to_string(), "10.500");
    }

    #[test]
    fn pads_short_fractions() {
        let w: Grams = "10.5".parse().unwrap();
        assert_eq!(w.milligrams(), 10_500);

        let w: Grams = "0.05".parse().unwrap();
        assert_eq!(w.milligrams(), 50);
        assert_eq!(w.to_string(), "0.050");
    }

    #[test]
    fn parses_whole_grams() {
        let w: Grams = "100".parse().unwrap();
        assert_eq!(w.milligrams(), 100_000);
        assert_eq!(w.to_string(), "100.000");
    }

    #[test]
    fn parses_negative_weights() {
        let w: Grams = "-3.2".parse().unwrap();
        assert_eq!(w.milligrams(), -3_200);
        assert_eq!(w.to_string(), "-3.200");
    }

    #[test]
    fn rejects_too_many_decimal_places() {
        assert!("1.0001".parse::<Grams>().is_err());
    }

    #[test]
    fn rejects_garbage() {
        assert!("".parse::<Grams>().is_err());
        assert!("abc".parse::<Grams>().is_err());
        assert!("1.2.3".parse::<Grams>().is_err());
        assert!("--1".parse::<Grams>().is_err());
    }

    #[test]
    fn checked_arithmetic() {
        let a = Grams::from_milligrams(10_000);
        let b = Grams::from_milligrams(500);
        assert_eq!(a.checked_add(b), Some(Grams::from_milligrams(10_500)));
        assert_eq!(a.checked_sub(b), Some(Grams::from_milligrams(9_500)));
        assert_eq!(Grams::from_milligrams(i64::MAX).checked_add(b), None);
    }
}
