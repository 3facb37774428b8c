//! Value objects for the Pool Funding subsystem.
//!
//! Fixed-point currency weights and the ranking score derived from them.
//! Neither ever touches floating point.

use primitive_types::{U256, U512};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Number of fractional decimal digits carried by a [`Weight`].
pub const WEIGHT_DECIMALS: usize = 18;

fn weight_unit() -> U256 {
    U256::exp10(WEIGHT_DECIMALS)
}

/// Error parsing a decimal weight string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid weight {input:?}: {reason}")]
pub struct WeightParseError {
    pub input: String,
    pub reason: &'static str,
}

/// Non-negative currency weight with 18 fractional digits.
///
/// Serialized as a decimal string (`"0.0358"`), stored as the scaled integer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Weight(U256);

impl Weight {
    /// Weight of zero: the currency does not count towards a score.
    pub fn zero() -> Self {
        Self(U256::zero())
    }

    /// Weight of exactly one.
    pub fn one() -> Self {
        Self(weight_unit())
    }

    /// Whole-number weight.
    pub fn from_integer(value: u64) -> Self {
        Self(U256::from(value).saturating_mul(weight_unit()))
    }

    /// Raw scaled value (`weight * 10^18`).
    pub fn raw(&self) -> U256 {
        self.0
    }

    /// Weighted amount, scaled by `10^18`. Never overflows.
    pub fn apply(&self, amount: U256) -> U512 {
        self.0.full_mul(amount)
    }
}

impl FromStr for Weight {
    type Err = WeightParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let err = |reason| WeightParseError {
            input: input.to_string(),
            reason,
        };

        let trimmed = input.trim();
        let (int_part, frac_part) = match trimmed.split_once('.') {
            Some((i, f)) => (i, f),
            None => (trimmed, ""),
        };

        if int_part.is_empty() && frac_part.is_empty() {
            return Err(err("empty"));
        }
        if !int_part.chars().all(|c| c.is_ascii_digit())
            || !frac_part.chars().all(|c| c.is_ascii_digit())
        {
            return Err(err("expected an unsigned decimal number"));
        }
        if frac_part.len() > WEIGHT_DECIMALS {
            return Err(err("more than 18 fractional digits"));
        }

        let int_value = if int_part.is_empty() {
            U256::zero()
        } else {
            U256::from_dec_str(int_part).map_err(|_| err("integer part out of range"))?
        };
        let frac_value = if frac_part.is_empty() {
            U256::zero()
        } else {
            let padded = format!("{:0<width$}", frac_part, width = WEIGHT_DECIMALS);
            U256::from_dec_str(&padded).map_err(|_| err("fraction out of range"))?
        };

        int_value
            .checked_mul(weight_unit())
            .and_then(|scaled| scaled.checked_add(frac_value))
            .map(Weight)
            .ok_or_else(|| err("integer part out of range"))
    }
}

impl TryFrom<String> for Weight {
    type Error = WeightParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Weight> for String {
    fn from(weight: Weight) -> Self {
        weight.to_string()
    }
}

impl fmt::Display for Weight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let unit = weight_unit();
        let int_part = self.0 / unit;
        let frac_part = self.0 % unit;
        if frac_part.is_zero() {
            return write!(f, "{}", int_part);
        }
        let frac = format!("{:0>width$}", frac_part.to_string(), width = WEIGHT_DECIMALS);
        write!(f, "{}.{}", int_part, frac.trim_end_matches('0'))
    }
}

/// Ranking scalar of a funding: `Σ weight[c] * balance[c]`, scaled by `10^18`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Score(U512);

impl Score {
    pub fn zero() -> Self {
        Self(U512::zero())
    }

    pub fn value(&self) -> U512 {
        self.0
    }

    /// Adds a weighted component.
    pub fn accumulate(self, weighted: U512) -> Self {
        Self(self.0.saturating_add(weighted))
    }
}

impl Ord for Score {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.cmp(&other.0)
    }
}

impl PartialOrd for Score {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weight_parse_integer_and_fraction() {
        assert_eq!("1".parse::<Weight>().unwrap(), Weight::one());
        assert_eq!("3".parse::<Weight>().unwrap(), Weight::from_integer(3));

        let w: Weight = "0.0358".parse().unwrap();
        assert_eq!(w.raw(), U256::from(35_800_000_000_000_000u64));
        assert_eq!(w.to_string(), "0.0358");
    }

    #[test]
    fn test_weight_display_trims_trailing_zeros() {
        let w: Weight = "2.500".parse().unwrap();
        assert_eq!(w.to_string(), "2.5");
        assert_eq!(Weight::zero().to_string(), "0");
    }

    #[test]
    fn test_weight_rejects_garbage() {
        assert!("".parse::<Weight>().is_err());
        assert!("-1".parse::<Weight>().is_err());
        assert!("1.2.3".parse::<Weight>().is_err());
        assert!("0.0000000000000000001".parse::<Weight>().is_err());
        assert!("abc".parse::<Weight>().is_err());
    }

    #[test]
    fn test_weight_serde_as_string() {
        let w: Weight = "0.25".parse().unwrap();
        let json = serde_json::to_string(&w).unwrap();
        assert_eq!(json, "\"0.25\"");
        let back: Weight = serde_json::from_str(&json).unwrap();
        assert_eq!(back, w);
    }

    #[test]
    fn test_weight_apply_does_not_overflow() {
        let w = Weight::from_integer(1_000);
        let weighted = w.apply(U256::MAX);
        assert!(weighted > U512::from(U256::MAX));
    }

    #[test]
    fn test_score_ordering() {
        let low = Score::zero().accumulate(U512::from(10u64));
        let high = Score::zero().accumulate(U512::from(11u64));
        assert!(low < high);
        assert_eq!(low.to_string(), "10");
    }
}
