//! # Multi-Currency Amounts
//!
//! `Coins` is a sparse, sorted map from currency symbol to a non-negative
//! `U256` amount. Zero components are never stored, so two `Coins` values
//! that represent the same amounts compare (and serialize) identically.

use crate::entities::{Denom, U256};
use crate::errors::CoinsError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Sparse multi-currency amount, iterated in ascending denom order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "BTreeMap<Denom, U256>", into = "BTreeMap<Denom, U256>")]
pub struct Coins(BTreeMap<Denom, U256>);

impl Coins {
    /// Creates an empty amount.
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Creates an amount holding a single currency.
    pub fn single(denom: impl Into<Denom>, amount: impl Into<U256>) -> Self {
        let mut coins = Self::new();
        coins.set(denom, amount.into());
        coins
    }

    /// Returns the amount held in `denom` (zero when absent).
    pub fn amount_of(&self, denom: &str) -> U256 {
        self.0.get(denom).copied().unwrap_or_default()
    }

    /// Returns true if `denom` has a non-zero amount.
    pub fn contains(&self, denom: &str) -> bool {
        self.0.contains_key(denom)
    }

    /// Sets the amount of `denom`, dropping the entry when zero.
    pub fn set(&mut self, denom: impl Into<Denom>, amount: U256) {
        let denom = denom.into();
        if amount.is_zero() {
            self.0.remove(&denom);
        } else {
            self.0.insert(denom, amount);
        }
    }

    /// Returns true if every component is zero.
    pub fn is_zero(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of non-zero components.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if there are no components.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates `(denom, amount)` pairs in ascending denom order.
    pub fn iter(&self) -> impl Iterator<Item = (&Denom, &U256)> {
        self.0.iter()
    }

    /// Iterates denoms in ascending order.
    pub fn denoms(&self) -> impl Iterator<Item = &Denom> {
        self.0.keys()
    }

    /// Component-wise addition.
    pub fn checked_add(&self, other: &Coins) -> Result<Coins, CoinsError> {
        let mut sum = self.clone();
        for (denom, amount) in other.iter() {
            let total = sum
                .amount_of(denom)
                .checked_add(*amount)
                .ok_or_else(|| CoinsError::Overflow {
                    denom: denom.clone(),
                })?;
            sum.set(denom.clone(), total);
        }
        Ok(sum)
    }

    /// Component-wise subtraction that fails if any component would go negative.
    pub fn checked_sub(&self, other: &Coins) -> Result<Coins, CoinsError> {
        let mut diff = self.clone();
        for (denom, amount) in other.iter() {
            let available = diff.amount_of(denom);
            let remaining =
                available
                    .checked_sub(*amount)
                    .ok_or_else(|| CoinsError::Underflow {
                        denom: denom.clone(),
                        available: available.to_string(),
                        requested: amount.to_string(),
                    })?;
            diff.set(denom.clone(), remaining);
        }
        Ok(diff)
    }

    /// Component-wise minimum. Currencies missing on either side are dropped.
    pub fn min(&self, other: &Coins) -> Coins {
        self.iter()
            .map(|(denom, amount)| (denom.clone(), (*amount).min(other.amount_of(denom))))
            .collect()
    }

    /// Returns true if every component is `<=` the matching component of `other`.
    pub fn is_all_lte(&self, other: &Coins) -> bool {
        self.iter()
            .all(|(denom, amount)| *amount <= other.amount_of(denom))
    }

    /// Keeps only the currencies for which `keep` returns true.
    pub fn retain(&mut self, mut keep: impl FnMut(&str) -> bool) {
        self.0.retain(|denom, _| keep(denom));
    }
}

impl FromIterator<(Denom, U256)> for Coins {
    /// Collects pairs, summing repeated denoms (saturating) and skipping zeros.
    fn from_iter<I: IntoIterator<Item = (Denom, U256)>>(iter: I) -> Self {
        let mut coins = Coins::new();
        for (denom, amount) in iter {
            let total = coins.amount_of(&denom).saturating_add(amount);
            coins.set(denom, total);
        }
        coins
    }
}

impl From<BTreeMap<Denom, U256>> for Coins {
    fn from(map: BTreeMap<Denom, U256>) -> Self {
        map.into_iter().collect()
    }
}

impl From<Coins> for BTreeMap<Denom, U256> {
    fn from(coins: Coins) -> Self {
        coins.0
    }
}

impl fmt::Display for Coins {
    /// Renders as `100uqc,50uusdc` (empty string when zero).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (denom, amount)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}{}", amount, denom)?;
        }
        Ok(())
    }
}
