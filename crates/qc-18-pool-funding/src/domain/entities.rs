//! Core domain entities for the Pool Funding subsystem.
//!
//! - [`Funder`]: registry record, keyed by address, never deleted.
//! - [`Funding`]: one balance/rate record per `(funder, pool)`.
//! - [`FundingState`]: the bounded set of active funders of one pool.

use serde::{Deserialize, Serialize};
use shared_types::{Address, Coins, CoinsError, PoolId};
use std::collections::BTreeSet;

/// Descriptive funder metadata, supplied on register and update.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunderMetadata {
    pub moniker: String,
    pub identity: Option<String>,
    pub website: Option<String>,
    pub contact: Option<String>,
    pub description: Option<String>,
}

impl FunderMetadata {
    pub fn with_moniker(moniker: impl Into<String>) -> Self {
        Self {
            moniker: moniker.into(),
            ..Self::default()
        }
    }
}

/// A registered funder.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Funder {
    pub address: Address,
    pub moniker: String,
    pub identity: Option<String>,
    pub website: Option<String>,
    pub contact: Option<String>,
    pub description: Option<String>,
}

impl Funder {
    pub fn new(address: Address, metadata: FunderMetadata) -> Self {
        Self {
            address,
            moniker: metadata.moniker,
            identity: metadata.identity,
            website: metadata.website,
            contact: metadata.contact,
            description: metadata.description,
        }
    }

    /// Replaces every metadata field.
    pub fn apply(&mut self, metadata: FunderMetadata) {
        self.moniker = metadata.moniker;
        self.identity = metadata.identity;
        self.website = metadata.website;
        self.contact = metadata.contact;
        self.description = metadata.description;
    }
}

/// Ledger record of one funder's balance and rate for one pool.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Funding {
    pub funder: Address,
    pub pool_id: PoolId,
    /// Remaining deposited balance.
    pub balances: Coins,
    /// Amount charged per finalized bundle.
    pub per_bundle_rate: Coins,
    /// Lifetime amount charged by the pool.
    pub total_charged: Coins,
}

impl Funding {
    pub fn new(funder: Address, pool_id: PoolId) -> Self {
        Self {
            funder,
            pool_id,
            balances: Coins::new(),
            per_bundle_rate: Coins::new(),
            total_charged: Coins::new(),
        }
    }

    /// A funding is active exactly when some balance is positive.
    pub fn is_active(&self) -> bool {
        !self.balances.is_zero()
    }

    pub fn add_balances(&mut self, deposit: &Coins) -> Result<(), CoinsError> {
        self.balances = self.balances.checked_add(deposit)?;
        Ok(())
    }

    /// Replaces the rate for every currency mentioned in `rate`.
    pub fn merge_rate(&mut self, rate: &Coins) {
        for (denom, amount) in rate.iter() {
            self.per_bundle_rate.set(denom.clone(), *amount);
        }
    }

    /// Subtracts up to `amounts`, clamped per currency. Returns what was removed.
    pub fn subtract_clamped(&mut self, amounts: &Coins) -> Coins {
        let removed = amounts.min(&self.balances);
        for (denom, amount) in removed.iter() {
            let remaining = self.balances.amount_of(denom).saturating_sub(*amount);
            self.balances.set(denom.clone(), remaining);
        }
        removed
    }

    /// Debits one bundle: the rate, clamped to the remaining balance.
    ///
    /// Returns the amount charged, possibly zero.
    pub fn charge_one_bundle(&mut self) -> Result<Coins, CoinsError> {
        let charged = self.per_bundle_rate.min(&self.balances);
        self.balances = self.balances.checked_sub(&charged)?;
        self.total_charged = self.total_charged.checked_add(&charged)?;
        Ok(charged)
    }

    /// Empties the balance and returns it.
    pub fn drain(&mut self) -> Coins {
        std::mem::take(&mut self.balances)
    }

    /// Drops rate entries for currencies no longer held.
    pub fn clean_rates(&mut self) {
        let balances = &self.balances;
        self.per_bundle_rate.retain(|denom| balances.contains(denom));
    }
}

/// Active funder set of one pool.
///
/// Iteration is ascending by address, the canonical charge order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundingState {
    pub pool_id: PoolId,
    pub active_funders: BTreeSet<Address>,
}

impl FundingState {
    pub fn new(pool_id: PoolId) -> Self {
        Self {
            pool_id,
            active_funders: BTreeSet::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.active_funders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active_funders.is_empty()
    }

    pub fn contains(&self, funder: &Address) -> bool {
        self.active_funders.contains(funder)
    }

    /// Inserts; returns false if already present.
    pub fn set_active(&mut self, funder: Address) -> bool {
        self.active_funders.insert(funder)
    }

    /// Removes; returns false if absent.
    pub fn set_inactive(&mut self, funder: &Address) -> bool {
        self.active_funders.remove(funder)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Address> {
        self.active_funders.iter()
    }
}
