//! # Charge Engine
//!
//! Debits every active funding of a pool by one bundle.
//!
//! Fundings are charged in ascending address order. A funding whose balance
//! reaches zero leaves the active set, and rates for drained currencies are
//! dropped as on a defund. The engine never moves coins: it
//! returns the payout owed to the pool and the updated records.

use crate::domain::entities::{Funding, FundingState};
use crate::domain::errors::FundingError;
use serde::{Deserialize, Serialize};
use shared_types::{address_hex, Address, Coins, PoolId};
use std::collections::BTreeMap;

/// Aggregate result of charging one bundle.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChargeResult {
    pub pool_id: PoolId,
    /// Sum of every charged amount, owed to the pool.
    pub total_payout: Coins,
    /// Per-funder charge, in charge order. Zero charges are omitted.
    pub charged: Vec<(Address, Coins)>,
    /// Funders deactivated by this charge.
    pub exhausted: Vec<Address>,
}

impl ChargeResult {
    pub fn empty(pool_id: PoolId) -> Self {
        Self {
            pool_id,
            ..Self::default()
        }
    }
}

/// Engine output: the result plus the records to persist.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChargeOutcome {
    pub result: ChargeResult,
    /// Charged fundings, to be written back.
    pub updated: Vec<Funding>,
    /// True if this charge emptied a previously non-empty active set.
    pub emptied: bool,
}

/// Charges one bundle against every active funding of `state`.
///
/// `active` must contain exactly the fundings of the active funders.
/// Rejects (without touching `state`) any mismatch between the two.
pub fn charge_bundle(
    state: &mut FundingState,
    active: Vec<Funding>,
) -> Result<ChargeOutcome, FundingError> {
    let mut by_funder: BTreeMap<Address, Funding> = BTreeMap::new();
    for funding in active {
        if funding.pool_id != state.pool_id || !state.contains(&funding.funder) {
            return Err(FundingError::invariant(format!(
                "funding of {} is not an active funding of pool {}",
                address_hex(&funding.funder),
                state.pool_id
            )));
        }
        if !funding.is_active() {
            return Err(FundingError::invariant(format!(
                "active funder {} of pool {} has no balance",
                address_hex(&funding.funder),
                state.pool_id
            )));
        }
        by_funder.insert(funding.funder, funding);
    }
    if by_funder.len() != state.len() {
        return Err(FundingError::invariant(format!(
            "pool {} lists {} active funders but {} fundings were supplied",
            state.pool_id,
            state.len(),
            by_funder.len()
        )));
    }

    let was_empty = state.is_empty();
    let mut result = ChargeResult::empty(state.pool_id);
    let mut updated = Vec::with_capacity(by_funder.len());

    // BTreeMap iteration is ascending by address.
    for (funder, mut funding) in by_funder {
        let charged = funding.charge_one_bundle()?;
        if !charged.is_zero() {
            result.total_payout = result.total_payout.checked_add(&charged)?;
            result.charged.push((funder, charged));
        }
        funding.clean_rates();
        if !funding.is_active() {
            result.exhausted.push(funder);
        }
        updated.push(funding);
    }

    for funder in &result.exhausted {
        state.set_inactive(funder);
    }

    Ok(ChargeOutcome {
        emptied: !was_empty && state.is_empty(),
        result,
        updated,
    })
}
