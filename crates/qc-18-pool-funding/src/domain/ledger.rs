//! # Funding Ledger
//!
//! Pure balance transitions of a single [`Funding`]. Nothing here touches
//! storage or the active set; callers stage the returned records and commit
//! them together with the admission decision.

use crate::config::FundersParams;
use crate::domain::entities::Funding;
use crate::domain::errors::FundingError;
use crate::domain::validation::ensure_params_compatibility;
use shared_types::{Address, Coins, PoolId};

/// Result of a clamped decrease.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Decrease {
    /// The updated funding.
    pub funding: Funding,
    /// What was actually removed (never more than the prior balance).
    pub removed: Coins,
    /// True if the decrease drained the funding.
    pub drained: bool,
}

/// Creates a funding or tops up an existing one, then validates the result.
///
/// The rate for every currency named in `rate` replaces the old rate; other
/// currencies keep theirs. Every currency in `rate` must be held after the
/// deposit. Rate entries for currencies no longer held are dropped.
pub fn create_or_increase(
    existing: Option<Funding>,
    funder: Address,
    pool_id: PoolId,
    deposit: &Coins,
    rate: &Coins,
    params: &FundersParams,
) -> Result<Funding, FundingError> {
    if deposit.is_zero() && rate.is_zero() {
        return Err(FundingError::EmptyFundRequest);
    }

    let mut funding = existing.unwrap_or_else(|| Funding::new(funder, pool_id));
    if funding.funder != funder || funding.pool_id != pool_id {
        return Err(FundingError::invariant(
            "funding record does not match its (funder, pool) key",
        ));
    }

    funding.add_balances(deposit)?;

    if let Some(denom) = rate.denoms().find(|denom| !funding.balances.contains(denom)) {
        return Err(FundingError::InvalidRate {
            denom: denom.clone(),
            reason: "rate given for a currency without balance".to_string(),
        });
    }
    funding.merge_rate(rate);
    funding.clean_rates();

    ensure_params_compatibility(&funding, params)?;
    Ok(funding)
}

/// Removes up to `amounts` from the funding, clamped per currency.
///
/// A partial decrease must leave a funding that still satisfies the
/// parameters; a full drain is always allowed.
pub fn decrease(
    mut funding: Funding,
    amounts: &Coins,
    params: &FundersParams,
) -> Result<Decrease, FundingError> {
    if amounts.is_zero() {
        return Err(FundingError::EmptyAmount);
    }

    let removed = funding.subtract_clamped(amounts);
    let drained = !funding.is_active();
    funding.clean_rates();

    if !drained && !removed.is_zero() {
        ensure_params_compatibility(&funding, params)?;
    }

    Ok(Decrease {
        funding,
        removed,
        drained,
    })
}
