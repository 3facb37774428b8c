//! Parameter compatibility checks for a funding.
//!
//! Run against the merged funding on every fund, and against the remainder
//! of a partial defund.

use crate::config::FundersParams;
use crate::domain::entities::Funding;
use crate::domain::errors::FundingError;
use primitive_types::{U256, U512};

/// Checks whitelist, minimum balance, minimum rate and minimum multiple.
pub fn ensure_params_compatibility(
    funding: &Funding,
    params: &FundersParams,
) -> Result<(), FundingError> {
    for (denom, balance) in funding.balances.iter() {
        let entry = params
            .whitelist_entry(denom)
            .ok_or_else(|| FundingError::CoinNotWhitelisted {
                denom: denom.clone(),
            })?;

        if *balance < entry.min_funding_amount {
            return Err(FundingError::InvalidDeposit {
                denom: denom.clone(),
                amount: *balance,
                minimum: entry.min_funding_amount,
            });
        }

        let rate = funding.per_bundle_rate.amount_of(denom);
        if rate.is_zero() {
            return Err(FundingError::InvalidRate {
                denom: denom.clone(),
                reason: "rate must be positive for every funded currency".to_string(),
            });
        }
        if rate < entry.min_funding_amount_per_bundle {
            return Err(FundingError::InvalidRate {
                denom: denom.clone(),
                reason: format!(
                    "{} is below the minimum of {}",
                    rate, entry.min_funding_amount_per_bundle
                ),
            });
        }

        // Compared in full width: rate * multiple may exceed U256.
        let required = rate.full_mul(U256::from(params.min_funding_multiple));
        if U512::from(*balance) < required {
            return Err(FundingError::RatioTooLow {
                denom: denom.clone(),
                balance: *balance,
                rate,
                multiple: params.min_funding_multiple,
            });
        }
    }
    Ok(())
}
