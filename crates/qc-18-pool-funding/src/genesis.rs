//! Genesis import/export of the funding tables.

use crate::config::FundersParams;
use crate::domain::entities::{Funder, Funding, FundingState};
use crate::domain::errors::FundingError;
use serde::{Deserialize, Serialize};
use shared_types::{address_hex, Address, PoolId};
use std::collections::{BTreeMap, BTreeSet};

/// Complete snapshot of the subsystem.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenesisState {
    pub params: FundersParams,
    pub funders: Vec<Funder>,
    pub fundings: Vec<Funding>,
    pub funding_states: Vec<FundingState>,
}

impl GenesisState {
    pub fn from_json(json: &str) -> Result<Self, FundingError> {
        serde_json::from_str(json).map_err(|e| FundingError::InvalidGenesis(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String, FundingError> {
        serde_json::to_string_pretty(self).map_err(|e| FundingError::Serialization(e.to_string()))
    }

    /// Checks uniqueness, references, capacity and active-set consistency.
    pub fn validate(&self) -> Result<(), FundingError> {
        self.params.validate()?;
        let invalid = |msg: String| Err(FundingError::InvalidGenesis(msg));

        let mut funders = BTreeSet::new();
        for funder in &self.funders {
            if !funders.insert(funder.address) {
                return invalid(format!("duplicate funder {}", address_hex(&funder.address)));
            }
        }

        let mut states: BTreeMap<PoolId, &FundingState> = BTreeMap::new();
        for state in &self.funding_states {
            if states.insert(state.pool_id, state).is_some() {
                return invalid(format!("duplicate funding state for pool {}", state.pool_id));
            }
            if state.len() > self.params.max_active_funders {
                return invalid(format!(
                    "pool {} has {} active funders, capacity {}",
                    state.pool_id,
                    state.len(),
                    self.params.max_active_funders
                ));
            }
        }

        let mut fundings: BTreeMap<(Address, PoolId), &Funding> = BTreeMap::new();
        for funding in &self.fundings {
            let key = (funding.funder, funding.pool_id);
            if fundings.insert(key, funding).is_some() {
                return invalid(format!(
                    "duplicate funding of {} for pool {}",
                    address_hex(&funding.funder),
                    funding.pool_id
                ));
            }
            if !funders.contains(&funding.funder) {
                return invalid(format!(
                    "funding references unknown funder {}",
                    address_hex(&funding.funder)
                ));
            }

            let state = match states.get(&funding.pool_id) {
                Some(state) => state,
                None => {
                    return invalid(format!(
                        "funding references pool {} without funding state",
                        funding.pool_id
                    ))
                }
            };
            if let Some(denom) = funding
                .balances
                .denoms()
                .find(|denom| !funding.per_bundle_rate.contains(denom))
            {
                return invalid(format!(
                    "funding of {} for pool {} holds {} without a rate",
                    address_hex(&funding.funder),
                    funding.pool_id,
                    denom
                ));
            }
            if let Some(denom) = funding
                .per_bundle_rate
                .denoms()
                .find(|denom| !funding.balances.contains(denom))
            {
                return invalid(format!(
                    "funding of {} for pool {} has a {} rate without balance",
                    address_hex(&funding.funder),
                    funding.pool_id,
                    denom
                ));
            }
            if funding.is_active() != state.contains(&funding.funder) {
                return invalid(format!(
                    "funding of {} for pool {} is {} but {} the active set",
                    address_hex(&funding.funder),
                    funding.pool_id,
                    if funding.is_active() { "active" } else { "inactive" },
                    if funding.is_active() { "missing from" } else { "listed in" }
                ));
            }
        }

        for state in &self.funding_states {
            for funder in state.iter() {
                if !fundings.contains_key(&(*funder, state.pool_id)) {
                    return invalid(format!(
                        "active funder {} of pool {} has no funding",
                        address_hex(funder),
                        state.pool_id
                    ));
                }
            }
        }
        Ok(())
    }
}
