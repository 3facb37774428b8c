//! Typed repository over a [`KeyValueStore`].
//!
//! Reads decode straight from the store. Writes are staged in a
//! [`WriteBatch`] and land together through one `atomic_batch_write`.

use crate::domain::entities::{Funder, Funding, FundingState};
use crate::domain::errors::FundingError;
use crate::ports::outbound::{BatchOperation, KeyValueStore};
use crate::store::keys::KeyPrefix;
use serde::de::DeserializeOwned;
use serde::Serialize;
use shared_types::{address_hex, Address, PoolId};

fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, FundingError> {
    Ok(bincode::serialize(value)?)
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, FundingError> {
    Ok(bincode::deserialize(bytes)?)
}

/// Staged writes for one logical operation.
#[derive(Debug, Default, Clone)]
pub struct WriteBatch {
    operations: Vec<BatchOperation>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put_funder(&mut self, funder: &Funder) -> Result<(), FundingError> {
        self.operations.push(BatchOperation::put(
            KeyPrefix::funder_key(&funder.address),
            encode(funder)?,
        ));
        Ok(())
    }

    /// Stages the funding record and its pool index entry.
    pub fn put_funding(&mut self, funding: &Funding) -> Result<(), FundingError> {
        self.operations.push(BatchOperation::put(
            KeyPrefix::funding_key(&funding.funder, funding.pool_id),
            encode(funding)?,
        ));
        self.operations.push(BatchOperation::put(
            KeyPrefix::funding_pool_index_key(funding.pool_id, &funding.funder),
            Vec::new(),
        ));
        Ok(())
    }

    pub fn put_funding_state(&mut self, state: &FundingState) -> Result<(), FundingError> {
        self.operations.push(BatchOperation::put(
            KeyPrefix::funding_state_key(state.pool_id),
            encode(state)?,
        ));
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

/// Funder, Funding and FundingState tables.
#[derive(Debug, Default, Clone)]
pub struct FundingStore<KV: KeyValueStore> {
    kv: KV,
}

impl<KV: KeyValueStore> FundingStore<KV> {
    pub fn new(kv: KV) -> Self {
        Self { kv }
    }

    pub fn kv(&self) -> &KV {
        &self.kv
    }

    pub fn kv_mut(&mut self) -> &mut KV {
        &mut self.kv
    }

    pub fn into_inner(self) -> KV {
        self.kv
    }

    /// Writes every staged operation atomically.
    pub fn commit(&mut self, batch: WriteBatch) -> Result<(), FundingError> {
        if batch.is_empty() {
            return Ok(());
        }
        self.kv.atomic_batch_write(batch.operations)?;
        Ok(())
    }

    fn get_decoded<T: DeserializeOwned>(&self, key: &[u8]) -> Result<Option<T>, FundingError> {
        self.kv
            .get(key)?
            .map(|bytes| decode(&bytes))
            .transpose()
    }

    fn scan_decoded<T: DeserializeOwned>(&self, prefix: &[u8]) -> Result<Vec<T>, FundingError> {
        self.kv
            .prefix_scan(prefix)?
            .iter()
            .map(|(_, value)| decode(value))
            .collect()
    }

    // -------------------------------------------------------------------------
    // Funders
    // -------------------------------------------------------------------------

    pub fn get_funder(&self, address: &Address) -> Result<Option<Funder>, FundingError> {
        self.get_decoded(&KeyPrefix::funder_key(address))
    }

    pub fn funder_exists(&self, address: &Address) -> Result<bool, FundingError> {
        Ok(self.kv.exists(&KeyPrefix::funder_key(address))?)
    }

    /// All funders, ascending by address.
    pub fn all_funders(&self) -> Result<Vec<Funder>, FundingError> {
        self.scan_decoded(KeyPrefix::Funder.as_bytes())
    }

    // -------------------------------------------------------------------------
    // Fundings
    // -------------------------------------------------------------------------

    pub fn get_funding(
        &self,
        funder: &Address,
        pool_id: PoolId,
    ) -> Result<Option<Funding>, FundingError> {
        self.get_decoded(&KeyPrefix::funding_key(funder, pool_id))
    }

    /// Fundings of `funder`, ascending by pool id.
    pub fn fundings_by_funder(&self, funder: &Address) -> Result<Vec<Funding>, FundingError> {
        self.scan_decoded(&KeyPrefix::fundings_of_funder(funder))
    }

    /// Fundings of `pool_id`, ascending by funder address.
    pub fn fundings_by_pool(&self, pool_id: PoolId) -> Result<Vec<Funding>, FundingError> {
        let index = self.kv.prefix_scan(&KeyPrefix::fundings_of_pool(pool_id))?;
        let mut fundings = Vec::with_capacity(index.len());
        for (key, _) in index {
            let funder = KeyPrefix::funder_from_pool_index_key(&key).ok_or_else(|| {
                FundingError::invariant(format!("malformed pool index key for pool {}", pool_id))
            })?;
            let funding = self.get_funding(&funder, pool_id)?.ok_or_else(|| {
                FundingError::invariant(format!(
                    "pool index of pool {} points to missing funding of {}",
                    pool_id,
                    address_hex(&funder)
                ))
            })?;
            fundings.push(funding);
        }
        Ok(fundings)
    }

    /// All fundings, ascending by (funder, pool).
    pub fn all_fundings(&self) -> Result<Vec<Funding>, FundingError> {
        self.scan_decoded(KeyPrefix::FundingByFunder.as_bytes())
    }

    // -------------------------------------------------------------------------
    // Funding states
    // -------------------------------------------------------------------------

    pub fn get_funding_state(&self, pool_id: PoolId) -> Result<Option<FundingState>, FundingError> {
        self.get_decoded(&KeyPrefix::funding_state_key(pool_id))
    }

    /// All funding states, ascending by pool id.
    pub fn all_funding_states(&self) -> Result<Vec<FundingState>, FundingError> {
        self.scan_decoded(KeyPrefix::FundingState.as_bytes())
    }

    /// Loads the funding of every active funder of `state`, in address order.
    pub fn active_fundings(&self, state: &FundingState) -> Result<Vec<Funding>, FundingError> {
        state
            .iter()
            .map(|funder| {
                self.get_funding(funder, state.pool_id)?.ok_or_else(|| {
                    FundingError::invariant(format!(
                        "active funder {} of pool {} has no funding",
                        address_hex(funder),
                        state.pool_id
                    ))
                })
            })
            .collect()
    }
}
