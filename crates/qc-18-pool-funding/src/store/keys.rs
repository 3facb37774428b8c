//! Key layout of the funding tables.
//!
//! | Table | Key | Value |
//! |-------|-----|-------|
//! | Funder | `funder/{address}` | `Funder` |
//! | Funding | `funding/by_funder/{address}{pool_be}` | `Funding` |
//! | Funding index | `funding/by_pool/{pool_be}{address}` | empty |
//! | FundingState | `funding_state/{pool_be}` | `FundingState` |
//!
//! Pool ids are big-endian so key order equals numeric order.

use shared_types::{Address, PoolId};

const ADDRESS_LEN: usize = 20;
const POOL_LEN: usize = 8;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyPrefix {
    Funder,
    FundingByFunder,
    FundingByPool,
    FundingState,
}

impl KeyPrefix {
    /// Get the byte prefix for this key type.
    pub fn as_bytes(&self) -> &'static [u8] {
        match self {
            KeyPrefix::Funder => b"funder/",
            KeyPrefix::FundingByFunder => b"funding/by_funder/",
            KeyPrefix::FundingByPool => b"funding/by_pool/",
            KeyPrefix::FundingState => b"funding_state/",
        }
    }

    /// Build a full key with the given suffix.
    pub fn key(&self, suffix: &[u8]) -> Vec<u8> {
        let mut key = self.as_bytes().to_vec();
        key.extend_from_slice(suffix);
        key
    }

    pub fn funder_key(address: &Address) -> Vec<u8> {
        KeyPrefix::Funder.key(address)
    }

    pub fn funding_key(funder: &Address, pool_id: PoolId) -> Vec<u8> {
        let mut key = KeyPrefix::FundingByFunder.key(funder);
        key.extend_from_slice(&pool_id.to_be_bytes());
        key
    }

    pub fn funding_pool_index_key(pool_id: PoolId, funder: &Address) -> Vec<u8> {
        let mut key = KeyPrefix::FundingByPool.key(&pool_id.to_be_bytes());
        key.extend_from_slice(funder);
        key
    }

    pub fn funding_state_key(pool_id: PoolId) -> Vec<u8> {
        KeyPrefix::FundingState.key(&pool_id.to_be_bytes())
    }

    /// Prefix of every funding of `funder`.
    pub fn fundings_of_funder(funder: &Address) -> Vec<u8> {
        KeyPrefix::FundingByFunder.key(funder)
    }

    /// Prefix of every index entry of `pool_id`.
    pub fn fundings_of_pool(pool_id: PoolId) -> Vec<u8> {
        KeyPrefix::FundingByPool.key(&pool_id.to_be_bytes())
    }

    /// Recovers the funder address from a `funding/by_pool/` key.
    pub fn funder_from_pool_index_key(key: &[u8]) -> Option<Address> {
        let offset = KeyPrefix::FundingByPool.as_bytes().len() + POOL_LEN;
        if key.len() != offset + ADDRESS_LEN {
            return None;
        }
        key[offset..].try_into().ok()
    }
}
