//! # Outbound Ports (Driven Ports)
//!
//! Dependencies required by the Pool Funding service. The host application
//! provides real implementations; `adapters/` carries in-memory ones.

use crate::domain::errors::{BankError, KVStoreError};
use shared_types::{Address, Coins, PoolId};

/// Result of a prefix scan: `(key, value)` pairs in ascending key order.
pub type ScanResult = Vec<(Vec<u8>, Vec<u8>)>;

/// Abstract interface for key-value database operations.
pub trait KeyValueStore: Send + Sync {
    /// Get a value by key.
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KVStoreError>;

    /// Put a single key-value pair.
    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<(), KVStoreError>;

    /// Execute an atomic batch write.
    ///
    /// Either ALL operations in the batch succeed, or NONE are applied.
    fn atomic_batch_write(&mut self, operations: Vec<BatchOperation>) -> Result<(), KVStoreError>;

    /// Check if a key exists.
    fn exists(&self, key: &[u8]) -> Result<bool, KVStoreError>;

    /// Iterate over keys with a prefix, in ascending key order.
    fn prefix_scan(&self, prefix: &[u8]) -> Result<ScanResult, KVStoreError>;
}

/// Batch operation for atomic writes.
///
/// Funding records are never removed, so a batch only carries puts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOperation {
    /// Put a key-value pair.
    Put { key: Vec<u8>, value: Vec<u8> },
}

impl BatchOperation {
    /// Create a Put operation.
    pub fn put(key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Self {
        BatchOperation::Put {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Trusted ledger primitive that moves coins between accounts and the
/// funding escrow.
pub trait BankKeeper: Send + Sync {
    /// Moves `amount` from `from` into escrow.
    fn deposit_to_escrow(&mut self, from: &Address, amount: &Coins) -> Result<(), BankError>;

    /// Moves `amount` from escrow back to `to`.
    fn refund_from_escrow(&mut self, to: &Address, amount: &Coins) -> Result<(), BankError>;
}

/// Lifecycle status of a pool, as reported by the pool subsystem.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PoolStatus {
    Active,
    /// Pool exists but produces no bundles; it is never charged.
    Disabled,
}

/// Read-only view of the pool lifecycle.
pub trait PoolRegistry: Send + Sync {
    /// Status of `pool_id`, or `None` if the pool does not exist.
    fn pool_status(&self, pool_id: PoolId) -> Option<PoolStatus>;

    fn pool_exists(&self, pool_id: PoolId) -> bool {
        self.pool_status(pool_id).is_some()
    }
}
