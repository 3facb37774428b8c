//! Fixtures shared by unit tests and the `qc-tests` crate.

use crate::adapters::{InMemoryBank, InMemoryKVStore, InMemoryPoolRegistry, RecordingPublisher};
use crate::config::FundingConfig;
use crate::domain::entities::FunderMetadata;
use crate::domain::errors::{FundingError, KVStoreError};
use crate::ports::inbound::PoolFundingApi;
use crate::ports::outbound::{BatchOperation, KeyValueStore, ScanResult};
use crate::service::FundingService;
use shared_types::{address_hex, Address, Coins, PoolId, NATIVE_DENOM};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Service wired to in-memory adapters.
pub type TestService =
    FundingService<InMemoryKVStore, InMemoryBank, InMemoryPoolRegistry, RecordingPublisher>;

/// Address whose last byte is `n`; ordering follows `n`.
pub fn addr(n: u8) -> Address {
    let mut address = [0u8; 20];
    address[19] = n;
    address
}

/// Address derived from a wider index, for sets larger than 256.
pub fn addr_u32(n: u32) -> Address {
    let mut address = [0u8; 20];
    address[16..].copy_from_slice(&n.to_be_bytes());
    address
}

/// `amount` of the native denom.
pub fn native(amount: u64) -> Coins {
    Coins::single(NATIVE_DENOM, amount)
}

/// Service with the permissive test config and the given pools.
pub fn test_service(pools: impl IntoIterator<Item = PoolId>) -> TestService {
    test_service_with(FundingConfig::for_testing(), pools)
}

/// Service with `config`; every pool gets a funding state.
pub fn test_service_with(
    config: FundingConfig,
    pools: impl IntoIterator<Item = PoolId>,
) -> TestService {
    let pools: Vec<PoolId> = pools.into_iter().collect();
    let mut service = FundingService::new(
        config,
        InMemoryKVStore::new(),
        InMemoryBank::new(),
        InMemoryPoolRegistry::with_pools(pools.iter().copied()),
        RecordingPublisher::new(),
    )
    .expect("test config is valid");
    for pool_id in pools {
        service
            .create_funding_state(pool_id)
            .expect("in-memory store accepts writes");
    }
    service
}

/// Registers `address` and mints it `balance` of the native denom.
pub fn register_funded<KVS>(
    service: &mut FundingService<KVS, InMemoryBank, InMemoryPoolRegistry, RecordingPublisher>,
    address: Address,
    balance: u64,
) -> Result<(), FundingError>
where
    KVS: KeyValueStore,
{
    service.register_funder(
        address,
        FunderMetadata::with_moniker(format!("funder-{}", &address_hex(&address)[32..])),
    )?;
    service.bank_mut().mint(address, &native(balance));
    Ok(())
}

/// Key-value store that can be told to reject batch writes.
///
/// Clones of the switch returned by [`FailingKVStore::failure_switch`] stay
/// connected after the store is moved into a service.
#[derive(Debug, Default, Clone)]
pub struct FailingKVStore {
    inner: InMemoryKVStore,
    fail_batches: Arc<AtomicBool>,
}

impl FailingKVStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failure_switch(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.fail_batches)
    }
}

impl KeyValueStore for FailingKVStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KVStoreError> {
        self.inner.get(key)
    }

    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<(), KVStoreError> {
        self.inner.put(key, value)
    }

    fn atomic_batch_write(&mut self, operations: Vec<BatchOperation>) -> Result<(), KVStoreError> {
        if self.fail_batches.load(Ordering::SeqCst) {
            return Err(KVStoreError::IOError {
                message: "injected batch failure".to_string(),
            });
        }
        self.inner.atomic_batch_write(operations)
    }

    fn exists(&self, key: &[u8]) -> Result<bool, KVStoreError> {
        self.inner.exists(key)
    }

    fn prefix_scan(&self, prefix: &[u8]) -> Result<ScanResult, KVStoreError> {
        self.inner.prefix_scan(prefix)
    }
}
