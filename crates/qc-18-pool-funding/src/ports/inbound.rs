//! # Inbound Ports (Driving Ports)
//!
//! The API this subsystem exposes. Every mutating call is all-or-nothing:
//! on `Err` no ledger, admission or bank state has changed.

use crate::domain::charge::ChargeResult;
use crate::domain::entities::{Funder, FunderMetadata, Funding};
use crate::domain::errors::FundingError;
use crate::query::{FunderView, FundingStateView, FundingStatus, Page, PageRequest};
use shared_types::{Address, Coins, PoolId};

/// Result of a successful fund action.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FundOutcome {
    /// The funding after the deposit.
    pub funding: Funding,
    /// Funder displaced to make room, if any.
    pub evicted: Option<Address>,
}

/// Mutating actions.
pub trait PoolFundingApi {
    /// Creates the empty funding state of a newly created pool. Idempotent.
    fn create_funding_state(&mut self, pool_id: PoolId) -> Result<(), FundingError>;

    fn register_funder(
        &mut self,
        address: Address,
        metadata: FunderMetadata,
    ) -> Result<Funder, FundingError>;

    fn update_funder(
        &mut self,
        address: Address,
        metadata: FunderMetadata,
    ) -> Result<Funder, FundingError>;

    /// Deposits into a pool and/or updates the per-bundle rate.
    fn fund_pool(
        &mut self,
        funder: Address,
        pool_id: PoolId,
        deposit: Coins,
        per_bundle_rate: Coins,
    ) -> Result<FundOutcome, FundingError>;

    /// Withdraws up to `amounts`. Returns exactly what was removed.
    fn defund_pool(
        &mut self,
        funder: Address,
        pool_id: PoolId,
        amounts: Coins,
    ) -> Result<Coins, FundingError>;

    /// Charges one finalized bundle. Called by bundle finalization only.
    fn charge_bundle(&mut self, pool_id: PoolId) -> Result<ChargeResult, FundingError>;
}

/// Read-only queries.
pub trait FundingQueryApi {
    fn get_funder(&self, address: &Address) -> Result<FunderView, FundingError>;

    /// Funders whose moniker contains `search` (case-insensitive).
    fn list_funders(
        &self,
        search: Option<&str>,
        page: PageRequest,
    ) -> Result<Page<FunderView>, FundingError>;

    fn get_funding(&self, funder: &Address, pool_id: PoolId) -> Result<Funding, FundingError>;

    fn fundings_by_funder(
        &self,
        funder: &Address,
        status: FundingStatus,
        page: PageRequest,
    ) -> Result<Page<Funding>, FundingError>;

    fn fundings_by_pool(
        &self,
        pool_id: PoolId,
        status: FundingStatus,
        page: PageRequest,
    ) -> Result<Page<Funding>, FundingError>;

    fn funding_state(&self, pool_id: PoolId) -> Result<FundingStateView, FundingError>;

    /// The funding that would be evicted next, if the pool has any.
    fn lowest_funding(&self, pool_id: PoolId) -> Result<Option<Funding>, FundingError>;
}
