//! # Pool Funding Service
//!
//! The main service implementing `PoolFundingApi` and `FundingQueryApi`.
//!
//! ## Architecture
//!
//! This service:
//! 1. Loads records through the `FundingStore` repository
//! 2. Runs the pure domain transitions (ledger, admission, charge engine)
//! 3. Moves coins through the `BankKeeper` port, journaling every transfer
//! 4. Commits all records with one atomic batch, unwinding the journal on failure
//! 5. Publishes events only after the commit

mod actions;
mod queries;

use crate::adapters::publisher::FundingEventPublisher;
use crate::config::FundingConfig;
use crate::domain::errors::FundingError;
use crate::domain::events::FundingEvent;
use crate::genesis::GenesisState;
use crate::ports::outbound::{BankKeeper, KeyValueStore, PoolRegistry};
use crate::store::{FundingStore, WriteBatch};
use shared_types::{address_hex, Address, Coins};
use tracing::{error, info, warn};

/// One executed escrow transfer, kept so it can be reversed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Transfer {
    Deposit { from: Address, amount: Coins },
    Refund { to: Address, amount: Coins },
}

/// The Pool Funding Service.
///
/// Operations take `&mut self` and run strictly one after another.
pub struct FundingService<KV, B, P, E>
where
    KV: KeyValueStore,
    B: BankKeeper,
    P: PoolRegistry,
    E: FundingEventPublisher,
{
    /// Immutable configuration.
    pub(crate) config: FundingConfig,
    /// Funder, Funding and FundingState tables.
    pub(crate) store: FundingStore<KV>,
    /// Escrow transfers.
    pub(crate) bank: B,
    /// Pool lifecycle (existence and status).
    pub(crate) pools: P,
    /// Event sink.
    pub(crate) events: E,
}

impl<KV, B, P, E> FundingService<KV, B, P, E>
where
    KV: KeyValueStore,
    B: BankKeeper,
    P: PoolRegistry,
    E: FundingEventPublisher,
{
    /// Creates a service over existing storage.
    pub fn new(
        config: FundingConfig,
        kv_store: KV,
        bank: B,
        pools: P,
        events: E,
    ) -> Result<Self, FundingError> {
        config.params.validate()?;
        info!(
            native_denom = %config.params.native_denom,
            whitelist = config.params.coin_whitelist.len(),
            min_funding_multiple = config.params.min_funding_multiple,
            max_active_funders = config.params.max_active_funders,
            "Pool funding service initialized"
        );
        Ok(Self {
            config,
            store: FundingStore::new(kv_store),
            bank,
            pools,
            events,
        })
    }

    /// Creates a service and imports `genesis` in one batch.
    pub fn from_genesis(
        genesis: GenesisState,
        kv_store: KV,
        bank: B,
        pools: P,
        events: E,
    ) -> Result<Self, FundingError> {
        genesis.validate()?;
        let mut service = Self::new(
            FundingConfig::new(genesis.params.clone()),
            kv_store,
            bank,
            pools,
            events,
        )?;

        let mut batch = WriteBatch::new();
        for funder in &genesis.funders {
            batch.put_funder(funder)?;
        }
        for funding in &genesis.fundings {
            batch.put_funding(funding)?;
        }
        for state in &genesis.funding_states {
            batch.put_funding_state(state)?;
        }
        service.store.commit(batch)?;

        info!(
            funders = genesis.funders.len(),
            fundings = genesis.fundings.len(),
            funding_states = genesis.funding_states.len(),
            "Imported funding genesis"
        );
        Ok(service)
    }

    /// Exports every table, in key order.
    pub fn export_genesis(&self) -> Result<GenesisState, FundingError> {
        Ok(GenesisState {
            params: self.config.params.clone(),
            funders: self.store.all_funders()?,
            fundings: self.store.all_fundings()?,
            funding_states: self.store.all_funding_states()?,
        })
    }

    pub fn config(&self) -> &FundingConfig {
        &self.config
    }

    pub fn store(&self) -> &FundingStore<KV> {
        &self.store
    }

    pub fn bank(&self) -> &B {
        &self.bank
    }

    pub fn bank_mut(&mut self) -> &mut B {
        &mut self.bank
    }

    pub fn pools_mut(&mut self) -> &mut P {
        &mut self.pools
    }

    pub fn events(&self) -> &E {
        &self.events
    }

    // -------------------------------------------------------------------------
    // Transfer journal
    // -------------------------------------------------------------------------

    /// Executes `transfer` and records it in `journal`.
    pub(crate) fn execute(
        &mut self,
        journal: &mut Vec<Transfer>,
        transfer: Transfer,
    ) -> Result<(), FundingError> {
        match &transfer {
            Transfer::Deposit { amount, .. } | Transfer::Refund { amount, .. }
                if amount.is_zero() =>
            {
                return Ok(())
            }
            Transfer::Deposit { from, amount } => self.bank.deposit_to_escrow(from, amount)?,
            Transfer::Refund { to, amount } => self.bank.refund_from_escrow(to, amount)?,
        }
        journal.push(transfer);
        Ok(())
    }

    /// Reverses every journaled transfer, newest first.
    pub(crate) fn unwind(&mut self, journal: Vec<Transfer>) -> Result<(), FundingError> {
        for transfer in journal.into_iter().rev() {
            let reversed = match &transfer {
                Transfer::Deposit { from, amount } => self.bank.refund_from_escrow(from, amount),
                Transfer::Refund { to, amount } => self.bank.deposit_to_escrow(to, amount),
            };
            if let Err(e) = reversed {
                error!(error = %e, transfer = ?transfer, "Failed to reverse escrow transfer");
                return Err(FundingError::invariant(format!(
                    "escrow transfer could not be reversed: {}",
                    e
                )));
            }
        }
        Ok(())
    }

    /// Commits `batch`; on failure unwinds `journal` and reports the cause.
    pub(crate) fn commit(
        &mut self,
        batch: WriteBatch,
        journal: Vec<Transfer>,
    ) -> Result<(), FundingError> {
        if let Err(e) = self.store.commit(batch) {
            error!(error = %e, transfers = journal.len(), "Commit failed, reversing transfers");
            self.unwind(journal)?;
            return Err(e);
        }
        Ok(())
    }

    pub(crate) fn emit(&self, event: FundingEvent) {
        if let Err(e) = self.events.publish(event) {
            warn!(error = %e, "Failed to publish funding event");
        }
    }

    pub(crate) fn ensure_funder_exists(&self, address: &Address) -> Result<(), FundingError> {
        if !self.store.funder_exists(address)? {
            warn!(funder = %address_hex(address), "Funder does not exist");
            return Err(FundingError::FunderNotFound { address: *address });
        }
        Ok(())
    }
}
