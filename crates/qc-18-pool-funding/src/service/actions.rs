//! # Pool Funding Service - Actions
//!
//! `PoolFundingApi` implementation. Each action computes every new record
//! first, then transfers, then commits once.

use super::*;
use crate::domain::admission::{AdmissionController, AdmissionOutcome};
use crate::domain::charge::{self, ChargeResult};
use crate::domain::entities::{Funder, FunderMetadata, Funding, FundingState};
use crate::domain::ledger;
use crate::ports::inbound::{FundOutcome, PoolFundingApi};
use crate::ports::outbound::PoolStatus;
use shared_types::PoolId;
use tracing::debug;

impl<KV, B, P, E> FundingService<KV, B, P, E>
where
    KV: KeyValueStore,
    B: BankKeeper,
    P: PoolRegistry,
    E: FundingEventPublisher,
{
    fn load_funding_state(&self, pool_id: PoolId) -> Result<FundingState, FundingError> {
        self.store
            .get_funding_state(pool_id)?
            .ok_or(FundingError::FundingStateNotFound { pool_id })
    }

    fn validate_metadata(metadata: &FunderMetadata) -> Result<(), FundingError> {
        if metadata.moniker.trim().is_empty() {
            return Err(FundingError::EmptyMoniker);
        }
        Ok(())
    }
}

impl<KV, B, P, E> PoolFundingApi for FundingService<KV, B, P, E>
where
    KV: KeyValueStore,
    B: BankKeeper,
    P: PoolRegistry,
    E: FundingEventPublisher,
{
    fn create_funding_state(&mut self, pool_id: PoolId) -> Result<(), FundingError> {
        if self.store.get_funding_state(pool_id)?.is_some() {
            debug!(pool_id, "Funding state already exists");
            return Ok(());
        }

        let mut batch = WriteBatch::new();
        batch.put_funding_state(&FundingState::new(pool_id))?;
        self.store.commit(batch)?;

        info!(pool_id, "Created funding state");
        Ok(())
    }

    fn register_funder(
        &mut self,
        address: Address,
        metadata: FunderMetadata,
    ) -> Result<Funder, FundingError> {
        Self::validate_metadata(&metadata)?;
        if self.store.funder_exists(&address)? {
            return Err(FundingError::FunderAlreadyExists { address });
        }

        let funder = Funder::new(address, metadata);
        let mut batch = WriteBatch::new();
        batch.put_funder(&funder)?;
        self.store.commit(batch)?;

        info!(funder = %address_hex(&address), moniker = %funder.moniker, "Registered funder");
        self.emit(FundingEvent::FunderCreated {
            address,
            moniker: funder.moniker.clone(),
        });
        Ok(funder)
    }

    fn update_funder(
        &mut self,
        address: Address,
        metadata: FunderMetadata,
    ) -> Result<Funder, FundingError> {
        Self::validate_metadata(&metadata)?;
        let mut funder = self
            .store
            .get_funder(&address)?
            .ok_or(FundingError::FunderNotFound { address })?;

        funder.apply(metadata);
        let mut batch = WriteBatch::new();
        batch.put_funder(&funder)?;
        self.store.commit(batch)?;

        info!(funder = %address_hex(&address), moniker = %funder.moniker, "Updated funder");
        self.emit(FundingEvent::FunderUpdated {
            address,
            moniker: funder.moniker.clone(),
        });
        Ok(funder)
    }

    fn fund_pool(
        &mut self,
        funder: Address,
        pool_id: PoolId,
        deposit: Coins,
        per_bundle_rate: Coins,
    ) -> Result<FundOutcome, FundingError> {
        // 1. Referenced entities must exist
        self.ensure_funder_exists(&funder)?;
        if !self.pools.pool_exists(pool_id) {
            return Err(FundingError::PoolNotFound { pool_id });
        }
        let mut state = self.load_funding_state(pool_id)?;

        // 2. Merge into the funding and validate against params
        let existing = self.store.get_funding(&funder, pool_id)?;
        let funding = ledger::create_or_increase(
            existing,
            funder,
            pool_id,
            &deposit,
            &per_bundle_rate,
            &self.config.params,
        )?;

        // 3. Admission (may evict the lowest-ranked funding)
        let controller = AdmissionController::new(&self.config.params);
        let outcome = if state.contains(&funder) {
            AdmissionOutcome::AlreadyActive
        } else {
            let active = self.store.active_fundings(&state)?;
            let outcome = controller.admit(&mut state, &funding, &active)?;
            if let AdmissionOutcome::AdmittedWithEviction { evicted } = &outcome {
                let evicted_funding = active
                    .iter()
                    .find(|f| &f.funder == evicted)
                    .cloned()
                    .ok_or_else(|| {
                        FundingError::invariant("evicted funder missing from active fundings")
                    })?;
                return self.commit_fund_with_eviction(
                    funding,
                    state,
                    deposit,
                    per_bundle_rate,
                    evicted_funding,
                );
            }
            outcome
        };

        // 4. Transfer the deposit, then commit
        let mut journal = Vec::new();
        self.execute(
            &mut journal,
            Transfer::Deposit {
                from: funder,
                amount: deposit.clone(),
            },
        )?;

        let mut batch = WriteBatch::new();
        batch.put_funding(&funding)?;
        if outcome == AdmissionOutcome::Admitted {
            batch.put_funding_state(&state)?;
        }
        self.commit(batch, journal)?;

        info!(
            pool_id,
            funder = %address_hex(&funder),
            deposit = %deposit,
            balance = %funding.balances,
            per_bundle_rate = %funding.per_bundle_rate,
            active_funders = state.len(),
            "Pool funded"
        );
        self.emit(FundingEvent::FundPool {
            pool_id,
            funder,
            amounts: deposit,
            per_bundle_rate,
        });

        Ok(FundOutcome {
            funding,
            evicted: None,
        })
    }

    fn defund_pool(
        &mut self,
        funder: Address,
        pool_id: PoolId,
        amounts: Coins,
    ) -> Result<Coins, FundingError> {
        if amounts.is_zero() {
            return Err(FundingError::EmptyAmount);
        }
        let funding = self
            .store
            .get_funding(&funder, pool_id)?
            .ok_or(FundingError::FundingNotFound { funder, pool_id })?;
        let mut state = self.load_funding_state(pool_id)?;

        if !funding.is_active() {
            debug!(pool_id, funder = %address_hex(&funder), "Defund of inactive funding");
            return Ok(Coins::new());
        }

        let decrease = ledger::decrease(funding, &amounts, &self.config.params)?;
        if decrease.removed.is_zero() {
            debug!(pool_id, funder = %address_hex(&funder), "Nothing to defund in requested currencies");
            return Ok(Coins::new());
        }

        if decrease.drained {
            let controller = AdmissionController::new(&self.config.params);
            if !controller.remove(&mut state, &funder) {
                return Err(FundingError::invariant(format!(
                    "active funding of {} missing from active set of pool {}",
                    address_hex(&funder),
                    pool_id
                )));
            }
        }

        let mut journal = Vec::new();
        self.execute(
            &mut journal,
            Transfer::Refund {
                to: funder,
                amount: decrease.removed.clone(),
            },
        )?;

        let mut batch = WriteBatch::new();
        batch.put_funding(&decrease.funding)?;
        if decrease.drained {
            batch.put_funding_state(&state)?;
        }
        self.commit(batch, journal)?;

        info!(
            pool_id,
            funder = %address_hex(&funder),
            removed = %decrease.removed,
            remaining = %decrease.funding.balances,
            deactivated = decrease.drained,
            "Pool defunded"
        );
        self.emit(FundingEvent::DefundPool {
            pool_id,
            funder,
            amounts: decrease.removed.clone(),
        });
        Ok(decrease.removed)
    }

    fn charge_bundle(&mut self, pool_id: PoolId) -> Result<ChargeResult, FundingError> {
        match self.pools.pool_status(pool_id) {
            None => return Err(FundingError::PoolNotFound { pool_id }),
            Some(PoolStatus::Disabled) => {
                debug!(pool_id, "Pool disabled, not charging");
                return Ok(ChargeResult::empty(pool_id));
            }
            Some(PoolStatus::Active) => {}
        }
        let mut state = self.load_funding_state(pool_id)?;
        if state.is_empty() {
            return Ok(ChargeResult::empty(pool_id));
        }

        let active = self.store.active_fundings(&state)?;
        let outcome = charge::charge_bundle(&mut state, active).inspect_err(|e| {
            error!(pool_id, error = %e, "Charge aborted");
        })?;

        let mut batch = WriteBatch::new();
        for funding in &outcome.updated {
            batch.put_funding(funding)?;
        }
        if !outcome.result.exhausted.is_empty() {
            batch.put_funding_state(&state)?;
        }
        self.store.commit(batch)?;

        info!(
            pool_id,
            payout = %outcome.result.total_payout,
            charged = outcome.result.charged.len(),
            exhausted = outcome.result.exhausted.len(),
            active_funders = state.len(),
            "Charged bundle"
        );
        if outcome.emptied {
            warn!(pool_id, "Pool ran out of funds");
            self.emit(FundingEvent::PoolOutOfFunds { pool_id });
        }
        Ok(outcome.result)
    }
}

impl<KV, B, P, E> FundingService<KV, B, P, E>
where
    KV: KeyValueStore,
    B: BankKeeper,
    P: PoolRegistry,
    E: FundingEventPublisher,
{
    /// Deposit, refund the evicted funding in full, commit both records.
    fn commit_fund_with_eviction(
        &mut self,
        funding: Funding,
        state: FundingState,
        deposit: Coins,
        per_bundle_rate: Coins,
        mut evicted: Funding,
    ) -> Result<FundOutcome, FundingError> {
        let funder = funding.funder;
        let pool_id = funding.pool_id;
        let refund = evicted.drain();
        evicted.clean_rates();

        let mut journal = Vec::new();
        self.execute(
            &mut journal,
            Transfer::Deposit {
                from: funder,
                amount: deposit.clone(),
            },
        )?;
        if let Err(e) = self.execute(
            &mut journal,
            Transfer::Refund {
                to: evicted.funder,
                amount: refund.clone(),
            },
        ) {
            error!(
                pool_id,
                evicted = %address_hex(&evicted.funder),
                error = %e,
                "Escrow could not refund evicted funding"
            );
            self.unwind(journal)?;
            return Err(FundingError::invariant(format!(
                "escrow could not refund evicted funding of {}: {}",
                address_hex(&evicted.funder),
                e
            )));
        }

        let mut batch = WriteBatch::new();
        batch.put_funding(&funding)?;
        batch.put_funding(&evicted)?;
        batch.put_funding_state(&state)?;
        self.commit(batch, journal)?;

        info!(
            pool_id,
            funder = %address_hex(&funder),
            evicted = %address_hex(&evicted.funder),
            refunded = %refund,
            deposit = %deposit,
            "Pool funded with eviction"
        );
        self.emit(FundingEvent::FundingEvicted {
            pool_id,
            funder: evicted.funder,
            refunded: refund,
        });
        self.emit(FundingEvent::FundPool {
            pool_id,
            funder,
            amounts: deposit,
            per_bundle_rate,
        });

        Ok(FundOutcome {
            funding,
            evicted: Some(evicted.funder),
        })
    }
}
