//! # Admission Controller
//!
//! Decides whether a funding may occupy one of a pool's bounded slots.
//!
//! ```text
//! [EMPTY] ──admit──→ [ACCEPTING: size < cap] ──admit──→ [FULL: size = cap]
//!                              ↑                              │
//!                              └──────── remove ──────────────┘
//! ```
//!
//! When the pool is full, a newcomer is admitted only if its score is
//! strictly greater than the lowest-ranked active funding, which is evicted.
//! Equal scores never displace.

use crate::config::FundersParams;
use crate::domain::entities::{Funding, FundingState};
use crate::domain::errors::FundingError;
use crate::domain::ranking::{get_lowest_funding, RankedFunding};
use shared_types::{address_hex, Address};
use tracing::{debug, warn};

/// Outcome of a successful admission.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AdmissionOutcome {
    /// The funder already held a slot; nothing changed.
    AlreadyActive,
    /// A free slot was taken.
    Admitted,
    /// The lowest-ranked funder was removed to make room.
    AdmittedWithEviction { evicted: Address },
}

/// Bounded-set admission over a [`FundingState`].
pub struct AdmissionController<'a> {
    params: &'a FundersParams,
}

impl<'a> AdmissionController<'a> {
    pub fn new(params: &'a FundersParams) -> Self {
        Self { params }
    }

    pub fn capacity(&self) -> usize {
        self.params.max_active_funders
    }

    /// Admits `candidate` into `state`.
    ///
    /// `active` must hold the current fundings of every active funder. On
    /// error `state` is left untouched.
    pub fn admit(
        &self,
        state: &mut FundingState,
        candidate: &Funding,
        active: &[Funding],
    ) -> Result<AdmissionOutcome, FundingError> {
        if state.len() > self.capacity() {
            return Err(FundingError::invariant(format!(
                "pool {} has {} active funders, capacity {}",
                state.pool_id,
                state.len(),
                self.capacity()
            )));
        }

        if state.contains(&candidate.funder) {
            return Ok(AdmissionOutcome::AlreadyActive);
        }

        if state.len() < self.capacity() {
            state.set_active(candidate.funder);
            debug!(
                pool_id = state.pool_id,
                funder = %address_hex(&candidate.funder),
                size = state.len(),
                "Admitted into free slot"
            );
            return Ok(AdmissionOutcome::Admitted);
        }

        let offered = RankedFunding::new(candidate, self.params);
        let lowest = get_lowest_funding(active, self.params)?;
        if !state.contains(lowest.funder()) {
            return Err(FundingError::invariant(format!(
                "lowest funding {} is not in the active set of pool {}",
                address_hex(lowest.funder()),
                state.pool_id
            )));
        }

        if offered.score <= lowest.score {
            warn!(
                pool_id = state.pool_id,
                funder = %address_hex(&candidate.funder),
                offered = %offered.score,
                lowest = %lowest.score,
                "Funding does not outrank lowest active funder"
            );
            return Err(FundingError::InsufficientToDisplace {
                pool_id: state.pool_id,
                offered: offered.score,
                lowest: lowest.score,
                lowest_funder: *lowest.funder(),
            });
        }

        let evicted = *lowest.funder();
        state.set_inactive(&evicted);
        state.set_active(candidate.funder);
        debug!(
            pool_id = state.pool_id,
            funder = %address_hex(&candidate.funder),
            evicted = %address_hex(&evicted),
            "Admitted by displacing lowest funder"
        );
        Ok(AdmissionOutcome::AdmittedWithEviction { evicted })
    }

    /// Removes `funder` from the active set. Returns false if it was absent.
    pub fn remove(&self, state: &mut FundingState, funder: &Address) -> bool {
        state.set_inactive(funder)
    }
}
