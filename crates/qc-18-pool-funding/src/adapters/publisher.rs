//! Event publisher adapters for the Pool Funding subsystem.

use crate::domain::events::FundingEvent;
use shared_types::address_hex;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tracing::info;

/// Topics for funding events.
pub mod topics {
    pub const FUNDER: &str = "funders.funder";
    pub const FUNDING: &str = "funders.funding";
    pub const POOL_OUT_OF_FUNDS: &str = "funders.pool_out_of_funds";
}

/// Topic an event is published on.
pub fn topic_of(event: &FundingEvent) -> &'static str {
    match event {
        FundingEvent::FunderCreated { .. } | FundingEvent::FunderUpdated { .. } => topics::FUNDER,
        FundingEvent::FundPool { .. }
        | FundingEvent::DefundPool { .. }
        | FundingEvent::FundingEvicted { .. } => topics::FUNDING,
        FundingEvent::PoolOutOfFunds { .. } => topics::POOL_OUT_OF_FUNDS,
    }
}

/// Error type for publish operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PublishError {
    #[error("Event bus not connected")]
    NotConnected,
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Event publisher trait.
///
/// Events are published only after the state change is committed.
pub trait FundingEventPublisher: Send + Sync {
    fn publish(&self, event: FundingEvent) -> Result<(), PublishError>;
}

/// No-op publisher for hosts without an event bus.
#[derive(Debug, Clone, Default)]
pub struct NoOpPublisher;

impl FundingEventPublisher for NoOpPublisher {
    fn publish(&self, _event: FundingEvent) -> Result<(), PublishError> {
        Ok(())
    }
}

/// Publisher that keeps every event. Clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct RecordingPublisher {
    events: Arc<Mutex<Vec<FundingEvent>>>,
}

impl RecordingPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events published so far.
    pub fn events(&self) -> Vec<FundingEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    /// Removes and returns the recorded events.
    pub fn take(&self) -> Vec<FundingEvent> {
        self.events
            .lock()
            .map(|mut events| std::mem::take(&mut *events))
            .unwrap_or_default()
    }
}

impl FundingEventPublisher for RecordingPublisher {
    fn publish(&self, event: FundingEvent) -> Result<(), PublishError> {
        self.events
            .lock()
            .map_err(|e| PublishError::Internal(e.to_string()))?
            .push(event);
        Ok(())
    }
}

/// Publisher that writes each event to the tracing log.
#[derive(Debug, Clone, Default)]
pub struct TracingPublisher;

impl FundingEventPublisher for TracingPublisher {
    fn publish(&self, event: FundingEvent) -> Result<(), PublishError> {
        let topic = topic_of(&event);
        match &event {
            FundingEvent::FunderCreated { address, moniker }
            | FundingEvent::FunderUpdated { address, moniker } => {
                info!(topic, funder = %address_hex(address), moniker = %moniker, "Funder event");
            }
            FundingEvent::FundPool {
                pool_id,
                funder,
                amounts,
                per_bundle_rate,
            } => {
                info!(topic, pool_id, funder = %address_hex(funder), amounts = %amounts,
                    per_bundle_rate = %per_bundle_rate, "Pool funded");
            }
            FundingEvent::DefundPool {
                pool_id,
                funder,
                amounts,
            } => {
                info!(topic, pool_id, funder = %address_hex(funder), amounts = %amounts, "Pool defunded");
            }
            FundingEvent::FundingEvicted {
                pool_id,
                funder,
                refunded,
            } => {
                info!(topic, pool_id, funder = %address_hex(funder), refunded = %refunded, "Funding evicted");
            }
            FundingEvent::PoolOutOfFunds { pool_id } => {
                info!(topic, pool_id, "Pool out of funds");
            }
        }
        Ok(())
    }
}
