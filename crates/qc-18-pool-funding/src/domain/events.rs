//! Domain events emitted by the Pool Funding subsystem.

use serde::{Deserialize, Serialize};
use shared_types::{Address, Coins, PoolId};

/// Events published after a state change is committed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FundingEvent {
    FunderCreated {
        address: Address,
        moniker: String,
    },
    FunderUpdated {
        address: Address,
        moniker: String,
    },
    FundPool {
        pool_id: PoolId,
        funder: Address,
        amounts: Coins,
        per_bundle_rate: Coins,
    },
    DefundPool {
        pool_id: PoolId,
        funder: Address,
        amounts: Coins,
    },
    /// A funder lost its slot to a higher-ranked funding and was refunded.
    FundingEvicted {
        pool_id: PoolId,
        funder: Address,
        refunded: Coins,
    },
    /// The last active funding of a pool was exhausted by a charge.
    PoolOutOfFunds {
        pool_id: PoolId,
    },
}

impl FundingEvent {
    /// Pool the event concerns, if any.
    pub fn pool_id(&self) -> Option<PoolId> {
        match self {
            Self::FunderCreated { .. } | Self::FunderUpdated { .. } => None,
            Self::FundPool { pool_id, .. }
            | Self::DefundPool { pool_id, .. }
            | Self::FundingEvicted { pool_id, .. }
            | Self::PoolOutOfFunds { pool_id } => Some(*pool_id),
        }
    }
}
