//! # Domain Errors
//!
//! Error types for the Pool Funding subsystem.
//!
//! Every `FundingError` belongs to one [`ErrorKind`]. Callers branch on the
//! kind: `Capacity` means "offer more", `Invariant` means the ledger is
//! corrupt and the enclosing block must halt.

use crate::config::ConfigError;
use crate::domain::value_objects::Score;
use primitive_types::U256;
use shared_types::{address_hex, Address, CoinsError, Denom, PoolId};
use thiserror::Error;

/// Classification of a [`FundingError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Referenced funder, pool, funding or funding state does not exist.
    NotFound,
    /// Request rejected by a parameter or input check.
    Validation,
    /// All slots taken and the request does not outrank the lowest funding.
    Capacity,
    /// Ledger corruption. Fatal.
    Invariant,
    /// Storage, encoding, bank or configuration failure.
    Infrastructure,
}

/// Errors that can occur during funding operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FundingError {
    #[error("Funder {} already exists", address_hex(.address))]
    FunderAlreadyExists { address: Address },

    #[error("Funder {} does not exist", address_hex(.address))]
    FunderNotFound { address: Address },

    #[error("Pool {pool_id} does not exist")]
    PoolNotFound { pool_id: PoolId },

    #[error("Funding of {} for pool {pool_id} does not exist", address_hex(.funder))]
    FundingNotFound { funder: Address, pool_id: PoolId },

    #[error("Funding state for pool {pool_id} does not exist")]
    FundingStateNotFound { pool_id: PoolId },

    #[error("Fund request has neither a deposit nor a rate")]
    EmptyFundRequest,

    #[error("Amount must not be empty")]
    EmptyAmount,

    #[error("Moniker must not be empty")]
    EmptyMoniker,

    #[error("Coin {denom} is not whitelisted")]
    CoinNotWhitelisted { denom: Denom },

    #[error("Funding balance {amount}{denom} is below the minimum of {minimum}{denom}")]
    InvalidDeposit {
        denom: Denom,
        amount: U256,
        minimum: U256,
    },

    #[error("Invalid per-bundle rate for {denom}: {reason}")]
    InvalidRate { denom: Denom, reason: String },

    #[error(
        "Balance {balance}{denom} covers fewer than {multiple} bundles at {rate}{denom} per bundle"
    )]
    RatioTooLow {
        denom: Denom,
        balance: U256,
        rate: U256,
        multiple: u64,
    },

    #[error("Invalid genesis: {0}")]
    InvalidGenesis(String),

    #[error(
        "Pool {pool_id} is full: score {offered} does not exceed lowest score {lowest} of {}",
        address_hex(.lowest_funder)
    )]
    InsufficientToDisplace {
        pool_id: PoolId,
        offered: Score,
        lowest: Score,
        lowest_funder: Address,
    },

    #[error("No active fundings to rank")]
    NoCandidates,

    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    #[error("Storage error: {0}")]
    Storage(#[from] KVStoreError),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Bank error: {0}")]
    Bank(#[from] BankError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

impl FundingError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::FunderNotFound { .. }
            | Self::PoolNotFound { .. }
            | Self::FundingNotFound { .. }
            | Self::FundingStateNotFound { .. } => ErrorKind::NotFound,
            Self::FunderAlreadyExists { .. }
            | Self::EmptyFundRequest
            | Self::EmptyAmount
            | Self::EmptyMoniker
            | Self::CoinNotWhitelisted { .. }
            | Self::InvalidDeposit { .. }
            | Self::InvalidRate { .. }
            | Self::RatioTooLow { .. }
            | Self::InvalidGenesis(_) => ErrorKind::Validation,
            Self::InsufficientToDisplace { .. } => ErrorKind::Capacity,
            Self::NoCandidates | Self::InvariantViolation(_) => ErrorKind::Invariant,
            Self::Storage(_) | Self::Serialization(_) | Self::Bank(_) | Self::Config(_) => {
                ErrorKind::Infrastructure
            }
        }
    }

    /// True if processing of the enclosing block must halt.
    pub fn is_fatal(&self) -> bool {
        self.kind() == ErrorKind::Invariant
    }

    pub(crate) fn invariant(message: impl Into<String>) -> Self {
        Self::InvariantViolation(message.into())
    }
}

impl From<CoinsError> for FundingError {
    fn from(err: CoinsError) -> Self {
        Self::InvariantViolation(err.to_string())
    }
}

impl From<bincode::Error> for FundingError {
    fn from(err: bincode::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Key-value store errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KVStoreError {
    /// I/O error during read/write.
    #[error("KV store I/O error: {message}")]
    IOError { message: String },
    /// Data corruption in the store.
    #[error("KV store corruption: {message}")]
    CorruptionError { message: String },
}

/// Escrow transfer errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BankError {
    #[error("Account {} cannot cover {requested}", address_hex(.address))]
    InsufficientFunds { address: Address, requested: String },

    #[error("Escrow cannot cover {requested}")]
    EscrowUnderflow { requested: String },

    #[error("Transfer rejected: {0}")]
    Rejected(String),
}
