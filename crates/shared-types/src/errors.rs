//! # Error Types
//!
//! Errors raised by shared amount arithmetic.

use thiserror::Error;

/// Errors from `Coins` arithmetic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoinsError {
    /// A component would exceed `U256::MAX`.
    #[error("Amount overflow for {denom}")]
    Overflow { denom: String },

    /// A component would become negative.
    #[error("Amount underflow for {denom}: {available} available, {requested} requested")]
    Underflow {
        denom: String,
        available: String,
        requested: String,
    },
}
