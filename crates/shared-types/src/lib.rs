//! # Shared Types Crate
//!
//! Primitive types exchanged between the pool funding subsystem and its
//! collaborators (bundle finalization, pool lifecycle, bank).
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: identities, pool ids and amounts are defined
//!   once here and re-used by every subsystem.
//! - **Deterministic Ordering**: multi-currency amounts are sorted association
//!   maps, never hash maps, so every node iterates them identically.
//! - **No Floating Point**: all amounts are `U256` base units.

pub mod coins;
pub mod entities;
pub mod errors;

pub use coins::Coins;
pub use entities::*;
pub use errors::*;
