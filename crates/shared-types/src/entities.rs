//! # Core Primitive Entities
//!
//! Identity and amount primitives used across subsystems.

// Re-export wide integers from primitive-types for use across all subsystems
pub use primitive_types::{U256, U512};

/// A 20-byte account address.
///
/// Byte-wise ordering of addresses is the canonical ordering used for
/// deterministic iteration and tie-breaks.
pub type Address = [u8; 20];

/// Identifier of a data pool.
pub type PoolId = u64;

/// Currency symbol (e.g. `"uqc"`).
pub type Denom = String;

/// Native currency of the chain.
pub const NATIVE_DENOM: &str = "uqc";

/// Renders an address as lowercase hex for logs and queries.
pub fn address_hex(address: &Address) -> String {
    hex::encode(address)
}
