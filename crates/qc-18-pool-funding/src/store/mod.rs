//! Persistence of the funding tables over the `KeyValueStore` port.

pub mod keys;
pub mod repository;

pub use keys::KeyPrefix;
pub use repository::{FundingStore, WriteBatch};
