//! Adapters layer for the Pool Funding subsystem.
//!
//! In-memory implementations of the outbound ports, plus event publishers.

pub mod bank;
pub mod pools;
pub mod publisher;
pub mod storage;

pub use bank::InMemoryBank;
pub use pools::InMemoryPoolRegistry;
pub use publisher::{
    topic_of, topics, FundingEventPublisher, NoOpPublisher, PublishError, RecordingPublisher,
    TracingPublisher,
};
pub use storage::InMemoryKVStore;
