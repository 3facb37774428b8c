//! # Pool Funding Subsystem
//!
//! **Subsystem ID:** 18
//!
//! ## Purpose
//!
//! Lets funders pre-pay a data pool and debits them once per finalized
//! bundle. Slots are scarce: each pool admits a bounded number of active
//! funders, and a higher-value funding can always buy a slot by displacing
//! the lowest-ranked one, which is refunded in full.
//!
//! ## Domain Invariants
//!
//! | Invariant | Enforcement Location |
//! |-----------|---------------------|
//! | No balance is ever negative | `domain/entities.rs` - clamped subtraction and charge |
//! | At most `max_active_funders` (50) active funders per pool | `domain/admission.rs` - `admit()` |
//! | Active membership ⇔ positive balance | `service/actions.rs`, `domain/charge.rs` |
//! | `total_charged` never decreases | `domain/entities.rs` - `charge_one_bundle()` |
//! | Deterministic tie-break: smallest address ranks lowest | `domain/ranking.rs` - `RankedFunding` |
//! | Charge order is ascending address | `domain/charge.rs` - `charge_bundle()` |
//! | Every action is all-or-nothing | `service/mod.rs` - transfer journal + atomic batch |
//!
//! ## Admission
//!
//! ```text
//! [EMPTY] ──fund──→ [ACCEPTING: size < cap] ──fund──→ [FULL: size = cap]
//!                             ↑                              │
//!                             └─── defund / charge to zero ──┘
//!
//! FULL + fund(score > lowest)  → evict lowest (full refund), admit
//! FULL + fund(score <= lowest) → InsufficientToDisplace, nothing changes
//! ```
//!
//! ## Error Taxonomy
//!
//! | Kind | Examples | Caller reaction |
//! |------|----------|-----------------|
//! | NotFound | `FunderNotFound`, `PoolNotFound` | surface |
//! | Validation | `InvalidDeposit`, `InvalidRate`, `RatioTooLow` | surface |
//! | Capacity | `InsufficientToDisplace` | offer more |
//! | Invariant | `InvariantViolation` | halt the block |
//! | Infrastructure | `Storage`, `Bank` | surface |
//!
//! ## Module Structure (Hexagonal Architecture)
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      OUTER LAYER                                │
//! │  adapters/ - in-memory KV store, bank, pool registry, publishers│
//! │  store/    - key layout + bincode repository, atomic batches    │
//! └─────────────────────────────────────────────────────────────────┘
//!                          ↑ implements ↑
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      MIDDLE LAYER                               │
//! │  ports/inbound.rs  - PoolFundingApi, FundingQueryApi            │
//! │  ports/outbound.rs - KeyValueStore, BankKeeper, PoolRegistry    │
//! │  service/          - FundingService orchestration               │
//! └─────────────────────────────────────────────────────────────────┘
//!                          ↑ uses ↑
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      INNER LAYER                                │
//! │  domain/entities.rs   - Funder, Funding, FundingState           │
//! │  domain/ledger.rs     - create/increase, clamped decrease       │
//! │  domain/ranking.rs    - weighted score, lowest funding          │
//! │  domain/admission.rs  - bounded set with eviction               │
//! │  domain/charge.rs     - per-bundle charge engine                │
//! │  domain/errors.rs     - FundingError, ErrorKind                 │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod adapters;
pub mod config;
pub mod domain;
pub mod genesis;
pub mod ports;
pub mod query;
pub mod service;
pub mod store;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use config::{ConfigError, FundersParams, FundingConfig, WhitelistEntry};
pub use domain::{
    AdmissionOutcome, ChargeResult, ErrorKind, Funder, FunderMetadata, Funding, FundingError,
    FundingEvent, FundingState, Score, Weight,
};
pub use genesis::GenesisState;
pub use ports::inbound::{FundOutcome, FundingQueryApi, PoolFundingApi};
pub use ports::outbound::{BankKeeper, KeyValueStore, PoolRegistry, PoolStatus};
pub use query::{FunderStats, FunderView, FundingStateView, FundingStatus, Page, PageRequest};
pub use service::FundingService;
