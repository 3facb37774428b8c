//! # Domain Layer - Pool Funding Subsystem
//!
//! Pure business logic: no storage, no transfers.
//!
//! ## Components
//!
//! - `entities`: Funder, Funding, FundingState
//! - `ledger`: create/increase and clamped decrease of a funding
//! - `validation`: parameter compatibility checks
//! - `ranking`: weighted score and lowest-funding selection
//! - `admission`: bounded active set with strict-score eviction
//! - `charge`: per-bundle charge engine
//! - `events`: FundingEvent enumeration
//! - `value_objects`: Weight, Score
//! - `errors`: FundingError, ErrorKind

pub mod admission;
pub mod charge;
pub mod entities;
pub mod errors;
pub mod events;
pub mod ledger;
pub mod ranking;
pub mod validation;
pub mod value_objects;

pub use admission::{AdmissionController, AdmissionOutcome};
pub use charge::{charge_bundle, ChargeOutcome, ChargeResult};
pub use entities::*;
pub use errors::*;
pub use events::FundingEvent;
pub use ranking::{get_lowest_funding, score, RankedFunding};
pub use value_objects::*;
