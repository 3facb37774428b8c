//! # Quantum-Chain Pool Funding Test Suite
//!
//! Unified test crate containing:
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── funding_flows.rs  # End-to-end fund / charge / defund / evict flows
//!     └── properties.rs     # Ledger properties under random operation sequences
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p qc-tests
//!
//! # By category
//! cargo test -p qc-tests integration::funding_flows::
//! cargo test -p qc-tests integration::properties::
//!
//! # More proptest cases
//! PROPTEST_CASES=1024 cargo test -p qc-tests properties
//! ```

#![allow(unused_variables)]
#![allow(unused_imports)]
#![allow(dead_code)]

pub mod integration;
