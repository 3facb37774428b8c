//! Ports layer for the Pool Funding subsystem.
//!
//! - Inbound (Driving) ports: actions and queries exposed to other subsystems
//! - Outbound (Driven) ports: storage, bank and pool lifecycle

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
