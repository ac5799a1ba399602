//! Reputation Ledger Core
//!
//! Permissioned identity registry and transaction ledger for marketplace
//! participants.
//!
//! # Architecture
//!
//! - **Identity Registry**: Append-only set of known participants
//! - **Transaction Ledger**: Gapless, 1-based transaction sequence
//! - **Access Guard**: Self-registration and marketplace-only initiation
//! - **State Machine**: Single entry point composing the three
//!
//! # Invariants
//!
//! - An address is registered at most once
//! - Transaction ids are never reused, skipped or decremented
//! - `get_transaction_count()` equals the last id assigned
//! - Append-only: identities and transactions are never modified or deleted

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    missing_debug_implementations,
    clippy::all
)]

pub mod types;
pub mod error;
pub mod registry;
pub mod ledger;
pub mod guard;
pub mod machine;
pub mod command;
pub mod config;
pub mod metrics;

// Re-exports
pub use error::{Error, Result};
pub use types::{Address, Identity, RejectionKind, Transaction, TransactionId};
pub use registry::IdentityRegistry;
pub use ledger::TransactionLedger;
pub use guard::AccessGuard;
pub use machine::ReputationStateMachine;
pub use config::Config;
