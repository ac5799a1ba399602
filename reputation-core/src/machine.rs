//! Reputation state machine
//!
//! The entry point used by every external caller. Each call runs the access
//! guard first, then mutates or reads the registry and ledger.
//!
//! ```text
//! caller ──▶ ReputationStateMachine ──▶ AccessGuard (authorize)
//!                      │
//!                      ├──▶ IdentityRegistry  (register / lookup / list)
//!                      └──▶ TransactionLedger (initiate / count)
//! ```
//!
//! Both state components only grow: identities are never removed and
//! transactions are never modified.
//!
//! # Example
//!
//! ```
//! use reputation_core::{AccessGuard, Address, ReputationStateMachine};
//!
//! # fn main() -> reputation_core::Result<()> {
//! let machine = ReputationStateMachine::new(AccessGuard::single(Address::new("0xM")))?;
//!
//! machine.register_user(Address::new("0xA"))?;
//! machine.register_user(Address::new("0xB"))?;
//!
//! let id = machine.initiate_transaction(
//!     Address::new("0xM"),
//!     Address::new("0xA"),
//!     Address::new("0xB"),
//! )?;
//! assert_eq!(id.value(), 1);
//! assert_eq!(machine.get_transaction_count(), 1);
//! # Ok(())
//! # }
//! ```

use crate::{
    guard::AccessGuard,
    ledger::TransactionLedger,
    metrics::Metrics,
    registry::IdentityRegistry,
    types::{Address, Identity, Transaction, TransactionId},
    Config, Result,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Facade over the access guard, identity registry and transaction ledger
#[derive(Debug)]
pub struct ReputationStateMachine {
    registry: Arc<IdentityRegistry>,
    ledger: TransactionLedger,
    guard: AccessGuard,
    metrics: Metrics,
}

impl ReputationStateMachine {
    /// Create an empty state machine
    pub fn new(guard: AccessGuard) -> Result<Self> {
        let registry = Arc::new(IdentityRegistry::new());
        let ledger = TransactionLedger::new(registry.clone());

        Ok(Self {
            registry,
            ledger,
            guard,
            metrics: Metrics::new()?,
        })
    }

    /// Create from validated configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;
        let guard = AccessGuard::new(config.marketplace_addresses());

        info!(
            service = %config.service_name,
            marketplaces = guard.marketplaces().len(),
            "Reputation state machine initialized"
        );

        Self::new(guard)
    }

    /// Register the calling identity
    pub fn register_user(&self, caller: Address) -> Result<Identity> {
        let result = self
            .guard
            .authorize_registration(&caller, &caller)
            .and_then(|()| self.registry.register(caller));

        let identity = self.observe(result)?;
        self.metrics.record_registration();
        info!(
            address = %identity.address,
            sequence = identity.sequence,
            "User registered"
        );

        Ok(identity)
    }

    /// Record a transaction between two registered identities
    ///
    /// Only an authorized marketplace may call this. Returns the new id.
    pub fn initiate_transaction(
        &self,
        caller: Address,
        buyer: Address,
        seller: Address,
    ) -> Result<TransactionId> {
        let result = self
            .guard
            .authorize_transaction_initiation(&caller)
            .and_then(|()| self.ledger.initiate(caller, buyer, seller));

        let transaction = self.observe(result)?;
        self.metrics.record_transaction();
        info!(
            id = %transaction.id(),
            buyer = %transaction.buyer(),
            seller = %transaction.seller(),
            initiator = %transaction.initiator(),
            "Transaction initiated"
        );

        Ok(transaction.id())
    }

    /// Registered addresses in registration order
    pub fn get_all_users(&self) -> Vec<Address> {
        let users = self.registry.list_all();
        debug!(count = users.len(), "Listing users");
        users
    }

    /// Number of transactions created; equals the last id assigned
    pub fn get_transaction_count(&self) -> u64 {
        self.ledger.count()
    }

    /// Whether an address is registered
    pub fn is_registered(&self, address: &Address) -> bool {
        self.registry.is_registered(address)
    }

    /// Look up a registered identity
    pub fn get_identity(&self, address: &Address) -> Option<Identity> {
        self.registry.get(address)
    }

    /// Look up a transaction by id
    pub fn get_transaction(&self, id: TransactionId) -> Option<Transaction> {
        self.ledger.get(id)
    }

    /// Transactions where the address is buyer or seller
    pub fn transactions_involving(&self, address: &Address) -> Vec<Transaction> {
        self.ledger.transactions_involving(address)
    }

    /// Authorized marketplaces
    pub fn marketplaces(&self) -> Vec<Address> {
        self.guard.marketplaces()
    }

    /// Metrics collector
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Count rejections before handing them back to the caller
    fn observe<T>(&self, result: Result<T>) -> Result<T> {
        if let Err(ref err) = result {
            if let Some(kind) = err.rejection_kind() {
                self.metrics.record_rejection(kind);
                warn!(kind = %kind, error = %err, "Call rejected");
            }
        }
        result
    }
}
