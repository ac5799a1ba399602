//! Transaction ledger
//!
//! Append-only record of transactions between registered identities.
//!
//! # Id allocation
//!
//! Ids start at 1 and are allocated under the same lock that appends the
//! record, so they are gapless and `count()` always equals the last id
//! handed out.
//!
//! # Example
//!
//! ```
//! use reputation_core::{Address, IdentityRegistry, TransactionLedger};
//! use std::sync::Arc;
//!
//! let registry = Arc::new(IdentityRegistry::new());
//! registry.register(Address::new("0xA")).unwrap();
//! registry.register(Address::new("0xB")).unwrap();
//!
//! let ledger = TransactionLedger::new(registry);
//! let tx = ledger
//!     .initiate(Address::new("0xM"), Address::new("0xA"), Address::new("0xB"))
//!     .unwrap();
//! assert_eq!(tx.id().value(), 1);
//! assert_eq!(ledger.count(), 1);
//! ```

use crate::{
    error::{Error, Result},
    registry::IdentityRegistry,
    types::{Address, Transaction, TransactionId},
};
use chrono::Utc;
use parking_lot::Mutex;
use std::sync::Arc;

/// Append-only transaction ledger
#[derive(Debug)]
pub struct TransactionLedger {
    /// Registry used to validate parties (not owned)
    registry: Arc<IdentityRegistry>,

    /// Records in id order; `transactions[i].id() == i + 1`
    transactions: Mutex<Vec<Transaction>>,
}

impl TransactionLedger {
    /// Create empty ledger backed by a registry
    pub fn new(registry: Arc<IdentityRegistry>) -> Self {
        Self {
            registry,
            transactions: Mutex::new(Vec::new()),
        }
    }

    /// Record a new transaction
    ///
    /// Checks, first failure wins: buyer differs from seller, buyer is
    /// registered, seller is registered. A rejected call leaves the ledger
    /// untouched.
    pub fn initiate(&self, initiator: Address, buyer: Address, seller: Address) -> Result<Transaction> {
        // Held across validation so the id cannot be observed twice
        let mut transactions = self.transactions.lock();

        self.validate_parties(&buyer, &seller)?;

        let id = match transactions.last() {
            Some(last) => last.id().next(),
            None => TransactionId::FIRST,
        };

        let transaction = Transaction::new(id, buyer, seller, initiator, Utc::now());
        transactions.push(transaction.clone());

        Ok(transaction)
    }

    /// Number of transactions created so far
    pub fn count(&self) -> u64 {
        self.transactions.lock().len() as u64
    }

    /// Get transaction by id
    pub fn get(&self, id: TransactionId) -> Option<Transaction> {
        let index = usize::try_from(id.value().checked_sub(1)?).ok()?;
        self.transactions.lock().get(index).cloned()
    }

    /// All transactions in id order
    pub fn transactions(&self) -> Vec<Transaction> {
        self.transactions.lock().clone()
    }

    /// Transactions where the address is buyer or seller
    pub fn transactions_involving(&self, address: &Address) -> Vec<Transaction> {
        self.transactions
            .lock()
            .iter()
            .filter(|tx| tx.involves(address))
            .cloned()
            .collect()
    }

    fn validate_parties(&self, buyer: &Address, seller: &Address) -> Result<()> {
        if buyer == seller {
            return Err(Error::SameParty(buyer.clone()));
        }

        if !self.registry.is_registered(buyer) {
            return Err(Error::UnknownBuyer(buyer.clone()));
        }

        if !self.registry.is_registered(seller) {
            return Err(Error::UnknownSeller(seller.clone()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_ledger(users: &[&str]) -> TransactionLedger {
        let registry = Arc::new(IdentityRegistry::new());
        for user in users {
            registry.register(Address::new(*user)).unwrap();
        }
        TransactionLedger::new(registry)
    }

    fn market() -> Address {
        Address::new("0xMARKET")
    }

    #[test]
    fn test_initiate_assigns_sequential_ids() {
        let ledger = create_test_ledger(&["0xA", "0xB", "0xC"]);

        let tx1 = ledger.initiate(market(), "0xA".into(), "0xB".into()).unwrap();
        let tx2 = ledger.initiate(market(), "0xB".into(), "0xC".into()).unwrap();
        let tx3 = ledger.initiate(market(), "0xA".into(), "0xB".into()).unwrap();

        assert_eq!(tx1.id(), TransactionId::new(1));
        assert_eq!(tx2.id(), TransactionId::new(2));
        assert_eq!(tx3.id(), TransactionId::new(3));
        assert_eq!(ledger.count(), 3);
    }

    #[test]
    fn test_record_contents() {
        let ledger = create_test_ledger(&["0xA", "0xB"]);
        let tx = ledger.initiate(market(), "0xA".into(), "0xB".into()).unwrap();

        let stored = ledger.get(tx.id()).unwrap();
        assert_eq!(stored, tx);
        assert_eq!(stored.buyer().as_str(), "0xA");
        assert_eq!(stored.seller().as_str(), "0xB");
        assert_eq!(stored.initiator(), &market());
    }

    #[test]
    fn test_unknown_buyer() {
        let ledger = create_test_ledger(&["0xB"]);
        let result = ledger.initiate(market(), "0xA".into(), "0xB".into());

        assert!(matches!(result, Err(Error::UnknownBuyer(_))));
        assert_eq!(ledger.count(), 0);
    }

    #[test]
    fn test_unknown_seller() {
        let ledger = create_test_ledger(&["0xA"]);
        let result = ledger.initiate(market(), "0xA".into(), "0xB".into());

        assert!(matches!(result, Err(Error::UnknownSeller(_))));
        assert_eq!(ledger.count(), 0);
    }

    #[test]
    fn test_buyer_checked_before_seller() {
        let ledger = create_test_ledger(&[]);
        let result = ledger.initiate(market(), "0xA".into(), "0xB".into());
        assert!(matches!(result, Err(Error::UnknownBuyer(_))));
    }

    #[test]
    fn test_same_party_regardless_of_registration() {
        let ledger = create_test_ledger(&["0xA"]);

        let registered = ledger.initiate(market(), "0xA".into(), "0xA".into());
        assert!(matches!(registered, Err(Error::SameParty(_))));

        let unregistered = ledger.initiate(market(), "0xZ".into(), "0xZ".into());
        assert!(matches!(unregistered, Err(Error::SameParty(_))));

        assert_eq!(ledger.count(), 0);
    }

    #[test]
    fn test_get_out_of_range() {
        let ledger = create_test_ledger(&["0xA", "0xB"]);
        ledger.initiate(market(), "0xA".into(), "0xB".into()).unwrap();

        assert!(ledger.get(TransactionId::new(0)).is_none());
        assert!(ledger.get(TransactionId::new(2)).is_none());
        assert!(ledger.get(TransactionId::new(1)).is_some());
    }

    #[test]
    fn test_transactions_involving() {
        let ledger = create_test_ledger(&["0xA", "0xB", "0xC"]);
        ledger.initiate(market(), "0xA".into(), "0xB".into()).unwrap();
        ledger.initiate(market(), "0xB".into(), "0xC".into()).unwrap();
        ledger.initiate(market(), "0xC".into(), "0xA".into()).unwrap();

        let ids: Vec<u64> = ledger
            .transactions_involving(&Address::new("0xB"))
            .iter()
            .map(|tx| tx.id().value())
            .collect();
        assert_eq!(ids, vec![1, 2]);

        assert_eq!(ledger.transactions().len(), 3);
    }
}
