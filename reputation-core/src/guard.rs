//! Access guard
//!
//! Role checks consulted before any mutation:
//! - Registration: a caller may only register itself
//! - Transaction initiation: the caller must be an authorized marketplace
//!
//! The marketplace set is fixed when the guard is built.

use crate::{
    error::{Error, Result},
    types::Address,
};
use std::collections::BTreeSet;
use tracing::warn;

/// Role-based authorization for registry and ledger mutations
#[derive(Debug, Clone, Default)]
pub struct AccessGuard {
    marketplaces: BTreeSet<Address>,
}

impl AccessGuard {
    /// Create guard with the authorized marketplace set
    ///
    /// Empty addresses are ignored; they can never authenticate a caller.
    pub fn new(marketplaces: impl IntoIterator<Item = Address>) -> Self {
        Self {
            marketplaces: marketplaces
                .into_iter()
                .filter(|address| !address.is_empty())
                .collect(),
        }
    }

    /// Guard with a single marketplace authority
    pub fn single(marketplace: Address) -> Self {
        Self::new([marketplace])
    }

    /// Check that `caller` may register `subject`
    pub fn authorize_registration(&self, caller: &Address, subject: &Address) -> Result<()> {
        if caller.is_empty() || caller != subject {
            warn!(caller = %caller, subject = %subject, "Registration refused");
            return Err(Error::Unauthorized {
                caller: caller.clone(),
                operation: "register another identity",
            });
        }
        Ok(())
    }

    /// Check that `caller` may initiate transactions
    pub fn authorize_transaction_initiation(&self, caller: &Address) -> Result<()> {
        if !self.is_marketplace(caller) {
            warn!(caller = %caller, "Transaction initiation refused");
            return Err(Error::Unauthorized {
                caller: caller.clone(),
                operation: "initiate transactions",
            });
        }
        Ok(())
    }

    /// Whether the address is an authorized marketplace
    pub fn is_marketplace(&self, address: &Address) -> bool {
        self.marketplaces.contains(address)
    }

    /// Authorized marketplaces, sorted
    pub fn marketplaces(&self) -> Vec<Address> {
        self.marketplaces.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_self_registration_allowed() {
        let guard = AccessGuard::default();
        let a = Address::new("0xA");
        assert!(guard.authorize_registration(&a, &a).is_ok());
    }

    #[test]
    fn test_registration_on_behalf_refused() {
        let guard = AccessGuard::default();
        let result = guard.authorize_registration(&Address::new("0xA"), &Address::new("0xB"));
        assert!(matches!(result, Err(Error::Unauthorized { .. })));
    }

    #[test]
    fn test_empty_caller_refused() {
        let guard = AccessGuard::default();
        let empty = Address::new("");
        assert!(guard.authorize_registration(&empty, &empty).is_err());
    }

    #[test]
    fn test_marketplace_set() {
        let guard = AccessGuard::new([Address::new("0xM1"), Address::new("0xM2"), Address::new("")]);

        assert!(guard.authorize_transaction_initiation(&Address::new("0xM1")).is_ok());
        assert!(guard.authorize_transaction_initiation(&Address::new("0xM2")).is_ok());
        assert!(guard.authorize_transaction_initiation(&Address::new("0xA")).is_err());
        assert!(guard.authorize_transaction_initiation(&Address::new("")).is_err());
        assert_eq!(guard.marketplaces().len(), 2);
    }

    #[test]
    fn test_no_marketplaces_refuses_everyone() {
        let guard = AccessGuard::new(Vec::new());
        let result = guard.authorize_transaction_initiation(&Address::new("0xM"));
        assert!(matches!(
            result,
            Err(Error::Unauthorized { operation: "initiate transactions", .. })
        ));
    }
}
