//! Identity registry
//!
//! Owns the set of known participants. The ordered user list and the
//! membership index sit behind a single lock, so a registration is one
//! atomic check-and-append and every read sees a consistent snapshot.

use crate::{
    error::{Error, Result},
    types::{Address, Identity},
};
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::HashMap;

#[derive(Debug, Default)]
struct RegistryState {
    /// Identities in registration order
    users: Vec<Identity>,

    /// Address -> position in `users`
    index: HashMap<Address, usize>,
}

/// Append-only registry of participant identities
#[derive(Debug, Default)]
pub struct IdentityRegistry {
    state: RwLock<RegistryState>,
}

impl IdentityRegistry {
    /// Create empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an address
    ///
    /// Fails with [`Error::AlreadyRegistered`] if the address is known. A
    /// repeated call is never treated as success.
    pub fn register(&self, address: Address) -> Result<Identity> {
        let mut state = self.state.write();

        if state.index.contains_key(&address) {
            return Err(Error::AlreadyRegistered(address));
        }

        let identity = Identity {
            sequence: state.users.len() as u64 + 1,
            registered_at: Utc::now(),
            address,
        };

        let position = state.users.len();
        state.index.insert(identity.address.clone(), position);
        state.users.push(identity.clone());

        tracing::debug!(
            address = %identity.address,
            sequence = identity.sequence,
            "Identity registered"
        );

        Ok(identity)
    }

    /// Check whether an address is registered
    pub fn is_registered(&self, address: &Address) -> bool {
        self.state.read().index.contains_key(address)
    }

    /// Look up a registered identity
    pub fn get(&self, address: &Address) -> Option<Identity> {
        let state = self.state.read();
        state
            .index
            .get(address)
            .map(|&position| state.users[position].clone())
    }

    /// All addresses in registration order
    pub fn list_all(&self) -> Vec<Address> {
        self.state
            .read()
            .users
            .iter()
            .map(|identity| identity.address.clone())
            .collect()
    }

    /// All identities in registration order
    pub fn identities(&self) -> Vec<Identity> {
        self.state.read().users.clone()
    }

    /// Number of registered identities
    pub fn len(&self) -> usize {
        self.state.read().users.len()
    }

    /// True if nobody has registered yet
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_register_and_lookup() {
        let registry = IdentityRegistry::new();
        let a = Address::new("0xA");

        assert!(!registry.is_registered(&a));

        let identity = registry.register(a.clone()).unwrap();
        assert_eq!(identity.address, a);
        assert_eq!(identity.sequence, 1);

        assert!(registry.is_registered(&a));
        assert_eq!(registry.get(&a), Some(identity));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let registry = IdentityRegistry::new();
        registry.register(Address::new("0xA")).unwrap();

        let result = registry.register(Address::new("0xA"));
        assert!(matches!(result, Err(Error::AlreadyRegistered(ref a)) if a.as_str() == "0xA"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_list_preserves_registration_order() {
        let registry = IdentityRegistry::new();
        for id in ["0xC", "0xA", "0xB"] {
            registry.register(Address::new(id)).unwrap();
        }
        // Failed attempts leave no trace
        assert!(registry.register(Address::new("0xA")).is_err());

        let users = registry.list_all();
        assert_eq!(
            users,
            vec![Address::new("0xC"), Address::new("0xA"), Address::new("0xB")]
        );

        let sequences: Vec<u64> = registry.identities().iter().map(|i| i.sequence).collect();
        assert_eq!(sequences, vec![1, 2, 3]);
    }

    #[test]
    fn test_concurrent_duplicate_registration() {
        let registry = Arc::new(IdentityRegistry::new());

        let results: Vec<Result<Identity>> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    let registry = registry.clone();
                    s.spawn(move || registry.register(Address::new("0xSAME")))
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        let successes = results.iter().filter(|r| r.is_ok()).count();
        let duplicates = results
            .iter()
            .filter(|r| matches!(r, Err(Error::AlreadyRegistered(_))))
            .count();

        assert_eq!(successes, 1);
        assert_eq!(duplicates, 7);
        assert_eq!(registry.list_all(), vec![Address::new("0xSAME")]);
    }

    #[test]
    fn test_empty_registry() {
        let registry = IdentityRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.list_all().is_empty());
        assert_eq!(registry.get(&Address::new("0xA")), None);
    }
}
