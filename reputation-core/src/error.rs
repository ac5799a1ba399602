//! Error types for the reputation ledger

use crate::types::{Address, RejectionKind};
use thiserror::Error;

/// Result type for registry and ledger operations
pub type Result<T> = std::result::Result<T, Error>;

/// Reputation ledger errors
#[derive(Error, Debug)]
pub enum Error {
    /// Caller is not permitted to perform the operation
    #[error("Unauthorized: {caller} may not {operation}")]
    Unauthorized {
        /// Identity that attempted the call
        caller: Address,
        /// Operation that was refused
        operation: &'static str,
    },

    /// Address is already in the registry
    #[error("Already registered: {0}")]
    AlreadyRegistered(Address),

    /// Buyer is not a registered identity
    #[error("Unknown buyer: {0}")]
    UnknownBuyer(Address),

    /// Seller is not a registered identity
    #[error("Unknown seller: {0}")]
    UnknownSeller(Address),

    /// Buyer and seller are the same identity
    #[error("Buyer and seller are the same party: {0}")]
    SameParty(Address),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Metrics registry error
    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Caller-facing rejection kind, `None` for infrastructure failures
    pub fn rejection_kind(&self) -> Option<RejectionKind> {
        match self {
            Error::Unauthorized { .. } => Some(RejectionKind::Unauthorized),
            Error::AlreadyRegistered(_) => Some(RejectionKind::AlreadyRegistered),
            Error::UnknownBuyer(_) => Some(RejectionKind::UnknownBuyer),
            Error::UnknownSeller(_) => Some(RejectionKind::UnknownSeller),
            Error::SameParty(_) => Some(RejectionKind::SameParty),
            Error::Config(_) | Error::Serialization(_) | Error::Metrics(_) | Error::Io(_) => None,
        }
    }

    /// Whether this is a caller-facing rejection rather than an infrastructure failure
    pub fn is_rejection(&self) -> bool {
        self.rejection_kind().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_rejection_kinds_are_distinct() {
        let a = Address::new("0xA");
        let errors = [
            Error::Unauthorized {
                caller: a.clone(),
                operation: "initiate transactions",
            },
            Error::AlreadyRegistered(a.clone()),
            Error::UnknownBuyer(a.clone()),
            Error::UnknownSeller(a.clone()),
            Error::SameParty(a),
        ];

        let kinds: HashSet<_> = errors.iter().filter_map(Error::rejection_kind).collect();
        assert_eq!(kinds.len(), errors.len());
    }

    #[test]
    fn test_config_error_is_not_rejection() {
        let err = Error::Config("missing marketplace".to_string());
        assert!(!err.is_rejection());
        assert!(err.to_string().contains("missing marketplace"));
    }

    #[test]
    fn test_unauthorized_message() {
        let err = Error::Unauthorized {
            caller: Address::new("0xEVE"),
            operation: "initiate transactions",
        };
        assert_eq!(err.to_string(), "Unauthorized: 0xEVE may not initiate transactions");
    }
}
