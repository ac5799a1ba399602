//! Core types for the reputation ledger
//!
//! Identities and transactions are immutable once created. Addresses are
//! opaque keys: the ledger never interprets their format.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Participant identifier (account-style key from the hosting system)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    /// Create new address (kept byte-for-byte)
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get as string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for the empty address, which never identifies a caller
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Address {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for Address {
    fn from(id: String) -> Self {
        Self::new(id)
    }
}

/// Transaction identifier (1-based, gapless)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(u64);

impl TransactionId {
    /// First id handed out by an empty ledger
    pub const FIRST: TransactionId = TransactionId(1);

    /// Wrap a raw id
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Raw value
    pub fn value(&self) -> u64 {
        self.0
    }

    /// Id that follows this one
    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A registered participant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Participant address
    pub address: Address,

    /// Registration order (1-based)
    pub sequence: u64,

    /// Registration timestamp
    pub registered_at: DateTime<Utc>,
}

/// Record of a transaction between a buyer and a seller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    id: TransactionId,
    buyer: Address,
    seller: Address,
    initiator: Address,
    created_at: DateTime<Utc>,
}

impl Transaction {
    pub(crate) fn new(
        id: TransactionId,
        buyer: Address,
        seller: Address,
        initiator: Address,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            buyer,
            seller,
            initiator,
            created_at,
        }
    }

    /// Transaction id
    pub fn id(&self) -> TransactionId {
        self.id
    }

    /// Buyer identity
    pub fn buyer(&self) -> &Address {
        &self.buyer
    }

    /// Seller identity
    pub fn seller(&self) -> &Address {
        &self.seller
    }

    /// Marketplace that created the record
    pub fn initiator(&self) -> &Address {
        &self.initiator
    }

    /// Creation timestamp
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Whether the address is the buyer or the seller
    pub fn involves(&self, address: &Address) -> bool {
        &self.buyer == address || &self.seller == address
    }
}

/// Stable, caller-facing failure kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionKind {
    /// Caller lacks the role for the operation
    Unauthorized,
    /// Address registered twice
    AlreadyRegistered,
    /// Buyer not in the registry
    UnknownBuyer,
    /// Seller not in the registry
    UnknownSeller,
    /// Buyer and seller are identical
    SameParty,
}

impl RejectionKind {
    /// All kinds, in taxonomy order
    pub const ALL: [RejectionKind; 5] = [
        RejectionKind::Unauthorized,
        RejectionKind::AlreadyRegistered,
        RejectionKind::UnknownBuyer,
        RejectionKind::UnknownSeller,
        RejectionKind::SameParty,
    ];

    /// Stable code
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectionKind::Unauthorized => "unauthorized",
            RejectionKind::AlreadyRegistered => "already_registered",
            RejectionKind::UnknownBuyer => "unknown_buyer",
            RejectionKind::UnknownSeller => "unknown_seller",
            RejectionKind::SameParty => "same_party",
        }
    }
}

impl fmt::Display for RejectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
