use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::ContactId;
use super::money::Money;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionType {
    Settle,
    Other(String),
}

impl TransactionType {
    pub fn parse(s: &str) -> Self {
        match s {
            "settle" => TransactionType::Settle,
            other => TransactionType::Other(other.to_string()),
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionType::Settle => write!(f, "settle"),
            TransactionType::Other(s) => write!(f, "{s}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionStatus {
    Complete,
    Other(String),
}

impl TransactionStatus {
    pub fn parse(s: &str) -> Self {
        match s {
            "complete" => TransactionStatus::Complete,
            other => TransactionStatus::Other(other.to_string()),
        }
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionStatus::Complete => write!(f, "complete"),
            TransactionStatus::Other(s) => write!(f, "{s}"),
        }
    }
}

/// One processor row after parsing. `email` is already lower-cased and
/// alias-mapped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTransaction {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub amount: Money,
    pub kind: TransactionType,
    pub status: TransactionStatus,
}

impl RawTransaction {
    /// A completed settlement, the only kind of row worth reconciling.
    pub fn is_settlement(&self) -> bool {
        self.kind == TransactionType::Settle && self.status == TransactionStatus::Complete
    }
}

/// Net of every settlement sharing one email address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedTransaction {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub amount: Money,
    pub record_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchTier {
    Email,
    Name,
}

impl fmt::Display for MatchTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchTier::Email => write!(f, "email"),
            MatchTier::Name => write!(f, "name"),
        }
    }
}

/// An aggregated transaction after identity lookup. `contact_id` is `None`
/// when neither tier found a contact; such transactions are never submitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedTransaction {
    pub transaction: AggregatedTransaction,
    pub contact_id: Option<ContactId>,
    pub matched_by: Option<MatchTier>,
}

impl ResolvedTransaction {
    pub fn unresolved(transaction: AggregatedTransaction) -> Self {
        ResolvedTransaction {
            transaction,
            contact_id: None,
            matched_by: None,
        }
    }

    pub fn matched(transaction: AggregatedTransaction, contact_id: ContactId, tier: MatchTier) -> Self {
        ResolvedTransaction {
            transaction,
            contact_id: Some(contact_id),
            matched_by: Some(tier),
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.contact_id.is_some()
    }
}
