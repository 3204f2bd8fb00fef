use std::collections::HashMap;
use std::fmt;

use payline_core::{AggregatedTransaction, Contact, ContactId, MatchTier, ResolvedTransaction};

/// Something the resolver wants the operator to know about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionEvent {
    /// No contact by email or by name. The transaction will not be submitted.
    Unmatched {
        email: String,
        first_name: String,
        last_name: String,
    },
    /// Email lookup failed but a contact with the same name was used.
    NameFallback {
        email: String,
        contact_id: ContactId,
        contact_email: String,
    },
}

impl ResolutionEvent {
    pub fn is_warning(&self) -> bool {
        matches!(self, ResolutionEvent::Unmatched { .. })
    }
}

impl fmt::Display for ResolutionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolutionEvent::Unmatched {
                email,
                first_name,
                last_name,
            } => write!(
                f,
                "no matching contact for {email} {first_name} {last_name}; transaction will be ignored"
            ),
            ResolutionEvent::NameFallback {
                email,
                contact_id,
                contact_email,
            } => write!(
                f,
                "{email} not found, matched by name to contact {contact_id} ({contact_email})"
            ),
        }
    }
}

/// Output of a resolver pass: every input transaction, in order, plus events.
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    pub transactions: Vec<ResolvedTransaction>,
    pub events: Vec<ResolutionEvent>,
}

impl Resolution {
    pub fn resolved(&self) -> impl Iterator<Item = &ResolvedTransaction> {
        self.transactions.iter().filter(|t| t.is_resolved())
    }

    pub fn unresolved_count(&self) -> usize {
        self.transactions.iter().filter(|t| !t.is_resolved()).count()
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ResolutionEvent> {
        self.events.iter().filter(|e| e.is_warning())
    }
}

/// Two-tier contact lookup: exact email, then exact (first, last) name.
///
/// Ties go to the contact that comes first in the directory's listing. The
/// indexes only record the first occurrence of each key, which gives the same
/// answer as scanning the list front to back.
pub struct IdentityResolver<'a> {
    contacts: &'a [Contact],
    by_email: HashMap<&'a str, usize>,
    by_name: HashMap<(&'a str, &'a str), usize>,
}

impl<'a> IdentityResolver<'a> {
    pub fn new(contacts: &'a [Contact]) -> Self {
        let mut by_email = HashMap::with_capacity(contacts.len());
        let mut by_name = HashMap::with_capacity(contacts.len());
        for (i, c) in contacts.iter().enumerate() {
            by_email.entry(c.email.as_str()).or_insert(i);
            by_name
                .entry((c.first_name.as_str(), c.last_name.as_str()))
                .or_insert(i);
        }
        Self {
            contacts,
            by_email,
            by_name,
        }
    }

    /// Finds the contact for one transaction and the tier that matched.
    pub fn find_contact(&self, txn: &AggregatedTransaction) -> Option<(&'a Contact, MatchTier)> {
        if let Some(&i) = self.by_email.get(txn.email.as_str()) {
            return Some((&self.contacts[i], MatchTier::Email));
        }
        self.by_name
            .get(&(txn.first_name.as_str(), txn.last_name.as_str()))
            .map(|&i| (&self.contacts[i], MatchTier::Name))
    }

    pub fn resolve(&self, transactions: Vec<AggregatedTransaction>) -> Resolution {
        let mut resolution = Resolution {
            transactions: Vec::with_capacity(transactions.len()),
            events: Vec::new(),
        };

        for txn in transactions {
            match self.find_contact(&txn) {
                Some((contact, tier)) => {
                    if tier == MatchTier::Name {
                        resolution.events.push(ResolutionEvent::NameFallback {
                            email: txn.email.clone(),
                            contact_id: contact.id,
                            contact_email: contact.email.clone(),
                        });
                    }
                    resolution
                        .transactions
                        .push(ResolvedTransaction::matched(txn, contact.id, tier));
                }
                None => {
                    resolution.events.push(ResolutionEvent::Unmatched {
                        email: txn.email.clone(),
                        first_name: txn.first_name.clone(),
                        last_name: txn.last_name.clone(),
                    });
                    resolution
                        .transactions
                        .push(ResolvedTransaction::unresolved(txn));
                }
            }
        }

        resolution
    }
}
