use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! directory_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

directory_id!(
    /// Identifier of a member record in the directory.
    ContactId
);
directory_id!(
    /// Identifier of a payment method (tender) configured in the directory.
    TenderId
);
directory_id!(
    /// Identifier the directory assigns to a newly created invoice.
    InvoiceId
);

impl InvoiceId {
    /// Placeholder used in payment payloads when no invoice was created (dry run).
    pub const DRY_RUN: InvoiceId = InvoiceId(0);
}
