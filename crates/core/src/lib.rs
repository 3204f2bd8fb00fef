pub mod directory;
pub mod ids;
pub mod money;
pub mod payload;
pub mod transaction;

pub use directory::{AccountDescriptor, AccountResource, Contact, Tender};
pub use ids::{ContactId, InvoiceId, TenderId};
pub use money::{Money, MoneyParseError};
pub use payload::{EntityRef, InvoicePayload, OrderDetail, PayloadTemplate, PaymentPayload};
pub use transaction::{
    AggregatedTransaction, MatchTier, RawTransaction, ResolvedTransaction, TransactionStatus,
    TransactionType,
};
