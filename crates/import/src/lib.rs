pub mod aggregate;
pub mod alias;
pub mod csv;
pub mod match_engine;

pub use aggregate::aggregate_transactions;
pub use alias::AliasTable;
pub use csv::{import_settlements, CsvError, ImportProfile, SettlementImporter};
pub use match_engine::{IdentityResolver, Resolution, ResolutionEvent};
