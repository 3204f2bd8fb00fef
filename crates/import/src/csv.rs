use payline_core::{Money, RawTransaction, TransactionStatus, TransactionType};
use serde::{Deserialize, Serialize};
use std::io::Read;
use thiserror::Error;
use tracing::{debug, trace};

use crate::alias::AliasTable;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportProfile {
    pub delimiter: String,
    pub aliases: AliasTable,
}

impl Default for ImportProfile {
    fn default() -> Self {
        Self {
            delimiter: ",".to_string(),
            aliases: AliasTable::default(),
        }
    }
}

#[derive(Error, Debug)]
pub enum CsvError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("Missing required column: {0}")]
    MissingColumn(String),
    #[error("Malformed record on line {line}: amount '{value}' is not a number")]
    MalformedRecord { line: u64, value: String },
}

/// Positions of the required columns within the header row. Extra columns
/// are ignored.
struct ColumnIndex {
    first_name: usize,
    last_name: usize,
    email: usize,
    amount: usize,
    kind: usize,
    status: usize,
}

impl ColumnIndex {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self, CsvError> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| CsvError::MissingColumn(name.to_string()))
        };
        Ok(Self {
            first_name: find("first_name")?,
            last_name: find("last_name")?,
            email: find("email")?,
            amount: find("amount")?,
            kind: find("type")?,
            status: find("status")?,
        })
    }
}

pub struct SettlementImporter;

impl SettlementImporter {
    /// Parses every row, then keeps only completed settlements in input order.
    ///
    /// A non-numeric amount anywhere in the file fails the whole import, even
    /// on rows that would have been filtered out.
    pub fn parse_settlements<R: Read>(
        reader: &mut csv::Reader<R>,
        aliases: &AliasTable,
    ) -> Result<Vec<RawTransaction>, CsvError> {
        let columns = ColumnIndex::from_headers(reader.headers()?)?;
        let mut transactions = Vec::new();
        let mut skipped = 0usize;

        for result in reader.records() {
            let record = result?;

            if record.iter().all(|f| f.trim().is_empty()) {
                continue;
            }

            let line = record.position().map(|p| p.line()).unwrap_or_default();
            let field = |col: usize| record.get(col).unwrap_or_default();

            let amount_field = field(columns.amount);
            let amount = amount_field
                .parse::<Money>()
                .map_err(|_| CsvError::MalformedRecord {
                    line,
                    value: amount_field.to_string(),
                })?;

            let email = field(columns.email).trim().to_lowercase();
            let email = aliases.canonicalize(&email).to_string();

            let txn = RawTransaction {
                first_name: field(columns.first_name).to_string(),
                last_name: field(columns.last_name).to_string(),
                email,
                amount,
                kind: TransactionType::parse(field(columns.kind)),
                status: TransactionStatus::parse(field(columns.status)),
            };

            if txn.is_settlement() {
                transactions.push(txn);
            } else {
                trace!(line, kind = %txn.kind, status = %txn.status, "dropping non-settlement row");
                skipped += 1;
            }
        }

        debug!(
            kept = transactions.len(),
            skipped, "parsed settlement file"
        );
        Ok(transactions)
    }
}

pub fn import_settlements<R: Read>(
    data: R,
    profile: &ImportProfile,
) -> Result<Vec<RawTransaction>, CsvError> {
    let delimiter = profile
        .delimiter
        .as_bytes()
        .first()
        .copied()
        .unwrap_or(b',');
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(delimiter)
        .trim(csv::Trim::Headers)
        .from_reader(data);

    SettlementImporter::parse_settlements(&mut reader, &profile.aliases)
}
