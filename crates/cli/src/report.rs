//! Fixed-width transaction tables for `--debug` output.

use payline_core::{AggregatedTransaction, Money, RawTransaction};

pub trait TableRow {
    fn first_name(&self) -> &str;
    fn last_name(&self) -> &str;
    fn email(&self) -> &str;
    fn amount(&self) -> Money;
}

impl TableRow for RawTransaction {
    fn first_name(&self) -> &str {
        &self.first_name
    }
    fn last_name(&self) -> &str {
        &self.last_name
    }
    fn email(&self) -> &str {
        &self.email
    }
    fn amount(&self) -> Money {
        self.amount
    }
}

impl TableRow for AggregatedTransaction {
    fn first_name(&self) -> &str {
        &self.first_name
    }
    fn last_name(&self) -> &str {
        &self.last_name
    }
    fn email(&self) -> &str {
        &self.email
    }
    fn amount(&self) -> Money {
        self.amount
    }
}

pub fn render_table<T: TableRow>(rows: &[T]) -> String {
    let mut out = format!(
        "{:<15}{:<15}{:<35}{:>9}\n",
        "first_name", "last_name", "email", "amount"
    );
    for row in rows {
        let amount = format!("{:.2}", row.amount().as_decimal());
        out.push_str(&format!(
            "{:<15}{:<15}{:<35}{:>9}\n",
            row.first_name(),
            row.last_name(),
            row.email(),
            amount
        ));
    }
    out
}
