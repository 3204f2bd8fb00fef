use std::collections::HashMap;

use payline_core::{AggregatedTransaction, RawTransaction};
use tracing::debug;

/// Net every settlement per email address.
///
/// Groups appear in the order their email was first seen, and take their
/// names from that first row. Groups whose net is zero or negative are
/// dropped: nothing is owed, so no invoice is raised.
pub fn aggregate_transactions(rows: &[RawTransaction]) -> Vec<AggregatedTransaction> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<AggregatedTransaction> = Vec::new();

    for row in rows {
        match index.get(row.email.as_str()) {
            Some(&i) => {
                let group = &mut groups[i];
                group.amount += row.amount;
                group.record_count += 1;
            }
            None => {
                index.insert(row.email.as_str(), groups.len());
                groups.push(AggregatedTransaction {
                    first_name: row.first_name.clone(),
                    last_name: row.last_name.clone(),
                    email: row.email.clone(),
                    amount: row.amount,
                    record_count: 1,
                });
            }
        }
    }

    groups
        .into_iter()
        .filter(|g| {
            let payable = g.amount.is_positive();
            if !payable {
                debug!(email = %g.email, net = %g.amount, "dropping non-positive net");
            }
            payable
        })
        .collect()
}
