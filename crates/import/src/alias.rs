use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

/// Maps a member's old email address to the one the directory knows.
///
/// Both sides are stored lower-case, so lookups must use an already
/// lower-cased address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, String>", into = "BTreeMap<String, String>")]
pub struct AliasTable {
    map: HashMap<String, String>,
}

impl AliasTable {
    pub fn new<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let map = pairs
            .into_iter()
            .map(|(k, v)| {
                (
                    k.as_ref().trim().to_lowercase(),
                    v.as_ref().trim().to_lowercase(),
                )
            })
            .collect();
        Self { map }
    }

    /// Canonical address for `email`, or `email` itself when no alias exists.
    pub fn canonicalize<'a>(&'a self, email: &'a str) -> &'a str {
        self.map.get(email).map(String::as_str).unwrap_or(email)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl From<BTreeMap<String, String>> for AliasTable {
    fn from(map: BTreeMap<String, String>) -> Self {
        AliasTable::new(map)
    }
}

impl From<AliasTable> for BTreeMap<String, String> {
    fn from(table: AliasTable) -> Self {
        table.map.into_iter().collect()
    }
}
