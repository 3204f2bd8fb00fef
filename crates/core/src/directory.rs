//! Read-only entities fetched from the membership directory.
//!
//! Field names follow the directory's PascalCase JSON so responses can be
//! deserialized directly.

use serde::{Deserialize, Serialize};

use super::ids::{ContactId, TenderId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Contact {
    pub id: ContactId,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Tender {
    pub id: TenderId,
    pub name: String,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AccountResource {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AccountDescriptor {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub resources: Vec<AccountResource>,
}

impl AccountDescriptor {
    /// URL of the first sub-resource with exactly this name.
    pub fn resource_url(&self, name: &str) -> Option<&str> {
        self.resources
            .iter()
            .find(|r| r.name == name)
            .map(|r| r.url.as_str())
    }
}
