use payline_core::AccountDescriptor;
use tracing::debug;

use crate::api::Directory;
use crate::error::DirectoryError;

/// Endpoint URLs of the account sub-resources this importer touches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountResources {
    pub account_id: i64,
    pub contacts: String,
    pub invoices: String,
    pub tenders: String,
    pub payments: String,
}

impl AccountResources {
    /// Picks the named sub-resources out of the first account descriptor.
    pub fn from_accounts(accounts: &[AccountDescriptor]) -> Result<Self, DirectoryError> {
        let account = accounts.first().ok_or(DirectoryError::NoAccount)?;
        let url = |name: &str| {
            account
                .resource_url(name)
                .map(str::to_string)
                .ok_or_else(|| DirectoryError::MissingResource(name.to_string()))
        };
        let resources = Self {
            account_id: account.id,
            contacts: url("Contacts")?,
            invoices: url("Invoices")?,
            tenders: url("Tenders")?,
            payments: url("Payments")?,
        };
        debug!(?resources, "discovered account resources");
        Ok(resources)
    }

    pub async fn discover<D: Directory>(directory: &D) -> Result<Self, DirectoryError> {
        let accounts = directory.list_accounts().await?;
        Self::from_accounts(&accounts)
    }
}
