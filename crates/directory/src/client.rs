//! Directory HTTP client.
//!
//! Authenticates once with an API key (OAuth client-credentials grant), then
//! issues bearer-authenticated JSON requests. No retries.

use std::time::Duration;

use payline_core::{AccountDescriptor, Contact, InvoiceId, InvoicePayload, PaymentPayload, Tender};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::Directory;
use crate::error::DirectoryError;

pub const DEFAULT_API_BASE: &str = "https://api.wildapricot.org";
pub const DEFAULT_AUTH_URL: &str = "https://oauth.wildapricot.org/auth/token";
pub const DEFAULT_SCOPE: &str = "account_view contacts_view finances_view finances_edit";

const ACTIVE_MEMBER_FILTER: &str = "member eq true AND Status eq Active";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub auth_url: String,
    pub scope: String,
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE.to_string(),
            auth_url: DEFAULT_AUTH_URL.to_string(),
            scope: DEFAULT_SCOPE.to_string(),
            timeout_secs: 60,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct ContactsResponse {
    #[serde(rename = "Contacts", default)]
    contacts: Vec<Contact>,
}

#[derive(Debug, Deserialize)]
struct CreatedEntity {
    #[serde(rename = "Id")]
    id: i64,
}

/// Directory API client.
#[derive(Clone)]
pub struct DirectoryClient {
    http: reqwest::Client,
    api_base: String,
    token: String,
}

impl DirectoryClient {
    /// Exchange an API key for an access token and build a client around it.
    pub async fn authenticate(config: &ApiConfig, api_key: &str) -> Result<Self, DirectoryError> {
        let http = build_http(config)?;

        debug!(url = %config.auth_url, scope = %config.scope, "requesting access token");
        let resp = http
            .post(&config.auth_url)
            .basic_auth("APIKEY", Some(api_key))
            .form(&[
                ("grant_type", "client_credentials"),
                ("scope", config.scope.as_str()),
            ])
            .send()
            .await?;
        let resp = check_status(resp).await?;
        let token: TokenResponse = resp
            .json()
            .await
            .map_err(|e| DirectoryError::Parse(format!("token response: {e}")))?;

        Ok(Self {
            http,
            api_base: config.base_url.trim_end_matches('/').to_string(),
            token: token.access_token,
        })
    }

    /// Build a client around an already issued access token.
    #[cfg(test)]
    fn with_token(config: &ApiConfig, token: impl Into<String>) -> Result<Self, DirectoryError> {
        Ok(Self {
            http: build_http(config)?,
            api_base: config.base_url.trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T, DirectoryError> {
        debug!(%url, "GET");
        let resp = self
            .http
            .get(url)
            .bearer_auth(&self.token)
            .header(reqwest::header::ACCEPT, "application/json")
            .query(query)
            .send()
            .await?;
        let resp = check_status(resp).await?;
        resp.json::<T>()
            .await
            .map_err(|e| DirectoryError::Parse(format!("{url}: {e}")))
    }

    async fn post_json<B: Serialize>(&self, url: &str, body: &B) -> Result<String, DirectoryError> {
        debug!(%url, "POST");
        let resp = self
            .http
            .post(url)
            .bearer_auth(&self.token)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(body)
            .send()
            .await?;
        let resp = check_status(resp).await?;
        Ok(resp.text().await?)
    }
}

impl Directory for DirectoryClient {
    async fn list_accounts(&self) -> Result<Vec<AccountDescriptor>, DirectoryError> {
        let url = format!("{}/v2/accounts", self.api_base);
        self.get_json(&url, &[]).await
    }

    async fn list_active_contacts(&self, contacts_url: &str) -> Result<Vec<Contact>, DirectoryError> {
        let resp: ContactsResponse = self
            .get_json(
                contacts_url,
                &[("$filter", ACTIVE_MEMBER_FILTER), ("$async", "false")],
            )
            .await?;
        debug!(count = resp.contacts.len(), "retrieved active contacts");
        Ok(resp.contacts)
    }

    async fn list_tenders(&self, tenders_url: &str) -> Result<Vec<Tender>, DirectoryError> {
        self.get_json(tenders_url, &[]).await
    }

    async fn create_invoice(
        &self,
        invoices_url: &str,
        invoice: &InvoicePayload,
    ) -> Result<InvoiceId, DirectoryError> {
        let body = self.post_json(invoices_url, invoice).await?;
        let id = parse_created_id(&body)?;
        debug!(invoice_id = id, "invoice created");
        Ok(InvoiceId(id))
    }

    async fn create_payment(
        &self,
        payments_url: &str,
        payment: &PaymentPayload,
    ) -> Result<(), DirectoryError> {
        self.post_json(payments_url, payment).await?;
        Ok(())
    }
}

fn build_http(config: &ApiConfig) -> Result<reqwest::Client, DirectoryError> {
    Ok(reqwest::Client::builder()
        .user_agent(format!("payline-sync/{}", env!("CARGO_PKG_VERSION")))
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?)
}

async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, DirectoryError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(DirectoryError::Http {
        status: status.as_u16(),
        body,
    })
}

/// The invoice endpoint answers with the bare id; an `{"Id": n}` object is
/// accepted as well.
fn parse_created_id(body: &str) -> Result<i64, DirectoryError> {
    let trimmed = body.trim();
    if let Ok(id) = trimmed.parse::<i64>() {
        return Ok(id);
    }
    serde_json::from_str::<CreatedEntity>(trimmed)
        .map(|e| e.id)
        .map_err(|_| DirectoryError::Parse(format!("unexpected create response: '{trimmed}'")))
}
