use std::sync::Mutex;

use payline_core::{
    AccountDescriptor, Contact, InvoiceId, InvoicePayload, PaymentPayload, Tender,
};

use crate::error::DirectoryError;

/// The slice of the membership directory's API this importer needs.
///
/// Calls are awaited one at a time; implementations need not be `Sync`.
#[allow(async_fn_in_trait)]
pub trait Directory {
    async fn list_accounts(&self) -> Result<Vec<AccountDescriptor>, DirectoryError>;

    /// Contacts of members whose status is active.
    async fn list_active_contacts(&self, contacts_url: &str) -> Result<Vec<Contact>, DirectoryError>;

    async fn list_tenders(&self, tenders_url: &str) -> Result<Vec<Tender>, DirectoryError>;

    async fn create_invoice(
        &self,
        invoices_url: &str,
        invoice: &InvoicePayload,
    ) -> Result<InvoiceId, DirectoryError>;

    async fn create_payment(
        &self,
        payments_url: &str,
        payment: &PaymentPayload,
    ) -> Result<(), DirectoryError>;
}

// ── In-memory directory (always available, used for tests) ────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum DirectoryCall {
    ListAccounts,
    ListActiveContacts(String),
    ListTenders(String),
    CreateInvoice(String, InvoicePayload),
    CreatePayment(String, PaymentPayload),
}

impl DirectoryCall {
    pub fn is_write(&self) -> bool {
        matches!(
            self,
            DirectoryCall::CreateInvoice(..) | DirectoryCall::CreatePayment(..)
        )
    }
}

/// Serves canned listings and records every call. Invoice ids are handed out
/// sequentially starting at `first_invoice_id`.
#[derive(Debug, Default)]
pub struct MockDirectory {
    pub accounts: Vec<AccountDescriptor>,
    pub contacts: Vec<Contact>,
    pub tenders: Vec<Tender>,
    pub first_invoice_id: i64,
    /// Fail every payment call with an HTTP 500.
    pub fail_payments: bool,
    calls: Mutex<Vec<DirectoryCall>>,
}

impl MockDirectory {
    pub fn new(accounts: Vec<AccountDescriptor>, contacts: Vec<Contact>, tenders: Vec<Tender>) -> Self {
        Self {
            accounts,
            contacts,
            tenders,
            first_invoice_id: 1000,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<DirectoryCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn write_count(&self) -> usize {
        self.calls().iter().filter(|c| c.is_write()).count()
    }

    fn record(&self, call: DirectoryCall) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }

    fn invoices_created(&self) -> i64 {
        self.calls()
            .iter()
            .filter(|c| matches!(c, DirectoryCall::CreateInvoice(..)))
            .count() as i64
    }
}

impl Directory for MockDirectory {
    async fn list_accounts(&self) -> Result<Vec<AccountDescriptor>, DirectoryError> {
        self.record(DirectoryCall::ListAccounts);
        Ok(self.accounts.clone())
    }

    async fn list_active_contacts(&self, contacts_url: &str) -> Result<Vec<Contact>, DirectoryError> {
        self.record(DirectoryCall::ListActiveContacts(contacts_url.to_string()));
        Ok(self.contacts.clone())
    }

    async fn list_tenders(&self, tenders_url: &str) -> Result<Vec<Tender>, DirectoryError> {
        self.record(DirectoryCall::ListTenders(tenders_url.to_string()));
        Ok(self.tenders.clone())
    }

    async fn create_invoice(
        &self,
        invoices_url: &str,
        invoice: &InvoicePayload,
    ) -> Result<InvoiceId, DirectoryError> {
        let id = self.first_invoice_id + self.invoices_created();
        self.record(DirectoryCall::CreateInvoice(
            invoices_url.to_string(),
            invoice.clone(),
        ));
        Ok(InvoiceId(id))
    }

    async fn create_payment(
        &self,
        payments_url: &str,
        payment: &PaymentPayload,
    ) -> Result<(), DirectoryError> {
        self.record(DirectoryCall::CreatePayment(
            payments_url.to_string(),
            payment.clone(),
        ));
        if self.fail_payments {
            return Err(DirectoryError::Http {
                status: 500,
                body: "payment rejected".to_string(),
            });
        }
        Ok(())
    }
}
