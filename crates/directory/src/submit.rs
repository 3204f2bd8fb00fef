use payline_core::{InvoiceId, Money, PayloadTemplate, ResolvedTransaction, TenderId};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, info};

use crate::api::Directory;
use crate::error::DirectoryError;
use crate::resources::AccountResources;

pub const DEFAULT_TENDER_NAME: &str = "Payline";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubmissionSettings {
    /// Name of the tender (payment method) payments are booked against.
    pub tender_name: String,
    #[serde(flatten)]
    pub template: PayloadTemplate,
}

impl Default for SubmissionSettings {
    fn default() -> Self {
        Self {
            tender_name: DEFAULT_TENDER_NAME.to_string(),
            template: PayloadTemplate::default(),
        }
    }
}

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("Invoice for {email} failed: {source}")]
    Invoice {
        email: String,
        #[source]
        source: DirectoryError,
    },
    /// The invoice exists in the directory but has no payment against it.
    #[error("Payment for {email} failed; invoice {invoice_id} left without payment: {source}")]
    Payment {
        email: String,
        invoice_id: InvoiceId,
        #[source]
        source: DirectoryError,
    },
}

/// One invoice/payment pair that was (or, in a dry run, would have been) posted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmittedPair {
    pub email: String,
    pub invoice_id: InvoiceId,
    pub amount: Money,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SubmissionReport {
    pub dry_run: bool,
    pub submitted: Vec<SubmittedPair>,
    pub skipped: usize,
}

/// Posts invoice-then-payment for each resolved transaction, strictly in order.
pub struct SubmissionDriver<'a, D: Directory> {
    directory: &'a D,
    resources: AccountResources,
    template: PayloadTemplate,
    tender_id: TenderId,
    dry_run: bool,
}

impl<'a, D: Directory> SubmissionDriver<'a, D> {
    /// Looks up the configured tender. Without it nothing may be submitted.
    /// When several tenders share the name, the last one listed wins.
    pub async fn prepare(
        directory: &'a D,
        resources: AccountResources,
        settings: &SubmissionSettings,
        dry_run: bool,
    ) -> Result<Self, DirectoryError> {
        let tenders = directory.list_tenders(&resources.tenders).await?;
        let tender = tenders
            .iter()
            .rev()
            .find(|t| t.name == settings.tender_name)
            .ok_or_else(|| DirectoryError::TenderNotFound(settings.tender_name.clone()))?;
        debug!(
            tender_id = %tender.id,
            url = tender.url.as_deref().unwrap_or(""),
            "{} tender found", settings.tender_name
        );

        Ok(Self {
            directory,
            resources,
            template: settings.template.clone(),
            tender_id: tender.id,
            dry_run,
        })
    }

    pub fn tender_id(&self) -> TenderId {
        self.tender_id
    }

    pub async fn submit(
        &self,
        transactions: &[ResolvedTransaction],
    ) -> Result<SubmissionReport, SubmitError> {
        let mut report = SubmissionReport {
            dry_run: self.dry_run,
            ..SubmissionReport::default()
        };

        for txn in transactions {
            match self.submit_one(txn).await? {
                Some(pair) => report.submitted.push(pair),
                None => report.skipped += 1,
            }
        }

        Ok(report)
    }

    async fn submit_one(&self, txn: &ResolvedTransaction) -> Result<Option<SubmittedPair>, SubmitError> {
        let email = &txn.transaction.email;
        let Some(invoice) = self.template.invoice_for(txn) else {
            debug!(%email, "skipping unresolved transaction");
            return Ok(None);
        };

        let invoice_id = if self.dry_run {
            info!(%email, payload = %to_json(&invoice), "dry run: would post invoice");
            InvoiceId::DRY_RUN
        } else {
            debug!(%email, payload = %to_json(&invoice), "posting invoice");
            self.directory
                .create_invoice(&self.resources.invoices, &invoice)
                .await
                .map_err(|source| SubmitError::Invoice {
                    email: email.clone(),
                    source,
                })?
        };

        let Some(payment) = self.template.payment_for(txn, invoice_id, self.tender_id) else {
            return Ok(None);
        };

        if self.dry_run {
            info!(%email, payload = %to_json(&payment), "dry run: would post payment");
        } else {
            debug!(%email, invoice_id = ?payment.invoice_id(), payload = %to_json(&payment), "posting payment");
            if let Err(source) = self
                .directory
                .create_payment(&self.resources.payments, &payment)
                .await
            {
                error!(%email, %invoice_id, "payment failed after invoice was created; reconcile manually");
                return Err(SubmitError::Payment {
                    email: email.clone(),
                    invoice_id,
                    source,
                });
            }
        }

        Ok(Some(SubmittedPair {
            email: email.clone(),
            invoice_id,
            amount: txn.transaction.amount,
        }))
    }
}

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| format!("<unserializable: {e}>"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{DirectoryCall, MockDirectory};
    use payline_core::{
        AggregatedTransaction, ContactId, MatchTier, Tender,
    };

    fn resources() -> AccountResources {
        AccountResources {
            account_id: 1,
            contacts: "https://api/contacts".into(),
            invoices: "https://api/invoices".into(),
            tenders: "https://api/tenders".into(),
            payments: "https://api/payments".into(),
        }
    }

    fn tenders() -> Vec<Tender> {
        vec![
            Tender { id: TenderId(1), name: "Cash".into(), url: None },
            Tender { id: TenderId(9), name: "Payline".into(), url: Some("https://api/tenders/9".into()) },
        ]
    }

    fn txn(email: &str, cents: i64, contact: Option<i64>) -> ResolvedTransaction {
        let agg = AggregatedTransaction {
            first_name: "F".into(),
            last_name: "L".into(),
            email: email.into(),
            amount: Money::from_cents(cents),
            record_count: 1,
        };
        match contact {
            Some(id) => ResolvedTransaction::matched(agg, ContactId(id), MatchTier::Email),
            None => ResolvedTransaction::unresolved(agg),
        }
    }

    #[tokio::test]
    async fn missing_tender_aborts_before_any_write() {
        let dir = MockDirectory::new(vec![], vec![], vec![Tender { id: TenderId(1), name: "Cash".into(), url: None }]);
        let err = SubmissionDriver::prepare(&dir, resources(), &SubmissionSettings::default(), false)
            .await
            .err()
            .unwrap();
        assert!(matches!(err, DirectoryError::TenderNotFound(ref n) if n == "Payline"));
        assert_eq!(dir.write_count(), 0);
    }

    #[tokio::test]
    async fn tender_name_is_configurable() {
        let dir = MockDirectory::new(vec![], vec![], tenders());
        let settings = SubmissionSettings {
            tender_name: "Cash".into(),
            ..SubmissionSettings::default()
        };
        let driver = SubmissionDriver::prepare(&dir, resources(), &settings, false).await.unwrap();
        assert_eq!(driver.tender_id(), TenderId(1));
    }

    #[tokio::test]
    async fn duplicate_tender_name_uses_last_listed() {
        let mut listed = tenders();
        listed.push(Tender { id: TenderId(12), name: "Payline".into(), url: None });
        let dir = MockDirectory::new(vec![], vec![], listed);
        let driver = SubmissionDriver::prepare(&dir, resources(), &SubmissionSettings::default(), false)
            .await
            .unwrap();
        assert_eq!(driver.tender_id(), TenderId(12));
    }

    #[tokio::test]
    async fn invoice_then_payment_in_order() {
        let dir = MockDirectory::new(vec![], vec![], tenders());
        let driver = SubmissionDriver::prepare(&dir, resources(), &SubmissionSettings::default(), false)
            .await
            .unwrap();
        let report = driver
            .submit(&[txn("a@x.com", 1000, Some(1)), txn("b@x.com", 2000, Some(2))])
            .await
            .unwrap();

        assert_eq!(report.submitted.len(), 2);
        assert_eq!(report.submitted[0].invoice_id, InvoiceId(1000));
        assert_eq!(report.submitted[1].invoice_id, InvoiceId(1001));

        let writes: Vec<_> = dir.calls().into_iter().filter(DirectoryCall::is_write).collect();
        assert_eq!(writes.len(), 4);
        match (&writes[0], &writes[1], &writes[2], &writes[3]) {
            (
                DirectoryCall::CreateInvoice(inv_url, inv_a),
                DirectoryCall::CreatePayment(pay_url, pay_a),
                DirectoryCall::CreateInvoice(_, inv_b),
                DirectoryCall::CreatePayment(_, pay_b),
            ) => {
                assert_eq!(inv_url, "https://api/invoices");
                assert_eq!(pay_url, "https://api/payments");
                assert_eq!(inv_a.contact.id, ContactId(1));
                assert_eq!(pay_a.invoice_id(), Some(InvoiceId(1000)));
                assert_eq!(pay_a.tender.id, TenderId(9));
                assert_eq!(pay_a.value, Money::from_cents(1000));
                assert_eq!(inv_b.contact.id, ContactId(2));
                assert_eq!(pay_b.invoice_id(), Some(InvoiceId(1001)));
            }
            other => panic!("unexpected call order: {other:?}"),
        }
    }

    #[tokio::test]
    async fn unresolved_transactions_are_skipped() {
        let dir = MockDirectory::new(vec![], vec![], tenders());
        let driver = SubmissionDriver::prepare(&dir, resources(), &SubmissionSettings::default(), false)
            .await
            .unwrap();
        let report = driver
            .submit(&[txn("ghost@x.com", 1000, None), txn("b@x.com", 2000, Some(2))])
            .await
            .unwrap();
        assert_eq!(report.skipped, 1);
        assert_eq!(report.submitted.len(), 1);
        assert_eq!(report.submitted[0].email, "b@x.com");
        assert_eq!(dir.write_count(), 2);
    }

    #[tokio::test]
    async fn dry_run_issues_no_writes() {
        let dir = MockDirectory::new(vec![], vec![], tenders());
        let driver = SubmissionDriver::prepare(&dir, resources(), &SubmissionSettings::default(), true)
            .await
            .unwrap();
        let report = driver
            .submit(&[txn("a@x.com", 1000, Some(1)), txn("b@x.com", 2000, Some(2))])
            .await
            .unwrap();

        assert!(report.dry_run);
        assert_eq!(report.submitted.len(), 2);
        assert!(report.submitted.iter().all(|p| p.invoice_id == InvoiceId::DRY_RUN));
        assert_eq!(dir.write_count(), 0);
        assert_eq!(dir.calls(), vec![DirectoryCall::ListTenders("https://api/tenders".into())]);
    }

    #[tokio::test]
    async fn failed_payment_reports_orphaned_invoice() {
        let mut dir = MockDirectory::new(vec![], vec![], tenders());
        dir.fail_payments = true;
        let driver = SubmissionDriver::prepare(&dir, resources(), &SubmissionSettings::default(), false)
            .await
            .unwrap();
        let err = driver
            .submit(&[txn("a@x.com", 1000, Some(1)), txn("b@x.com", 2000, Some(2))])
            .await
            .unwrap_err();

        match err {
            SubmitError::Payment { email, invoice_id, .. } => {
                assert_eq!(email, "a@x.com");
                assert_eq!(invoice_id, InvoiceId(1000));
            }
            other => panic!("unexpected error: {other}"),
        }
        // The run stops at the first failure.
        assert_eq!(dir.write_count(), 2);
    }
}
