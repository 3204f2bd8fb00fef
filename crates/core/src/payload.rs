//! Invoice and payment documents posted to the directory's finance API.

use serde::{Deserialize, Serialize};

use super::ids::{ContactId, InvoiceId, TenderId};
use super::money::Money;
use super::transaction::ResolvedTransaction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct EntityRef<T> {
    pub id: T,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct OrderDetail {
    pub value: Money,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct InvoicePayload {
    pub order_type: String,
    pub contact: EntityRef<ContactId>,
    pub order_details: Vec<OrderDetail>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PaymentPayload {
    pub value: Money,
    pub invoices: Vec<EntityRef<InvoiceId>>,
    pub contact: EntityRef<ContactId>,
    pub tender: EntityRef<TenderId>,
    pub comment: String,
    pub payment_type: String,
}

impl PaymentPayload {
    pub fn invoice_id(&self) -> Option<InvoiceId> {
        self.invoices.first().map(|r| r.id)
    }
}

/// Fixed wording stamped onto every invoice/payment pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PayloadTemplate {
    pub order_type: String,
    pub line_notes: String,
    pub comment: String,
    pub payment_type: String,
}

impl Default for PayloadTemplate {
    fn default() -> Self {
        Self {
            order_type: "Legacy subscription payment".to_string(),
            line_notes: "Payline subscription payment".to_string(),
            comment: "Entered via API script".to_string(),
            payment_type: "Payline subscription".to_string(),
        }
    }
}

impl PayloadTemplate {
    pub fn invoice(&self, contact_id: ContactId, amount: Money) -> InvoicePayload {
        InvoicePayload {
            order_type: self.order_type.clone(),
            contact: EntityRef { id: contact_id },
            order_details: vec![OrderDetail {
                value: amount,
                notes: self.line_notes.clone(),
            }],
        }
    }

    pub fn payment(
        &self,
        contact_id: ContactId,
        amount: Money,
        invoice_id: InvoiceId,
        tender_id: TenderId,
    ) -> PaymentPayload {
        PaymentPayload {
            value: amount,
            invoices: vec![EntityRef { id: invoice_id }],
            contact: EntityRef { id: contact_id },
            tender: EntityRef { id: tender_id },
            comment: self.comment.clone(),
            payment_type: self.payment_type.clone(),
        }
    }

    /// Invoice for a resolved transaction, or `None` if it has no contact.
    pub fn invoice_for(&self, txn: &ResolvedTransaction) -> Option<InvoicePayload> {
        txn.contact_id
            .map(|id| self.invoice(id, txn.transaction.amount))
    }

    /// Payment for a resolved transaction, or `None` if it has no contact.
    pub fn payment_for(
        &self,
        txn: &ResolvedTransaction,
        invoice_id: InvoiceId,
        tender_id: TenderId,
    ) -> Option<PaymentPayload> {
        txn.contact_id
            .map(|id| self.payment(id, txn.transaction.amount, invoice_id, tender_id))
    }
}
