//! Fully resolved input of the document generator.

use super::DocumentError;
use crate::models::{Client, Invoice, InvoiceTotals, LineItem};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Issuer block printed in the document header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyProfile {
    pub name: String,
    pub tax_id: String,
    pub address: String,
    pub phone: String,
    pub email: String,
}

impl Default for CompanyProfile {
    fn default() -> Self {
        Self {
            name: "Your Company Inc.".to_string(),
            tax_id: "Tax ID: XAXX010101000".to_string(),
            address: "123 Main Street, Mexico City".to_string(),
            phone: "+52 55 1234 5678".to_string(),
            email: "billing@yourcompany.example".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillTo {
    pub name: String,
    pub address: String,
    pub phone: String,
    pub email: String,
}

impl From<&Client> for BillTo {
    fn from(client: &Client) -> Self {
        Self {
            name: client.name.clone(),
            address: client.location.clone(),
            phone: client.phone.clone(),
            email: client.email.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentLine {
    pub description: String,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub amount: Decimal,
}

impl From<&LineItem> for DocumentLine {
    fn from(item: &LineItem) -> Self {
        Self {
            description: item.description().to_string(),
            quantity: item.quantity(),
            unit_price: item.unit_price(),
            amount: item.amount(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceDocument {
    pub invoice_number: String,
    pub issue_date: NaiveDate,
    pub client: Option<BillTo>,
    pub items: Vec<DocumentLine>,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
    pub notes: Option<String>,
    pub company: CompanyProfile,
}

impl InvoiceDocument {
    /// Build the payload for a stored invoice. Totals are recomputed from
    /// the lines; `default_notes` is used when the invoice carries none.
    pub fn from_invoice(
        invoice: &Invoice,
        client: &Client,
        company: &CompanyProfile,
        default_notes: &str,
    ) -> Self {
        let totals: InvoiceTotals = invoice.totals();
        let notes = invoice
            .notes
            .clone()
            .or_else(|| Some(default_notes.to_string()))
            .filter(|n| !n.trim().is_empty());

        Self {
            invoice_number: invoice.id.clone(),
            issue_date: invoice.issue_date,
            client: Some(BillTo::from(client)),
            items: invoice.items.iter().map(DocumentLine::from).collect(),
            subtotal: totals.subtotal,
            tax: totals.tax,
            total: totals.total,
            notes,
            company: company.clone(),
        }
    }

    /// Checks that must pass before anything is rendered.
    pub fn validate(&self) -> Result<(), DocumentError> {
        if self.invoice_number.trim().is_empty() {
            return Err(DocumentError::MissingInvoiceNumber);
        }
        match &self.client {
            Some(client) if !client.name.trim().is_empty() => {}
            _ => return Err(DocumentError::MissingClient),
        }
        if self.items.is_empty() {
            return Err(DocumentError::NoLineItems);
        }
        Ok(())
    }

    /// `Factura_<number>_<YYYYMMDD>.pdf`, with every non-alphanumeric
    /// character of the number replaced by `_`.
    pub fn filename(&self) -> String {
        let sanitized: String = self
            .invoice_number
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect();
        format!(
            "Factura_{}_{}.pdf",
            sanitized,
            self.issue_date.format("%Y%m%d")
        )
    }
}
