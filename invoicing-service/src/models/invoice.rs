//! Invoice model for invoicing-service.

use super::line_item::{LineItem, LineItemInput};
use super::money::{currency_or_zero, format_currency, round_money, sum_amounts, TAX_RATE};
use super::validation::not_blank;
use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use validator::Validate;

/// Days between issue date and due date.
pub const PAYMENT_TERMS_DAYS: u64 = 30;

/// Persisted invoice status.
///
/// Overdue is never stored; it is derived from the due date at read time
/// (see [`Invoice::effective_status`]). Snapshots written with a stored
/// `overdue` value load as pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    #[serde(alias = "overdue")]
    Pending,
    Paid,
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Pending => "pending",
            InvoiceStatus::Paid => "paid",
        }
    }
}

/// Status as observed on a given day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectiveStatus {
    Pending,
    Paid,
    Overdue,
}

impl EffectiveStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EffectiveStatus::Pending => "pending",
            EffectiveStatus::Paid => "paid",
            EffectiveStatus::Overdue => "overdue",
        }
    }
}

impl FromStr for EffectiveStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(EffectiveStatus::Pending),
            "paid" => Ok(EffectiveStatus::Paid),
            "overdue" => Ok(EffectiveStatus::Overdue),
            _ => Err(format!("Invalid invoice status: {}", s)),
        }
    }
}

/// Subtotal, tax and total of a set of lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InvoiceTotals {
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}

impl InvoiceTotals {
    pub fn from_items(items: &[LineItem]) -> Self {
        let subtotal = round_money(sum_amounts(items.iter().map(LineItem::amount)));
        let tax = round_money(subtotal.saturating_mul(TAX_RATE));
        Self {
            subtotal,
            tax,
            total: subtotal.saturating_add(tax),
        }
    }
}

/// Invoice document.
///
/// `client` is the client's name at the time of issue, not a reference.
/// `amount` is the formatted total (`$1,234.56`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: String,
    pub client: String,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub amount: String,
    pub status: InvoiceStatus,
    pub items: Vec<LineItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Invoice {
    /// Pending invoices past their due date are overdue.
    pub fn effective_status(&self, today: NaiveDate) -> EffectiveStatus {
        match self.status {
            InvoiceStatus::Paid => EffectiveStatus::Paid,
            InvoiceStatus::Pending if self.due_date < today => EffectiveStatus::Overdue,
            InvoiceStatus::Pending => EffectiveStatus::Pending,
        }
    }

    /// Whole days past the due date; zero when not yet due.
    pub fn days_overdue(&self, today: NaiveDate) -> i64 {
        (today - self.due_date).num_days().max(0)
    }

    /// Numeric value of the formatted amount; malformed amounts count as zero.
    pub fn amount_value(&self) -> Decimal {
        currency_or_zero(&self.amount, &self.id)
    }

    pub fn totals(&self) -> InvoiceTotals {
        InvoiceTotals::from_items(&self.items)
    }
}

/// Due date for an invoice issued on `issue_date`.
pub fn due_date_for(issue_date: NaiveDate) -> NaiveDate {
    issue_date
        .checked_add_days(Days::new(PAYMENT_TERMS_DAYS))
        .unwrap_or(NaiveDate::MAX)
}

/// A line on an invoice draft: a catalogue product and a quantity.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DraftLine {
    #[validate(custom(function = "not_blank"))]
    pub product_id: String,
    #[validate(range(min = 1))]
    pub quantity: u32,
}

/// Input for issuing a new invoice.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct InvoiceDraft {
    #[validate(custom(function = "not_blank"))]
    pub client_id: String,
    pub issue_date: NaiveDate,
    #[validate(length(min = 1), nested)]
    pub lines: Vec<DraftLine>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Partial update for an invoice.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateInvoice {
    pub issue_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub status: Option<InvoiceStatus>,
    #[validate(length(min = 1), nested)]
    pub items: Option<Vec<LineItemInput>>,
    pub notes: Option<String>,
}

impl UpdateInvoice {
    /// Apply the patch; replacing the lines reformats the amount.
    pub fn apply_to(self, invoice: &mut Invoice) {
        if let Some(issue_date) = self.issue_date {
            invoice.issue_date = issue_date;
        }
        if let Some(due_date) = self.due_date {
            invoice.due_date = due_date;
        }
        if let Some(status) = self.status {
            invoice.status = status;
        }
        if let Some(items) = self.items {
            invoice.items = items.into_iter().map(LineItem::from).collect();
            invoice.amount = format_currency(invoice.totals().total);
        }
        if let Some(notes) = self.notes {
            invoice.notes = Some(notes).filter(|n| !n.trim().is_empty());
        }
    }
}
