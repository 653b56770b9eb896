//! Derived metrics: pure functions of a snapshot and the current date.

use crate::models::money::{round_money, sum_amounts, TAX_RATE, WITHHOLDING_RATE};
use crate::models::{EffectiveStatus, Invoice, InvoiceStatus, Snapshot};
use crate::services::alerts::{alerts, Alert};
use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;

/// Window of the "due soon" dashboard counter.
pub const DUE_WITHIN_DAYS: u64 = 7;
/// Window of the upcoming collections list.
pub const UPCOMING_COLLECTION_DAYS: u64 = 30;
pub const UPCOMING_COLLECTION_LIMIT: usize = 3;
pub const RECENT_INVOICE_LIMIT: usize = 5;

fn add_days(date: NaiveDate, days: u64) -> NaiveDate {
    date.checked_add_days(Days::new(days))
        .unwrap_or(NaiveDate::MAX)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusDistribution {
    pub pending: usize,
    pub paid: usize,
    pub overdue: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpcomingCollection {
    pub id: String,
    pub invoice_id: String,
    pub client: String,
    pub amount: Decimal,
    pub scheduled_date: NaiveDate,
    pub days_remaining: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvoiceOverview {
    pub id: String,
    pub client: String,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub amount: String,
    pub status: EffectiveStatus,
}

impl InvoiceOverview {
    fn of(invoice: &Invoice, today: NaiveDate) -> Self {
        Self {
            id: invoice.id.clone(),
            client: invoice.client.clone(),
            issue_date: invoice.issue_date,
            due_date: invoice.due_date,
            amount: invoice.amount.clone(),
            status: invoice.effective_status(today),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FiscalSummary {
    pub taxable_income: Decimal,
    pub tax_collected: Decimal,
    pub withholding: Decimal,
    pub invoice_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSummary {
    pub as_of: NaiveDate,
    pub total_revenue: Decimal,
    pub pending_invoices: usize,
    pub overdue_invoices: usize,
    pub due_within_week: usize,
    pub active_clients: usize,
    pub total_clients: usize,
    pub status_distribution: StatusDistribution,
    pub upcoming_collections: Vec<UpcomingCollection>,
    pub alerts: Vec<Alert>,
    pub recent_invoices: Vec<InvoiceOverview>,
}

/// Sum of paid invoice amounts. Unparsable amounts contribute zero.
pub fn total_revenue(snapshot: &Snapshot) -> Decimal {
    sum_amounts(
        snapshot
            .invoices
            .iter()
            .filter(|i| i.status == InvoiceStatus::Paid)
            .map(Invoice::amount_value),
    )
}

/// Invoices whose persisted status is pending, overdue ones included.
pub fn pending_invoice_count(snapshot: &Snapshot) -> usize {
    snapshot
        .invoices
        .iter()
        .filter(|i| i.status == InvoiceStatus::Pending)
        .count()
}

pub fn overdue_invoice_count(snapshot: &Snapshot, today: NaiveDate) -> usize {
    snapshot
        .invoices
        .iter()
        .filter(|i| i.effective_status(today) == EffectiveStatus::Overdue)
        .count()
}

/// Pending invoices due in `[today, today + days]`.
pub fn due_within(snapshot: &Snapshot, today: NaiveDate, days: u64) -> usize {
    let horizon = add_days(today, days);
    snapshot
        .invoices
        .iter()
        .filter(|i| {
            i.status == InvoiceStatus::Pending && i.due_date >= today && i.due_date <= horizon
        })
        .count()
}

pub fn active_client_count(snapshot: &Snapshot) -> usize {
    snapshot
        .clients
        .iter()
        .filter(|c| c.status.is_active())
        .count()
}

pub fn status_distribution(snapshot: &Snapshot, today: NaiveDate) -> StatusDistribution {
    snapshot
        .invoices
        .iter()
        .fold(StatusDistribution::default(), |mut acc, invoice| {
            match invoice.effective_status(today) {
                EffectiveStatus::Pending => acc.pending += 1,
                EffectiveStatus::Paid => acc.paid += 1,
                EffectiveStatus::Overdue => acc.overdue += 1,
            }
            acc
        })
}

/// Pending collections scheduled in `[today, today + 30 days]`, soonest first.
pub fn upcoming_collections(snapshot: &Snapshot, today: NaiveDate) -> Vec<UpcomingCollection> {
    let horizon = add_days(today, UPCOMING_COLLECTION_DAYS);
    let mut upcoming: Vec<_> = snapshot
        .collections
        .iter()
        .filter(|c| c.is_pending() && c.scheduled_date >= today && c.scheduled_date <= horizon)
        .map(|c| UpcomingCollection {
            id: c.id.clone(),
            invoice_id: c.invoice_id.clone(),
            client: c.client.clone(),
            amount: c.amount,
            scheduled_date: c.scheduled_date,
            days_remaining: (c.scheduled_date - today).num_days().max(0),
        })
        .collect();
    upcoming.sort_by(|a, b| {
        a.scheduled_date
            .cmp(&b.scheduled_date)
            .then_with(|| a.id.cmp(&b.id))
    });
    upcoming.truncate(UPCOMING_COLLECTION_LIMIT);
    upcoming
}

/// The `limit` most recently issued invoices.
pub fn recent_invoices(snapshot: &Snapshot, today: NaiveDate, limit: usize) -> Vec<InvoiceOverview> {
    let mut invoices: Vec<&Invoice> = snapshot.invoices.iter().collect();
    invoices.sort_by(|a, b| {
        b.issue_date
            .cmp(&a.issue_date)
            .then_with(|| b.id.cmp(&a.id))
    });
    invoices
        .into_iter()
        .take(limit)
        .map(|i| InvoiceOverview::of(i, today))
        .collect()
}

pub fn fiscal_summary(snapshot: &Snapshot) -> FiscalSummary {
    let taxable_income = total_revenue(snapshot);
    FiscalSummary {
        taxable_income,
        tax_collected: round_money(taxable_income.saturating_mul(TAX_RATE)),
        withholding: round_money(taxable_income.saturating_mul(WITHHOLDING_RATE)),
        invoice_count: snapshot.invoices.len(),
    }
}

pub fn dashboard(snapshot: &Snapshot, today: NaiveDate) -> DashboardSummary {
    DashboardSummary {
        as_of: today,
        total_revenue: total_revenue(snapshot),
        pending_invoices: pending_invoice_count(snapshot),
        overdue_invoices: overdue_invoice_count(snapshot, today),
        due_within_week: due_within(snapshot, today, DUE_WITHIN_DAYS),
        active_clients: active_client_count(snapshot),
        total_clients: snapshot.clients.len(),
        status_distribution: status_distribution(snapshot, today),
        upcoming_collections: upcoming_collections(snapshot, today),
        alerts: alerts(snapshot, today),
        recent_invoices: recent_invoices(snapshot, today, RECENT_INVOICE_LIMIT),
    }
}
