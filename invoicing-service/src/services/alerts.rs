//! Dashboard alerts derived from the current snapshot.

use crate::models::{EffectiveStatus, Snapshot};
use chrono::{Days, NaiveDate};
use serde::Serialize;

/// Alerts shown at most.
pub const MAX_ALERTS: usize = 3;

/// Invoices due within this many days (after today) raise a reminder.
pub const DUE_SOON_DAYS: u64 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    Invoice,
    Collection,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertPriority {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Alert {
    pub id: String,
    pub kind: AlertKind,
    pub priority: AlertPriority,
    pub message: String,
    pub date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_overdue: Option<i64>,
}

impl Alert {
    fn placeholder(today: NaiveDate) -> Self {
        Self {
            id: "no-alerts".to_string(),
            kind: AlertKind::System,
            priority: AlertPriority::Low,
            message: "No pending alerts".to_string(),
            date: today,
            days_overdue: None,
        }
    }
}

/// Alerts in priority order, capped at [`MAX_ALERTS`]:
/// one per overdue invoice (most overdue first), one per pending collection
/// scheduled for today, then a single reminder for invoices due within
/// [`DUE_SOON_DAYS`]. Returns a lone placeholder when nothing applies.
pub fn alerts(snapshot: &Snapshot, today: NaiveDate) -> Vec<Alert> {
    let mut alerts = Vec::new();

    let mut overdue: Vec<_> = snapshot
        .invoices
        .iter()
        .filter(|i| i.effective_status(today) == EffectiveStatus::Overdue)
        .collect();
    overdue.sort_by(|a, b| a.due_date.cmp(&b.due_date).then_with(|| a.id.cmp(&b.id)));

    for invoice in overdue {
        let days = invoice.days_overdue(today);
        alerts.push(Alert {
            id: format!("overdue-{}", invoice.id),
            kind: AlertKind::Invoice,
            priority: AlertPriority::High,
            message: format!(
                "Invoice {} for {} is {} day{} overdue",
                invoice.id,
                invoice.client,
                days,
                if days == 1 { "" } else { "s" }
            ),
            date: invoice.due_date,
            days_overdue: Some(days),
        });
    }

    for collection in snapshot
        .collections
        .iter()
        .filter(|c| c.is_pending() && c.scheduled_date == today)
    {
        alerts.push(Alert {
            id: format!("collection-{}", collection.id),
            kind: AlertKind::Collection,
            priority: AlertPriority::Medium,
            message: format!(
                "Collection {} from {} is scheduled for today",
                collection.id, collection.client
            ),
            date: collection.scheduled_date,
            days_overdue: None,
        });
    }

    let horizon = today
        .checked_add_days(Days::new(DUE_SOON_DAYS))
        .unwrap_or(NaiveDate::MAX);
    let due_soon = snapshot
        .invoices
        .iter()
        .filter(|i| {
            i.effective_status(today) == EffectiveStatus::Pending
                && i.due_date > today
                && i.due_date <= horizon
        })
        .count();
    if due_soon > 0 {
        alerts.push(Alert {
            id: "due-soon".to_string(),
            kind: AlertKind::Invoice,
            priority: AlertPriority::Medium,
            message: format!(
                "{} invoice{} due in the next {} days",
                due_soon,
                if due_soon == 1 { " is" } else { "s are" },
                DUE_SOON_DAYS
            ),
            date: today,
            days_overdue: None,
        });
    }

    if alerts.is_empty() {
        return vec![Alert::placeholder(today)];
    }
    alerts.truncate(MAX_ALERTS);
    alerts
}
