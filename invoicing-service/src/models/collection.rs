//! Collection (scheduled payment) model.

use super::validation::not_blank;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionStatus {
    Pending,
    Processed,
}

impl CollectionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CollectionStatus::Pending => "pending",
            CollectionStatus::Processed => "processed",
        }
    }
}

impl FromStr for CollectionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(CollectionStatus::Pending),
            "processed" => Ok(CollectionStatus::Processed),
            _ => Err(format!("Invalid collection status: {}", s)),
        }
    }
}

/// A scheduled or completed payment against one invoice.
///
/// `amount` is captured from the invoice when the collection is scheduled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    pub id: String,
    pub invoice_id: String,
    pub client: String,
    pub amount: Decimal,
    pub scheduled_date: NaiveDate,
    pub processed_date: Option<NaiveDate>,
    pub status: CollectionStatus,
    pub payment_method: String,
    #[serde(default)]
    pub reference: Option<String>,
}

impl Collection {
    pub fn is_pending(&self) -> bool {
        self.status == CollectionStatus::Pending
    }
}

/// Input for scheduling a collection.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewCollection {
    #[validate(custom(function = "not_blank"))]
    pub invoice_id: String,
    pub scheduled_date: NaiveDate,
    #[validate(custom(function = "not_blank"))]
    pub payment_method: String,
    #[serde(default)]
    pub reference: Option<String>,
}
