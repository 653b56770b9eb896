//! Product catalogue model.

use super::validation::{not_blank, positive_amount};
use super::RecordStatus;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Whether a catalogue entry is billed as a service or a physical good.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductKind {
    Service,
    Good,
}

impl ProductKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductKind::Service => "service",
            ProductKind::Good => "good",
        }
    }
}

/// Catalogue entry that invoice lines are priced from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub kind: ProductKind,
    pub status: RecordStatus,
}

impl Product {
    /// Case-insensitive match against name and description. `needle` must be lowercase.
    pub fn matches(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle)
            || self.description.to_lowercase().contains(needle)
    }
}

/// Input for adding a product.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewProduct {
    #[validate(custom(function = "not_blank"))]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[validate(custom(function = "positive_amount"))]
    pub price: Decimal,
    pub kind: ProductKind,
    #[serde(default)]
    pub status: RecordStatus,
}

/// Partial update for a product.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateProduct {
    #[validate(custom(function = "not_blank"))]
    pub name: Option<String>,
    pub description: Option<String>,
    #[validate(custom(function = "positive_amount"))]
    pub price: Option<Decimal>,
    pub kind: Option<ProductKind>,
    pub status: Option<RecordStatus>,
}

impl UpdateProduct {
    pub fn apply_to(self, product: &mut Product) {
        if let Some(name) = self.name {
            product.name = name;
        }
        if let Some(description) = self.description {
            product.description = description;
        }
        if let Some(price) = self.price {
            product.price = price;
        }
        if let Some(kind) = self.kind {
            product.kind = kind;
        }
        if let Some(status) = self.status {
            product.status = status;
        }
    }
}
