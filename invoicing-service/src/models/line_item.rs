//! Invoice line item model.

use super::validation::{non_negative_amount, not_blank};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// One billed line. `amount` is always `quantity * unit_price`.
///
/// The stored amount is ignored on deserialization and recomputed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "StoredLineItem")]
pub struct LineItem {
    description: String,
    quantity: u32,
    unit_price: Decimal,
    amount: Decimal,
}

#[derive(Deserialize)]
struct StoredLineItem {
    description: String,
    quantity: u32,
    unit_price: Decimal,
}

impl From<StoredLineItem> for LineItem {
    fn from(stored: StoredLineItem) -> Self {
        LineItem::new(stored.description, stored.quantity, stored.unit_price)
    }
}

impl LineItem {
    pub fn new(description: impl Into<String>, quantity: u32, unit_price: Decimal) -> Self {
        Self {
            description: description.into(),
            quantity,
            unit_price,
            amount: Decimal::from(quantity).saturating_mul(unit_price),
        }
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn unit_price(&self) -> Decimal {
        self.unit_price
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn set_quantity(&mut self, quantity: u32) {
        self.quantity = quantity;
        self.recompute();
    }

    pub fn set_unit_price(&mut self, unit_price: Decimal) {
        self.unit_price = unit_price;
        self.recompute();
    }

    fn recompute(&mut self) {
        self.amount = Decimal::from(self.quantity).saturating_mul(self.unit_price);
    }
}

/// Free-form line supplied when editing an existing invoice.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LineItemInput {
    #[validate(custom(function = "not_blank"))]
    pub description: String,
    #[validate(range(min = 1))]
    pub quantity: u32,
    #[validate(custom(function = "non_negative_amount"))]
    pub unit_price: Decimal,
}

impl From<LineItemInput> for LineItem {
    fn from(input: LineItemInput) -> Self {
        LineItem::new(input.description, input.quantity, input.unit_price)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amount_follows_operands() {
        let mut item = LineItem::new("Maintenance", 3, Decimal::new(1400, 0));
        assert_eq!(item.amount(), Decimal::new(4200, 0));

        item.set_quantity(2);
        assert_eq!(item.amount(), Decimal::new(2800, 0));

        item.set_unit_price(Decimal::new(99950, 2));
        assert_eq!(item.amount(), Decimal::new(199900, 2));
    }

    #[test]
    fn stored_amount_is_recomputed_on_load() {
        let json = r#"{"description":"Revisions","quantity":2,"unit_price":"100","amount":"999"}"#;
        let item: LineItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.amount(), Decimal::new(200, 0));
    }
}
