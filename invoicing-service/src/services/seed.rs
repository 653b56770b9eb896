//! Built-in demo data used when no usable snapshot is stored.

use crate::models::{
    Client, Collection, CollectionStatus, Invoice, InvoiceStatus, LineItem, Product, ProductKind,
    RecordStatus, Snapshot,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}

fn money(units: i64) -> Decimal {
    Decimal::new(units, 0)
}

fn product(
    id: &str,
    name: &str,
    description: &str,
    price: i64,
    kind: ProductKind,
    status: RecordStatus,
) -> Product {
    Product {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        price: money(price),
        kind,
        status,
    }
}

#[allow(clippy::too_many_arguments)]
fn client(
    id: &str,
    name: &str,
    contact: &str,
    email: &str,
    phone: &str,
    location: &str,
    status: RecordStatus,
    invoice_count: u32,
) -> Client {
    Client {
        id: id.to_string(),
        name: name.to_string(),
        contact: contact.to_string(),
        email: email.to_string(),
        phone: phone.to_string(),
        location: location.to_string(),
        status,
        invoice_count,
    }
}

fn invoice(
    id: &str,
    client: &str,
    issued: NaiveDate,
    due: NaiveDate,
    amount: &str,
    status: InvoiceStatus,
    items: Vec<LineItem>,
) -> Invoice {
    Invoice {
        id: id.to_string(),
        client: client.to_string(),
        issue_date: issued,
        due_date: due,
        amount: amount.to_string(),
        status,
        items,
        notes: None,
    }
}

#[allow(clippy::too_many_arguments)]
fn collection(
    id: &str,
    invoice_id: &str,
    client: &str,
    amount: i64,
    scheduled: NaiveDate,
    processed: Option<NaiveDate>,
    method: &str,
    reference: &str,
) -> Collection {
    Collection {
        id: id.to_string(),
        invoice_id: invoice_id.to_string(),
        client: client.to_string(),
        amount: money(amount),
        scheduled_date: scheduled,
        processed_date: processed,
        status: if processed.is_some() {
            CollectionStatus::Processed
        } else {
            CollectionStatus::Pending
        },
        payment_method: method.to_string(),
        reference: Some(reference.to_string()),
    }
}

/// The demo catalogue, client list, invoices and collections.
pub fn snapshot() -> Snapshot {
    use InvoiceStatus::{Paid, Pending};
    use ProductKind::{Good, Service};
    use RecordStatus::{Active, Inactive};

    let products = vec![
        product("1", "Web development", "Custom website development", 5000, Service, Active),
        product("2", "Graphic design", "Logo and brand identity design", 3000, Service, Active),
        product("3", "Consulting", "Digital strategy advisory", 8000, Service, Active),
        product("4", "Maintenance", "Monthly website maintenance", 2500, Service, Active),
        product("5", "Hosting", "Yearly web hosting", 1200, Good, Active),
        product("6", "Domain", "Yearly domain registration", 350, Good, Inactive),
        product("7", "Software license", "Yearly software license", 4500, Good, Active),
    ];

    let clients = vec![
        client("1", "Acme Corp", "John Carter", "billing@acme.example", "+52 55 1234 5678", "Mexico City", Active, 12),
        client("2", "Northwind Consulting", "Mary Lopez", "info@northwind.example", "+34 91 234 5678", "Madrid, Spain", Active, 8),
        client("3", "Freelance Studio", "Charles Rodriguez", "hello@freelance.example", "+57 1 234 5678", "Bogota, Colombia", Inactive, 3),
        client("4", "Globex", "Anne Martin", "info@globex.example", "+54 11 2345 6789", "Buenos Aires, Argentina", Active, 5),
        client("5", "Initech", "Robert Gomez", "contact@initech.example", "+52 33 2345 6789", "Guadalajara, Mexico", Active, 2),
    ];

    let invoices = vec![
        invoice(
            "FACT-2023-0001", "Acme Corp", date(2023, 5, 15), date(2023, 6, 15), "$5,800.00", Paid,
            vec![
                LineItem::new("Web development", 1, money(5000)),
                LineItem::new("Yearly hosting", 1, money(800)),
            ],
        ),
        invoice(
            "FACT-2023-0002", "Northwind Consulting", date(2023, 5, 18), date(2023, 6, 18), "$3,200.00", Pending,
            vec![
                LineItem::new("Graphic design", 1, money(3000)),
                LineItem::new("Revisions", 2, money(100)),
            ],
        ),
        invoice(
            "FACT-2023-0003", "Freelance Studio", date(2023, 5, 20), date(2023, 5, 20), "$1,500.00", Pending,
            vec![LineItem::new("Consulting", 2, money(750))],
        ),
        invoice(
            "FACT-2023-0004", "Acme Corp", date(2023, 5, 22), date(2023, 6, 22), "$4,200.00", Pending,
            vec![LineItem::new("Maintenance", 3, money(1400))],
        ),
        invoice(
            "FACT-2023-0005", "Northwind Consulting", date(2023, 5, 25), date(2023, 6, 25), "$2,800.00", Paid,
            vec![LineItem::new("Web development", 1, money(2800))],
        ),
        invoice(
            "FACT-2023-0006", "Freelance Studio", date(2023, 5, 28), date(2023, 6, 28), "$2,100.00", Pending,
            vec![LineItem::new("Graphic design", 1, money(2100))],
        ),
        invoice(
            "FACT-2023-0007", "Globex", date(2023, 5, 30), date(2023, 5, 15), "$3,500.00", Pending,
            vec![LineItem::new("Consulting", 1, money(3500))],
        ),
    ];

    let collections = vec![
        collection("COB-2023-0001", "FACT-2023-0001", "Acme Corp", 5800, date(2023, 6, 15), Some(date(2023, 6, 15)), "Bank transfer", "TRF001234"),
        collection("COB-2023-0002", "FACT-2023-0002", "Northwind Consulting", 3200, date(2023, 6, 18), None, "Credit card", "TC005678"),
        collection("COB-2023-0003", "FACT-2023-0003", "Freelance Studio", 1500, date(2023, 5, 20), None, "Bank transfer", "TRF001235"),
        collection("COB-2023-0004", "FACT-2023-0004", "Acme Corp", 4200, date(2023, 6, 22), None, "Check", "CHQ001"),
        collection("COB-2023-0005", "FACT-2023-0005", "Northwind Consulting", 2800, date(2023, 6, 25), Some(date(2023, 6, 24)), "Bank transfer", "TRF001236"),
    ];

    let mut snapshot = Snapshot {
        products,
        clients,
        invoices,
        collections,
        ..Default::default()
    };
    snapshot.reconcile_sequences();
    snapshot
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_amounts_match_line_totals_before_tax() {
        let snapshot = snapshot();
        for invoice in &snapshot.invoices {
            assert_eq!(
                invoice.amount_value(),
                invoice.totals().subtotal,
                "invoice {}",
                invoice.id
            );
        }
    }

    #[test]
    fn seed_sequences_continue_after_existing_ids() {
        let mut snapshot = snapshot();
        assert_eq!(snapshot.sequences.next_product_id(), "8");
        assert_eq!(
            snapshot.sequences.next_document_id("FACT", 2023),
            "FACT-2023-0008"
        );
    }
}
