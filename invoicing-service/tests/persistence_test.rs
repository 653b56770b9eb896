//! Snapshot persistence: file round trips, fallback to seed data and
//! loading snapshots written before id sequences were stored.

mod common;

use common::{test_today, TestApp};
use invoicing_service::config::NumberingConfig;
use invoicing_service::models::{
    DraftLine, EffectiveStatus, InvoiceDraft, InvoiceStatus, NewProduct, ProductKind,
    RecordStatus,
};
use invoicing_service::services::metrics::SNAPSHOT_LOAD_FALLBACKS;
use invoicing_service::services::{
    seed, DomainStore, FileSnapshotStore, FixedClock, MemorySnapshotStore, SnapshotStore,
};
use rust_decimal::Decimal;
use serde_json::json;
use serial_test::serial;
use std::sync::Arc;

async fn open(persistence: Arc<dyn SnapshotStore>) -> DomainStore {
    DomainStore::open(
        persistence,
        Arc::new(FixedClock::on(test_today())),
        NumberingConfig::default(),
    )
    .await
}

fn hosting_plan() -> NewProduct {
    NewProduct {
        name: "Premium hosting".to_string(),
        description: "Managed hosting with backups".to_string(),
        price: Decimal::new(1800, 0),
        kind: ProductKind::Good,
        status: RecordStatus::Active,
    }
}

const LEGACY_BLOB: &str = r#"{
    "products": [
        {"id": "3", "name": "Consulting", "description": "", "price": "8000", "kind": "service", "status": "active"}
    ],
    "clients": [
        {"id": "2", "name": "Acme Corp", "contact": "", "email": "billing@acme.example", "phone": "", "location": "Mexico City", "status": "active"}
    ],
    "invoices": [
        {
            "id": "FACT-2023-0003",
            "client": "Acme Corp",
            "issue_date": "2023-05-01",
            "due_date": "2023-05-31",
            "amount": "$1,600.00",
            "status": "overdue",
            "items": [{"description": "Consulting", "quantity": 2, "unit_price": "800", "amount": "1"}]
        }
    ],
    "collections": []
}"#;

#[tokio::test]
async fn http_mutations_are_written_to_the_snapshot_file() {
    let app = TestApp::spawn().await;

    let response = app
        .post_json(
            "/products",
            &json!({ "name": "Premium hosting", "price": "1800", "kind": "good" }),
        )
        .await;
    assert_eq!(response.status(), 201);

    let stored = app.stored_snapshot().expect("snapshot file should exist");
    assert_eq!(stored.products.len(), 8);
    assert!(stored.products.iter().any(|p| p.name == "Premium hosting"));
    assert_eq!(stored.sequences.products, 8);
    assert_eq!(stored.invoices.len(), 7);
}

#[tokio::test]
async fn reopened_file_store_yields_saved_state() {
    let dir = tempfile::tempdir().unwrap();
    let persistence: Arc<dyn SnapshotStore> = Arc::new(
        FileSnapshotStore::new(dir.path(), "invoicing-app-data")
            .await
            .unwrap(),
    );

    let mut store = open(persistence.clone()).await;
    let product = store.add_product(hosting_plan()).await.unwrap();
    let saved = store.snapshot().clone();
    drop(store);

    let reopened = open(persistence).await;
    assert_eq!(reopened.snapshot(), &saved);
    assert_eq!(reopened.product(&product.id).unwrap().name, "Premium hosting");
}

#[tokio::test]
#[serial]
async fn corrupt_blob_falls_back_to_seed_data() {
    let before = SNAPSHOT_LOAD_FALLBACKS.get();

    let store = open(Arc::new(MemorySnapshotStore::with_blob("{not json"))).await;

    assert_eq!(store.snapshot().invoices, seed::snapshot().invoices);
    assert_eq!(store.snapshot().clients.len(), 5);
    assert!(SNAPSHOT_LOAD_FALLBACKS.get() > before);
}

#[tokio::test]
#[serial]
async fn structurally_incompatible_blob_falls_back_to_seed_data() {
    let before = SNAPSHOT_LOAD_FALLBACKS.get();

    let store = open(Arc::new(MemorySnapshotStore::with_blob(
        r#"{"products": 5, "clients": "none"}"#,
    )))
    .await;

    assert_eq!(store.snapshot().products, seed::snapshot().products);
    assert!(SNAPSHOT_LOAD_FALLBACKS.get() > before);
}

#[tokio::test]
async fn missing_blob_starts_from_seed_data_without_saving() {
    let persistence = Arc::new(MemorySnapshotStore::new());
    let store = open(persistence.clone()).await;

    assert_eq!(store.snapshot().invoices.len(), 7);
    assert_eq!(persistence.contents().await, None);
}

#[tokio::test]
async fn legacy_overdue_status_loads_as_pending() {
    let store = open(Arc::new(MemorySnapshotStore::with_blob(LEGACY_BLOB))).await;

    let invoice = store.invoice("FACT-2023-0003").unwrap();
    assert_eq!(invoice.status, InvoiceStatus::Pending);
    assert_eq!(
        invoice.effective_status(test_today()),
        EffectiveStatus::Overdue
    );
    assert_eq!(invoice.items[0].amount(), Decimal::new(1600, 0));
    assert_eq!(store.client("2").unwrap().invoice_count, 0);
}

#[tokio::test]
async fn sequences_are_recovered_from_existing_ids() {
    let persistence = Arc::new(MemorySnapshotStore::with_blob(LEGACY_BLOB));
    let mut store = open(persistence.clone()).await;

    let product = store.add_product(hosting_plan()).await.unwrap();
    assert_eq!(product.id, "4");

    let invoice = store
        .create_invoice(InvoiceDraft {
            client_id: "2".to_string(),
            issue_date: test_today(),
            lines: vec![DraftLine {
                product_id: "3".to_string(),
                quantity: 1,
            }],
            notes: None,
        })
        .await
        .unwrap();
    assert_eq!(invoice.id, "FACT-2023-0004");

    let saved = persistence.contents().await.unwrap();
    let saved: serde_json::Value = serde_json::from_str(&saved).unwrap();
    assert_eq!(saved["sequences"]["products"], 4);
    assert_eq!(saved["sequences"]["documents"]["FACT-2023"], 4);
    assert_eq!(saved["invoices"][0]["status"], "pending");
}
