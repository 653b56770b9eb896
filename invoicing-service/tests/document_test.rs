//! Invoice PDF download tests.

mod common;

use common::TestApp;
use invoicing_service::services::seed;
use reqwest::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use serde_json::{json, Value};

fn header<'a>(response: &'a reqwest::Response, name: &str) -> &'a str {
    response
        .headers()
        .get(name)
        .unwrap_or_else(|| panic!("missing {} header", name))
        .to_str()
        .unwrap()
}

#[tokio::test]
async fn downloads_invoice_as_pdf_attachment() {
    let app = TestApp::spawn().await;

    let response = app.get("/invoices/FACT-2023-0001/document").await;
    assert_eq!(response.status(), 200);
    assert_eq!(header(&response, CONTENT_TYPE.as_str()), "application/pdf");
    assert_eq!(
        header(&response, CONTENT_DISPOSITION.as_str()),
        "attachment; filename=\"Factura_FACT_2023_0001_20230515.pdf\""
    );
    assert_eq!(header(&response, "x-page-count"), "1");

    let bytes = response.bytes().await.unwrap();
    assert!(bytes.starts_with(b"%PDF"));
}

#[tokio::test]
async fn long_invoices_span_several_pages() {
    let app = TestApp::spawn().await;

    let lines: Vec<Value> = (0..40)
        .map(|i| json!({ "product_id": if i % 2 == 0 { "1" } else { "4" }, "quantity": 1 }))
        .collect();
    let response = app
        .post_json(
            "/invoices",
            &json!({ "client_id": "1", "issue_date": "2023-06-20", "lines": lines }),
        )
        .await;
    assert_eq!(response.status(), 201);
    let invoice: Value = response.json().await.unwrap();
    let id = invoice["id"].as_str().unwrap().to_string();
    assert_eq!(id, "FACT-2023-0008");

    let response = app.get(&format!("/invoices/{}/document", id)).await;
    assert_eq!(response.status(), 200);
    assert_eq!(
        header(&response, CONTENT_DISPOSITION.as_str()),
        "attachment; filename=\"Factura_FACT_2023_0008_20230620.pdf\""
    );
    let pages: usize = header(&response, "x-page-count").parse().unwrap();
    assert!(pages > 1, "expected several pages, got {}", pages);
}

#[tokio::test]
async fn unknown_invoice_is_not_found() {
    let app = TestApp::spawn().await;

    let response = app.get("/invoices/FACT-2023-9999/document").await;
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn invoice_without_line_items_is_rejected() {
    let mut snapshot = seed::snapshot();
    snapshot.invoices[0].items.clear();
    let app = TestApp::spawn_with_snapshot(&snapshot).await;

    let response = app.get("/invoices/FACT-2023-0001/document").await;
    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("no line items"));
}

#[tokio::test]
async fn invoice_whose_client_was_deleted_is_not_found() {
    let app = TestApp::spawn().await;

    let response = app.delete("/clients/4").await;
    assert_eq!(response.status(), 204);

    let response = app.get("/invoices/FACT-2023-0007/document").await;
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn concurrent_downloads_never_fail_unexpectedly() {
    let app = TestApp::spawn().await;

    let (first, second) = tokio::join!(
        app.get("/invoices/FACT-2023-0002/document"),
        app.get("/invoices/FACT-2023-0002/document"),
    );
    let statuses = [first.status().as_u16(), second.status().as_u16()];

    assert!(statuses.iter().all(|s| *s == 200 || *s == 409), "{:?}", statuses);
    assert!(statuses.contains(&200));
}
