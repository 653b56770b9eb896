pub mod clients;
pub mod collections;
pub mod health;
pub mod invoices;
pub mod products;
pub mod reports;

pub use clients::{
    create_client, delete_client, get_client, list_clients, toggle_client_status, update_client,
};
pub use collections::{list_collections, process_collection, schedule_collection};
pub use health::health_check;
pub use invoices::{
    create_invoice, download_invoice_document, get_invoice, list_invoices, pay_invoice,
    update_invoice,
};
pub use products::{
    create_product, delete_product, get_product, list_products, toggle_product_status,
    update_product,
};
pub use reports::{dashboard, fiscal_report};

use serde::Deserialize;

/// `?search=` on catalogue and client listings.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub search: Option<String>,
}

/// `?status=` on invoice and collection listings.
#[derive(Debug, Default, Deserialize)]
pub struct StatusParams {
    pub status: Option<String>,
}
