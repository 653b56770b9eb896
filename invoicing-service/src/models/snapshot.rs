//! The persisted state: every collection plus id sequences.

use super::{Client, Collection, Invoice, Product};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Monotonic id counters, persisted with the data they number.
///
/// Counters only move forward, so deleting the newest record never frees
/// its id for reuse.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sequences {
    #[serde(default)]
    pub products: u64,
    #[serde(default)]
    pub clients: u64,
    /// Last issued number per `<PREFIX>-<YEAR>` series.
    #[serde(default)]
    pub documents: BTreeMap<String, u32>,
}

impl Sequences {
    pub fn next_product_id(&mut self) -> String {
        self.products += 1;
        self.products.to_string()
    }

    pub fn next_client_id(&mut self) -> String {
        self.clients += 1;
        self.clients.to_string()
    }

    /// Next `<PREFIX>-<YEAR>-<NNNN>` id in its series.
    pub fn next_document_id(&mut self, prefix: &str, year: i32) -> String {
        let series = format!("{}-{}", prefix, year);
        let counter = self.documents.entry(series.clone()).or_insert(0);
        *counter += 1;
        format!("{}-{:04}", series, counter)
    }

    fn observe_numeric(counter: &mut u64, id: &str) {
        if let Ok(n) = id.parse::<u64>() {
            *counter = (*counter).max(n);
        }
    }

    fn observe_document(&mut self, id: &str) {
        if let Some((series, number)) = id.rsplit_once('-') {
            if let Ok(n) = number.parse::<u32>() {
                let counter = self.documents.entry(series.to_string()).or_insert(0);
                *counter = (*counter).max(n);
            }
        }
    }
}

/// Entire application state, saved and loaded as one document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub products: Vec<Product>,
    pub clients: Vec<Client>,
    pub invoices: Vec<Invoice>,
    pub collections: Vec<Collection>,
    #[serde(default)]
    pub sequences: Sequences,
}

impl Snapshot {
    /// Raise every counter to at least the largest id already present.
    ///
    /// Snapshots written without counters get them rebuilt here.
    pub fn reconcile_sequences(&mut self) {
        let mut sequences = std::mem::take(&mut self.sequences);
        for product in &self.products {
            Sequences::observe_numeric(&mut sequences.products, &product.id);
        }
        for client in &self.clients {
            Sequences::observe_numeric(&mut sequences.clients, &client.id);
        }
        for invoice in &self.invoices {
            sequences.observe_document(&invoice.id);
        }
        for collection in &self.collections {
            sequences.observe_document(&collection.id);
        }
        self.sequences = sequences;
    }

    pub fn product(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    pub fn client(&self, id: &str) -> Option<&Client> {
        self.clients.iter().find(|c| c.id == id)
    }

    pub fn client_by_name(&self, name: &str) -> Option<&Client> {
        self.clients.iter().find(|c| c.name == name)
    }

    pub fn invoice(&self, id: &str) -> Option<&Invoice> {
        self.invoices.iter().find(|i| i.id == id)
    }

    pub fn collection(&self, id: &str) -> Option<&Collection> {
        self.collections.iter().find(|c| c.id == id)
    }
}
