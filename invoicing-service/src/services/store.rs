//! Domain store: the single owner of products, clients, invoices and collections.
//!
//! Every mutation is applied to a copy of the snapshot, saved through the
//! persistence port, and only then becomes the current state. A failed save
//! leaves the in-memory state as it was.

use crate::config::NumberingConfig;
use crate::models::{
    due_date_for, money, Client, Collection, CollectionStatus, EffectiveStatus, Invoice,
    InvoiceDraft, InvoiceStatus, InvoiceTotals, LineItem, NewClient, NewCollection, NewProduct,
    Product, Snapshot, UpdateClient, UpdateInvoice, UpdateProduct,
};
use crate::services::analytics::{self, InvoiceOverview};
use crate::services::clock::Clock;
use crate::services::metrics::{SNAPSHOT_LOAD_FALLBACKS, STORE_MUTATIONS_TOTAL};
use crate::services::persistence::SnapshotStore;
use crate::services::seed;
use chrono::{Datelike, NaiveDate};
use service_core::error::AppError;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use validator::Validate;

pub struct DomainStore {
    snapshot: Snapshot,
    persistence: Arc<dyn SnapshotStore>,
    clock: Arc<dyn Clock>,
    numbering: NumberingConfig,
}

fn not_found(entity: &str, id: &str) -> AppError {
    AppError::NotFound(anyhow::anyhow!("{} {} not found", entity, id))
}

/// Invoices and collections refer to clients by name, so names must be unique.
fn ensure_unique_client_name(
    snapshot: &Snapshot,
    name: &str,
    except_id: Option<&str>,
) -> Result<(), AppError> {
    let taken = snapshot
        .clients
        .iter()
        .any(|c| Some(c.id.as_str()) != except_id && c.name.trim() == name);
    if taken {
        return Err(AppError::Conflict(anyhow::anyhow!(
            "A client named {} already exists",
            name
        )));
    }
    Ok(())
}

fn search_needle(search: Option<&str>) -> Option<String> {
    search
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
}

impl DomainStore {
    /// Load the stored snapshot, falling back to seed data when it is
    /// missing, unreadable or structurally incompatible.
    pub async fn open(
        persistence: Arc<dyn SnapshotStore>,
        clock: Arc<dyn Clock>,
        numbering: NumberingConfig,
    ) -> Self {
        let mut snapshot = match persistence.load().await {
            Ok(Some(blob)) => match serde_json::from_str::<Snapshot>(&blob) {
                Ok(snapshot) => {
                    info!(
                        products = snapshot.products.len(),
                        clients = snapshot.clients.len(),
                        invoices = snapshot.invoices.len(),
                        collections = snapshot.collections.len(),
                        "Loaded stored snapshot"
                    );
                    snapshot
                }
                Err(e) => {
                    warn!(error = %e, "Stored snapshot is incompatible, using seed data");
                    SNAPSHOT_LOAD_FALLBACKS.inc();
                    seed::snapshot()
                }
            },
            Ok(None) => {
                info!("No stored snapshot, using seed data");
                seed::snapshot()
            }
            Err(e) => {
                warn!(error = %e, "Failed to read stored snapshot, using seed data");
                SNAPSHOT_LOAD_FALLBACKS.inc();
                seed::snapshot()
            }
        };
        snapshot.reconcile_sequences();

        Self {
            snapshot,
            persistence,
            clock,
            numbering,
        }
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub fn clock(&self) -> Arc<dyn Clock> {
        Arc::clone(&self.clock)
    }

    async fn commit(
        &mut self,
        next: Snapshot,
        entity: &'static str,
        operation: &'static str,
    ) -> Result<(), AppError> {
        let blob = serde_json::to_string(&next).map_err(|e| {
            AppError::InternalError(anyhow::anyhow!("Failed to serialize snapshot: {}", e))
        })?;
        self.persistence.save(&blob).await?;
        self.snapshot = next;
        STORE_MUTATIONS_TOTAL
            .with_label_values(&[entity, operation])
            .inc();
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Products
    // -------------------------------------------------------------------------

    /// Products whose name or description contains `search` (case-insensitive).
    pub fn list_products(&self, search: Option<&str>) -> Vec<Product> {
        let needle = search_needle(search);
        self.snapshot
            .products
            .iter()
            .filter(|p| needle.as_deref().is_none_or(|n| p.matches(n)))
            .cloned()
            .collect()
    }

    pub fn product(&self, id: &str) -> Result<Product, AppError> {
        self.snapshot
            .product(id)
            .cloned()
            .ok_or_else(|| not_found("Product", id))
    }

    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn add_product(&mut self, input: NewProduct) -> Result<Product, AppError> {
        input.validate()?;

        let mut next = self.snapshot.clone();
        let product = Product {
            id: next.sequences.next_product_id(),
            name: input.name.trim().to_string(),
            description: input.description,
            price: input.price,
            kind: input.kind,
            status: input.status,
        };
        next.products.push(product.clone());
        self.commit(next, "product", "create").await?;

        info!(product_id = %product.id, "Product created");
        Ok(product)
    }

    #[instrument(skip(self, patch))]
    pub async fn update_product(
        &mut self,
        id: &str,
        patch: UpdateProduct,
    ) -> Result<Product, AppError> {
        patch.validate()?;

        let mut next = self.snapshot.clone();
        let product = next
            .products
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| not_found("Product", id))?;
        patch.apply_to(product);
        let product = product.clone();
        self.commit(next, "product", "update").await?;

        info!(product_id = %id, "Product updated");
        Ok(product)
    }

    #[instrument(skip(self))]
    pub async fn delete_product(&mut self, id: &str) -> Result<Product, AppError> {
        let mut next = self.snapshot.clone();
        let index = next
            .products
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| not_found("Product", id))?;
        let removed = next.products.remove(index);
        self.commit(next, "product", "delete").await?;

        info!(product_id = %id, "Product deleted");
        Ok(removed)
    }

    #[instrument(skip(self))]
    pub async fn toggle_product_status(&mut self, id: &str) -> Result<Product, AppError> {
        let mut next = self.snapshot.clone();
        let product = next
            .products
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| not_found("Product", id))?;
        product.status = product.status.toggled();
        let product = product.clone();
        self.commit(next, "product", "toggle_status").await?;

        info!(product_id = %id, status = product.status.as_str(), "Product status changed");
        Ok(product)
    }

    // -------------------------------------------------------------------------
    // Clients
    // -------------------------------------------------------------------------

    /// Clients whose name, contact, email or location contains `search`.
    pub fn list_clients(&self, search: Option<&str>) -> Vec<Client> {
        let needle = search_needle(search);
        self.snapshot
            .clients
            .iter()
            .filter(|c| needle.as_deref().is_none_or(|n| c.matches(n)))
            .cloned()
            .collect()
    }

    pub fn client(&self, id: &str) -> Result<Client, AppError> {
        self.snapshot
            .client(id)
            .cloned()
            .ok_or_else(|| not_found("Client", id))
    }

    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn add_client(&mut self, input: NewClient) -> Result<Client, AppError> {
        input.validate()?;
        ensure_unique_client_name(&self.snapshot, input.name.trim(), None)?;

        let mut next = self.snapshot.clone();
        let client = Client {
            id: next.sequences.next_client_id(),
            name: input.name.trim().to_string(),
            contact: input.contact,
            email: input.email,
            phone: input.phone,
            location: input.location,
            status: input.status,
            invoice_count: 0,
        };
        next.clients.push(client.clone());
        self.commit(next, "client", "create").await?;

        info!(client_id = %client.id, "Client created");
        Ok(client)
    }

    /// Update a client. A new name is copied onto the client's invoices and
    /// collections, which store the name rather than the id.
    #[instrument(skip(self, patch))]
    pub async fn update_client(
        &mut self,
        id: &str,
        patch: UpdateClient,
    ) -> Result<Client, AppError> {
        patch.validate()?;
        if let Some(name) = &patch.name {
            ensure_unique_client_name(&self.snapshot, name.trim(), Some(id))?;
        }

        let mut next = self.snapshot.clone();
        let client = next
            .clients
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| not_found("Client", id))?;
        let previous_name = client.name.clone();
        patch.apply_to(client);
        let client = client.clone();

        if client.name != previous_name {
            let mut renamed = 0usize;
            for invoice in next.invoices.iter_mut().filter(|i| i.client == previous_name) {
                invoice.client = client.name.clone();
                renamed += 1;
            }
            for collection in next
                .collections
                .iter_mut()
                .filter(|c| c.client == previous_name)
            {
                collection.client = client.name.clone();
            }
            info!(
                client_id = %id,
                invoices = renamed,
                "Propagated client rename"
            );
        }

        self.commit(next, "client", "update").await?;

        info!(client_id = %id, "Client updated");
        Ok(client)
    }

    #[instrument(skip(self))]
    pub async fn delete_client(&mut self, id: &str) -> Result<Client, AppError> {
        let mut next = self.snapshot.clone();
        let index = next
            .clients
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| not_found("Client", id))?;
        let removed = next.clients.remove(index);
        self.commit(next, "client", "delete").await?;

        info!(client_id = %id, "Client deleted");
        Ok(removed)
    }

    #[instrument(skip(self))]
    pub async fn toggle_client_status(&mut self, id: &str) -> Result<Client, AppError> {
        let mut next = self.snapshot.clone();
        let client = next
            .clients
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| not_found("Client", id))?;
        client.status = client.status.toggled();
        let client = client.clone();
        self.commit(next, "client", "toggle_status").await?;

        info!(client_id = %id, status = client.status.as_str(), "Client status changed");
        Ok(client)
    }

    // -------------------------------------------------------------------------
    // Invoices
    // -------------------------------------------------------------------------

    /// Invoices, optionally only those with the given status as of today.
    pub fn list_invoices(&self, status: Option<EffectiveStatus>) -> Vec<Invoice> {
        let today = self.today();
        self.snapshot
            .invoices
            .iter()
            .filter(|i| status.is_none_or(|s| i.effective_status(today) == s))
            .cloned()
            .collect()
    }

    pub fn invoice(&self, id: &str) -> Result<Invoice, AppError> {
        self.snapshot
            .invoice(id)
            .cloned()
            .ok_or_else(|| not_found("Invoice", id))
    }

    pub fn recent_invoices(&self, limit: usize) -> Vec<InvoiceOverview> {
        analytics::recent_invoices(&self.snapshot, self.today(), limit)
    }

    /// Issue an invoice from a draft priced against the catalogue.
    #[instrument(skip(self, draft), fields(client_id = %draft.client_id))]
    pub async fn create_invoice(&mut self, draft: InvoiceDraft) -> Result<Invoice, AppError> {
        draft.validate()?;

        let client = self
            .snapshot
            .client(&draft.client_id)
            .ok_or_else(|| not_found("Client", &draft.client_id))?;
        if !client.status.is_active() {
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "Client {} is inactive",
                client.name
            )));
        }
        let client_name = client.name.clone();

        let mut items = Vec::with_capacity(draft.lines.len());
        for line in &draft.lines {
            let product = self
                .snapshot
                .product(&line.product_id)
                .ok_or_else(|| not_found("Product", &line.product_id))?;
            if !product.status.is_active() {
                return Err(AppError::BadRequest(anyhow::anyhow!(
                    "Product {} is inactive",
                    product.name
                )));
            }
            items.push(LineItem::new(
                product.name.clone(),
                line.quantity,
                product.price,
            ));
        }

        let totals = InvoiceTotals::from_items(&items);
        let year = self.today().year();

        let mut next = self.snapshot.clone();
        let invoice = Invoice {
            id: next
                .sequences
                .next_document_id(&self.numbering.invoice_prefix, year),
            client: client_name,
            issue_date: draft.issue_date,
            due_date: due_date_for(draft.issue_date),
            amount: money::format_currency(totals.total),
            status: InvoiceStatus::Pending,
            items,
            notes: draft.notes.filter(|n| !n.trim().is_empty()),
        };
        next.invoices.push(invoice.clone());
        if let Some(client) = next.clients.iter_mut().find(|c| c.id == draft.client_id) {
            client.invoice_count += 1;
        }
        self.commit(next, "invoice", "create").await?;

        info!(
            invoice_id = %invoice.id,
            amount = %invoice.amount,
            lines = invoice.items.len(),
            "Invoice created"
        );
        Ok(invoice)
    }

    #[instrument(skip(self, patch))]
    pub async fn update_invoice(
        &mut self,
        id: &str,
        patch: UpdateInvoice,
    ) -> Result<Invoice, AppError> {
        patch.validate()?;

        let mut next = self.snapshot.clone();
        let invoice = next
            .invoices
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or_else(|| not_found("Invoice", id))?;
        patch.apply_to(invoice);
        let invoice = invoice.clone();
        self.commit(next, "invoice", "update").await?;

        info!(invoice_id = %id, "Invoice updated");
        Ok(invoice)
    }

    #[instrument(skip(self))]
    pub async fn mark_invoice_paid(&mut self, id: &str) -> Result<Invoice, AppError> {
        let mut next = self.snapshot.clone();
        let invoice = next
            .invoices
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or_else(|| not_found("Invoice", id))?;
        invoice.status = InvoiceStatus::Paid;
        let invoice = invoice.clone();
        self.commit(next, "invoice", "mark_paid").await?;

        info!(invoice_id = %id, "Invoice marked as paid");
        Ok(invoice)
    }

    // -------------------------------------------------------------------------
    // Collections
    // -------------------------------------------------------------------------

    pub fn list_collections(&self, status: Option<CollectionStatus>) -> Vec<Collection> {
        self.snapshot
            .collections
            .iter()
            .filter(|c| status.is_none_or(|s| c.status == s))
            .cloned()
            .collect()
    }

    pub fn collection(&self, id: &str) -> Result<Collection, AppError> {
        self.snapshot
            .collection(id)
            .cloned()
            .ok_or_else(|| not_found("Collection", id))
    }

    /// Schedule a payment for an unpaid invoice. The amount is captured from
    /// the invoice's formatted amount now and is not kept in sync afterwards.
    #[instrument(skip(self, input), fields(invoice_id = %input.invoice_id))]
    pub async fn schedule_collection(
        &mut self,
        input: NewCollection,
    ) -> Result<Collection, AppError> {
        input.validate()?;

        let invoice = self
            .snapshot
            .invoice(&input.invoice_id)
            .ok_or_else(|| not_found("Invoice", &input.invoice_id))?;
        if invoice.status == InvoiceStatus::Paid {
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "Invoice {} is already paid",
                invoice.id
            )));
        }
        let amount = invoice.amount_value();
        let client = invoice.client.clone();
        let year = self.today().year();

        let mut next = self.snapshot.clone();
        let collection = Collection {
            id: next
                .sequences
                .next_document_id(&self.numbering.collection_prefix, year),
            invoice_id: input.invoice_id,
            client,
            amount,
            scheduled_date: input.scheduled_date,
            processed_date: None,
            status: CollectionStatus::Pending,
            payment_method: input.payment_method.trim().to_string(),
            reference: input.reference.filter(|r| !r.trim().is_empty()),
        };
        next.collections.push(collection.clone());
        self.commit(next, "collection", "create").await?;

        info!(
            collection_id = %collection.id,
            amount = %collection.amount,
            scheduled_date = %collection.scheduled_date,
            "Collection scheduled"
        );
        Ok(collection)
    }

    /// Mark a pending collection processed today. Amount and scheduled date
    /// are left untouched.
    #[instrument(skip(self))]
    pub async fn mark_collection_processed(&mut self, id: &str) -> Result<Collection, AppError> {
        let today = self.today();

        let mut next = self.snapshot.clone();
        let collection = next
            .collections
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| not_found("Collection", id))?;
        if !collection.is_pending() {
            return Err(AppError::Conflict(anyhow::anyhow!(
                "Collection {} was already processed",
                id
            )));
        }
        collection.status = CollectionStatus::Processed;
        collection.processed_date = Some(today);
        let collection = collection.clone();
        self.commit(next, "collection", "mark_processed").await?;

        info!(collection_id = %id, processed_date = %today, "Collection processed");
        Ok(collection)
    }
}
