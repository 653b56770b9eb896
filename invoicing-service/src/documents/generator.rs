//! Invoice document generation with one render in flight per invoice.

use super::layout::lay_out;
use super::payload::InvoiceDocument;
use super::render::render;
use super::DocumentError;
use crate::services::metrics::{DOCUMENTS_TOTAL, DOCUMENT_RENDER_DURATION};
use chrono::NaiveDateTime;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;
use tracing::{error, info, warn};

pub const PDF_CONTENT_TYPE: &str = "application/pdf";

/// A rendered document ready for download.
#[derive(Debug, Clone)]
pub struct DocumentArtifact {
    pub filename: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
    pub page_count: usize,
}

/// Renders invoice documents, allowing one generation in flight per invoice.
#[derive(Debug, Clone, Default)]
pub struct DocumentGenerator {
    in_flight: Arc<DashMap<String, ()>>,
}

/// Holds an invoice's generation slot until dropped.
struct Slot {
    in_flight: Arc<DashMap<String, ()>>,
    invoice_number: String,
}

impl Drop for Slot {
    fn drop(&mut self) {
        self.in_flight.remove(&self.invoice_number);
    }
}

impl DocumentGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_busy(&self, invoice_number: &str) -> bool {
        self.in_flight.contains_key(invoice_number)
    }

    fn acquire(&self, invoice_number: &str) -> Result<Slot, DocumentError> {
        match self.in_flight.entry(invoice_number.to_string()) {
            Entry::Occupied(_) => Err(DocumentError::InProgress(invoice_number.to_string())),
            Entry::Vacant(entry) => {
                entry.insert(());
                Ok(Slot {
                    in_flight: Arc::clone(&self.in_flight),
                    invoice_number: invoice_number.to_string(),
                })
            }
        }
    }

    /// Validate, lay out and render `document`. Nothing is rendered when
    /// validation fails, and a second request for an invoice that is still
    /// being generated is rejected.
    pub async fn generate(
        &self,
        document: InvoiceDocument,
        generated_at: NaiveDateTime,
    ) -> Result<DocumentArtifact, DocumentError> {
        if let Err(e) = document.validate() {
            error!(
                invoice_number = %document.invoice_number,
                error = %e,
                "Invoice document rejected"
            );
            DOCUMENTS_TOTAL.with_label_values(&[e.outcome()]).inc();
            return Err(e);
        }

        let invoice_number = document.invoice_number.clone();
        let _slot = match self.acquire(&invoice_number) {
            Ok(slot) => slot,
            Err(e) => {
                warn!(invoice_number = %invoice_number, "Invoice document already in progress");
                DOCUMENTS_TOTAL.with_label_values(&[e.outcome()]).inc();
                return Err(e);
            }
        };

        let filename = document.filename();
        let timer = DOCUMENT_RENDER_DURATION.start_timer();
        let rendered = tokio::task::spawn_blocking(move || {
            let layout = lay_out(&document, generated_at);
            let page_count = layout.pages.len();
            render(&layout).map(|bytes| (bytes, page_count))
        })
        .await
        .map_err(|e| DocumentError::Render(format!("Render task failed: {}", e)))
        .and_then(|result| result);
        timer.observe_duration();

        match rendered {
            Ok((bytes, page_count)) => {
                info!(
                    invoice_number = %invoice_number,
                    filename = %filename,
                    page_count = page_count,
                    size_bytes = bytes.len(),
                    "Invoice document generated"
                );
                DOCUMENTS_TOTAL.with_label_values(&["generated"]).inc();
                Ok(DocumentArtifact {
                    filename,
                    content_type: PDF_CONTENT_TYPE,
                    bytes,
                    page_count,
                })
            }
            Err(e) => {
                error!(
                    invoice_number = %invoice_number,
                    error = %e,
                    "Invoice document generation failed"
                );
                DOCUMENTS_TOTAL.with_label_values(&[e.outcome()]).inc();
                Err(e)
            }
        }
    }
}
