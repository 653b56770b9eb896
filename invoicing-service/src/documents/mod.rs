//! Invoice document generation: payload checks, page layout and PDF rendering.

mod generator;
pub mod layout;
mod payload;
mod render;

pub use generator::{DocumentArtifact, DocumentGenerator, PDF_CONTENT_TYPE};
pub use payload::{BillTo, CompanyProfile, DocumentLine, InvoiceDocument};

use service_core::error::AppError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Invoice number is missing")]
    MissingInvoiceNumber,

    #[error("Invoice has no client")]
    MissingClient,

    #[error("Invoice has no line items")]
    NoLineItems,

    #[error("A document for invoice {0} is already being generated")]
    InProgress(String),

    #[error("Failed to render document: {0}")]
    Render(String),
}

impl DocumentError {
    /// Label for the documents metric.
    pub fn outcome(&self) -> &'static str {
        match self {
            DocumentError::MissingInvoiceNumber
            | DocumentError::MissingClient
            | DocumentError::NoLineItems => "rejected",
            DocumentError::InProgress(_) => "busy",
            DocumentError::Render(_) => "failed",
        }
    }
}

impl From<DocumentError> for AppError {
    fn from(err: DocumentError) -> Self {
        match err {
            DocumentError::InProgress(_) => AppError::Conflict(anyhow::Error::new(err)),
            DocumentError::Render(_) => AppError::InternalError(anyhow::Error::new(err)),
            _ => AppError::BadRequest(anyhow::Error::new(err)),
        }
    }
}

#[cfg(test)]
pub(crate) fn sample_document() -> InvoiceDocument {
    let snapshot = crate::services::seed::snapshot();
    let invoice = snapshot.invoice("FACT-2023-0001").unwrap();
    let client = snapshot.client_by_name(&invoice.client).unwrap();
    InvoiceDocument::from_invoice(invoice, client, &CompanyProfile::default(), "")
}
