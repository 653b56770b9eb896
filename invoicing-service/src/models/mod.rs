//! Domain models for invoicing-service.

mod client;
mod collection;
mod invoice;
mod line_item;
pub mod money;
mod product;
mod record_status;
mod snapshot;
mod validation;

pub use client::{Client, NewClient, UpdateClient};
pub use collection::{Collection, CollectionStatus, NewCollection};
pub use invoice::{
    due_date_for, DraftLine, EffectiveStatus, Invoice, InvoiceDraft, InvoiceStatus,
    InvoiceTotals, UpdateInvoice, PAYMENT_TERMS_DAYS,
};
pub use line_item::{LineItem, LineItemInput};
pub use product::{NewProduct, Product, ProductKind, UpdateProduct};
pub use record_status::RecordStatus;
pub use snapshot::{Sequences, Snapshot};
