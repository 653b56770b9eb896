//! Services module for invoicing-service.

pub mod alerts;
pub mod analytics;
pub mod clock;
pub mod metrics;
pub mod persistence;
pub mod seed;
pub mod store;

pub use alerts::{Alert, AlertKind, AlertPriority};
pub use analytics::{DashboardSummary, FiscalSummary, InvoiceOverview, UpcomingCollection};
pub use clock::{Clock, FixedClock, SystemClock};
pub use metrics::{get_metrics, init_metrics};
pub use persistence::{FileSnapshotStore, MemorySnapshotStore, SnapshotStore};
pub use store::DomainStore;
