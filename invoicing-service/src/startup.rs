//! Application startup and lifecycle management.

use crate::config::InvoicingConfig;
use crate::documents::DocumentGenerator;
use crate::handlers;
use crate::services::metrics::ERRORS_TOTAL;
use crate::services::{
    get_metrics, init_metrics, Clock, DomainStore, FileSnapshotStore, SnapshotStore, SystemClock,
};
use axum::{
    extract::Request,
    http::{header, HeaderValue, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: InvoicingConfig,
    pub store: Arc<RwLock<DomainStore>>,
    pub documents: DocumentGenerator,
}

/// Metrics endpoint for Prometheus scraping.
async fn metrics_handler() -> impl IntoResponse {
    let metrics = get_metrics();
    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        metrics,
    )
}

/// Count failed requests by status code.
async fn error_metrics(request: Request, next: Next) -> Response {
    let response = next.run(request).await;
    let status = response.status();
    if status.is_client_error() || status.is_server_error() {
        ERRORS_TOTAL
            .with_label_values(&[status.as_str()])
            .inc();
    }
    response
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(origin = %origin, error = %e, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE])
        .expose_headers([header::CONTENT_DISPOSITION])
}

pub fn router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.allowed_origins);

    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/metrics", get(metrics_handler))
        .route(
            "/products",
            get(handlers::list_products).post(handlers::create_product),
        )
        .route(
            "/products/:id",
            get(handlers::get_product)
                .patch(handlers::update_product)
                .delete(handlers::delete_product),
        )
        .route(
            "/products/:id/toggle-status",
            post(handlers::toggle_product_status),
        )
        .route(
            "/clients",
            get(handlers::list_clients).post(handlers::create_client),
        )
        .route(
            "/clients/:id",
            get(handlers::get_client)
                .patch(handlers::update_client)
                .delete(handlers::delete_client),
        )
        .route(
            "/clients/:id/toggle-status",
            post(handlers::toggle_client_status),
        )
        .route(
            "/invoices",
            get(handlers::list_invoices).post(handlers::create_invoice),
        )
        .route(
            "/invoices/:id",
            get(handlers::get_invoice).patch(handlers::update_invoice),
        )
        .route("/invoices/:id/pay", post(handlers::pay_invoice))
        .route(
            "/invoices/:id/document",
            get(handlers::download_invoice_document),
        )
        .route(
            "/collections",
            get(handlers::list_collections).post(handlers::schedule_collection),
        )
        .route(
            "/collections/:id/process",
            post(handlers::process_collection),
        )
        .route("/dashboard", get(handlers::dashboard))
        .route("/reports/fiscal", get(handlers::fiscal_report))
        .layer(middleware::from_fn(error_metrics))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    state: AppState,
}

impl Application {
    /// Build the application with the file-backed snapshot store and the system clock.
    pub async fn build(config: InvoicingConfig) -> Result<Self, AppError> {
        let persistence: Arc<dyn SnapshotStore> = Arc::new(
            FileSnapshotStore::new(&config.storage.snapshot_dir, &config.storage.snapshot_key)
                .await
                .map_err(|e| {
                    tracing::error!(
                        error = %e,
                        snapshot_dir = %config.storage.snapshot_dir,
                        "Failed to initialize snapshot storage"
                    );
                    e
                })?,
        );
        Self::build_with(config, persistence, Arc::new(SystemClock)).await
    }

    /// Build the application with an explicit persistence port and clock.
    pub async fn build_with(
        config: InvoicingConfig,
        persistence: Arc<dyn SnapshotStore>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, AppError> {
        init_metrics();

        let store = DomainStore::open(persistence, clock, config.numbering.clone()).await;

        let state = AppState {
            config: config.clone(),
            store: Arc::new(RwLock::new(store)),
            documents: DocumentGenerator::new(),
        };

        let addr: SocketAddr = config.common.bind_address().parse().map_err(|e| {
            AppError::ConfigError(anyhow::anyhow!(
                "Invalid bind address {}: {}",
                config.common.bind_address(),
                e
            ))
        })?;
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!(error = %e, %addr, "Failed to bind HTTP listener");
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!(port = port, "HTTP server listening");

        Ok(Self {
            port,
            listener,
            state,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        let app = router(self.state);
        axum::serve(self.listener, app).await
    }
}
