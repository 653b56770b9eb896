#![allow(dead_code)]

use chrono::NaiveDate;
use invoicing_service::config::{InvoicingConfig, NumberingConfig, StorageConfig};
use invoicing_service::documents::CompanyProfile;
use invoicing_service::models::Snapshot;
use invoicing_service::services::{
    FileSnapshotStore, FixedClock, MemorySnapshotStore, SnapshotStore,
};
use invoicing_service::startup::Application;
use service_core::config::Config as CoreConfig;
use std::sync::{Arc, Once};
use tempfile::TempDir;

/// Date the fixed test clock is stopped at. Against the seed data this
/// leaves three invoices overdue and one due in two days.
pub fn test_today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 6, 20).unwrap()
}

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

static TRACING: Once = Once::new();

/// Route service logs to the test harness when `RUST_LOG` is set.
pub fn init_test_tracing() {
    TRACING.call_once(|| {
        if std::env::var("RUST_LOG").is_ok() {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
                .with_test_writer()
                .try_init();
        }
    });
}

pub fn test_config(snapshot_dir: &str) -> InvoicingConfig {
    InvoicingConfig {
        common: CoreConfig {
            host: "127.0.0.1".to_string(),
            port: 0, // Random port for testing
        },
        service_name: "invoicing-service".to_string(),
        log_level: "info".to_string(),
        storage: StorageConfig {
            snapshot_dir: snapshot_dir.to_string(),
            snapshot_key: "invoicing-app-data".to_string(),
        },
        numbering: NumberingConfig::default(),
        company: CompanyProfile::default(),
        default_invoice_notes: "Payment due within 30 days.".to_string(),
        allowed_origins: vec!["http://localhost:5173".to_string()],
    }
}

pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub client: reqwest::Client,
    pub snapshot_dir: TempDir,
}

impl TestApp {
    /// Seeded app backed by a snapshot file in a temporary directory.
    pub async fn spawn() -> Self {
        let snapshot_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let config = test_config(&snapshot_dir.path().to_string_lossy());
        let persistence: Arc<dyn SnapshotStore> = Arc::new(
            FileSnapshotStore::new(snapshot_dir.path(), &config.storage.snapshot_key)
                .await
                .expect("Failed to create snapshot store"),
        );
        Self::spawn_with(config, persistence, snapshot_dir).await
    }

    /// App whose store starts from `snapshot` instead of the seed data.
    pub async fn spawn_with_snapshot(snapshot: &Snapshot) -> Self {
        let snapshot_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let config = test_config(&snapshot_dir.path().to_string_lossy());
        let blob = serde_json::to_string(snapshot).expect("Failed to serialize snapshot");
        let persistence: Arc<dyn SnapshotStore> = Arc::new(MemorySnapshotStore::with_blob(blob));
        Self::spawn_with(config, persistence, snapshot_dir).await
    }

    async fn spawn_with(
        config: InvoicingConfig,
        persistence: Arc<dyn SnapshotStore>,
        snapshot_dir: TempDir,
    ) -> Self {
        init_test_tracing();

        let app = Application::build_with(config, persistence, Arc::new(FixedClock::on(test_today())))
            .await
            .expect("Failed to build test application");

        let port = app.port();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for the server to be ready by polling the health endpoint
        let client = reqwest::Client::new();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        TestApp {
            address,
            port,
            client,
            snapshot_dir,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn post_json(&self, path: &str, body: &serde_json::Value) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn post(&self, path: &str) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn patch_json(&self, path: &str, body: &serde_json::Value) -> reqwest::Response {
        self.client
            .patch(self.url(path))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn delete(&self, path: &str) -> reqwest::Response {
        self.client
            .delete(self.url(path))
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Contents of the snapshot file written by the file-backed store.
    pub fn stored_snapshot(&self) -> Option<Snapshot> {
        let path = self.snapshot_dir.path().join("invoicing-app-data.json");
        let blob = std::fs::read_to_string(path).ok()?;
        Some(serde_json::from_str(&blob).expect("Stored snapshot is not valid"))
    }
}
