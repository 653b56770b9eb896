//! Configuration module for invoicing-service.

use crate::documents::CompanyProfile;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;

#[derive(Debug, Clone)]
pub struct InvoicingConfig {
    pub common: core_config::Config,
    pub service_name: String,
    pub log_level: String,
    pub storage: StorageConfig,
    pub numbering: NumberingConfig,
    pub company: CompanyProfile,
    /// Notes printed on re-issued documents when the invoice has none.
    pub default_invoice_notes: String,
    /// Browser origins allowed to call the API.
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub snapshot_dir: String,
    pub snapshot_key: String,
}

/// Prefixes of generated document ids; the year comes from the clock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberingConfig {
    pub invoice_prefix: String,
    pub collection_prefix: String,
}

impl Default for NumberingConfig {
    fn default() -> Self {
        Self {
            invoice_prefix: "FACT".to_string(),
            collection_prefix: "COB".to_string(),
        }
    }
}

impl InvoicingConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let common = core_config::Config::load()?;
        let defaults = CompanyProfile::default();
        let numbering = NumberingConfig::default();

        let config = Self {
            common,
            service_name: env::var("SERVICE_NAME")
                .unwrap_or_else(|_| "invoicing-service".to_string()),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            storage: StorageConfig {
                snapshot_dir: env::var("SNAPSHOT_DIR").unwrap_or_else(|_| "data".to_string()),
                snapshot_key: env::var("SNAPSHOT_KEY")
                    .unwrap_or_else(|_| "invoicing-app-data".to_string()),
            },
            numbering: NumberingConfig {
                invoice_prefix: env::var("INVOICE_PREFIX").unwrap_or(numbering.invoice_prefix),
                collection_prefix: env::var("COLLECTION_PREFIX")
                    .unwrap_or(numbering.collection_prefix),
            },
            company: CompanyProfile {
                name: env::var("COMPANY_NAME").unwrap_or(defaults.name),
                tax_id: env::var("COMPANY_TAX_ID").unwrap_or(defaults.tax_id),
                address: env::var("COMPANY_ADDRESS").unwrap_or(defaults.address),
                phone: env::var("COMPANY_PHONE").unwrap_or(defaults.phone),
                email: env::var("COMPANY_EMAIL").unwrap_or(defaults.email),
            },
            default_invoice_notes: env::var("DEFAULT_INVOICE_NOTES").unwrap_or_else(|_| {
                "Thank you for your business. Payment due within 30 days.".to_string()
            }),
            allowed_origins: env::var("ALLOWED_ORIGINS")
                .unwrap_or_else(|_| "http://localhost:5173".to_string())
                .split(',')
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty())
                .collect(),
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), AppError> {
        for (key, value) in [
            ("INVOICE_PREFIX", &self.numbering.invoice_prefix),
            ("COLLECTION_PREFIX", &self.numbering.collection_prefix),
            ("SNAPSHOT_KEY", &self.storage.snapshot_key),
        ] {
            if value.trim().is_empty() {
                return Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} must not be empty",
                    key
                )));
            }
        }

        let key = &self.storage.snapshot_key;
        if key.contains(['/', '\\']) || key.contains("..") {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "SNAPSHOT_KEY must be a plain file name, got {}",
                key
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_key(key: &str) -> InvoicingConfig {
        InvoicingConfig {
            common: core_config::Config::default(),
            service_name: "invoicing-service".to_string(),
            log_level: "info".to_string(),
            storage: StorageConfig {
                snapshot_dir: "data".to_string(),
                snapshot_key: key.to_string(),
            },
            numbering: NumberingConfig::default(),
            company: CompanyProfile::default(),
            default_invoice_notes: String::new(),
            allowed_origins: Vec::new(),
        }
    }

    #[test]
    fn plain_snapshot_key_is_accepted() {
        assert!(config_with_key("invoicing-app-data").validate().is_ok());
    }

    #[test]
    fn snapshot_key_cannot_escape_the_snapshot_dir() {
        for key in ["../outside", "nested/key", "nested\\key", "..", "   "] {
            let err = config_with_key(key).validate().unwrap_err();
            assert!(matches!(err, AppError::ConfigError(_)), "{}", key);
        }
    }
}
