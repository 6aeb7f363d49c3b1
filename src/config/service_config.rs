use crate::core::ConfigProvider;
use crate::domain::query::DEFAULT_MAX_PAGE_SIZE;
use crate::utils::error::{ListingError, Result};
use crate::utils::validation::{
    redact_credentials, validate_non_empty_string, validate_range, validate_required_field,
    validate_socket_addr, validate_url, Validate, DATABASE_URL_SCHEMES,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const DATABASE_URL_ENV: &str = "MONGODB_URI";
pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:3000";
pub const DEFAULT_DATABASE_NAME: &str = "real_estate";
pub const DEFAULT_COLLECTION: &str = "listings";
const MAX_PAGE_SIZE_CEILING: usize = 1000;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Mongo,
    Memory,
}

impl fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreBackend::Mongo => f.write_str("mongo"),
            StoreBackend::Memory => f.write_str("memory"),
        }
    }
}

impl FromStr for StoreBackend {
    type Err = ListingError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mongo" | "mongodb" => Ok(StoreBackend::Mongo),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(ListingError::InvalidConfigValueError {
                field: "database.backend".to_string(),
                value: other.to_string(),
                reason: "Valid backends: mongo, memory".to_string(),
            }),
        }
    }
}

/// Fully resolved runtime settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    pub listen_addr: String,
    pub backend: StoreBackend,
    pub database_url: Option<String>,
    pub database_name: String,
    pub collection: String,
    pub max_page_size: usize,
    pub cors_enabled: bool,
    pub json_logs: bool,
    pub verbose: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            listen_addr: DEFAULT_LISTEN_ADDR.to_string(),
            backend: StoreBackend::default(),
            database_url: None,
            database_name: DEFAULT_DATABASE_NAME.to_string(),
            collection: DEFAULT_COLLECTION.to_string(),
            max_page_size: DEFAULT_MAX_PAGE_SIZE,
            cors_enabled: false,
            json_logs: false,
            verbose: false,
        }
    }
}

impl ServiceConfig {
    /// Fills the connection string from the environment when nothing else supplied one.
    pub fn with_env_fallback<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if self.database_url.is_none() {
            self.database_url = lookup(DATABASE_URL_ENV).filter(|v| !v.trim().is_empty());
        }
        self
    }

    /// Connection string with any password masked, for logging.
    pub fn database_url_for_display(&self) -> String {
        self.database_url
            .as_deref()
            .map(redact_credentials)
            .unwrap_or_else(|| "<unset>".to_string())
    }
}

impl ConfigProvider for ServiceConfig {
    fn database_url(&self) -> Option<&str> {
        self.database_url.as_deref()
    }

    fn database_name(&self) -> &str {
        &self.database_name
    }

    fn collection(&self) -> &str {
        &self.collection
    }

    fn max_page_size(&self) -> usize {
        self.max_page_size
    }
}

impl Validate for ServiceConfig {
    fn validate(&self) -> Result<()> {
        validate_socket_addr("server.listen_addr", &self.listen_addr)?;
        validate_range("query.max_page_size", self.max_page_size, 1, MAX_PAGE_SIZE_CEILING)?;

        if self.backend == StoreBackend::Mongo {
            // 連線字串缺失屬於啟動錯誤，不應延遲到第一個請求
            let url = validate_required_field("database.url", &self.database_url)?;
            validate_url("database.url", url, DATABASE_URL_SCHEMES)?;
            validate_non_empty_string("database.name", &self.database_name)?;
            validate_non_empty_string("database.collection", &self.collection)?;
        }

        tracing::debug!("✅ Service configuration validation passed");
        Ok(())
    }
}
