// Application wiring: turns a resolved configuration into a ready service.

use crate::adapters::{InMemoryListingStore, MongoListingStore};
use crate::config::{ServiceConfig, StoreBackend};
use crate::core::{ConfigProvider, ListingService, ListingStore};
use crate::utils::error::{ListingError, Result};
use std::sync::Arc;

/// Opens the configured store once; the handle is shared by every request.
pub async fn connect_store(config: &ServiceConfig) -> Result<Arc<dyn ListingStore>> {
    match config.backend {
        StoreBackend::Memory => {
            tracing::warn!("Using the in-memory store; listings are lost on shutdown");
            Ok(Arc::new(InMemoryListingStore::new()))
        }
        StoreBackend::Mongo => {
            let url = config
                .database_url()
                .ok_or_else(|| ListingError::MissingConfigError {
                    field: "database.url".to_string(),
                })?;
            tracing::info!(
                "Connecting to MongoDB at {} (collection {}.{})",
                config.database_url_for_display(),
                config.database_name(),
                config.collection()
            );
            let store = MongoListingStore::connect(url, config.database_name(), config.collection()).await?;
            Ok(Arc::new(store))
        }
    }
}

pub async fn build_service(config: &ServiceConfig) -> Result<ListingService> {
    let store = connect_store(config).await?;
    Ok(ListingService::new(store).with_max_page_size(config.max_page_size()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_backend_builds_without_database() {
        let config = ServiceConfig {
            backend: StoreBackend::Memory,
            max_page_size: 3,
            ..Default::default()
        };
        let service = build_service(&config).await.unwrap();
        assert_eq!(service.backend_name(), "memory");
    }

    #[tokio::test]
    async fn test_mongo_backend_without_url_fails_at_startup() {
        let config = ServiceConfig::default();
        let err = build_service(&config).await.err().unwrap();
        assert!(matches!(err, ListingError::MissingConfigError { .. }));
    }
}
