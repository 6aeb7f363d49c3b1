use crate::core::{ListingStore, Result};
use crate::domain::model::{Listing, ListingId, ListingUpdate, NewListing};
use crate::domain::query::{ListingQuery, ListingQueryParams, DEFAULT_MAX_PAGE_SIZE};
use crate::utils::error::{ErrorCategory, ListingError};
use crate::utils::validation::Validate;
use std::sync::Arc;

/// Entry point for every listing operation. Validates input, normalises queries and
/// delegates persistence to the configured store.
#[derive(Clone)]
pub struct ListingService {
    store: Arc<dyn ListingStore>,
    max_page_size: usize,
}

impl ListingService {
    pub fn new(store: Arc<dyn ListingStore>) -> Self {
        Self {
            store,
            max_page_size: DEFAULT_MAX_PAGE_SIZE,
        }
    }

    pub fn with_max_page_size(mut self, max_page_size: usize) -> Self {
        self.max_page_size = max_page_size.max(1);
        self
    }

    pub fn backend_name(&self) -> &'static str {
        self.store.backend_name()
    }

    pub async fn create(&self, candidate: NewListing) -> Result<ListingId> {
        candidate.validate()?;
        let unit_name = candidate.unit_name.clone();

        match self.store.create(candidate).await {
            Ok(id) => {
                tracing::info!("🏠 Created listing {} ({})", id, unit_name);
                Ok(id)
            }
            Err(e) => Err(log_failure("create", e)),
        }
    }

    pub async fn update(&self, id: &ListingId, fields: ListingUpdate) -> Result<ListingId> {
        fields.validate()?;

        match self.store.update_by_id(id, &fields).await {
            Ok(id) => {
                tracing::info!("✏️ Updated listing {}", id);
                Ok(id)
            }
            Err(e) => Err(log_failure("update", e)),
        }
    }

    pub async fn delete(&self, id: &ListingId) -> Result<()> {
        match self.store.delete_by_id(id).await {
            Ok(()) => {
                tracing::info!("🗑️ Deleted listing {}", id);
                Ok(())
            }
            Err(e) => Err(log_failure("delete", e)),
        }
    }

    pub async fn find_by_id(&self, id: &ListingId) -> Result<Option<Listing>> {
        self.store
            .find_by_id(id)
            .await
            .map_err(|e| log_failure("find", e))
    }

    /// Like `find_by_id`, but a missing listing is an error.
    pub async fn get(&self, id: &ListingId) -> Result<Listing> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| ListingError::NotFound { id: id.to_string() })
    }

    pub async fn search(&self, params: &ListingQueryParams) -> Result<Vec<Listing>> {
        let query = ListingQuery::from_params(params, self.max_page_size);
        self.query(&query).await
    }

    /// Runs a typed query. The page limit is normalised against `max_page_size` first.
    pub async fn query(&self, query: &ListingQuery) -> Result<Vec<Listing>> {
        let query = query.clone().bounded(self.max_page_size);
        tracing::debug!(
            "Listing query: search={:?} start={} limit={} order={}",
            query.search,
            query.start_index,
            query.limit,
            query.order.as_str()
        );

        let page = self
            .store
            .query(&query)
            .await
            .map_err(|e| log_failure("query", e))?;

        tracing::debug!("Listing query returned {} records", page.len());
        Ok(page)
    }
}

fn log_failure(operation: &str, err: ListingError) -> ListingError {
    match err.category() {
        ErrorCategory::Conflict | ErrorCategory::NotFound | ErrorCategory::Validation => {
            tracing::warn!("⚠️ Listing {} rejected: {}", operation, err);
        }
        category => {
            tracing::error!(
                "❌ Listing {} failed: {} (Category: {:?}, Severity: {:?})",
                operation,
                err,
                category,
                err.severity()
            );
        }
    }
    err
}
