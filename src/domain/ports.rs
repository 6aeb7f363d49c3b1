use crate::domain::model::{Listing, ListingId, ListingUpdate, NewListing};
use crate::domain::query::ListingQuery;
use crate::utils::error::Result;
use async_trait::async_trait;

/// Durable holder of listings. Implementations enforce `unitName` and `unitNumber`
/// uniqueness atomically with the write that would violate it.
#[async_trait]
pub trait ListingStore: Send + Sync {
    /// Fails with `DuplicateUnitName` before `DuplicateUnitNumber` when both collide.
    async fn create(&self, candidate: NewListing) -> Result<ListingId>;

    async fn update_by_id(&self, id: &ListingId, fields: &ListingUpdate) -> Result<ListingId>;

    async fn delete_by_id(&self, id: &ListingId) -> Result<()>;

    async fn find_by_id(&self, id: &ListingId) -> Result<Option<Listing>>;

    /// One ordered page of matching listings. No total count is produced.
    async fn query(&self, query: &ListingQuery) -> Result<Vec<Listing>>;

    fn backend_name(&self) -> &'static str;
}

pub trait ConfigProvider: Send + Sync {
    fn database_url(&self) -> Option<&str>;
    fn database_name(&self) -> &str;
    fn collection(&self) -> &str;
    fn max_page_size(&self) -> usize;
}
