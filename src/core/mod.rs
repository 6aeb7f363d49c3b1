pub mod service;

pub use crate::domain::model::{Listing, ListingId, ListingUpdate, NewListing};
pub use crate::domain::ports::{ConfigProvider, ListingStore};
pub use crate::domain::query::{ListingQuery, ListingQueryParams, SortOrder};
pub use crate::utils::error::Result;
pub use service::ListingService;
