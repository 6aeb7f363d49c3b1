pub mod adapters;
pub mod app;
pub mod client;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::http::HttpServer;
pub use adapters::{InMemoryListingStore, MongoListingStore};
pub use client::ListingApiClient;
pub use config::{ServiceConfig, StoreBackend, TomlConfig};
pub use crate::core::{ListingService, ListingStore};
pub use domain::model::{Listing, ListingId, ListingUpdate, NewListing};
pub use domain::query::{ListingQuery, ListingQueryParams, SortOrder};
pub use utils::error::{ListingError, Result};
