// Adapters layer: concrete implementations of the domain ports (storage back-ends, HTTP surface).

pub mod http;
pub mod memory;
pub mod mongo;

pub use memory::InMemoryListingStore;
pub use mongo::MongoListingStore;
