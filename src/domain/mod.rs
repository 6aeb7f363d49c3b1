// Domain layer: listing model, query contract and ports. Adapters implement the ports.

pub mod model;
pub mod ports;
pub mod query;
