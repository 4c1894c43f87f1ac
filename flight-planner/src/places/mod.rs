//! Airport lookup and neighbour discovery on top of the places service.

mod discovery;
mod error;
mod resolver;

pub use discovery::{DiscoveryConfig, NeighborDiscovery};
pub use error::PlaceError;
pub use resolver::PlaceResolver;
