// Adapters layer: concrete content repositories behind the ContentRepository port.

pub mod graphql;
pub mod memory;

pub use graphql::GraphQlRepository;
pub use memory::InMemoryRepository;
