//! Relational datasource metadata introspection.
//!
//! Answers fixed structural questions about a live database (tables,
//! columns, indexes, grants, charset) over an externally owned sqlx pool.
//! Connection lifecycle, pooling policy, and timeouts belong to the
//! embedding application; every operation here is a stateless read-only
//! request against the session.

pub mod dialect;
pub mod introspector;
pub mod pool;

// Re-export commonly used types
pub use dialect::Dialect;
pub use introspector::{MetadataIntrospector, MetadataIntrospectorTrait};
pub use pool::DatasourcePool;
