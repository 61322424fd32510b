//! Infrastructure layer - Schema store adapters
//!
//! Multiple backends for the SchemaStore trait

pub mod memory_store;
pub use memory_store::InMemorySchemaStore;

#[cfg(feature = "sqlite")]
pub mod sqlite_store;
#[cfg(feature = "sqlite")]
pub use sqlite_store::SqliteSchemaStore;
