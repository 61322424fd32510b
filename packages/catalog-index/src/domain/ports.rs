//! Schema Store Port (Trait Interface)
//!
//! Port/Adapter pattern for backend flexibility:
//! - Production: SQLite catalog database
//! - Testing: InMemory (fault injection, no disk)

use async_trait::async_trait;

use super::models::{CreateOutcome, IndexDescription, IndexSpec};
use crate::error::Result;

/// Schema Store Port
///
/// All store backends must implement this trait.
#[async_trait]
pub trait SchemaStore: Send + Sync {
    /// Create the index unless one with the same name already exists.
    ///
    /// Must be a single atomic request: concurrent callers racing on the
    /// same name see exactly one `Created`, everyone else `AlreadyExists`.
    /// An existing index with that name counts as `AlreadyExists` whatever
    /// its shape.
    async fn create_index_if_absent(&self, spec: &IndexSpec) -> Result<CreateOutcome>;

    /// Read back the live shape of an index, `None` if it does not exist
    async fn describe_index(&self, index_name: &str) -> Result<Option<IndexDescription>>;

    /// All user-created indexes, sorted by name
    ///
    /// Store-internal indexes (constraint backing indexes) are excluded.
    async fn list_indexes(&self) -> Result<Vec<IndexDescription>>;
}
