//! In-Memory Schema Store (for testing)
//!
//! HashMap-based stand-in for a live catalog database. Supports fault
//! injection (dropped connection, rejected tables) that a real SQLite file
//! cannot produce on demand.
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use crate::domain::models::{CreateOutcome, IndexDescription, IndexSpec};
use crate::domain::ports::SchemaStore;
use crate::error::{IndexError, Result};

#[derive(Clone, Default)]
pub struct InMemorySchemaStore {
    /// Lower-cased table name -> lower-cased column names
    tables: Arc<RwLock<HashMap<String, HashSet<String>>>>,
    /// Lower-cased index name -> description
    indexes: Arc<RwLock<BTreeMap<String, IndexDescription>>>,
    rejected_tables: Arc<RwLock<HashSet<String>>>,
    disconnected: Arc<AtomicBool>,
}

impl InMemorySchemaStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: declare a table and its columns
    pub fn with_table(self, table: &str, columns: &[&str]) -> Self {
        if let Ok(mut tables) = self.tables.write() {
            tables.insert(
                table.to_ascii_lowercase(),
                columns.iter().map(|c| c.to_ascii_lowercase()).collect(),
            );
        }
        self
    }

    /// Make every index creation on `table` fail as a store rejection
    pub fn reject_table(&self, table: &str) {
        if let Ok(mut rejected) = self.rejected_tables.write() {
            rejected.insert(table.to_ascii_lowercase());
        }
    }

    /// Simulate a lost connection: every later call fails
    pub fn disconnect(&self) {
        self.disconnected.store(true, Ordering::SeqCst);
    }

    fn check_connected(&self) -> Result<()> {
        if self.disconnected.load(Ordering::SeqCst) {
            return Err(IndexError::connection("connection to store lost"));
        }
        Ok(())
    }

    fn poisoned() -> IndexError {
        IndexError::connection("in-memory store lock poisoned")
    }
}

#[async_trait]
impl SchemaStore for InMemorySchemaStore {
    async fn create_index_if_absent(&self, spec: &IndexSpec) -> Result<CreateOutcome> {
        self.check_connected()?;

        // Holding the write lock for the whole check-and-insert keeps the
        // operation atomic, like the SQLite write transaction.
        let mut indexes = self.indexes.write().map_err(|_| Self::poisoned())?;
        let key = spec.index_name.to_ascii_lowercase();
        if indexes.contains_key(&key) {
            return Ok(CreateOutcome::AlreadyExists);
        }

        let table = spec.table_name.to_ascii_lowercase();
        let tables = self.tables.read().map_err(|_| Self::poisoned())?;
        let columns = tables.get(&table).ok_or_else(|| {
            IndexError::schema_object_missing(format!("no such table: {}", spec.table_name))
        })?;
        if !columns.contains(&spec.column_name.to_ascii_lowercase()) {
            return Err(IndexError::schema_object_missing(format!(
                "no such column: {}",
                spec.column_name
            )));
        }

        let rejected = self.rejected_tables.read().map_err(|_| Self::poisoned())?;
        if rejected.contains(&table) {
            return Err(IndexError::store_rejected(format!(
                "not authorized to create index on {}",
                spec.table_name
            )));
        }

        indexes.insert(
            key,
            IndexDescription {
                index_name: spec.index_name.clone(),
                table_name: spec.table_name.clone(),
                columns: vec![spec.column_name.clone()],
            },
        );
        Ok(CreateOutcome::Created)
    }

    async fn describe_index(&self, index_name: &str) -> Result<Option<IndexDescription>> {
        self.check_connected()?;
        let indexes = self.indexes.read().map_err(|_| Self::poisoned())?;
        Ok(indexes.get(&index_name.to_ascii_lowercase()).cloned())
    }

    async fn list_indexes(&self) -> Result<Vec<IndexDescription>> {
        self.check_connected()?;
        let indexes = self.indexes.read().map_err(|_| Self::poisoned())?;
        Ok(indexes.values().cloned().collect())
    }
}
