//! SQLite Schema Store
//!
//! Applies conditional index DDL to the catalog database file.
use async_trait::async_trait;
use rusqlite::{params, Connection, OpenFlags, OptionalExtension, TransactionBehavior};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tracing::debug;

use crate::domain::models::{CreateOutcome, IndexDescription, IndexSpec};
use crate::domain::ports::SchemaStore;
use crate::error::{IndexError, Result};

/// Default time a writer waits on another process's schema lock
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_millis(5000);

/// SQLite-based SchemaStore implementation
#[derive(Clone)]
pub struct SqliteSchemaStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteSchemaStore {
    /// Open the existing catalog database at the given path.
    ///
    /// The file is never created: a missing database is a connection error.
    pub fn open(db_path: impl AsRef<Path>, busy_timeout: Duration) -> Result<Self> {
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_URI
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = Connection::open_with_flags(db_path.as_ref(), flags).map_err(|err| {
            IndexError::connection(format!(
                "cannot open {}: {}",
                db_path.as_ref().display(),
                err
            ))
            .with_source(err)
        })?;
        conn.busy_timeout(busy_timeout)?;
        Ok(Self::from_connection(conn))
    }

    /// Create an in-memory store (for testing)
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self::from_connection(conn))
    }

    /// Wrap an already configured connection
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    /// Run a closure against the underlying connection.
    ///
    /// Schema setup belongs to the caller; this is the hook for it.
    pub fn with_connection<T>(
        &self,
        f: impl FnOnce(&Connection) -> rusqlite::Result<T>,
    ) -> Result<T> {
        let conn = self.lock()?;
        Ok(f(&*conn)?)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| IndexError::connection("connection mutex poisoned"))
    }
}

fn index_columns(conn: &Connection, index_name: &str) -> rusqlite::Result<Vec<String>> {
    let mut stmt = conn.prepare("SELECT name FROM pragma_index_info(?1) ORDER BY seqno")?;
    let columns = stmt
        .query_map(params![index_name], |row| {
            // Expression index keys have no column name
            let name: Option<String> = row.get(0)?;
            Ok(name.unwrap_or_else(|| "<expr>".to_string()))
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(columns)
}

/// Column names of a table or view, empty if it does not exist
fn table_columns(conn: &Connection, table_name: &str) -> rusqlite::Result<Vec<String>> {
    let mut stmt = conn.prepare("SELECT name FROM pragma_table_info(?1)")?;
    let columns = stmt
        .query_map(params![table_name], |row| row.get(0))?
        .collect::<rusqlite::Result<Vec<String>>>()?;
    Ok(columns)
}

#[async_trait]
impl SchemaStore for SqliteSchemaStore {
    async fn create_index_if_absent(&self, spec: &IndexSpec) -> Result<CreateOutcome> {
        let mut conn = self.lock()?;

        // IMMEDIATE takes the write lock up front, so the lookup and the
        // CREATE below cannot interleave with another writer.
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let exists: bool = tx.query_row(
            "SELECT EXISTS(
                 SELECT 1 FROM sqlite_master
                 WHERE type = 'index' AND name = ?1 COLLATE NOCASE
             )",
            params![&spec.index_name],
            |row| row.get(0),
        )?;

        if exists {
            tx.commit()?;
            return Ok(CreateOutcome::AlreadyExists);
        }

        // Column existence is checked explicitly: with double-quoted-string
        // compatibility on, SQLite would index a missing "column" as a
        // string constant instead of failing.
        let columns = table_columns(&tx, &spec.table_name)?;
        if columns.is_empty() {
            return Err(IndexError::schema_object_missing(format!(
                "no such table: {}",
                spec.table_name
            )));
        }
        if !columns
            .iter()
            .any(|column| column.eq_ignore_ascii_case(&spec.column_name))
        {
            return Err(IndexError::schema_object_missing(format!(
                "no such column: {}.{}",
                spec.table_name, spec.column_name
            )));
        }

        let sql = spec.create_sql();
        debug!(sql = %sql, "creating index");
        tx.execute(&sql, [])?;
        tx.commit()?;

        Ok(CreateOutcome::Created)
    }

    async fn describe_index(&self, index_name: &str) -> Result<Option<IndexDescription>> {
        let conn = self.lock()?;

        let row: Option<(String, String)> = conn
            .query_row(
                "SELECT name, tbl_name FROM sqlite_master
                 WHERE type = 'index' AND name = ?1 COLLATE NOCASE",
                params![index_name],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        let Some((name, table_name)) = row else {
            return Ok(None);
        };

        let columns = index_columns(&conn, &name)?;
        Ok(Some(IndexDescription {
            index_name: name,
            table_name,
            columns,
        }))
    }

    async fn list_indexes(&self) -> Result<Vec<IndexDescription>> {
        let conn = self.lock()?;

        // Constraint-backing autoindexes have no SQL text
        let mut stmt = conn.prepare(
            "SELECT name, tbl_name FROM sqlite_master
             WHERE type = 'index' AND sql IS NOT NULL
             ORDER BY name",
        )?;
        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut indexes = Vec::with_capacity(rows.len());
        for (index_name, table_name) in rows {
            let columns = index_columns(&conn, &index_name)?;
            indexes.push(IndexDescription {
                index_name,
                table_name,
                columns,
            });
        }
        Ok(indexes)
    }
}
