//! Error types for catalog-index

use std::fmt;
use thiserror::Error;

/// Index management error kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Database errors that fit no narrower kind
    Database,
    /// Referenced table or column does not exist
    SchemaObjectMissing,
    /// Store refused the statement (permission, quota, constraint, busy)
    StoreRejected,
    /// The connection itself is unusable
    Connection,
    /// Malformed index specification or catalog
    InvalidSpec,
    /// Configuration errors
    Config,
    /// Serialization/deserialization errors
    Serialization,
    /// I/O errors
    IO,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Database => "database",
            ErrorKind::SchemaObjectMissing => "schema_object_missing",
            ErrorKind::StoreRejected => "store_rejected",
            ErrorKind::Connection => "connection",
            ErrorKind::InvalidSpec => "invalid_spec",
            ErrorKind::Config => "config",
            ErrorKind::Serialization => "serialization",
            ErrorKind::IO => "io",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Index management error type
#[derive(Debug, Error)]
#[error("[{kind}] {message}")]
pub struct IndexError {
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
    pub kind: ErrorKind,
    pub message: String,
}

impl IndexError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    // Convenience constructors
    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Database, message)
    }

    pub fn schema_object_missing(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::SchemaObjectMissing, message)
    }

    pub fn store_rejected(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::StoreRejected, message)
    }

    pub fn connection(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Connection, message)
    }

    pub fn invalid_spec(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidSpec, message)
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Config, message)
    }

    /// True when no further statement on the same connection can succeed.
    pub fn is_connection_fatal(&self) -> bool {
        matches!(self.kind, ErrorKind::Connection | ErrorKind::IO)
    }
}

// SQLite error conversions
#[cfg(feature = "sqlite")]
impl From<rusqlite::Error> for IndexError {
    fn from(err: rusqlite::Error) -> Self {
        let kind = classify_sqlite(&err);
        IndexError::new(kind, format!("SQLite error: {}", err)).with_source(err)
    }
}

/// Map a rusqlite error onto the failure taxonomy.
///
/// Generic `SQLITE_ERROR` carries no code worth matching on, so missing
/// tables and columns are recognised from the message SQLite attaches.
/// Errors caught while preparing a statement arrive as `SqlInputError`
/// and go through the same mapping.
#[cfg(feature = "sqlite")]
fn classify_sqlite(err: &rusqlite::Error) -> ErrorKind {
    match err {
        rusqlite::Error::SqliteFailure(ffi_err, message) => {
            classify_failure(ffi_err.code, message.as_deref().unwrap_or_default())
        }
        rusqlite::Error::SqlInputError { error, msg, .. } => classify_failure(error.code, msg),
        rusqlite::Error::InvalidPath(_) => ErrorKind::Connection,
        _ => ErrorKind::Database,
    }
}

#[cfg(feature = "sqlite")]
fn classify_failure(code: rusqlite::ErrorCode, message: &str) -> ErrorKind {
    use rusqlite::ErrorCode;

    if message.starts_with("no such table")
        || message.starts_with("no such column")
        || message.contains("has no column named")
    {
        return ErrorKind::SchemaObjectMissing;
    }
    match code {
        ErrorCode::CannotOpen
        | ErrorCode::NotADatabase
        | ErrorCode::SystemIoFailure
        | ErrorCode::DatabaseCorrupt
        | ErrorCode::ApiMisuse => ErrorKind::Connection,
        _ => ErrorKind::StoreRejected,
    }
}

impl From<serde_json::Error> for IndexError {
    fn from(err: serde_json::Error) -> Self {
        IndexError::new(ErrorKind::Serialization, format!("JSON error: {}", err)).with_source(err)
    }
}

impl From<serde_yaml::Error> for IndexError {
    fn from(err: serde_yaml::Error) -> Self {
        IndexError::new(ErrorKind::Config, format!("YAML error: {}", err)).with_source(err)
    }
}

impl From<std::io::Error> for IndexError {
    fn from(err: std::io::Error) -> Self {
        IndexError::new(ErrorKind::IO, format!("I/O error: {}", err)).with_source(err)
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, IndexError>;
