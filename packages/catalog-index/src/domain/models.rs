//! Index management domain models

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{ErrorKind, IndexError};

// ═══════════════════════════════════════════════════════════════════════════
// IndexSpec
// ═══════════════════════════════════════════════════════════════════════════

/// Declarative description of one single-column secondary index.
///
/// Specs are configuration, not data: they are defined once by the caller
/// (built-in catalog or YAML file) and never persisted by this crate.
///
/// # Examples
///
/// ```rust
/// use catalog_index::domain::IndexSpec;
///
/// let spec = IndexSpec::new("idx_game_tags_gid", "game_tags", "game_id");
/// assert_eq!(
///     spec.create_sql(),
///     r#"CREATE INDEX IF NOT EXISTS "idx_game_tags_gid" ON "game_tags"("game_id")"#
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IndexSpec {
    /// Index name, unique within a catalog
    #[serde(rename = "name")]
    pub index_name: String,
    /// Table the index is built on
    #[serde(rename = "table")]
    pub table_name: String,
    /// Indexed column
    #[serde(rename = "column")]
    pub column_name: String,
}

impl IndexSpec {
    pub fn new(
        index_name: impl Into<String>,
        table_name: impl Into<String>,
        column_name: impl Into<String>,
    ) -> Self {
        Self {
            index_name: index_name.into(),
            table_name: table_name.into(),
            column_name: column_name.into(),
        }
    }

    /// Check identifier shape. Existence of the table and column is left to
    /// the store.
    pub fn validate(&self) -> Result<(), IndexError> {
        for (field, value) in [
            ("name", &self.index_name),
            ("table", &self.table_name),
            ("column", &self.column_name),
        ] {
            if value.trim().is_empty() {
                return Err(IndexError::invalid_spec(format!(
                    "index spec field '{}' must not be empty",
                    field
                )));
            }
            if value.contains('\0') {
                return Err(IndexError::invalid_spec(format!(
                    "index spec field '{}' contains a NUL byte: {:?}",
                    field, value
                )));
            }
        }
        Ok(())
    }

    /// Conditional DDL for this spec, identifiers quoted.
    pub fn create_sql(&self) -> String {
        format!(
            "CREATE INDEX IF NOT EXISTS {} ON {}({})",
            quote_ident(&self.index_name),
            quote_ident(&self.table_name),
            quote_ident(&self.column_name)
        )
    }

    /// Whether a live index has exactly the shape this spec asks for.
    ///
    /// SQLite identifiers are case-insensitive, so names compare that way.
    pub fn matches(&self, description: &IndexDescription) -> bool {
        description.table_name.eq_ignore_ascii_case(&self.table_name)
            && description.columns.len() == 1
            && description.columns[0].eq_ignore_ascii_case(&self.column_name)
    }
}

impl fmt::Display for IndexSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ON {}({})",
            self.index_name, self.table_name, self.column_name
        )
    }
}

/// Double-quote an SQL identifier, doubling embedded quotes.
pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

// ═══════════════════════════════════════════════════════════════════════════
// Failures
// ═══════════════════════════════════════════════════════════════════════════

/// Failure taxonomy reported per spec
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Referenced table or column absent
    SchemaObjectMissing,
    /// Permission, quota, or constraint violation at the store layer
    StoreRejected,
    /// Transport/connectivity failure reaching the store
    ConnectionError,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::SchemaObjectMissing => "schema_object_missing",
            FailureKind::StoreRejected => "store_rejected",
            FailureKind::ConnectionError => "connection_error",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Why a spec failed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureReason {
    pub kind: FailureKind,
    pub message: String,
}

impl FailureReason {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Reason recorded for specs skipped after this connection failure
    pub fn not_attempted(&self) -> Self {
        Self::new(
            FailureKind::ConnectionError,
            format!("not attempted: {}", self.message),
        )
    }
}

impl From<&IndexError> for FailureReason {
    fn from(err: &IndexError) -> Self {
        let kind = match err.kind {
            ErrorKind::SchemaObjectMissing => FailureKind::SchemaObjectMissing,
            ErrorKind::Connection | ErrorKind::IO => FailureKind::ConnectionError,
            ErrorKind::Database
            | ErrorKind::StoreRejected
            | ErrorKind::InvalidSpec
            | ErrorKind::Config
            | ErrorKind::Serialization => FailureKind::StoreRejected,
        };
        Self::new(kind, err.message.clone())
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Ensure outcomes
// ═══════════════════════════════════════════════════════════════════════════

/// What the store did for one conditional create
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CreateOutcome {
    Created,
    AlreadyExists,
}

/// Outcome of ensuring a single index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum IndexOutcome {
    Created,
    AlreadyExists,
    Failed { reason: FailureReason },
}

impl IndexOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, IndexOutcome::Failed { .. })
    }

    pub fn failure(&self) -> Option<&FailureReason> {
        match self {
            IndexOutcome::Failed { reason } => Some(reason),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            IndexOutcome::Created => "created",
            IndexOutcome::AlreadyExists => "already_exists",
            IndexOutcome::Failed { .. } => "failed",
        }
    }
}

impl From<CreateOutcome> for IndexOutcome {
    fn from(outcome: CreateOutcome) -> Self {
        match outcome {
            CreateOutcome::Created => IndexOutcome::Created,
            CreateOutcome::AlreadyExists => IndexOutcome::AlreadyExists,
        }
    }
}

/// Per-spec result of an ensure-run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexResult {
    pub spec: IndexSpec,
    pub outcome: IndexOutcome,
}

impl IndexResult {
    pub fn new(spec: IndexSpec, outcome: IndexOutcome) -> Self {
        Self { spec, outcome }
    }

    pub fn failed(spec: IndexSpec, reason: FailureReason) -> Self {
        Self::new(spec, IndexOutcome::Failed { reason })
    }
}

impl fmt::Display for IndexResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            IndexOutcome::Failed { reason } => {
                write!(f, "{:<15} {} ({})", "failed", self.spec, reason)
            }
            outcome => write!(f, "{:<15} {}", outcome.as_str(), self.spec),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Live schema
// ═══════════════════════════════════════════════════════════════════════════

/// An index as it exists in the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexDescription {
    pub index_name: String,
    pub table_name: String,
    /// Indexed columns, in key order
    pub columns: Vec<String>,
}

/// Verification status of one spec against the live schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum VerifyStatus {
    Present,
    Missing,
    /// Index name exists but covers a different table or column set
    Mismatched {
        actual_table: String,
        actual_columns: Vec<String>,
    },
    Failed {
        reason: FailureReason,
    },
}

impl VerifyStatus {
    pub fn classify(spec: &IndexSpec, live: Option<IndexDescription>) -> Self {
        match live {
            None => VerifyStatus::Missing,
            Some(description) if spec.matches(&description) => VerifyStatus::Present,
            Some(description) => VerifyStatus::Mismatched {
                actual_table: description.table_name,
                actual_columns: description.columns,
            },
        }
    }

    pub fn is_present(&self) -> bool {
        matches!(self, VerifyStatus::Present)
    }
}

/// Per-spec result of a verify-run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyResult {
    pub spec: IndexSpec,
    pub status: VerifyStatus,
}

impl VerifyResult {
    pub fn failed(spec: IndexSpec, reason: FailureReason) -> Self {
        Self {
            spec,
            status: VerifyStatus::Failed { reason },
        }
    }
}

impl fmt::Display for VerifyResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.status {
            VerifyStatus::Present => write!(f, "{:<15} {}", "present", self.spec),
            VerifyStatus::Missing => write!(f, "{:<15} {}", "missing", self.spec),
            VerifyStatus::Mismatched {
                actual_table,
                actual_columns,
            } => write!(
                f,
                "{:<15} {} (found on {}({}))",
                "mismatched",
                self.spec,
                actual_table,
                actual_columns.join(", ")
            ),
            VerifyStatus::Failed { reason } => {
                write!(f, "{:<15} {} ({})", "failed", self.spec, reason)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn description(table: &str, columns: &[&str]) -> IndexDescription {
        IndexDescription {
            index_name: "idx".to_string(),
            table_name: table.to_string(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
        }
    }

    #[test]
    fn test_create_sql_quotes_identifiers() {
        let spec = IndexSpec::new("idx_a", "t1", "game_id");
        assert_eq!(
            spec.create_sql(),
            r#"CREATE INDEX IF NOT EXISTS "idx_a" ON "t1"("game_id")"#
        );
    }

    #[test]
    fn test_create_sql_escapes_embedded_quotes() {
        let spec = IndexSpec::new(r#"idx"; DROP TABLE games; --"#, "t1", "game_id");
        assert_eq!(
            spec.create_sql(),
            r#"CREATE INDEX IF NOT EXISTS "idx""; DROP TABLE games; --" ON "t1"("game_id")"#
        );
    }

    #[test]
    fn test_validate_rejects_blank_and_nul() {
        assert!(IndexSpec::new("idx_a", "t1", "game_id").validate().is_ok());

        let err = IndexSpec::new("  ", "t1", "game_id").validate().unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidSpec);
        assert!(err.message.contains("'name'"));

        let err = IndexSpec::new("idx_a", "t1", "game\0id")
            .validate()
            .unwrap_err();
        assert!(err.message.contains("'column'"));
    }

    #[test]
    fn test_matches_is_case_insensitive() {
        let spec = IndexSpec::new("idx_a", "Game_Tags", "GAME_ID");
        assert!(spec.matches(&description("game_tags", &["game_id"])));
        assert!(!spec.matches(&description("game_tags", &["tag_id"])));
        assert!(!spec.matches(&description("game_tags", &["game_id", "tag_id"])));
        assert!(!spec.matches(&description("screenshots", &["game_id"])));
    }

    #[test]
    fn test_verify_status_classify() {
        let spec = IndexSpec::new("idx_a", "t1", "game_id");
        assert_eq!(VerifyStatus::classify(&spec, None), VerifyStatus::Missing);
        assert_eq!(
            VerifyStatus::classify(&spec, Some(description("t1", &["game_id"]))),
            VerifyStatus::Present
        );
        assert_eq!(
            VerifyStatus::classify(&spec, Some(description("t2", &["game_id"]))),
            VerifyStatus::Mismatched {
                actual_table: "t2".to_string(),
                actual_columns: vec!["game_id".to_string()],
            }
        );
    }

    #[test]
    fn test_failure_reason_from_error() {
        let reason = FailureReason::from(&IndexError::connection("disk unplugged"));
        assert_eq!(reason.kind, FailureKind::ConnectionError);
        assert_eq!(reason.message, "disk unplugged");

        let reason = FailureReason::from(&IndexError::schema_object_missing("no such table"));
        assert_eq!(reason.kind, FailureKind::SchemaObjectMissing);

        let reason = FailureReason::from(&IndexError::database("weird"));
        assert_eq!(reason.kind, FailureKind::StoreRejected);
    }

    #[test]
    fn test_outcome_serializes_with_status_tag() {
        let outcome = IndexOutcome::Failed {
            reason: FailureReason::new(FailureKind::SchemaObjectMissing, "no such table: x"),
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["reason"]["kind"], "schema_object_missing");

        let json = serde_json::to_value(IndexOutcome::AlreadyExists).unwrap();
        assert_eq!(json["status"], "already_exists");
    }

    #[test]
    fn test_spec_yaml_field_names() {
        let spec: IndexSpec =
            serde_yaml::from_str("name: idx_a\ntable: t1\ncolumn: game_id\n").unwrap();
        assert_eq!(spec, IndexSpec::new("idx_a", "t1", "game_id"));

        assert!(serde_yaml::from_str::<IndexSpec>(
            "name: idx_a\ntable: t1\ncolumn: game_id\nunique: true\n"
        )
        .is_err());
    }
}
