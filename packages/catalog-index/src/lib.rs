//! catalog-index - Secondary index management for the game catalog store
//!
//! > "Declare the indexes once; ensure them on every start."
//!
//! ## Core Principles
//!
//! 1. **Declarative**: indexes are data ([`IndexSpec`] / [`IndexCatalog`]), not inline DDL
//! 2. **Idempotent**: every create is conditional; re-running changes nothing
//! 3. **Race-safe**: one atomic conditional create per index, no check-then-create
//! 4. **Isolated failures**: one bad spec never blocks the rest of the batch
//!
//! ## Usage
//!
//! ```rust,ignore
//! use catalog_index::{IndexCatalog, IndexEnsurer, SqliteSchemaStore};
//! use std::time::Duration;
//!
//! let store = SqliteSchemaStore::open("latestgames.db", Duration::from_secs(5))?;
//! let ensurer = IndexEnsurer::new(store);
//!
//! let catalog = IndexCatalog::game_catalog();
//! let report = ensurer.ensure_report(catalog.specs()).await;
//! println!("{report}");
//! std::process::exit(report.exit_code());
//! ```

pub mod catalog;
pub mod config;
pub mod domain;
pub mod ensurer;
pub mod error;
pub mod infrastructure;
pub mod report;

pub use error::{ErrorKind, IndexError, Result};

pub use catalog::IndexCatalog;
pub use config::{ConfigError, EnsureConfig};
pub use domain::{
    CreateOutcome, FailureKind, FailureReason, IndexDescription, IndexOutcome, IndexResult,
    IndexSpec, SchemaStore, VerifyResult, VerifyStatus,
};
pub use ensurer::IndexEnsurer;
pub use report::EnsureReport;

pub use infrastructure::InMemorySchemaStore;
#[cfg(feature = "sqlite")]
pub use infrastructure::SqliteSchemaStore;
