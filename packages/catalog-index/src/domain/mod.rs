//! Domain layer for index management
//!
//! # Domain Models
//!
//! - `IndexSpec`: declarative (index, table, column) triple
//! - `IndexResult` / `IndexOutcome`: per-spec outcome of an ensure-run
//! - `IndexDescription`: live shape of an index as read back from the store
//! - `VerifyResult` / `VerifyStatus`: per-spec outcome of a verify-run
//!
//! # Port Trait
//!
//! - `SchemaStore`: the store-side operations the ensurer relies on

pub mod models;
pub mod ports;

pub use models::{
    CreateOutcome, FailureKind, FailureReason, IndexDescription, IndexOutcome, IndexResult,
    IndexSpec, VerifyResult, VerifyStatus,
};
pub use ports::SchemaStore;
