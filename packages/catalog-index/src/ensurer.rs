//! IndexEnsurer - idempotent application of an index catalog
//!
//! # Contract
//!
//! 1. One sequential pass, one conditional create per spec
//! 2. A failing spec is recorded and the pass continues
//! 3. A connection failure ends the pass: every spec not yet attempted is
//!    reported Failed with the same reason
//!
//! The ensurer never checks existence and then creates in two requests;
//! race safety between processes comes entirely from
//! [`SchemaStore::create_index_if_absent`].

use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::domain::{
    CreateOutcome, FailureReason, IndexOutcome, IndexResult, IndexSpec, SchemaStore, VerifyResult,
    VerifyStatus,
};
use crate::report::EnsureReport;

pub struct IndexEnsurer {
    store: Arc<dyn SchemaStore>,
}

impl IndexEnsurer {
    /// Create an ensurer over any SchemaStore implementation
    pub fn new<S: SchemaStore + 'static>(store: S) -> Self {
        Self {
            store: Arc::new(store),
        }
    }

    pub fn from_arc(store: Arc<dyn SchemaStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn SchemaStore> {
        &self.store
    }

    /// Ensure every spec's index exists, returning one result per spec in
    /// input order.
    pub async fn ensure_all(&self, specs: &[IndexSpec]) -> Vec<IndexResult> {
        let mut results = Vec::with_capacity(specs.len());

        for (position, spec) in specs.iter().enumerate() {
            match self.store.create_index_if_absent(spec).await {
                Ok(created) => {
                    match created {
                        CreateOutcome::Created => {
                            info!(index = %spec.index_name, table = %spec.table_name, "index created")
                        }
                        CreateOutcome::AlreadyExists => {
                            debug!(index = %spec.index_name, "index already exists")
                        }
                    }
                    results.push(IndexResult::new(spec.clone(), IndexOutcome::from(created)));
                }
                Err(err) if err.is_connection_fatal() => {
                    error!(
                        index = %spec.index_name,
                        remaining = specs.len() - position - 1,
                        error = %err,
                        "connection lost, abandoning ensure run"
                    );
                    let reason = FailureReason::from(&err);
                    results.push(IndexResult::failed(spec.clone(), reason.clone()));
                    results.extend(
                        specs[position + 1..]
                            .iter()
                            .map(|rest| IndexResult::failed(rest.clone(), reason.not_attempted())),
                    );
                    break;
                }
                Err(err) => {
                    warn!(index = %spec.index_name, error = %err, "index ensure failed");
                    results.push(IndexResult::failed(spec.clone(), FailureReason::from(&err)));
                }
            }
        }

        results
    }

    /// [`ensure_all`](Self::ensure_all) plus a timed summary
    pub async fn ensure_report(&self, specs: &[IndexSpec]) -> EnsureReport {
        let started_at = Utc::now();
        let results = self.ensure_all(specs).await;
        let report = EnsureReport::new(results, started_at, Utc::now());
        info!(
            created = report.created,
            already_existed = report.already_existed,
            failed = report.failed,
            "ensure run finished"
        );
        report
    }

    /// Compare every spec against the live schema without changing it.
    pub async fn verify_all(&self, specs: &[IndexSpec]) -> Vec<VerifyResult> {
        let mut results = Vec::with_capacity(specs.len());

        for (position, spec) in specs.iter().enumerate() {
            let status = match self.store.describe_index(&spec.index_name).await {
                Ok(live) => VerifyStatus::classify(spec, live),
                Err(err) if err.is_connection_fatal() => {
                    error!(index = %spec.index_name, error = %err, "connection lost, abandoning verify run");
                    let reason = FailureReason::from(&err);
                    results.push(VerifyResult {
                        spec: spec.clone(),
                        status: VerifyStatus::Failed {
                            reason: reason.clone(),
                        },
                    });
                    results.extend(specs[position + 1..].iter().map(|rest| VerifyResult {
                        spec: rest.clone(),
                        status: VerifyStatus::Failed {
                            reason: reason.not_attempted(),
                        },
                    }));
                    break;
                }
                Err(err) => VerifyStatus::Failed {
                    reason: FailureReason::from(&err),
                },
            };

            match &status {
                VerifyStatus::Present => debug!(index = %spec.index_name, "index present"),
                VerifyStatus::Missing => warn!(index = %spec.index_name, "index missing"),
                VerifyStatus::Mismatched { actual_table, .. } => {
                    warn!(index = %spec.index_name, actual_table = %actual_table, "index shape differs")
                }
                VerifyStatus::Failed { reason } => {
                    warn!(index = %spec.index_name, reason = %reason, "index verify failed")
                }
            }
            results.push(VerifyResult {
                spec: spec.clone(),
                status,
            });
        }

        results
    }
}
