//! Ensure-run summaries

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::{
    FailureKind, FailureReason, IndexOutcome, IndexResult, IndexSpec, VerifyResult, VerifyStatus,
};
use crate::error::IndexError;

/// Summary of one ensure-run, ready for logging or exit-code derivation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnsureReport {
    pub results: Vec<IndexResult>,
    pub created: usize,
    pub already_existed: usize,
    pub failed: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl EnsureReport {
    pub fn new(
        results: Vec<IndexResult>,
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
    ) -> Self {
        let mut created = 0;
        let mut already_existed = 0;
        let mut failed = 0;
        for result in &results {
            match result.outcome {
                IndexOutcome::Created => created += 1,
                IndexOutcome::AlreadyExists => already_existed += 1,
                IndexOutcome::Failed { .. } => failed += 1,
            }
        }

        Self {
            results,
            created,
            already_existed,
            failed,
            started_at,
            finished_at,
        }
    }

    /// Report for a run whose store could not be opened: the first spec
    /// carries the error, the rest are not attempted.
    pub fn store_unreachable(specs: &[IndexSpec], err: &IndexError) -> Self {
        let now = Utc::now();
        let results = unreachable_reasons(specs, err)
            .map(|(spec, reason)| IndexResult::failed(spec, reason))
            .collect();
        Self::new(results, now, now)
    }

    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    pub fn has_connection_failure(&self) -> bool {
        self.results.iter().any(|result| {
            result
                .outcome
                .failure()
                .is_some_and(|reason| reason.kind == FailureKind::ConnectionError)
        })
    }

    /// 0 = all present, 2 = store unreachable, 1 = any other failure
    pub fn exit_code(&self) -> i32 {
        if self.is_success() {
            0
        } else if self.has_connection_failure() {
            2
        } else {
            1
        }
    }

    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Verify results for a store that could not be opened
pub fn verify_unreachable(specs: &[IndexSpec], err: &IndexError) -> Vec<VerifyResult> {
    unreachable_reasons(specs, err)
        .map(|(spec, reason)| VerifyResult::failed(spec, reason))
        .collect()
}

fn unreachable_reasons<'a>(
    specs: &'a [IndexSpec],
    err: &IndexError,
) -> impl Iterator<Item = (IndexSpec, FailureReason)> + 'a {
    let reason = FailureReason::from(err);
    let rest = reason.not_attempted();
    specs.iter().enumerate().map(move |(position, spec)| {
        let reason = if position == 0 {
            reason.clone()
        } else {
            rest.clone()
        };
        (spec.clone(), reason)
    })
}

/// 0 = every index present, 2 = store unreachable, 1 = anything else
pub fn verify_exit_code(results: &[VerifyResult]) -> i32 {
    if results.iter().all(|result| result.status.is_present()) {
        return 0;
    }
    let unreachable = results.iter().any(|result| {
        matches!(
            &result.status,
            VerifyStatus::Failed { reason } if reason.kind == FailureKind::ConnectionError
        )
    });
    if unreachable {
        2
    } else {
        1
    }
}

impl fmt::Display for EnsureReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for result in &self.results {
            writeln!(f, "{}", result)?;
        }
        let elapsed_ms = (self.finished_at - self.started_at).num_milliseconds();
        write!(
            f,
            "{} created, {} already existed, {} failed ({} ms)",
            self.created, self.already_existed, self.failed, elapsed_ms
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FailureReason, IndexSpec};

    fn report(outcomes: Vec<IndexOutcome>) -> EnsureReport {
        let results = outcomes
            .into_iter()
            .enumerate()
            .map(|(i, outcome)| {
                IndexResult::new(IndexSpec::new(format!("idx_{i}"), "t1", "game_id"), outcome)
            })
            .collect();
        let now = Utc::now();
        EnsureReport::new(results, now, now)
    }

    fn failed(kind: FailureKind) -> IndexOutcome {
        IndexOutcome::Failed {
            reason: FailureReason::new(kind, "boom"),
        }
    }

    #[test]
    fn test_counts_and_success() {
        let report = report(vec![IndexOutcome::Created, IndexOutcome::AlreadyExists]);
        assert_eq!((report.created, report.already_existed, report.failed), (1, 1, 0));
        assert!(report.is_success());
        assert_eq!(report.exit_code(), 0);
    }

    #[test]
    fn test_exit_code_by_failure_kind() {
        let report = report(vec![
            IndexOutcome::Created,
            failed(FailureKind::SchemaObjectMissing),
        ]);
        assert_eq!(report.exit_code(), 1);

        let report = report_with_connection_loss();
        assert_eq!(report.exit_code(), 2);
    }

    fn report_with_connection_loss() -> EnsureReport {
        report(vec![
            failed(FailureKind::StoreRejected),
            failed(FailureKind::ConnectionError),
        ])
    }

    #[test]
    fn test_store_unreachable_fails_every_spec() {
        let specs = vec![
            IndexSpec::new("idx_a", "t1", "game_id"),
            IndexSpec::new("idx_b", "t2", "game_id"),
        ];
        let err = IndexError::connection("cannot open typo.db");

        let report = EnsureReport::store_unreachable(&specs, &err);
        assert_eq!(report.failed, 2);
        assert_eq!(report.exit_code(), 2);

        let messages: Vec<&str> = report
            .results
            .iter()
            .filter_map(|r| r.outcome.failure())
            .map(|reason| reason.message.as_str())
            .collect();
        assert_eq!(
            messages,
            vec![
                "cannot open typo.db",
                "not attempted: cannot open typo.db"
            ]
        );
    }

    #[test]
    fn test_verify_exit_code() {
        let spec = IndexSpec::new("idx_a", "t1", "game_id");
        let present = VerifyResult {
            spec: spec.clone(),
            status: VerifyStatus::Present,
        };
        let missing = VerifyResult {
            spec: spec.clone(),
            status: VerifyStatus::Missing,
        };
        let mismatched = VerifyResult {
            spec: spec.clone(),
            status: VerifyStatus::Mismatched {
                actual_table: "t2".to_string(),
                actual_columns: vec!["game_id".to_string()],
            },
        };

        assert_eq!(verify_exit_code(&[]), 0);
        assert_eq!(verify_exit_code(&[present.clone()]), 0);
        assert_eq!(verify_exit_code(&[present.clone(), missing]), 1);
        assert_eq!(verify_exit_code(&[mismatched]), 1);

        let unreachable =
            verify_unreachable(&[spec], &IndexError::connection("cannot open typo.db"));
        assert_eq!(verify_exit_code(&unreachable), 2);
    }

    #[test]
    fn test_display_lists_each_result() {
        let text = report(vec![
            IndexOutcome::Created,
            failed(FailureKind::SchemaObjectMissing),
        ])
        .to_string();

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("created"));
        assert!(lines[1].contains("schema_object_missing: boom"));
        assert!(lines[2].starts_with("1 created, 0 already existed, 1 failed"));
    }

    #[test]
    fn test_json_shape() {
        let json = report(vec![IndexOutcome::AlreadyExists]).to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["already_existed"], 1);
        assert_eq!(value["results"][0]["spec"]["name"], "idx_0");
        assert_eq!(value["results"][0]["outcome"]["status"], "already_exists");
    }
}
