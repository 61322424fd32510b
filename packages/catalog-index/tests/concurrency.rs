//! Concurrent ensure runs against one database file
//!
//! Each runner gets its own connection and its own runtime, mirroring
//! independent processes starting at the same time.

mod common;

use catalog_index::{IndexCatalog, IndexEnsurer, IndexOutcome, IndexResult, IndexSpec, SchemaStore};
use common::{file_store, CATALOG_SCHEMA};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Barrier};
use std::thread;

fn run_concurrently(path: PathBuf, spec_lists: Vec<Vec<IndexSpec>>) -> Vec<Vec<IndexResult>> {
    let barrier = Arc::new(Barrier::new(spec_lists.len()));

    let handles: Vec<_> = spec_lists
        .into_iter()
        .map(|specs| {
            let barrier = Arc::clone(&barrier);
            let path = path.clone();
            thread::spawn(move || {
                let runtime = tokio::runtime::Builder::new_current_thread()
                    .build()
                    .unwrap();
                let ensurer = IndexEnsurer::new(file_store(&path, ""));
                barrier.wait();
                runtime.block_on(ensurer.ensure_all(&specs))
            })
        })
        .collect();

    handles
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .collect()
}

#[test]
fn test_two_runners_overlapping_lists() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("latestgames.db");
    drop(file_store(&path, CATALOG_SCHEMA));

    let catalog = IndexCatalog::game_catalog();
    let first: Vec<IndexSpec> = catalog.specs()[..6].to_vec();
    let mut second: Vec<IndexSpec> = catalog.specs()[2..].to_vec();
    second.reverse();

    let runs = run_concurrently(path.clone(), vec![first, second]);

    let mut created_per_index: HashMap<String, usize> = HashMap::new();
    for result in runs.iter().flatten() {
        match &result.outcome {
            IndexOutcome::Created => {
                *created_per_index
                    .entry(result.spec.index_name.clone())
                    .or_default() += 1
            }
            IndexOutcome::AlreadyExists => {}
            IndexOutcome::Failed { reason } => {
                panic!("{} failed under concurrency: {}", result.spec, reason)
            }
        }
    }

    assert_eq!(created_per_index.len(), catalog.len());
    assert!(created_per_index.values().all(|&count| count == 1));

    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap();
    let indexes = runtime
        .block_on(file_store(&path, "").list_indexes())
        .unwrap();
    assert_eq!(indexes.len(), catalog.len());
}

#[test]
fn test_many_runners_same_list() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("latestgames.db");
    drop(file_store(&path, CATALOG_SCHEMA));

    let specs = IndexCatalog::game_catalog().specs().to_vec();
    let runs = run_concurrently(path, vec![specs.clone(); 4]);

    for position in 0..specs.len() {
        let outcomes: Vec<&IndexOutcome> = runs.iter().map(|run| &run[position].outcome).collect();
        let created = outcomes
            .iter()
            .filter(|o| ***o == IndexOutcome::Created)
            .count();
        let existed = outcomes
            .iter()
            .filter(|o| ***o == IndexOutcome::AlreadyExists)
            .count();
        assert_eq!(created, 1, "{} created {} times", specs[position], created);
        assert_eq!(existed, 3);
    }
}
