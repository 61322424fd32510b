//! Shared fixtures for catalog-index integration tests

#![allow(dead_code)]

use catalog_index::{IndexResult, SqliteSchemaStore};
use std::path::Path;
use std::time::Duration;

/// Game catalog tables as the ingestion side creates them
pub const CATALOG_SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS games(
        id INTEGER PRIMARY KEY, slug TEXT, name TEXT, description TEXT, released TEXT, rating REAL
    );
    CREATE TABLE IF NOT EXISTS genres(id INTEGER PRIMARY KEY, name TEXT);
    CREATE TABLE IF NOT EXISTS platforms(id INTEGER PRIMARY KEY, name TEXT);
    CREATE TABLE IF NOT EXISTS developers(id INTEGER PRIMARY KEY, name TEXT);
    CREATE TABLE IF NOT EXISTS publishers(id INTEGER PRIMARY KEY, name TEXT);
    CREATE TABLE IF NOT EXISTS tags(id INTEGER PRIMARY KEY, name TEXT);
    CREATE TABLE IF NOT EXISTS game_genres(game_id INTEGER, genre_id INTEGER, PRIMARY KEY(game_id, genre_id));
    CREATE TABLE IF NOT EXISTS game_platforms(game_id INTEGER, platform_id INTEGER, PRIMARY KEY(game_id, platform_id));
    CREATE TABLE IF NOT EXISTS game_developers(game_id INTEGER, developer_id INTEGER, PRIMARY KEY(game_id, developer_id));
    CREATE TABLE IF NOT EXISTS game_publishers(game_id INTEGER, publisher_id INTEGER, PRIMARY KEY(game_id, publisher_id));
    CREATE TABLE IF NOT EXISTS game_tags(game_id INTEGER, tag_id INTEGER, PRIMARY KEY(game_id, tag_id));
    CREATE TABLE IF NOT EXISTS screenshots(id INTEGER PRIMARY KEY, game_id INTEGER, url TEXT);
    CREATE TABLE IF NOT EXISTS game_series_links(id INTEGER PRIMARY KEY AUTOINCREMENT, game_id INTEGER, name TEXT, url TEXT);
    CREATE TABLE IF NOT EXISTS game_additions_links(id INTEGER PRIMARY KEY AUTOINCREMENT, game_id INTEGER, name TEXT, url TEXT);
";

/// Two minimal tables with a `game_id` column
pub const TWO_TABLE_SCHEMA: &str = "
    CREATE TABLE t1(id INTEGER PRIMARY KEY, game_id INTEGER);
    CREATE TABLE t2(id INTEGER PRIMARY KEY, game_id INTEGER);
";

pub fn memory_store(schema: &str) -> SqliteSchemaStore {
    let store = SqliteSchemaStore::in_memory().unwrap();
    store.with_connection(|conn| conn.execute_batch(schema)).unwrap();
    store
}

/// Create the database file (if needed) with `schema`, then open it as a store
pub fn file_store(path: &Path, schema: &str) -> SqliteSchemaStore {
    let setup = rusqlite::Connection::open(path).unwrap();
    setup.busy_timeout(Duration::from_secs(10)).unwrap();
    setup.execute_batch(schema).unwrap();
    drop(setup);

    SqliteSchemaStore::open(path, Duration::from_secs(10)).unwrap()
}

pub fn outcome_names(results: &[IndexResult]) -> Vec<&'static str> {
    results.iter().map(|r| r.outcome.as_str()).collect()
}
