//! Validated index catalogs
//!
//! An [`IndexCatalog`] is the ordered, non-empty, name-unique list of
//! [`IndexSpec`]s a deployment wants present. The built-in
//! [`IndexCatalog::game_catalog`] covers the `game_id` foreign keys of the
//! game catalog's link and media tables.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::domain::IndexSpec;
use crate::error::{IndexError, Result};

/// `(index, table, column)` for the game catalog's foreign-key indexes
const GAME_CATALOG: [(&str, &str, &str); 8] = [
    ("idx_game_genres_gid", "game_genres", "game_id"),
    ("idx_game_platforms_gid", "game_platforms", "game_id"),
    ("idx_game_devs_gid", "game_developers", "game_id"),
    ("idx_game_pubs_gid", "game_publishers", "game_id"),
    ("idx_game_tags_gid", "game_tags", "game_id"),
    ("idx_series_gid", "game_series_links", "game_id"),
    ("idx_additions_gid", "game_additions_links", "game_id"),
    ("idx_shots_gid", "screenshots", "game_id"),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<IndexSpec>", into = "Vec<IndexSpec>")]
pub struct IndexCatalog {
    specs: Vec<IndexSpec>,
}

impl IndexCatalog {
    /// Build a catalog, rejecting empty lists, malformed identifiers and
    /// duplicate index names (compared case-insensitively, as SQLite does).
    pub fn new(specs: Vec<IndexSpec>) -> Result<Self> {
        if specs.is_empty() {
            return Err(IndexError::invalid_spec("index catalog is empty"));
        }

        let mut seen = HashSet::with_capacity(specs.len());
        for spec in &specs {
            spec.validate()?;
            if !seen.insert(spec.index_name.to_ascii_lowercase()) {
                return Err(IndexError::invalid_spec(format!(
                    "duplicate index name: {}",
                    spec.index_name
                )));
            }
        }

        Ok(Self { specs })
    }

    pub fn game_catalog() -> Self {
        Self {
            specs: GAME_CATALOG
                .iter()
                .map(|(index, table, column)| IndexSpec::new(*index, *table, *column))
                .collect(),
        }
    }

    pub fn specs(&self) -> &[IndexSpec] {
        &self.specs
    }

    pub fn iter(&self) -> std::slice::Iter<'_, IndexSpec> {
        self.specs.iter()
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    pub fn get(&self, index_name: &str) -> Option<&IndexSpec> {
        self.specs
            .iter()
            .find(|spec| spec.index_name.eq_ignore_ascii_case(index_name))
    }
}

impl Default for IndexCatalog {
    fn default() -> Self {
        Self::game_catalog()
    }
}

impl TryFrom<Vec<IndexSpec>> for IndexCatalog {
    type Error = IndexError;

    fn try_from(specs: Vec<IndexSpec>) -> Result<Self> {
        Self::new(specs)
    }
}

impl From<IndexCatalog> for Vec<IndexSpec> {
    fn from(catalog: IndexCatalog) -> Self {
        catalog.specs
    }
}

impl<'a> IntoIterator for &'a IndexCatalog {
    type Item = &'a IndexSpec;
    type IntoIter = std::slice::Iter<'a, IndexSpec>;

    fn into_iter(self) -> Self::IntoIter {
        self.specs.iter()
    }
}
