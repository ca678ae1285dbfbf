//! Startup seeding of the catalog from a JSON file.
//!
//! The file holds an array of lessons without ids. Seeding is skipped when
//! the catalog already has lessons, so restarting against a persistent store
//! does not duplicate the catalog.

use std::path::Path;

use thiserror::Error;

use lessonbook_catalog::NewLesson;
use lessonbook_core::DomainError;

use crate::store::{CatalogStore, StoreError};

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("failed to read seed file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse seed file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("seed lesson {index} is invalid: {source}")]
    Invalid {
        index: usize,
        #[source]
        source: DomainError,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Read and validate a seed file.
pub async fn read_seed_file(path: &Path) -> Result<Vec<NewLesson>, SeedError> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| SeedError::Io {
            path: path.display().to_string(),
            source,
        })?;
    parse_seed(&raw)
}

pub fn parse_seed(raw: &str) -> Result<Vec<NewLesson>, SeedError> {
    let lessons: Vec<NewLesson> = serde_json::from_str(raw)?;
    for (index, lesson) in lessons.iter().enumerate() {
        lesson
            .validate()
            .map_err(|source| SeedError::Invalid { index, source })?;
    }
    Ok(lessons)
}

/// Insert `lessons` unless the catalog already holds data. Returns how many
/// lessons were inserted.
pub async fn seed_if_empty(
    store: &dyn CatalogStore,
    lessons: Vec<NewLesson>,
) -> Result<usize, SeedError> {
    let existing = store.count().await?;
    if existing > 0 {
        tracing::info!(existing, "catalog already populated, skipping seed");
        return Ok(0);
    }

    let total = lessons.len();
    for lesson in lessons {
        store.insert(lesson).await?;
    }
    tracing::info!(inserted = total, "catalog seeded");
    Ok(total)
}
