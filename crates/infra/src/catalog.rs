//! Read side of the catalog: listing and free-text search.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::instrument;

use lessonbook_catalog::{translate, Lesson, LessonFilter};

use crate::store::{with_timeout, CatalogStore, StoreError};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("invalid search: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub struct CatalogQueries {
    store: Arc<dyn CatalogStore>,
    store_timeout: Duration,
}

impl CatalogQueries {
    pub fn new(store: Arc<dyn CatalogStore>, store_timeout: Duration) -> Self {
        Self {
            store,
            store_timeout,
        }
    }

    pub async fn list(&self) -> Result<Vec<Lesson>, CatalogError> {
        Ok(with_timeout("find", self.store_timeout, self.store.find(&LessonFilter::All)).await?)
    }

    /// Translate `token` and return every matching lesson (possibly none).
    #[instrument(skip(self))]
    pub async fn search(&self, token: &str) -> Result<Vec<Lesson>, CatalogError> {
        let filter = translate(token).map_err(|e| CatalogError::InvalidInput(e.to_string()))?;
        let lessons = with_timeout("find", self.store_timeout, self.store.find(&filter)).await?;
        tracing::debug!(hits = lessons.len(), "search completed");
        Ok(lessons)
    }
}
