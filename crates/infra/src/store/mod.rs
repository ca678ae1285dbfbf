//! Catalog and order store boundary.
//!
//! This module defines the store-facing interface the core depends on
//! (`find`, `get`, `conditional_update`, `insert`) plus an in-memory backend
//! for tests/dev and a Postgres backend for production.

pub mod in_memory;
pub mod postgres;
pub mod r#trait;

use std::future::Future;
use std::time::Duration;

pub use in_memory::{InMemoryCatalogStore, InMemoryOrderStore};
pub use postgres::{PostgresCatalogStore, PostgresOrderStore};
pub use r#trait::{CatalogStore, OrderStore, SpacesUpdate, StoreError, UpdateOutcome};

/// Bound a store operation by `limit`.
///
/// Dropping the inner future on expiry is safe: every store write is a single
/// statement (or a single lock section), so it either committed or did not.
pub async fn with_timeout<T, F>(operation: &'static str, limit: Duration, fut: F) -> Result<T, StoreError>
where
    F: Future<Output = Result<T, StoreError>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!(operation, timeout_ms = limit.as_millis() as u64, "store operation timed out");
            Err(StoreError::Timeout {
                operation,
                timeout: limit,
            })
        }
    }
}
