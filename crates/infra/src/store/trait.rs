use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use lessonbook_catalog::{Lesson, LessonFilter, NewLesson, SpacesRejection};
use lessonbook_core::{ExpectedVersion, LessonId, OrderId};
use lessonbook_orders::NewOrder;

/// Store operation error.
///
/// These are **infrastructure errors** (connectivity, timeouts, backend
/// failures) as opposed to domain outcomes such as "lesson not found" or
/// "insufficient spaces", which are reported through [`UpdateOutcome`].
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store is not connected, or the connection has failed.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// The operation did not complete within the configured budget.
    #[error("store operation `{operation}` timed out after {timeout:?}")]
    Timeout {
        operation: &'static str,
        timeout: Duration,
    },

    /// A record failed validation on insert, or a stored row could not be decoded.
    #[error("invalid record: {0}")]
    InvalidRecord(String),

    /// Any other backend failure.
    #[error("store backend error: {0}")]
    Backend(String),
}

/// Conditional write against a lesson's `spaces` counter.
///
/// The store applies `spaces += delta` only if, at commit time, the record is
/// at the `expected` version **and** the result is non-negative. Both checks
/// and the write are a single atomic step.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SpacesUpdate {
    pub delta: i64,
    pub expected: ExpectedVersion,
}

/// Result of a conditional write that reached the store.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOutcome {
    /// Written; carries the post-update record.
    Applied(Lesson),
    /// No lesson with that id.
    NotFound,
    /// The record moved past the expected version, or (under
    /// `ExpectedVersion::Any`) changed while the store classified a refusal.
    VersionMismatch { actual: u64 },
    /// The delta would break the non-negativity invariant (or overflow).
    Rejected(SpacesRejection),
}

/// Persistent lesson collection.
///
/// The store exclusively owns lesson persistence and is the sole arbiter of
/// the `spaces >= 0` invariant.
#[async_trait::async_trait]
pub trait CatalogStore: Send + Sync {
    /// All lessons matching `filter`, in id order.
    async fn find(&self, filter: &LessonFilter) -> Result<Vec<Lesson>, StoreError>;

    async fn get(&self, id: LessonId) -> Result<Option<Lesson>, StoreError>;

    /// Atomic conditional update of `spaces`; see [`SpacesUpdate`].
    async fn conditional_update(
        &self,
        id: LessonId,
        update: SpacesUpdate,
    ) -> Result<UpdateOutcome, StoreError>;

    /// Insert a new lesson; the store assigns its identity.
    async fn insert(&self, lesson: NewLesson) -> Result<LessonId, StoreError>;

    async fn count(&self) -> Result<u64, StoreError>;
}

/// Append-only order collection.
#[async_trait::async_trait]
pub trait OrderStore: Send + Sync {
    /// Persist a new, immutable order; the store assigns its identity.
    async fn insert(&self, order: NewOrder) -> Result<OrderId, StoreError>;
}

#[async_trait::async_trait]
impl<S> CatalogStore for Arc<S>
where
    S: CatalogStore + ?Sized,
{
    async fn find(&self, filter: &LessonFilter) -> Result<Vec<Lesson>, StoreError> {
        (**self).find(filter).await
    }

    async fn get(&self, id: LessonId) -> Result<Option<Lesson>, StoreError> {
        (**self).get(id).await
    }

    async fn conditional_update(
        &self,
        id: LessonId,
        update: SpacesUpdate,
    ) -> Result<UpdateOutcome, StoreError> {
        (**self).conditional_update(id, update).await
    }

    async fn insert(&self, lesson: NewLesson) -> Result<LessonId, StoreError> {
        (**self).insert(lesson).await
    }

    async fn count(&self) -> Result<u64, StoreError> {
        (**self).count().await
    }
}

#[async_trait::async_trait]
impl<S> OrderStore for Arc<S>
where
    S: OrderStore + ?Sized,
{
    async fn insert(&self, order: NewOrder) -> Result<OrderId, StoreError> {
        (**self).insert(order).await
    }
}
