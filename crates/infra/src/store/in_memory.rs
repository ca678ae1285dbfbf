use std::collections::BTreeMap;
use std::sync::RwLock;

use lessonbook_catalog::{Lesson, LessonFilter, NewLesson};
use lessonbook_core::{LessonId, OrderId, Versioned};
use lessonbook_orders::{NewOrder, Order};

use super::r#trait::{CatalogStore, OrderStore, SpacesUpdate, StoreError, UpdateOutcome};

fn poisoned() -> StoreError {
    StoreError::Backend("lock poisoned".to_string())
}

/// In-memory lesson store.
///
/// Intended for tests/dev. Conditional updates run entirely under the write
/// lock, which makes the version check, the floor check and the write one
/// atomic step.
#[derive(Debug, Default)]
pub struct InMemoryCatalogStore {
    lessons: RwLock<BTreeMap<LessonId, Lesson>>,
}

impl InMemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl CatalogStore for InMemoryCatalogStore {
    async fn find(&self, filter: &LessonFilter) -> Result<Vec<Lesson>, StoreError> {
        let lessons = self.lessons.read().map_err(|_| poisoned())?;
        Ok(lessons
            .values()
            .filter(|lesson| filter.matches(lesson))
            .cloned()
            .collect())
    }

    async fn get(&self, id: LessonId) -> Result<Option<Lesson>, StoreError> {
        let lessons = self.lessons.read().map_err(|_| poisoned())?;
        Ok(lessons.get(&id).cloned())
    }

    async fn conditional_update(
        &self,
        id: LessonId,
        update: SpacesUpdate,
    ) -> Result<UpdateOutcome, StoreError> {
        let mut lessons = self.lessons.write().map_err(|_| poisoned())?;

        let Some(lesson) = lessons.get_mut(&id) else {
            return Ok(UpdateOutcome::NotFound);
        };

        if !update.expected.matches(lesson.version()) {
            return Ok(UpdateOutcome::VersionMismatch {
                actual: lesson.version(),
            });
        }

        let next = match lesson.spaces_after(update.delta) {
            Ok(next) => next,
            Err(rejection) => return Ok(UpdateOutcome::Rejected(rejection)),
        };

        lesson.spaces = next;
        lesson.version += 1;
        Ok(UpdateOutcome::Applied(lesson.clone()))
    }

    async fn insert(&self, lesson: NewLesson) -> Result<LessonId, StoreError> {
        lesson
            .validate()
            .map_err(|e| StoreError::InvalidRecord(e.to_string()))?;

        let id = LessonId::new();
        let mut lessons = self.lessons.write().map_err(|_| poisoned())?;
        lessons.insert(id, lesson.into_lesson(id));
        Ok(id)
    }

    async fn count(&self) -> Result<u64, StoreError> {
        let lessons = self.lessons.read().map_err(|_| poisoned())?;
        Ok(lessons.len() as u64)
    }
}

/// In-memory append-only order store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryOrderStore {
    orders: RwLock<Vec<Order>>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every persisted order, in insertion order.
    pub fn all(&self) -> Result<Vec<Order>, StoreError> {
        let orders = self.orders.read().map_err(|_| poisoned())?;
        Ok(orders.clone())
    }
}

#[async_trait::async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn insert(&self, order: NewOrder) -> Result<OrderId, StoreError> {
        let id = OrderId::new();
        let mut orders = self.orders.write().map_err(|_| poisoned())?;
        orders.push(order.into_order(id));
        Ok(id)
    }
}
