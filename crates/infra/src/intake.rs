//! Order intake: validate and persist client-submitted orders.
//!
//! Intake does **not** touch lesson availability. Callers that want an order
//! to consume spaces sequence an inventory adjustment themselves; the two
//! writes are independent.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::instrument;

use lessonbook_core::{DomainError, OrderId};
use lessonbook_orders::OrderDraft;

use crate::store::{with_timeout, OrderStore, StoreError};

#[derive(Debug, Error)]
pub enum IntakeError {
    #[error("invalid order: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<DomainError> for IntakeError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::Validation(msg)
            | DomainError::InvariantViolation(msg)
            | DomainError::InvalidId(msg) => IntakeError::InvalidInput(msg),
        }
    }
}

pub struct OrderIntake {
    store: Arc<dyn OrderStore>,
    store_timeout: Duration,
    clock: fn() -> DateTime<Utc>,
}

impl OrderIntake {
    pub fn new(store: Arc<dyn OrderStore>, store_timeout: Duration) -> Self {
        Self {
            store,
            store_timeout,
            clock: Utc::now,
        }
    }

    /// Replace the creation-time source (tests).
    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    /// Validate `draft`, stamp it with the server time and persist it.
    ///
    /// Nothing is written when validation fails.
    #[instrument(skip(self, draft), fields(items = draft.items.len()))]
    pub async fn create_order(&self, draft: OrderDraft) -> Result<OrderId, IntakeError> {
        let order = draft.validate((self.clock)())?;
        let id = with_timeout("insert_order", self.store_timeout, self.store.insert(order)).await?;
        tracing::info!(order_id = %id, "order created");
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    use crate::store::InMemoryOrderStore;

    fn fixed_clock() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap()
    }

    fn draft() -> OrderDraft {
        OrderDraft {
            items: vec![json!({"lessonId": "lesson-1", "spaces": 1})],
            name: "Ada".to_string(),
            phone: "123".to_string(),
        }
    }

    fn intake(store: Arc<InMemoryOrderStore>) -> OrderIntake {
        OrderIntake::new(store, Duration::from_secs(1)).with_clock(fixed_clock)
    }

    #[tokio::test]
    async fn valid_order_is_persisted_with_server_timestamp() {
        let store = Arc::new(InMemoryOrderStore::new());
        let id = intake(store.clone()).create_order(draft()).await.unwrap();

        let all = store.all().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, id);
        assert_eq!(all[0].created_at, fixed_clock());
        assert_eq!(all[0].name, "Ada");
    }

    #[tokio::test]
    async fn invalid_orders_persist_nothing() {
        let store = Arc::new(InMemoryOrderStore::new());
        let intake = intake(store.clone());

        let mut no_items = draft();
        no_items.items.clear();
        let mut blank_name = draft();
        blank_name.name = "   ".to_string();
        let mut blank_phone = draft();
        blank_phone.phone = String::new();

        for bad in [no_items, blank_name, blank_phone] {
            let err = intake.create_order(bad).await.unwrap_err();
            assert!(matches!(err, IntakeError::InvalidInput(_)));
        }
        assert!(store.all().unwrap().is_empty());
    }

    #[tokio::test]
    async fn bare_string_items_are_accepted() {
        let store = Arc::new(InMemoryOrderStore::new());
        let mut d = draft();
        d.items = vec![json!("lesson-1"), json!("lesson-2")];

        intake(store.clone()).create_order(d).await.unwrap();
        assert_eq!(store.all().unwrap()[0].items, vec![json!("lesson-1"), json!("lesson-2")]);
    }

    #[test]
    fn every_domain_error_becomes_invalid_input() {
        for (err, expected) in [
            (DomainError::validation("name cannot be empty"), "name cannot be empty"),
            (DomainError::invariant("spaces cannot be negative"), "spaces cannot be negative"),
            (DomainError::invalid_id("OrderId: bad"), "OrderId: bad"),
        ] {
            match IntakeError::from(err) {
                IntakeError::InvalidInput(msg) => assert_eq!(msg, expected),
                other => panic!("expected invalid input, got {other:?}"),
            }
        }
    }
}
