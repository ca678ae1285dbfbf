use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use lessonbook_core::{DomainError, DomainResult, OrderId};

/// Client-submitted order payload, as received.
///
/// Items are caller-supplied and kept verbatim: a bare lesson id, an object
/// with whatever keys the client uses, anything JSON. They are neither
/// resolved against the catalog nor structurally checked.
///
/// Every field defaults so that a missing field surfaces as a validation
/// failure rather than a decoding failure. Unknown fields (including any
/// client-side timestamp) are ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct OrderDraft {
    #[serde(default)]
    pub items: Vec<JsonValue>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone: String,
}

/// A validated order awaiting persistence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewOrder {
    pub items: Vec<JsonValue>,
    pub name: String,
    pub phone: String,
    pub created_at: DateTime<Utc>,
}

/// Persisted order. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Order {
    pub id: OrderId,
    pub items: Vec<JsonValue>,
    pub name: String,
    pub phone: String,
    pub created_at: DateTime<Utc>,
}

impl OrderDraft {
    /// Validate the draft and stamp it with the server-side creation time.
    pub fn validate(self, created_at: DateTime<Utc>) -> DomainResult<NewOrder> {
        if self.items.is_empty() {
            return Err(DomainError::validation("order must contain at least one item"));
        }

        let name = self.name.trim();
        if name.is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        let phone = self.phone.trim();
        if phone.is_empty() {
            return Err(DomainError::validation("phone cannot be empty"));
        }

        Ok(NewOrder {
            items: self.items,
            name: name.to_string(),
            phone: phone.to_string(),
            created_at,
        })
    }
}

impl NewOrder {
    pub fn into_order(self, id: OrderId) -> Order {
        Order {
            id,
            items: self.items,
            name: self.name,
            phone: self.phone,
            created_at: self.created_at,
        }
    }
}
