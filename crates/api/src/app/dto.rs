use serde::{Deserialize, Serialize};

use lessonbook_core::OrderId;

// -------------------------
// Request DTOs
// -------------------------

/// Body of `PUT /lessons/:id`.
///
/// The delta is kept raw so that numeric strings and integral floats can be
/// accepted; see `lessonbook_infra::inventory::parse_delta`.
#[derive(Debug, Deserialize)]
pub struct AdjustSpacesRequest {
    #[serde(rename = "spacesDelta", default)]
    pub spaces_delta: serde_json::Value,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct OrderCreatedResponse {
    pub ok: bool,
    #[serde(rename = "orderId")]
    pub order_id: OrderId,
}

impl OrderCreatedResponse {
    pub fn new(order_id: OrderId) -> Self {
        Self { ok: true, order_id }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_delta_deserializes_to_null() {
        let req: AdjustSpacesRequest = serde_json::from_str("{}").unwrap();
        assert!(req.spaces_delta.is_null());

        let req: AdjustSpacesRequest = serde_json::from_str(r#"{"spacesDelta": "-2"}"#).unwrap();
        assert_eq!(req.spaces_delta, serde_json::json!("-2"));
    }

    #[test]
    fn order_created_shape() {
        let id = OrderId::new();
        let body = serde_json::to_value(OrderCreatedResponse::new(id)).unwrap();
        assert_eq!(body["ok"], true);
        assert_eq!(body["orderId"], id.to_string());
    }
}
