// storefront/src/models/order.rs

use super::OrderItem;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Status written by checkout. Orders are never moved to another status by this client.
pub const ORDER_STATUS_COMPLETED: &str = "completed";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
  pub id: Uuid,
  pub user_id: Uuid,
  pub total_amount: Decimal,
  pub status: String,
  pub created_at: DateTime<Utc>,
  /// Present only when fetched with `order_items(...)` in the select list.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub order_items: Option<Vec<OrderItem>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewOrder {
  pub user_id: Uuid,
  pub total_amount: Decimal,
  pub status: String,
}
