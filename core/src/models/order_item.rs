// storefront/src/models/order_item.rs

use super::Product;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A purchased line. `price` is the unit price at the time of purchase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
  pub id: Uuid,
  pub order_id: Uuid,
  pub product_id: Uuid,
  pub quantity: i32,
  pub price: Decimal,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub product: Option<Product>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewOrderItem {
  pub order_id: Uuid,
  pub product_id: Uuid,
  pub quantity: i32,
  pub price: Decimal,
}
