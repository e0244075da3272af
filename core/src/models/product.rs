// storefront/src/models/product.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Below this many units a product is shown as low on stock.
pub const LOW_STOCK_THRESHOLD: i32 = 10;

/// A catalog row. Owned by the remote store; the client only reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
  pub id: Uuid,
  pub name: String,
  #[serde(default)]
  pub description: String,
  pub price: Decimal,
  #[serde(default)]
  pub image_url: String,
  #[serde(default)]
  pub category: String,
  pub stock_quantity: i32,
  pub created_at: DateTime<Utc>,
}

impl Product {
  pub fn is_in_stock(&self) -> bool {
    self.stock_quantity > 0
  }

  pub fn is_low_stock(&self) -> bool {
    self.stock_quantity < LOW_STOCK_THRESHOLD
  }
}
