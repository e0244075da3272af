// storefront/src/models/cart_item.rs

use super::Product;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A (user, product, quantity) row, optionally with the product joined in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
  pub id: Uuid,
  pub user_id: Uuid,
  pub product_id: Uuid,
  pub quantity: i32,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub product: Option<Product>,
}

impl CartItem {
  /// Price of the joined product; zero when the join is missing.
  pub fn unit_price(&self) -> Decimal {
    self.product.as_ref().map(|p| p.price).unwrap_or(Decimal::ZERO)
  }

  pub fn line_total(&self) -> Decimal {
    self.unit_price() * Decimal::from(self.quantity)
  }
}

/// Insert payload for `cart_items`.
#[derive(Debug, Clone, Serialize)]
pub struct NewCartItem {
  pub user_id: Uuid,
  pub product_id: Uuid,
  pub quantity: i32,
}
