// storefront/src/cart/state.rs

use crate::models::{CartItem, SessionUser};
use rust_decimal::Decimal;
use uuid::Uuid;

/// In-memory view of one user's cart.
#[derive(Debug, Clone, Default)]
pub struct CartState {
  pub user: Option<SessionUser>,
  pub items: Vec<CartItem>,
}

impl CartState {
  pub fn user_id(&self) -> Option<Uuid> {
    self.user.as_ref().map(|u| u.id)
  }

  pub fn quantity_of(&self, product_id: Uuid) -> Option<i32> {
    self.items.iter().find(|i| i.product_id == product_id).map(|i| i.quantity)
  }

  /// Sum of `price * quantity`. Items without a joined product count as zero.
  pub fn total(&self) -> Decimal {
    self.items.iter().map(CartItem::line_total).sum()
  }

  pub fn count(&self) -> i64 {
    self.items.iter().map(|i| i64::from(i.quantity)).sum()
  }
}
