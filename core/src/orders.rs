// storefront/src/orders.rs

use crate::error::StoreResult;
use crate::identity::Session;
use crate::models::Order;
use crate::remote::{Query, RemoteStore, RemoteStoreExt, Table};
use std::sync::Arc;
use tracing::{debug, instrument};

pub const ORDER_HISTORY_SELECT: &str = "*, order_items(*, product:products(*))";

/// Past orders of whoever is signed in on `session`.
#[derive(Clone)]
pub struct OrderHistory {
  store: Arc<dyn RemoteStore>,
  session: Session,
}

impl OrderHistory {
  pub fn new(store: Arc<dyn RemoteStore>, session: Session) -> Self {
    Self { store, session }
  }

  /// Newest first, each with its items and their products. Empty when nobody is signed in.
  #[instrument(name = "OrderHistory::list", skip(self), err(Display))]
  pub async fn list(&self) -> StoreResult<Vec<Order>> {
    let Some(user) = self.session.current_user() else {
      debug!("No signed-in user; no order history.");
      return Ok(Vec::new());
    };
    let query = Query::table(Table::Orders)
      .select(ORDER_HISTORY_SELECT)
      .eq("user_id", user.id)
      .order_by("created_at", false);
    self.store.fetch(&query).await
  }
}
