// storefront/src/cart/sync.rs

use super::state::CartState;
use crate::error::{StoreError, StoreResult};
use crate::identity::{IdentityObserver, Session, SubscriptionId};
use crate::models::{CartItem, NewCartItem, Product, SessionUser};
use crate::remote::{Query, RemoteStore, RemoteStoreExt, Table};
use crate::workflow::ContextData;
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

/// Cart rows are always read back with their product joined in.
pub const CART_ITEM_SELECT: &str = "*, product:products(*)";

fn logged(operation: &'static str, err: StoreError) -> StoreError {
  error!(operation, error = %err, "Cart operation failed.");
  err
}

/// Mediates between the in-memory cart and the `cart_items` table.
///
/// Every mutation goes through `gate`, so overlapping calls on one instance are applied one
/// after the other and never see a half-updated list. Reads (`total`, `count`, `items`) do
/// not wait on the gate.
///
/// Remote failures are logged and returned; the in-memory list is then left as it was.
/// A missing user or an invalid quantity is a silent no-op.
pub struct CartSync {
  store: Arc<dyn RemoteStore>,
  state: ContextData<CartState>,
  gate: Arc<tokio::sync::Mutex<()>>,
}

/// Exclusive hold on a cart's mutation gate, released on drop. While it is held every
/// mutation and load on that cart waits.
pub(crate) struct CartHold {
  _guard: tokio::sync::OwnedMutexGuard<()>,
}

impl CartSync {
  pub fn new(store: Arc<dyn RemoteStore>) -> Self {
    Self {
      store,
      state: ContextData::default(),
      gate: Arc::new(tokio::sync::Mutex::new(())),
    }
  }

  /// Subscribes this cart to `session`, so it loads on sign-in and empties on sign-out.
  ///
  /// Only future transitions are observed; call [`load`](Self::load) with the current
  /// user if one is already signed in.
  pub fn attach(self: &Arc<Self>, session: &Session) -> SubscriptionId {
    session.subscribe(Arc::clone(self) as Arc<dyn IdentityObserver>)
  }

  fn base_query(user_id: Uuid) -> Query {
    Query::table(Table::CartItems).eq("user_id", user_id)
  }

  #[instrument(name = "CartSync::load", skip_all, fields(user_id = ?user.as_ref().map(|u| u.id)), err(Display))]
  pub async fn load(&self, user: Option<SessionUser>) -> StoreResult<()> {
    let _gate = self.gate.lock().await;

    let Some(user) = user else {
      self.state.update(|s| *s = CartState::default());
      debug!("Cart cleared after sign-out.");
      return Ok(());
    };

    self.state.update(|s| {
      if s.user_id() != Some(user.id) {
        s.items.clear();
      }
      s.user = Some(user.clone());
    });

    let query = Self::base_query(user.id).select(CART_ITEM_SELECT);
    let items: Vec<CartItem> = self.store.fetch(&query).await.map_err(|e| logged("load", e))?;
    info!(items = items.len(), "Cart loaded.");
    self.state.update(|s| s.items = items);
    Ok(())
  }

  /// Forgets the user and the items without touching the remote store.
  pub async fn reset(&self) {
    let _gate = self.gate.lock().await;
    self.state.update(|s| *s = CartState::default());
  }

  /// Adds `quantity` of `product`. An existing line for the product has its quantity
  /// raised instead of a second row being inserted; a sum past `i32::MAX` is rejected with
  /// [`StoreError::QuantityOverflow`].
  #[instrument(name = "CartSync::add", skip(self, product), fields(product_id = %product.id), err(Display))]
  pub async fn add(&self, product: &Product, quantity: i32) -> StoreResult<()> {
    let _gate = self.gate.lock().await;

    if quantity < 1 {
      debug!("Ignoring add with non-positive quantity.");
      return Ok(());
    }
    let Some(user_id) = self.state.read().user_id() else {
      debug!("Ignoring add without a signed-in user.");
      return Ok(());
    };

    let existing = self.state.read().quantity_of(product.id);
    if let Some(current) = existing {
      let merged = current
        .checked_add(quantity)
        .ok_or_else(|| logged("add", StoreError::QuantityOverflow { current, added: quantity }))?;
      return self.apply_quantity(user_id, product.id, merged).await;
    }

    let row = NewCartItem {
      user_id,
      product_id: product.id,
      quantity,
    };
    let query = Query::table(Table::CartItems).select(CART_ITEM_SELECT);
    let item: CartItem = self
      .store
      .insert_one(&query, &row)
      .await
      .map_err(|e| logged("add", e))?;
    self.state.update(|s| s.items.push(item));
    Ok(())
  }

  /// Sets the quantity of `product_id`. Quantities below one are ignored; removing a line
  /// is what [`remove`](Self::remove) is for.
  #[instrument(name = "CartSync::update", skip(self), err(Display))]
  pub async fn update(&self, product_id: Uuid, quantity: i32) -> StoreResult<()> {
    let _gate = self.gate.lock().await;

    if quantity < 1 {
      debug!("Ignoring update with non-positive quantity.");
      return Ok(());
    }
    let Some(user_id) = self.state.read().user_id() else {
      debug!("Ignoring update without a signed-in user.");
      return Ok(());
    };
    self.apply_quantity(user_id, product_id, quantity).await
  }

  async fn apply_quantity(&self, user_id: Uuid, product_id: Uuid, quantity: i32) -> StoreResult<()> {
    let query = Self::base_query(user_id)
      .eq("product_id", product_id)
      .select(CART_ITEM_SELECT);
    let item: CartItem = self
      .store
      .update_one(&query, json!({ "quantity": quantity }))
      .await
      .map_err(|e| logged("update", e))?;
    self.state.update(|s| {
      if let Some(slot) = s.items.iter_mut().find(|i| i.product_id == product_id) {
        *slot = item;
      }
    });
    Ok(())
  }

  /// Deletes the line for `product_id`. Removing a product that is not in the cart
  /// changes nothing.
  #[instrument(name = "CartSync::remove", skip(self), err(Display))]
  pub async fn remove(&self, product_id: Uuid) -> StoreResult<()> {
    let _gate = self.gate.lock().await;

    let Some(user_id) = self.state.read().user_id() else {
      debug!("Ignoring remove without a signed-in user.");
      return Ok(());
    };
    let query = Self::base_query(user_id).eq("product_id", product_id);
    self.store.delete(&query).await.map_err(|e| logged("remove", e))?;
    self.state.update(|s| s.items.retain(|i| i.product_id != product_id));
    Ok(())
  }

  #[instrument(name = "CartSync::clear", skip(self), err(Display))]
  pub async fn clear(&self) -> StoreResult<()> {
    let _gate = self.gate.lock().await;
    self.clear_unlocked().await
  }

  /// Takes the mutation gate and keeps it until the returned hold is dropped.
  pub(crate) async fn hold(&self) -> CartHold {
    CartHold {
      _guard: Arc::clone(&self.gate).lock_owned().await,
    }
  }

  /// [`clear`](Self::clear) for a caller that already holds the gate.
  pub(crate) async fn clear_held(&self, _hold: &CartHold) -> StoreResult<()> {
    self.clear_unlocked().await
  }

  async fn clear_unlocked(&self) -> StoreResult<()> {
    let Some(user_id) = self.state.read().user_id() else {
      debug!("Ignoring clear without a signed-in user.");
      return Ok(());
    };
    self
      .store
      .delete(&Self::base_query(user_id))
      .await
      .map_err(|e| logged("clear", e))?;
    self.state.update(|s| s.items.clear());
    Ok(())
  }

  pub fn total(&self) -> Decimal {
    self.state.read().total()
  }

  pub fn count(&self) -> i64 {
    self.state.read().count()
  }

  pub fn items(&self) -> Vec<CartItem> {
    self.state.read().items.clone()
  }

  pub fn is_empty(&self) -> bool {
    self.state.read().items.is_empty()
  }

  pub fn user(&self) -> Option<SessionUser> {
    self.state.read().user.clone()
  }

  /// Consistent copy of user, items and total taken under one read lock.
  pub fn snapshot(&self) -> CartState {
    self.state.read().clone()
  }
}

#[async_trait]
impl IdentityObserver for CartSync {
  async fn identity_changed(&self, user: Option<SessionUser>) {
    // Already logged by `load`; the cart simply stays empty for the new user.
    let _ = self.load(user).await;
  }
}

impl std::fmt::Debug for CartSync {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let state = self.state.read();
    f.debug_struct("CartSync")
      .field("user", &state.user_id())
      .field("items", &state.items.len())
      .finish()
  }
}
