// storefront/src/checkout.rs

//! Turns the current cart into an order.
//!
//! Checkout is a [`Workflow`] with four steps:
//!
//! 1. `snapshot_cart` captures user, items and total; stops when there is nothing to buy.
//! 2. `create_order` inserts the `orders` row.
//! 3. `create_order_items` inserts one `order_items` row per cart line.
//! 4. `clear_cart` (optional) empties the cart. Its failure does not undo the order.
//!
//! The cart's mutation gate is held from `snapshot_cart` until the run ends, so an add
//! issued meanwhile waits and lands in the emptied cart instead of being cleared unordered.
//! Extra handlers registered through [`Checkout::workflow_mut`] must not mutate the cart.
//!
//! The two inserts are not atomic. If step 3 fails the order row stays behind, unless
//! [`CheckoutOptions::compensate_orphan_order`] asks for a best-effort delete.

use crate::cart::{CartHold, CartSync};
use crate::error::{StoreError, StoreResult};
use crate::models::{CartItem, NewOrder, NewOrderItem, Order, OrderItem, SessionUser, ORDER_STATUS_COMPLETED};
use crate::remote::{Query, RemoteStore, RemoteStoreExt, Table};
use crate::workflow::{ContextData, StepControl, StepDef, Workflow, WorkflowOutcome};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

pub const STEP_SNAPSHOT_CART: &str = "snapshot_cart";
pub const STEP_CREATE_ORDER: &str = "create_order";
pub const STEP_CREATE_ORDER_ITEMS: &str = "create_order_items";
pub const STEP_CLEAR_CART: &str = "clear_cart";

#[derive(Debug, Clone, Default)]
pub struct CheckoutOptions {
  /// Delete the freshly created order when its items cannot be written.
  pub compensate_orphan_order: bool,
}

/// Working state of one checkout run.
pub struct CheckoutCtxData {
  pub store: Arc<dyn RemoteStore>,
  pub cart: Arc<CartSync>,
  pub options: CheckoutOptions,
  pub user: Option<SessionUser>,
  pub items: Vec<CartItem>,
  pub total: Decimal,
  pub order: Option<Order>,
  pub order_items: Vec<OrderItem>,
  pub cart_cleared: bool,
  hold: Option<CartHold>,
}

impl CheckoutCtxData {
  fn new(store: Arc<dyn RemoteStore>, cart: Arc<CartSync>, options: CheckoutOptions) -> Self {
    Self {
      store,
      cart,
      options,
      user: None,
      items: Vec::new(),
      total: Decimal::ZERO,
      order: None,
      order_items: Vec::new(),
      cart_cleared: false,
      hold: None,
    }
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutReceipt {
  pub order: Order,
  pub items: Vec<OrderItem>,
  /// `false` when the order was placed but emptying the cart failed.
  pub cart_cleared: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CheckoutOutcome {
  Placed(CheckoutReceipt),
  /// No signed-in user or an empty cart. Nothing was written.
  NothingToCheckout,
}

pub type CheckoutWorkflow = Workflow<CheckoutCtxData, StoreError>;

pub struct Checkout {
  store: Arc<dyn RemoteStore>,
  cart: Arc<CartSync>,
  options: CheckoutOptions,
  workflow: CheckoutWorkflow,
}

impl Checkout {
  pub fn new(store: Arc<dyn RemoteStore>, cart: Arc<CartSync>, options: CheckoutOptions) -> Self {
    Self {
      store,
      cart,
      options,
      workflow: build_workflow(),
    }
  }

  /// The step pipeline, for callers that want to hook extra handlers around the steps.
  pub fn workflow_mut(&mut self) -> &mut CheckoutWorkflow {
    &mut self.workflow
  }

  #[instrument(name = "Checkout::run", skip(self), err(Display))]
  pub async fn run(&self) -> StoreResult<CheckoutOutcome> {
    let ctx = ContextData::new(CheckoutCtxData::new(
      Arc::clone(&self.store),
      Arc::clone(&self.cart),
      self.options.clone(),
    ));

    match self.workflow.run(ctx.clone()).await? {
      WorkflowOutcome::Stopped => Ok(CheckoutOutcome::NothingToCheckout),
      WorkflowOutcome::Completed => {
        let mut guard = ctx.write();
        let order = guard
          .order
          .take()
          .ok_or_else(|| StoreError::Internal("Checkout completed without an order".to_string()))?;
        Ok(CheckoutOutcome::Placed(CheckoutReceipt {
          order,
          items: std::mem::take(&mut guard.order_items),
          cart_cleared: guard.cart_cleared,
        }))
      }
    }
  }
}

fn build_workflow() -> CheckoutWorkflow {
  let mut wf = CheckoutWorkflow::new([
    StepDef::new(STEP_SNAPSHOT_CART),
    StepDef::new(STEP_CREATE_ORDER),
    StepDef::new(STEP_CREATE_ORDER_ITEMS),
    StepDef::new(STEP_CLEAR_CART).optional(),
  ]);

  wf.on(STEP_SNAPSHOT_CART, |ctx: ContextData<CheckoutCtxData>| async move {
    let cart = Arc::clone(&ctx.read().cart);
    let hold = cart.hold().await;
    let snapshot = cart.snapshot();
    if snapshot.user.is_none() || snapshot.items.is_empty() {
      info!("Nothing to check out.");
      return Ok::<_, StoreError>(StepControl::Stop);
    }
    let mut guard = ctx.write();
    guard.hold = Some(hold);
    guard.total = snapshot.total();
    guard.user = snapshot.user;
    guard.items = snapshot.items;
    info!(items = guard.items.len(), total = %guard.total, "Cart captured for checkout.");
    Ok(StepControl::Continue)
  });

  wf.on(STEP_CREATE_ORDER, |ctx: ContextData<CheckoutCtxData>| async move {
    let (store, row) = {
      let guard = ctx.read();
      let user_id = guard
        .user
        .as_ref()
        .map(|u| u.id)
        .ok_or_else(|| StoreError::Auth("No signed-in user".to_string()).at_checkout_step(STEP_CREATE_ORDER))?;
      let row = NewOrder {
        user_id,
        total_amount: guard.total,
        status: ORDER_STATUS_COMPLETED.to_string(),
      };
      (Arc::clone(&guard.store), row)
    };

    let order: Order = store
      .insert_one(&Query::table(Table::Orders).select("*"), &row)
      .await
      .map_err(|e| e.at_checkout_step(STEP_CREATE_ORDER))?;
    info!(order_id = %order.id, total = %order.total_amount, "Order created.");
    ctx.write().order = Some(order);
    Ok::<_, StoreError>(StepControl::Continue)
  });

  wf.on(STEP_CREATE_ORDER_ITEMS, |ctx: ContextData<CheckoutCtxData>| async move {
    let (store, order_id, compensate, rows) = {
      let guard = ctx.read();
      let order_id = guard
        .order
        .as_ref()
        .map(|o| o.id)
        .ok_or_else(|| StoreError::Internal("No order to attach items to".to_string()))?;
      let rows: Vec<NewOrderItem> = guard
        .items
        .iter()
        .map(|item| NewOrderItem {
          order_id,
          product_id: item.product_id,
          quantity: item.quantity,
          price: item.unit_price(),
        })
        .collect();
      (Arc::clone(&guard.store), order_id, guard.options.compensate_orphan_order, rows)
    };

    match store
      .insert_many::<_, OrderItem>(&Query::table(Table::OrderItems).select("*"), &rows)
      .await
    {
      Ok(items) => {
        info!(%order_id, items = items.len(), "Order items created.");
        ctx.write().order_items = items;
        Ok::<_, StoreError>(StepControl::Continue)
      }
      Err(e) => {
        if compensate {
          match store.delete(&Query::table(Table::Orders).eq("id", order_id)).await {
            Ok(()) => warn!(%order_id, "Order removed after its items could not be written."),
            Err(del) => error!(%order_id, error = %del, "Could not remove orphan order."),
          }
        } else {
          warn!(%order_id, "Order left without items.");
        }
        Err(e.at_checkout_step(STEP_CREATE_ORDER_ITEMS))
      }
    }
  });

  wf.on(STEP_CLEAR_CART, |ctx: ContextData<CheckoutCtxData>| async move {
    let (cart, hold) = {
      let mut guard = ctx.write();
      (Arc::clone(&guard.cart), guard.hold.take())
    };
    let result = match &hold {
      Some(hold) => cart.clear_held(hold).await,
      None => cart.clear().await,
    };
    drop(hold);
    let cleared = match result {
      Ok(()) => true,
      Err(e) => {
        warn!(error = %e, "Order placed but the cart could not be cleared.");
        false
      }
    };
    ctx.write().cart_cleared = cleared;
    Ok::<_, StoreError>(StepControl::Continue)
  });

  wf
}
