// tests/common/mod.rs
#![allow(dead_code)] // Not every test binary uses every fixture

use chrono::{TimeZone, Utc};
use once_cell::sync::Lazy;
use rust_decimal::Decimal;
use serde_json::json;
use std::sync::Arc;
use storefront::models::{AuthSession, Product, SessionUser};
use storefront::{CartSync, ContextData, MemoryStore, RemoteStore, Session, StepControl, Table};
use tracing::Level;
use uuid::Uuid;

// --- Tracing ---
static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

// --- Catalog fixtures ---
pub fn product(name: &str, price: Decimal, category: &str, stock: i32, day: u32) -> Product {
  Product {
    id: Uuid::new_v4(),
    name: name.to_string(),
    description: format!("{name} description"),
    price,
    image_url: format!("https://img.example.com/{}.jpg", name.to_lowercase().replace(' ', "-")),
    category: category.to_string(),
    stock_quantity: stock,
    created_at: Utc.with_ymd_and_hms(2024, 3, day, 12, 0, 0).unwrap(),
  }
}

/// The 19.99 product most cart scenarios revolve around.
pub fn lamp() -> Product {
  product("Desk Lamp", Decimal::new(1999, 2), "home", 25, 1)
}

pub fn mug() -> Product {
  product("Coffee Mug", Decimal::new(850, 2), "kitchen", 4, 2)
}

pub fn store_with(products: &[Product]) -> Arc<MemoryStore> {
  let store = MemoryStore::new();
  store.seed(Table::Products, products).unwrap();
  Arc::new(store)
}

pub fn seed_cart_line(store: &MemoryStore, user: &SessionUser, product: &Product, quantity: i32) {
  store
    .seed(
      Table::CartItems,
      &[json!({
        "id": Uuid::new_v4(),
        "user_id": user.id,
        "product_id": product.id,
        "quantity": quantity,
      })],
    )
    .unwrap();
}

// --- Identity fixtures ---
pub fn user(email: &str) -> SessionUser {
  SessionUser {
    id: Uuid::new_v4(),
    email: Some(email.to_string()),
  }
}

pub fn auth_session(user: &SessionUser) -> AuthSession {
  AuthSession {
    access_token: format!("token-{}", user.id.simple()),
    refresh_token: Some("refresh".to_string()),
    expires_in: Some(3600),
    user: user.clone(),
  }
}

/// A cart attached to a session in which `user` is already signed in.
pub async fn signed_in_cart(store: &Arc<MemoryStore>, user: &SessionUser) -> (Session, Arc<CartSync>) {
  let session = Session::new();
  let cart = Arc::new(CartSync::new(Arc::clone(store) as Arc<dyn RemoteStore>));
  cart.attach(&session);
  session.establish(auth_session(user)).await;
  (session, cart)
}

// --- Workflow fixtures ---
#[derive(Clone, Debug, Default)]
pub struct TestContext {
  pub counter: i32,
  pub message: String,
  pub steps_executed: Vec<String>,
  pub should_stop_at: Option<String>,
}

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum TestError {
  #[error("Workflow error: {0}")]
  Workflow(String),

  #[error("Test handler failed: {0}")]
  Handler(String),
}

impl From<storefront::WorkflowError> for TestError {
  fn from(err: storefront::WorkflowError) -> Self {
    TestError::Workflow(format!("{err:?}"))
  }
}

pub fn simple_handler(
  step_name: &'static str,
  message_to_append: &'static str,
) -> impl Fn(ContextData<TestContext>) -> std::future::Ready<Result<StepControl, TestError>> + Send + Sync + 'static {
  move |ctx: ContextData<TestContext>| {
    let mut guard = ctx.write();
    guard.counter += 1;
    guard.message.push_str(message_to_append);
    guard.steps_executed.push(step_name.to_string());
    tracing::debug!(target: "test_handlers", step = step_name, counter = guard.counter, "executed");
    let control = match &guard.should_stop_at {
      Some(stop) if stop == step_name => StepControl::Stop,
      _ => StepControl::Continue,
    };
    std::future::ready(Ok(control))
  }
}

pub fn failing_handler(
  step_name: &'static str,
  error_message: &'static str,
) -> impl Fn(ContextData<TestContext>) -> std::future::Ready<Result<StepControl, TestError>> + Send + Sync + 'static {
  move |ctx: ContextData<TestContext>| {
    ctx.write().steps_executed.push(step_name.to_string());
    tracing::warn!(target: "test_handlers", step = step_name, "failing with: '{}'", error_message);
    std::future::ready(Err(TestError::Handler(error_message.to_string())))
  }
}
