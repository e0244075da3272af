// storefront/examples/in_memory_checkout.rs

use chrono::Utc;
use rust_decimal::Decimal;
use std::sync::Arc;
use storefront::models::{AuthSession, Product, SessionUser};
use storefront::{
  CartSync, Catalog, Checkout, CheckoutOptions, CheckoutOutcome, MemoryStore, OrderHistory, ProductFilter,
  RemoteStore, Session, StoreResult, Table,
};
use tracing::info;
use uuid::Uuid;

#[tokio::main]
async fn main() -> StoreResult<()> {
  tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();

  info!("--- In-memory storefront walkthrough ---");

  // 1. A store with two products.
  let memory = MemoryStore::new();
  memory.seed(
    Table::Products,
    &[
      Product {
        id: Uuid::new_v4(),
        name: "Desk Lamp".to_string(),
        description: "Warm light for late nights".to_string(),
        price: Decimal::new(1999, 2),
        image_url: String::new(),
        category: "home".to_string(),
        stock_quantity: 25,
        created_at: Utc::now(),
      },
      Product {
        id: Uuid::new_v4(),
        name: "Coffee Mug".to_string(),
        description: "Holds 350ml".to_string(),
        price: Decimal::new(850, 2),
        image_url: String::new(),
        category: "kitchen".to_string(),
        stock_quantity: 4,
        created_at: Utc::now(),
      },
    ],
  )?;
  let store: Arc<dyn RemoteStore> = Arc::new(memory);

  // 2. Wire the cart to a session and sign someone in.
  let session = Session::new();
  let cart = Arc::new(CartSync::new(Arc::clone(&store)));
  cart.attach(&session);
  session
    .establish(AuthSession {
      access_token: "local".to_string(),
      refresh_token: None,
      expires_in: None,
      user: SessionUser {
        id: Uuid::new_v4(),
        email: Some("ada@example.com".to_string()),
      },
    })
    .await;

  // 3. Browse and fill the cart.
  let catalog = Catalog::new(Arc::clone(&store));
  for product in catalog.list(&ProductFilter::default()).await? {
    info!(name = %product.name, price = %product.price, low_stock = product.is_low_stock(), "Adding to cart.");
    cart.add(&product, 2).await?;
  }
  info!(count = cart.count(), total = %cart.total(), "Cart ready.");

  // 4. Check out and look at the history.
  let checkout = Checkout::new(Arc::clone(&store), Arc::clone(&cart), CheckoutOptions::default());
  if let CheckoutOutcome::Placed(receipt) = checkout.run().await? {
    info!(order_id = %receipt.order.id, total = %receipt.order.total_amount, "Order placed.");
  }

  let orders = OrderHistory::new(store, session.clone()).list().await?;
  info!(orders = orders.len(), cart_empty = cart.is_empty(), "Done.");
  Ok(())
}
