// tests/cart_sync_tests.rs
mod common;

use common::*;
use rust_decimal::Decimal;
use serial_test::serial;
use std::sync::Arc;
use std::time::Duration;
use storefront::models::CartItem;
use storefront::remote::Operation;
use storefront::{CartSync, MemoryStore, RemoteStore, StoreError, Table};

fn remote_lines(store: &MemoryStore) -> Vec<CartItem> {
  store.decoded(Table::CartItems).unwrap()
}

#[tokio::test]
#[serial]
async fn test_count_tracks_quantities_across_mutations() {
  setup_tracing();
  let (lamp, mug) = (lamp(), mug());
  let store = store_with(&[lamp.clone(), mug.clone()]);
  let (_session, cart) = signed_in_cart(&store, &user("ada@example.com")).await;

  cart.add(&lamp, 2).await.unwrap();
  cart.add(&mug, 1).await.unwrap();
  assert_eq!(cart.count(), 3);

  cart.update(mug.id, 4).await.unwrap();
  assert_eq!(cart.count(), 6);

  cart.remove(lamp.id).await.unwrap();
  assert_eq!(cart.count(), 4);

  let expected: i64 = cart.items().iter().map(|i| i64::from(i.quantity)).sum();
  assert_eq!(cart.count(), expected);
  assert_eq!(remote_lines(&store).len(), 1);
}

#[tokio::test]
#[serial]
async fn test_adding_twice_merges_into_one_line() {
  setup_tracing();
  let lamp = lamp();
  let store = store_with(&[lamp.clone()]);
  let (_session, cart) = signed_in_cart(&store, &user("ada@example.com")).await;

  cart.add(&lamp, 1).await.unwrap();
  cart.add(&lamp, 1).await.unwrap();

  let items = cart.items();
  assert_eq!(items.len(), 1);
  assert_eq!(items[0].quantity, 2);
  assert_eq!(items[0].product.as_ref().map(|p| p.id), Some(lamp.id));

  let lines = remote_lines(&store);
  assert_eq!(lines.len(), 1);
  assert_eq!(lines[0].quantity, 2);
  assert_eq!(store.call_count(Table::CartItems, Operation::Insert), 1);
  assert_eq!(store.call_count(Table::CartItems, Operation::Update), 1);
}

#[tokio::test]
#[serial]
async fn test_overlapping_adds_from_one_session_do_not_duplicate() {
  setup_tracing();
  let lamp = lamp();
  let store = Arc::new(MemoryStore::new().with_latency(Duration::from_millis(20)));
  store.seed(Table::Products, &[lamp.clone()]).unwrap();
  let (_session, cart) = signed_in_cart(&store, &user("ada@example.com")).await;

  let (a, b) = tokio::join!(cart.add(&lamp, 1), cart.add(&lamp, 1));
  a.unwrap();
  b.unwrap();

  let lines = remote_lines(&store);
  assert_eq!(lines.len(), 1, "a second row would mean the race is open");
  assert_eq!(lines[0].quantity, 2);
  assert_eq!(cart.count(), 2);
}

#[tokio::test]
#[serial]
async fn test_add_that_would_overflow_quantity_is_rejected() {
  setup_tracing();
  let lamp = lamp();
  let store = store_with(&[lamp.clone()]);
  let (_session, cart) = signed_in_cart(&store, &user("ada@example.com")).await;
  cart.add(&lamp, 1).await.unwrap();

  let err = cart.add(&lamp, i32::MAX).await.unwrap_err();

  assert!(matches!(
    err,
    StoreError::QuantityOverflow {
      current: 1,
      added: i32::MAX
    }
  ));
  assert_eq!(cart.count(), 1);
  assert_eq!(cart.items()[0].quantity, 1);
  assert_eq!(remote_lines(&store)[0].quantity, 1);
  assert_eq!(store.call_count(Table::CartItems, Operation::Update), 0);
}

#[tokio::test]
#[serial]
async fn test_update_below_one_is_ignored() {
  setup_tracing();
  let lamp = lamp();
  let store = store_with(&[lamp.clone()]);
  let (_session, cart) = signed_in_cart(&store, &user("ada@example.com")).await;
  cart.add(&lamp, 2).await.unwrap();

  cart.update(lamp.id, 0).await.unwrap();
  cart.update(lamp.id, -3).await.unwrap();
  cart.add(&lamp, 0).await.unwrap();

  assert_eq!(cart.count(), 2);
  assert_eq!(store.call_count(Table::CartItems, Operation::Update), 0);
}

#[tokio::test]
#[serial]
async fn test_clear_empties_cart_and_remote_rows() {
  setup_tracing();
  let (lamp, mug) = (lamp(), mug());
  let store = store_with(&[lamp.clone(), mug.clone()]);
  let ada = user("ada@example.com");
  let grace = user("grace@example.com");
  seed_cart_line(&store, &grace, &mug, 1);
  let (_session, cart) = signed_in_cart(&store, &ada).await;
  cart.add(&lamp, 1).await.unwrap();
  cart.add(&mug, 2).await.unwrap();

  cart.clear().await.unwrap();

  assert_eq!(cart.count(), 0);
  assert!(cart.is_empty());
  let lines = remote_lines(&store);
  assert_eq!(lines.len(), 1, "only the other user's line survives");
  assert_eq!(lines[0].user_id, grace.id);
}

#[tokio::test]
#[serial]
async fn test_total_uses_exact_decimal_arithmetic() {
  setup_tracing();
  let lamp = lamp();
  let store = store_with(&[lamp.clone()]);
  let (_session, cart) = signed_in_cart(&store, &user("ada@example.com")).await;

  cart.add(&lamp, 1).await.unwrap();
  cart.update(lamp.id, 3).await.unwrap();

  assert_eq!(cart.total(), Decimal::new(5997, 2));
}

#[tokio::test]
#[serial]
async fn test_removing_absent_product_changes_nothing() {
  setup_tracing();
  let (lamp, mug) = (lamp(), mug());
  let store = store_with(&[lamp.clone(), mug.clone()]);
  let (_session, cart) = signed_in_cart(&store, &user("ada@example.com")).await;
  cart.add(&lamp, 1).await.unwrap();
  let before = cart.items();

  cart.remove(mug.id).await.unwrap();

  assert_eq!(cart.items(), before);
  assert_eq!(remote_lines(&store).len(), 1);
}

#[tokio::test]
#[serial]
async fn test_failed_remote_call_leaves_state_unchanged() {
  setup_tracing();
  let (lamp, mug) = (lamp(), mug());
  let store = store_with(&[lamp.clone(), mug.clone()]);
  let (_session, cart) = signed_in_cart(&store, &user("ada@example.com")).await;
  cart.add(&lamp, 2).await.unwrap();
  let before = cart.items();

  store.fail_next(Table::CartItems, Operation::Update, 500, "database unavailable");
  let err = cart.update(lamp.id, 5).await.unwrap_err();
  assert_eq!(err.remote_status(), Some(500));
  assert_eq!(cart.items(), before);

  store.fail_next(Table::CartItems, Operation::Insert, 409, "conflict");
  assert!(matches!(cart.add(&mug, 1).await, Err(StoreError::Remote { status: 409, .. })));
  assert_eq!(cart.items(), before);

  store.fail_next(Table::CartItems, Operation::Delete, 503, "try later");
  assert!(cart.remove(lamp.id).await.is_err());
  assert!(cart.clear().await.is_ok());
  assert!(cart.is_empty());
}

#[tokio::test]
#[serial]
async fn test_mutations_without_user_are_silent_no_ops() {
  setup_tracing();
  let lamp = lamp();
  let store = store_with(&[lamp.clone()]);
  let cart = CartSync::new(Arc::clone(&store) as Arc<dyn RemoteStore>);

  cart.add(&lamp, 1).await.unwrap();
  cart.update(lamp.id, 2).await.unwrap();
  cart.remove(lamp.id).await.unwrap();
  cart.clear().await.unwrap();

  assert!(cart.is_empty());
  assert!(cart.user().is_none());
  assert!(store.calls().is_empty());
}

#[tokio::test]
#[serial]
async fn test_cart_follows_identity_changes() {
  setup_tracing();
  let (lamp, mug) = (lamp(), mug());
  let store = store_with(&[lamp.clone(), mug.clone()]);
  let ada = user("ada@example.com");
  let grace = user("grace@example.com");
  seed_cart_line(&store, &ada, &lamp, 3);
  seed_cart_line(&store, &grace, &mug, 1);

  let (session, cart) = signed_in_cart(&store, &ada).await;
  assert_eq!(cart.user(), Some(ada.clone()));
  assert_eq!(cart.count(), 3);
  assert_eq!(cart.total(), Decimal::new(5997, 2));

  session.establish(auth_session(&grace)).await;
  assert_eq!(cart.user().map(|u| u.id), Some(grace.id));
  assert_eq!(cart.items().len(), 1);
  assert_eq!(cart.items()[0].product_id, mug.id);

  session.end().await;
  assert!(cart.user().is_none());
  assert!(cart.is_empty());
  assert_eq!(remote_lines(&store).len(), 2, "sign-out never touches remote rows");
}

#[tokio::test]
#[serial]
async fn test_failed_load_after_user_switch_shows_no_foreign_items() {
  setup_tracing();
  let lamp = lamp();
  let store = store_with(&[lamp.clone()]);
  let ada = user("ada@example.com");
  seed_cart_line(&store, &ada, &lamp, 2);
  let (session, cart) = signed_in_cart(&store, &ada).await;
  assert_eq!(cart.count(), 2);

  store.fail_next(Table::CartItems, Operation::Select, 500, "boom");
  let grace = user("grace@example.com");
  session.establish(auth_session(&grace)).await;

  assert_eq!(cart.user().map(|u| u.id), Some(grace.id));
  assert!(cart.is_empty());
}

#[tokio::test]
#[serial]
async fn test_token_refresh_does_not_reload_cart() {
  setup_tracing();
  let lamp = lamp();
  let store = store_with(&[lamp.clone()]);
  let ada = user("ada@example.com");
  let (session, _cart) = signed_in_cart(&store, &ada).await;
  let selects = store.call_count(Table::CartItems, Operation::Select);

  let mut refreshed = auth_session(&ada);
  refreshed.access_token = "rotated".to_string();
  session.establish(refreshed).await;

  assert_eq!(store.call_count(Table::CartItems, Operation::Select), selects);
  assert_eq!(session.access_token().as_deref(), Some("rotated"));
}
