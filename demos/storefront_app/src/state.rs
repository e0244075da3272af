// storefront_app/src/state.rs

use crate::config::AppConfig;
use crate::errors::Result;
use std::sync::Arc;
use storefront::{AuthClient, Catalog, CartSync, Checkout, CheckoutOptions, OrderHistory, RemoteStore, RestStore, Session};

/// Everything the handlers need, for the single session this gateway serves.
#[derive(Clone)]
pub struct AppState {
  pub session: Session,
  pub auth: Arc<AuthClient>,
  pub cart: Arc<CartSync>,
  pub catalog: Catalog,
  pub orders: OrderHistory,
  pub checkout: Arc<Checkout>,
}

impl AppState {
  pub fn build(config: &AppConfig) -> Result<Self> {
    let session = Session::new();
    let store: Arc<dyn RemoteStore> = Arc::new(RestStore::new(config.store.clone())?.with_session(session.clone()));
    let auth = Arc::new(AuthClient::new(config.store.clone(), session.clone())?);

    let cart = Arc::new(CartSync::new(Arc::clone(&store)));
    cart.attach(&session);

    let checkout = Arc::new(Checkout::new(
      Arc::clone(&store),
      Arc::clone(&cart),
      CheckoutOptions::default(),
    ));

    Ok(Self {
      catalog: Catalog::new(Arc::clone(&store)),
      orders: OrderHistory::new(store, session.clone()),
      session,
      auth,
      cart,
      checkout,
    })
  }
}
