// storefront_app/src/web/handlers/checkout_handlers.rs

use actix_web::{web, HttpResponse};
use serde_json::json;
use storefront::CheckoutOutcome;
use tracing::{info, instrument};

use crate::errors::Result;
use crate::state::AppState;
use crate::web::extractors::SignedInUser;

#[instrument(name = "handler::checkout", skip(app_state, user), fields(user_id = %user.0.id))]
pub async fn checkout_handler(app_state: web::Data<AppState>, user: SignedInUser) -> Result<HttpResponse> {
  match app_state.checkout.run().await? {
    CheckoutOutcome::Placed(receipt) => {
      info!(order_id = %receipt.order.id, "Order placed.");
      Ok(HttpResponse::Created().json(json!({
          "message": "Order placed successfully!",
          "order": receipt.order,
          "items": receipt.items,
          "cart_cleared": receipt.cart_cleared,
      })))
    }
    CheckoutOutcome::NothingToCheckout => Ok(HttpResponse::UnprocessableEntity().json(json!({
        "error": "Your cart is empty.",
    }))),
  }
}
