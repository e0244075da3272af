// storefront_app/src/web/handlers/cart_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;
use uuid::Uuid;

use crate::errors::{AppError, Result};
use crate::state::AppState;
use crate::web::extractors::SignedInUser;

fn default_quantity() -> i32 {
  1
}

#[derive(Deserialize, Debug)]
pub struct AddToCartPayload {
  pub product_id: Uuid,
  #[serde(default = "default_quantity")]
  pub quantity: i32,
}

#[derive(Deserialize, Debug)]
pub struct UpdateQuantityPayload {
  pub quantity: i32,
}

fn cart_view(app_state: &AppState) -> HttpResponse {
  HttpResponse::Ok().json(json!({
      "items": app_state.cart.items(),
      "total": app_state.cart.total(),
      "count": app_state.cart.count(),
  }))
}

pub async fn view_cart_handler(app_state: web::Data<AppState>, _user: SignedInUser) -> HttpResponse {
  cart_view(&app_state)
}

#[instrument(
  name = "handler::add_to_cart",
  skip(app_state, payload, user),
  fields(user_id = %user.0.id, product_id = %payload.product_id, quantity = payload.quantity)
)]
pub async fn add_to_cart_handler(
  app_state: web::Data<AppState>,
  payload: web::Json<AddToCartPayload>,
  user: SignedInUser,
) -> Result<HttpResponse> {
  if payload.quantity < 1 {
    return Err(AppError::Validation("Quantity must be at least 1.".to_string()));
  }
  let product = app_state
    .catalog
    .get(payload.product_id)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Product with ID {} not found.", payload.product_id)))?;
  app_state.cart.add(&product, payload.quantity).await?;
  Ok(cart_view(&app_state))
}

#[instrument(name = "handler::update_cart_item", skip(app_state, payload, _user), fields(quantity = payload.quantity))]
pub async fn update_cart_item_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  payload: web::Json<UpdateQuantityPayload>,
  _user: SignedInUser,
) -> Result<HttpResponse> {
  app_state.cart.update(path.into_inner(), payload.quantity).await?;
  Ok(cart_view(&app_state))
}

#[instrument(name = "handler::remove_cart_item", skip(app_state, _user))]
pub async fn remove_cart_item_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  _user: SignedInUser,
) -> Result<HttpResponse> {
  app_state.cart.remove(path.into_inner()).await?;
  Ok(cart_view(&app_state))
}

#[instrument(name = "handler::clear_cart", skip(app_state, _user))]
pub async fn clear_cart_handler(app_state: web::Data<AppState>, _user: SignedInUser) -> Result<HttpResponse> {
  app_state.cart.clear().await?;
  Ok(cart_view(&app_state))
}
