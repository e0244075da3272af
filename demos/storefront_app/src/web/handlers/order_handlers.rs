// storefront_app/src/web/handlers/order_handlers.rs

use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::errors::Result;
use crate::state::AppState;
use crate::web::extractors::SignedInUser;

pub async fn list_orders_handler(app_state: web::Data<AppState>, _user: SignedInUser) -> Result<HttpResponse> {
  let orders = app_state.orders.list().await?;
  Ok(HttpResponse::Ok().json(json!({ "orders": orders })))
}
