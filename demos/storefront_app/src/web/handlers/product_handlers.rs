// storefront_app/src/web/handlers/product_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Serialize;
use serde_json::json;
use storefront::models::Product;
use storefront::ProductFilter;
use tracing::{instrument, warn};
use uuid::Uuid;

use crate::errors::{AppError, Result};
use crate::state::AppState;

/// A product as the shop window shows it, with its stock badges.
#[derive(Serialize)]
pub struct ProductView {
  #[serde(flatten)]
  pub product: Product,
  pub in_stock: bool,
  pub low_stock: bool,
}

impl From<Product> for ProductView {
  fn from(product: Product) -> Self {
    Self {
      in_stock: product.is_in_stock(),
      low_stock: product.is_low_stock(),
      product,
    }
  }
}

#[instrument(name = "handler::list_products", skip(app_state))]
pub async fn list_products_handler(
  app_state: web::Data<AppState>,
  filter: web::Query<ProductFilter>,
) -> Result<HttpResponse> {
  let products = app_state.catalog.list(&filter).await?;
  let products: Vec<ProductView> = products.into_iter().map(ProductView::from).collect();
  Ok(HttpResponse::Ok().json(json!({ "products": products })))
}

pub async fn list_categories_handler(app_state: web::Data<AppState>) -> Result<HttpResponse> {
  let categories = app_state.catalog.categories().await?;
  Ok(HttpResponse::Ok().json(json!({ "categories": categories })))
}

#[instrument(name = "handler::get_product", skip(app_state, path), fields(product_id = %path.as_ref()))]
pub async fn get_product_handler(app_state: web::Data<AppState>, path: web::Path<Uuid>) -> Result<HttpResponse> {
  let product_id = path.into_inner();
  match app_state.catalog.get(product_id).await? {
    Some(product) => Ok(HttpResponse::Ok().json(json!({ "product": ProductView::from(product) }))),
    None => {
      warn!("Product with ID {} not found.", product_id);
      Err(AppError::NotFound(format!("Product with ID {} not found.", product_id)))
    }
  }
}
