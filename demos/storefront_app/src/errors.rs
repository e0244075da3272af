// storefront_app/src/errors.rs

use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use storefront::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
  #[error("Validation Error: {0}")]
  Validation(String),

  #[error("Authentication Required: {0}")]
  Unauthenticated(String),

  #[error("Resource Not Found: {0}")]
  NotFound(String),

  #[error("Configuration Error: {0}")]
  Config(String),

  #[error(transparent)]
  Store(#[from] StoreError),
}

fn store_error_response(err: &StoreError) -> HttpResponse {
  match err {
    StoreError::Auth(m) => HttpResponse::Unauthorized().json(json!({"error": m})),
    StoreError::QuantityOverflow { .. } => HttpResponse::BadRequest().json(json!({"error": err.to_string()})),
    // The shopper only learns that checkout failed; the cause is in the logs.
    StoreError::Checkout { .. } => {
      HttpResponse::BadGateway().json(json!({"error": "Checkout failed. Your cart was kept, please try again."}))
    }
    StoreError::Transport(_) => HttpResponse::BadGateway().json(json!({"error": "Store is unreachable"})),
    StoreError::Remote { status, message, .. } => {
      HttpResponse::BadGateway().json(json!({"error": "Store rejected the request", "status": status, "detail": message}))
    }
    StoreError::Decode(_) | StoreError::RowCount { .. } => {
      HttpResponse::BadGateway().json(json!({"error": "Store returned an unexpected response"}))
    }
    StoreError::Config(m) => {
      HttpResponse::InternalServerError().json(json!({"error": "Configuration issue", "detail": m}))
    }
    StoreError::Workflow(_) | StoreError::Internal(_) => {
      HttpResponse::InternalServerError().json(json!({"error": "An internal error occurred"}))
    }
  }
}

impl ResponseError for AppError {
  fn error_response(&self) -> HttpResponse {
    tracing::error!(application_error = %self, "Responding with error");
    match self {
      AppError::Validation(m) => HttpResponse::BadRequest().json(json!({"error": m})),
      AppError::Unauthenticated(m) => HttpResponse::Unauthorized().json(json!({"error": m})),
      AppError::NotFound(m) => HttpResponse::NotFound().json(json!({"error": m})),
      AppError::Config(m) => {
        HttpResponse::InternalServerError().json(json!({"error": "Configuration issue", "detail": m}))
      }
      AppError::Store(err) => store_error_response(err),
    }
  }
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;
