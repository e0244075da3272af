// storefront_app/src/web/handlers/auth_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use storefront::SignUpOutcome;
use tracing::{info, instrument};

use crate::errors::{AppError, Result};
use crate::state::AppState;

#[derive(Deserialize, Debug)]
pub struct CredentialsPayload {
  pub email: String,
  pub password: String,
}

impl CredentialsPayload {
  fn validate(&self) -> Result<()> {
    if !self.email.contains('@') {
      return Err(AppError::Validation("A valid email is required.".to_string()));
    }
    if self.password.len() < 6 {
      return Err(AppError::Validation("Password must be at least 6 characters.".to_string()));
    }
    Ok(())
  }
}

#[instrument(name = "handler::signup", skip(app_state, payload), fields(email = %payload.email))]
pub async fn signup_handler(
  app_state: web::Data<AppState>,
  payload: web::Json<CredentialsPayload>,
) -> Result<HttpResponse> {
  payload.validate()?;
  match app_state.auth.sign_up(&payload.email, &payload.password).await? {
    SignUpOutcome::SignedIn(user) => Ok(HttpResponse::Created().json(json!({
        "message": "Account created.",
        "user": user,
    }))),
    SignUpOutcome::ConfirmationRequired(user) => Ok(HttpResponse::Accepted().json(json!({
        "message": "Check your email to confirm the account.",
        "user": user,
    }))),
  }
}

#[instrument(name = "handler::signin", skip(app_state, payload), fields(email = %payload.email))]
pub async fn signin_handler(
  app_state: web::Data<AppState>,
  payload: web::Json<CredentialsPayload>,
) -> Result<HttpResponse> {
  let user = app_state
    .auth
    .sign_in_with_password(&payload.email, &payload.password)
    .await?;
  info!(user_id = %user.id, "Signed in through the gateway.");
  Ok(HttpResponse::Ok().json(json!({
      "user": user,
      "cart_count": app_state.cart.count(),
  })))
}

#[instrument(name = "handler::signout", skip(app_state))]
pub async fn signout_handler(app_state: web::Data<AppState>) -> HttpResponse {
  app_state.auth.sign_out().await;
  HttpResponse::NoContent().finish()
}

pub async fn me_handler(app_state: web::Data<AppState>) -> HttpResponse {
  HttpResponse::Ok().json(json!({ "user": app_state.session.current_user() }))
}
