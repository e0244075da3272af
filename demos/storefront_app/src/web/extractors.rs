// storefront_app/src/web/extractors.rs

use crate::errors::AppError;
use crate::state::AppState;
use actix_web::{web, FromRequest, HttpRequest};
use storefront::models::SessionUser;
use tracing::warn;

/// The user signed in on the gateway's session. Rejects the request with 401 otherwise.
#[derive(Debug)]
pub struct SignedInUser(pub SessionUser);

impl FromRequest for SignedInUser {
  type Error = AppError;
  type Future = futures_util::future::Ready<Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
    let user = req
      .app_data::<web::Data<AppState>>()
      .and_then(|state| state.session.current_user());
    match user {
      Some(user) => futures_util::future::ready(Ok(SignedInUser(user))),
      None => {
        warn!("Request needs a signed-in user.");
        futures_util::future::ready(Err(AppError::Unauthenticated("Sign in first.".to_string())))
      }
    }
  }
}
