// storefront/src/identity/auth.rs

//! Client for the hosted auth API (`/auth/v1`).

use super::Session;
use crate::config::StoreConfig;
use crate::error::{StoreError, StoreResult};
use crate::models::{AuthSession, SessionUser};
use reqwest::Response;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, instrument, warn};

#[derive(Serialize)]
struct Credentials<'a> {
  email: &'a str,
  password: &'a str,
}

/// The auth API has used several error body shapes over time.
#[derive(Debug, Default, Deserialize)]
struct AuthErrorBody {
  error_description: Option<String>,
  msg: Option<String>,
  message: Option<String>,
  error: Option<String>,
}

impl AuthErrorBody {
  fn reason(self) -> Option<String> {
    self.error_description.or(self.msg).or(self.message).or(self.error)
  }
}

async fn auth_error(response: Response) -> StoreError {
  let status = response.status();
  let text = response.text().await.unwrap_or_default();
  let reason = serde_json::from_str::<AuthErrorBody>(&text)
    .ok()
    .and_then(AuthErrorBody::reason)
    .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));
  if status.is_client_error() {
    StoreError::Auth(reason)
  } else {
    StoreError::Remote {
      status: status.as_u16(),
      code: None,
      message: reason,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignUpOutcome {
  /// The project auto-confirms accounts; the session is now established.
  SignedIn(SessionUser),
  /// The account exists but must be confirmed (e.g. by email) before signing in.
  ConfirmationRequired(SessionUser),
}

/// Signs users in and out and keeps the shared [`Session`] up to date.
pub struct AuthClient {
  config: StoreConfig,
  http: reqwest::Client,
  session: Session,
}

impl AuthClient {
  pub fn new(config: StoreConfig, session: Session) -> StoreResult<Self> {
    Ok(Self::with_client(config, reqwest::Client::builder().build()?, session))
  }

  pub fn with_client(config: StoreConfig, http: reqwest::Client, session: Session) -> Self {
    Self { config, http, session }
  }

  pub fn session(&self) -> &Session {
    &self.session
  }

  async fn post_credentials(&self, path: &str, email: &str, password: &str) -> StoreResult<Value> {
    if email.trim().is_empty() || password.is_empty() {
      return Err(StoreError::Auth("Email and password are required".to_string()));
    }
    let response = self
      .http
      .post(self.config.auth_url(path))
      .header("apikey", &self.config.anon_key)
      .json(&Credentials {
        email: email.trim(),
        password,
      })
      .send()
      .await?;
    if !response.status().is_success() {
      return Err(auth_error(response).await);
    }
    Ok(response.json::<Value>().await?)
  }

  #[instrument(name = "AuthClient::sign_in_with_password", skip(self, password), err(Display))]
  pub async fn sign_in_with_password(&self, email: &str, password: &str) -> StoreResult<SessionUser> {
    let body = self.post_credentials("token?grant_type=password", email, password).await?;
    let session: AuthSession = serde_json::from_value(body)?;
    let user = session.user.clone();
    self.session.establish(session).await;
    info!(user_id = %user.id, "Signed in.");
    Ok(user)
  }

  #[instrument(name = "AuthClient::sign_up", skip(self, password), err(Display))]
  pub async fn sign_up(&self, email: &str, password: &str) -> StoreResult<SignUpOutcome> {
    let body = self.post_credentials("signup", email, password).await?;
    if body.get("access_token").is_some() {
      let session: AuthSession = serde_json::from_value(body)?;
      let user = session.user.clone();
      self.session.establish(session).await;
      info!(user_id = %user.id, "Signed up and signed in.");
      return Ok(SignUpOutcome::SignedIn(user));
    }
    let user: SessionUser = match body.get("user") {
      Some(user) => serde_json::from_value(user.clone())?,
      None => serde_json::from_value(body)?,
    };
    info!(user_id = %user.id, "Signed up; confirmation required.");
    Ok(SignUpOutcome::ConfirmationRequired(user))
  }

  /// Revokes the remote session and always ends the local one. A failed revoke is only
  /// logged: the user asked to be signed out and locally they are.
  #[instrument(name = "AuthClient::sign_out", skip(self))]
  pub async fn sign_out(&self) {
    if let Some(token) = self.session.access_token() {
      let result = self
        .http
        .post(self.config.auth_url("logout"))
        .header("apikey", &self.config.anon_key)
        .bearer_auth(token)
        .send()
        .await;
      match result {
        Ok(response) if response.status().is_success() => {}
        Ok(response) => {
          let err = auth_error(response).await;
          warn!(error = %err, "Remote sign-out rejected.");
        }
        Err(e) => warn!(error = %e, "Remote sign-out failed."),
      }
    }
    self.session.end().await;
    info!("Signed out.");
  }
}
