// storefront/src/models/user.rs

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The signed-in identity as issued by the auth API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
  pub id: Uuid,
  #[serde(default)]
  pub email: Option<String>,
}

/// Tokens plus user returned by a successful sign-in.
#[derive(Clone, Serialize, Deserialize)]
pub struct AuthSession {
  pub access_token: String,
  #[serde(default)]
  pub refresh_token: Option<String>,
  #[serde(default)]
  pub expires_in: Option<u64>,
  pub user: SessionUser,
}

impl std::fmt::Debug for AuthSession {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("AuthSession")
      .field("access_token", &"[REDACTED]")
      .field("expires_in", &self.expires_in)
      .field("user", &self.user)
      .finish()
  }
}
