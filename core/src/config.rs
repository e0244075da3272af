// storefront/src/config.rs

use crate::error::{StoreError, StoreResult};
use std::env;

/// Location of the hosted backend. These two values are the only external configuration.
#[derive(Debug, Clone)]
pub struct StoreConfig {
  /// Project URL, e.g. `https://abc.supabase.co`. Stored without a trailing slash.
  pub url: String,
  /// Public (anon) API key sent with every request.
  pub anon_key: String,
}

const URL_VARS: [&str; 2] = ["SUPABASE_URL", "VITE_SUPABASE_URL"];
const KEY_VARS: [&str; 2] = ["SUPABASE_ANON_KEY", "VITE_SUPABASE_ANON_KEY"];

impl StoreConfig {
  pub fn new(url: impl Into<String>, anon_key: impl Into<String>) -> StoreResult<Self> {
    let url = url.into().trim().trim_end_matches('/').to_string();
    let anon_key = anon_key.into().trim().to_string();
    if !(url.starts_with("http://") || url.starts_with("https://")) {
      return Err(StoreError::Config(format!("Store URL must be http(s), got '{url}'")));
    }
    if anon_key.is_empty() {
      return Err(StoreError::Config("Anon key is empty".to_string()));
    }
    Ok(Self { url, anon_key })
  }

  /// Reads the configuration from the environment, loading `.env` first when present.
  pub fn from_env() -> StoreResult<Self> {
    dotenvy::dotenv().ok();
    Self::from_lookup(|name| env::var(name).ok())
  }

  /// Same as [`from_env`](Self::from_env) but with an injectable variable source.
  pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> StoreResult<Self> {
    let first_of = |names: &[&str]| {
      names
        .iter()
        .find_map(|n| lookup(n).filter(|v| !v.trim().is_empty()))
        .ok_or_else(|| StoreError::Config(format!("Missing environment variable '{}'", names[0])))
    };
    let config = Self::new(first_of(&URL_VARS)?, first_of(&KEY_VARS)?)?;
    tracing::info!(url = %config.url, "Store configuration loaded.");
    Ok(config)
  }

  pub fn rest_url(&self, table: &str) -> String {
    format!("{}/rest/v1/{}", self.url, table)
  }

  pub fn auth_url(&self, path: &str) -> String {
    format!("{}/auth/v1/{}", self.url, path.trim_start_matches('/'))
  }
}
