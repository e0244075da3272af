// storefront/src/remote/rest.rs

//! [`RemoteStore`] over the hosted REST endpoint (`/rest/v1/<table>`).

use super::{Query, RemoteStore};
use crate::config::StoreConfig;
use crate::error::{StoreError, StoreResult};
use crate::identity::Session;
use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, instrument, warn};

const PREFER_REPRESENTATION: &str = "return=representation";
const PREFER_MINIMAL: &str = "return=minimal";

/// Error body returned by the REST endpoint on non-2xx responses.
#[derive(Debug, Default, Deserialize)]
struct ApiErrorBody {
  code: Option<String>,
  message: Option<String>,
  details: Option<String>,
  hint: Option<String>,
}

impl ApiErrorBody {
  fn into_message(self, fallback: String) -> (Option<String>, String) {
    let mut message = self.message.unwrap_or(fallback);
    if let Some(details) = self.details.filter(|d| !d.is_empty()) {
      message = format!("{message} ({details})");
    }
    if let Some(hint) = self.hint.filter(|h| !h.is_empty()) {
      message = format!("{message}; hint: {hint}");
    }
    (self.code, message)
  }
}

/// Turns a non-success response into [`StoreError::Remote`].
pub(crate) async fn remote_error(response: Response) -> StoreError {
  let status = response.status().as_u16();
  let text = response.text().await.unwrap_or_default();
  let (code, message) = serde_json::from_str::<ApiErrorBody>(&text)
    .unwrap_or_default()
    .into_message(if text.is_empty() { format!("HTTP {status}") } else { text });
  StoreError::Remote { status, code, message }
}

pub struct RestStore {
  config: StoreConfig,
  http: reqwest::Client,
  session: Option<Session>,
}

impl RestStore {
  pub fn new(config: StoreConfig) -> StoreResult<Self> {
    let http = reqwest::Client::builder().build()?;
    Ok(Self::with_client(config, http))
  }

  pub fn with_client(config: StoreConfig, http: reqwest::Client) -> Self {
    Self {
      config,
      http,
      session: None,
    }
  }

  /// Requests carry the signed-in user's token when `session` has one, so that row-level
  /// access rules apply; otherwise the anon key is used as bearer.
  pub fn with_session(mut self, session: Session) -> Self {
    self.session = Some(session);
    self
  }

  fn bearer(&self) -> String {
    self
      .session
      .as_ref()
      .and_then(Session::access_token)
      .unwrap_or_else(|| self.config.anon_key.clone())
  }

  fn request(&self, method: Method, query: &Query) -> RequestBuilder {
    self
      .http
      .request(method, self.config.rest_url(query.table.name()))
      .query(&query.to_params())
      .header("apikey", &self.config.anon_key)
      .bearer_auth(self.bearer())
  }

  async fn send(&self, request: RequestBuilder) -> StoreResult<Response> {
    let response = request.send().await?;
    if response.status().is_success() {
      return Ok(response);
    }
    let err = remote_error(response).await;
    warn!(error = %err, "Remote store request failed.");
    Err(err)
  }

  async fn rows(response: Response) -> StoreResult<Vec<Value>> {
    let bytes = response.bytes().await?;
    if bytes.is_empty() {
      return Ok(Vec::new());
    }
    match serde_json::from_slice::<Value>(&bytes)? {
      Value::Array(rows) => Ok(rows),
      Value::Null => Ok(Vec::new()),
      single => Ok(vec![single]),
    }
  }

  fn prefer(query: &Query) -> &'static str {
    if query.wants_rows() {
      PREFER_REPRESENTATION
    } else {
      PREFER_MINIMAL
    }
  }
}

#[async_trait]
impl RemoteStore for RestStore {
  #[instrument(name = "RestStore::select", skip_all, fields(table = %query.table), err(Display))]
  async fn select(&self, query: &Query) -> StoreResult<Vec<Value>> {
    let response = self.send(self.request(Method::GET, query)).await?;
    let rows = Self::rows(response).await?;
    debug!(rows = rows.len(), "Select returned.");
    Ok(rows)
  }

  #[instrument(name = "RestStore::insert", skip_all, fields(table = %query.table, rows = rows.len()), err(Display))]
  async fn insert(&self, query: &Query, mut rows: Vec<Value>) -> StoreResult<Vec<Value>> {
    // A single row goes out as an object, several as an array.
    let body = match rows.len() {
      1 => rows.remove(0),
      _ => Value::Array(rows),
    };
    let request = self
      .request(Method::POST, query)
      .header("Prefer", Self::prefer(query))
      .json(&body);
    let response = self.send(request).await?;
    if !query.wants_rows() {
      return Ok(Vec::new());
    }
    Self::rows(response).await
  }

  #[instrument(name = "RestStore::update", skip_all, fields(table = %query.table), err(Display))]
  async fn update(&self, query: &Query, patch: Value) -> StoreResult<Vec<Value>> {
    let request = self
      .request(Method::PATCH, query)
      .header("Prefer", Self::prefer(query))
      .json(&patch);
    let response = self.send(request).await?;
    if !query.wants_rows() {
      return Ok(Vec::new());
    }
    Self::rows(response).await
  }

  #[instrument(name = "RestStore::delete", skip_all, fields(table = %query.table), err(Display))]
  async fn delete(&self, query: &Query) -> StoreResult<()> {
    let request = self.request(Method::DELETE, query).header("Prefer", PREFER_MINIMAL);
    self.send(request).await?;
    Ok(())
  }
}
