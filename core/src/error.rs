// storefront/src/error.rs
use crate::workflow::WorkflowError;
use thiserror::Error;

/// Every failure a storefront operation can report.
///
/// Transport failures, remote rejections and local problems all surface through this
/// one type; none of them is fatal beyond the single action that produced it.
#[derive(Debug, Error)]
pub enum StoreError {
  #[error("Configuration error: {0}")]
  Config(String),

  #[error("Transport error: {0}")]
  Transport(#[from] reqwest::Error),

  #[error("Remote store rejected the request ({status}{}): {message}", code_suffix(.code))]
  Remote {
    status: u16,
    code: Option<String>,
    message: String,
  },

  #[error("Unexpected row shape: {0}")]
  Decode(#[from] serde_json::Error),

  #[error("Expected {expected} row(s) from '{table}', got {actual}")]
  RowCount {
    table: &'static str,
    expected: usize,
    actual: usize,
  },

  #[error("Authentication failed: {0}")]
  Auth(String),

  #[error("Cart quantity {current} + {added} is out of range")]
  QuantityOverflow { current: i32, added: i32 },

  #[error("Checkout abandoned at step '{step}': {source}")]
  Checkout {
    step: &'static str,
    #[source]
    source: Box<StoreError>,
  },

  #[error("Workflow error: {0}")]
  Workflow(#[from] WorkflowError),

  #[error("Internal error: {0}")]
  Internal(String),
}

fn code_suffix(code: &Option<String>) -> String {
  code.as_deref().map(|c| format!(", code {c}")).unwrap_or_default()
}

impl From<anyhow::Error> for StoreError {
  fn from(err: anyhow::Error) -> Self {
    match err.downcast::<StoreError>() {
      Ok(store_err) => store_err,
      Err(other) => StoreError::Internal(format!("{other:#}")),
    }
  }
}

impl StoreError {
  /// Wraps `self` as a checkout failure at `step`, unless it already is one.
  pub fn at_checkout_step(self, step: &'static str) -> Self {
    match self {
      already @ StoreError::Checkout { .. } => already,
      other => StoreError::Checkout {
        step,
        source: Box::new(other),
      },
    }
  }

  /// HTTP status of a remote rejection, if this is one.
  pub fn remote_status(&self) -> Option<u16> {
    match self {
      StoreError::Remote { status, .. } => Some(*status),
      StoreError::Checkout { source, .. } => source.remote_status(),
      _ => None,
    }
  }
}

pub type StoreResult<T, E = StoreError> = std::result::Result<T, E>;
