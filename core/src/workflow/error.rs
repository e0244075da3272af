// storefront/src/workflow/error.rs
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkflowError {
  #[error("Step not found: {step_name}")]
  StepNotFound { step_name: String },

  #[error("Step already exists: {step_name}")]
  DuplicateStep { step_name: String },

  #[error("Handler missing for non-optional step: {step_name}")]
  HandlerMissing { step_name: String },
}
