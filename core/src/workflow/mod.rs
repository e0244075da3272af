// storefront/src/workflow/mod.rs

//! A small asynchronous step pipeline.
//!
//! A [`Workflow`] is an ordered list of named steps. Each step carries `before`, `on` and
//! `after` handlers that operate on a shared [`ContextData<T>`] and answer with a
//! [`StepControl`]. Checkout is built on top of it; anything else that needs an ordered,
//! short-circuiting sequence of remote calls can be too.

pub mod context_data;
pub mod control;
pub mod definition;
pub mod error;
pub mod execution;
pub mod hooks;
pub mod step;

pub use context_data::ContextData;
pub use control::{StepControl, WorkflowOutcome};
pub use definition::Workflow;
pub use error::WorkflowError;
pub use hooks::Handler;
pub use step::{SkipCondition, StepDef};
