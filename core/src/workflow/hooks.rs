// storefront/src/workflow/hooks.rs

//! Registration of `before`, `on` and `after` handlers.

use super::context_data::ContextData;
use super::control::StepControl;
use super::definition::Workflow;
use super::error::WorkflowError;
use std::future::Future;
use std::pin::Pin;

/// A boxed step handler. It receives a clone of the shared context handle.
///
/// Handlers must release any lock guard before awaiting.
pub type Handler<T, Err> =
  Box<dyn Fn(ContextData<T>) -> Pin<Box<dyn Future<Output = Result<StepControl, Err>> + Send>> + Send + Sync>;

#[derive(Clone, Copy)]
enum Phase {
  Before,
  On,
  After,
}

impl<T, Err> Workflow<T, Err>
where
  T: Send + Sync + 'static,
  Err: std::error::Error + From<WorkflowError> + Send + Sync + 'static,
{
  fn push_handler<F, E>(
    &mut self,
    phase: Phase,
    step_name: &str,
    handler_fn: impl Fn(ContextData<T>) -> F + Send + Sync + 'static,
  ) where
    F: Future<Output = Result<StepControl, E>> + Send + 'static,
    E: Into<Err> + Send + Sync + 'static,
  {
    self.ensure_step_exists(step_name);
    let handler: Handler<T, Err> = Box::new(move |ctx| {
      let fut = handler_fn(ctx);
      Box::pin(async move { fut.await.map_err(Into::into) })
    });
    let slot = self.handlers.entry(step_name.to_string()).or_default();
    match phase {
      Phase::Before => slot.before.push(handler),
      Phase::On => slot.on.push(handler),
      Phase::After => slot.after.push(handler),
    }
  }

  /// Runs ahead of the step's `on` handlers. Any error type convertible into `Err` works.
  pub fn before<F, E>(&mut self, step_name: &str, handler_fn: impl Fn(ContextData<T>) -> F + Send + Sync + 'static)
  where
    F: Future<Output = Result<StepControl, E>> + Send + 'static,
    E: Into<Err> + Send + Sync + 'static,
  {
    self.push_handler(Phase::Before, step_name, handler_fn);
  }

  pub fn on<F, E>(&mut self, step_name: &str, handler_fn: impl Fn(ContextData<T>) -> F + Send + Sync + 'static)
  where
    F: Future<Output = Result<StepControl, E>> + Send + 'static,
    E: Into<Err> + Send + Sync + 'static,
  {
    self.push_handler(Phase::On, step_name, handler_fn);
  }

  pub fn after<F, E>(&mut self, step_name: &str, handler_fn: impl Fn(ContextData<T>) -> F + Send + Sync + 'static)
  where
    F: Future<Output = Result<StepControl, E>> + Send + 'static,
    E: Into<Err> + Send + Sync + 'static,
  {
    self.push_handler(Phase::After, step_name, handler_fn);
  }
}
