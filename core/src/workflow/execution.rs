// storefront/src/workflow/execution.rs

//! [`Workflow::run`].

use super::context_data::ContextData;
use super::control::{StepControl, WorkflowOutcome};
use super::definition::Workflow;
use super::error::WorkflowError;
use super::hooks::Handler;
use tracing::{event, instrument, Instrument, Level};

enum PhaseResult<Err> {
  Continue,
  Stopped,
  Failed(Err),
}

async fn run_phase<T, Err>(phase: &'static str, handlers: &[Handler<T, Err>], ctx: &ContextData<T>) -> PhaseResult<Err>
where
  T: Send + Sync + 'static,
  Err: std::error::Error + Send + Sync + 'static,
{
  for (idx, handler) in handlers.iter().enumerate() {
    let span = tracing::debug_span!("workflow_handler", phase = phase, handler_index = idx);
    match handler(ctx.clone()).instrument(span).await {
      Ok(StepControl::Continue) => {}
      Ok(StepControl::Stop) => {
        event!(Level::INFO, phase = phase, "Workflow stopped by handler.");
        return PhaseResult::Stopped;
      }
      Err(e) => {
        event!(Level::ERROR, phase = phase, error = %e, "Handler failed.");
        return PhaseResult::Failed(e);
      }
    }
  }
  PhaseResult::Continue
}

impl<T, Err> Workflow<T, Err>
where
  T: Send + Sync + 'static,
  Err: std::error::Error + From<WorkflowError> + Send + Sync + 'static,
{
  /// Executes every step in order against `ctx`.
  ///
  /// Skipped steps and optional steps without handlers are passed over. The first
  /// handler error aborts the run and is returned as is.
  #[instrument(
    name = "Workflow::run",
    skip_all,
    fields(context_type = %std::any::type_name::<T>(), num_steps = self.steps.len()),
    err(Display)
  )]
  pub async fn run(&self, ctx: ContextData<T>) -> Result<WorkflowOutcome, Err> {
    for (step_idx, step) in self.steps.iter().enumerate() {
      let step_span = tracing::info_span!("workflow_step", step_name = %step.name, step_index = step_idx);
      let handlers = {
        let _entered = step_span.enter();

        if let Some(skip) = &step.skip_if {
          if skip(&ctx) {
            event!(Level::DEBUG, "Step skipped by condition.");
            continue;
          }
        }

        match self.handlers.get(&step.name).filter(|h| !h.is_empty()) {
          Some(handlers) => handlers,
          None if step.optional => {
            event!(Level::DEBUG, "Optional step has no handlers, skipping.");
            continue;
          }
          None => {
            event!(Level::ERROR, "Non-optional step has no handlers.");
            return Err(Err::from(WorkflowError::HandlerMissing {
              step_name: step.name.clone(),
            }));
          }
        }
      };

      for (phase, list) in [("before", &handlers.before), ("on", &handlers.on), ("after", &handlers.after)] {
        match run_phase(phase, list, &ctx).instrument(step_span.clone()).await {
          PhaseResult::Continue => {}
          PhaseResult::Stopped => return Ok(WorkflowOutcome::Stopped),
          PhaseResult::Failed(e) => return Err(e),
        }
      }
    }

    event!(Level::DEBUG, "Workflow completed.");
    Ok(WorkflowOutcome::Completed)
  }
}
