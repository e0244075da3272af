// storefront/src/workflow/control.rs

//! Flow signals returned by handlers and by a whole run.

/// Answer of a single handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepControl {
  /// Keep going with the remaining handlers and steps.
  Continue,
  /// Halt the workflow. Nothing after this handler runs.
  Stop,
}

/// Outcome of a run that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowOutcome {
  Completed,
  /// A handler returned [`StepControl::Stop`].
  Stopped,
}
