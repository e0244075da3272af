// storefront/src/workflow/definition.rs

//! The [`Workflow`] type and its structural editing methods.

use super::error::WorkflowError;
use super::hooks::Handler;
use super::step::{SkipCondition, StepDef};
use std::collections::HashMap;

/// Handlers registered for one step, per phase.
pub(crate) struct StepHandlers<T: Send + Sync + 'static, Err> {
  pub(crate) before: Vec<Handler<T, Err>>,
  pub(crate) on: Vec<Handler<T, Err>>,
  pub(crate) after: Vec<Handler<T, Err>>,
}

impl<T: Send + Sync + 'static, Err> Default for StepHandlers<T, Err> {
  fn default() -> Self {
    Self {
      before: Vec::new(),
      on: Vec::new(),
      after: Vec::new(),
    }
  }
}

impl<T: Send + Sync + 'static, Err> StepHandlers<T, Err> {
  pub(crate) fn is_empty(&self) -> bool {
    self.before.is_empty() && self.on.is_empty() && self.after.is_empty()
  }
}

/// An ordered list of named steps over context data `T`, whose handlers fail with `Err`.
///
/// `Err` must absorb [`WorkflowError`] so that engine-level failures (a required step
/// without handlers) come out of [`Workflow::run`](Workflow::run) in the caller's error type.
pub struct Workflow<T, Err>
where
  T: Send + Sync + 'static,
  Err: std::error::Error + From<WorkflowError> + Send + Sync + 'static,
{
  pub(crate) steps: Vec<StepDef<T>>,
  pub(crate) handlers: HashMap<String, StepHandlers<T, Err>>,
}

impl<T, Err> Workflow<T, Err>
where
  T: Send + Sync + 'static,
  Err: std::error::Error + From<WorkflowError> + Send + Sync + 'static,
{
  /// Builds a workflow from step definitions. Duplicate names keep the first occurrence.
  pub fn new(steps: impl IntoIterator<Item = StepDef<T>>) -> Self {
    let mut defs: Vec<StepDef<T>> = Vec::new();
    for step in steps {
      if defs.iter().any(|s| s.name == step.name) {
        tracing::warn!(step_name = %step.name, "Duplicate step definition ignored.");
        continue;
      }
      defs.push(step);
    }
    Self {
      steps: defs,
      handlers: HashMap::new(),
    }
  }

  pub fn step_names(&self) -> Vec<&str> {
    self.steps.iter().map(|s| s.name.as_str()).collect()
  }

  pub fn has_step(&self, step_name: &str) -> bool {
    self.position(step_name).is_some()
  }

  fn position(&self, step_name: &str) -> Option<usize> {
    self.steps.iter().position(|s| s.name == step_name)
  }

  fn locate(&self, step_name: &str) -> Result<usize, WorkflowError> {
    self.position(step_name).ok_or_else(|| WorkflowError::StepNotFound {
      step_name: step_name.to_string(),
    })
  }

  fn ensure_absent(&self, step_name: &str) -> Result<(), WorkflowError> {
    if self.has_step(step_name) {
      return Err(WorkflowError::DuplicateStep {
        step_name: step_name.to_string(),
      });
    }
    Ok(())
  }

  /// Panics when `step_name` is unknown. Registering a hook on a missing step is a
  /// setup bug, not a runtime condition.
  pub(crate) fn ensure_step_exists(&self, step_name: &str) {
    if !self.has_step(step_name) {
      panic!("Workflow setup error: step '{}' is not defined.", step_name);
    }
  }

  pub fn insert_before_step(&mut self, existing_step: &str, step: StepDef<T>) -> Result<(), WorkflowError> {
    let idx = self.locate(existing_step)?;
    self.ensure_absent(&step.name)?;
    self.steps.insert(idx, step);
    Ok(())
  }

  pub fn insert_after_step(&mut self, existing_step: &str, step: StepDef<T>) -> Result<(), WorkflowError> {
    let idx = self.locate(existing_step)?;
    self.ensure_absent(&step.name)?;
    self.steps.insert(idx + 1, step);
    Ok(())
  }

  /// Removes a step and its handlers. Returns whether the step existed.
  pub fn remove_step(&mut self, step_name: &str) -> bool {
    match self.position(step_name) {
      Some(idx) => {
        self.steps.remove(idx);
        self.handlers.remove(step_name);
        true
      }
      None => false,
    }
  }

  pub fn set_optional(&mut self, step_name: &str, optional: bool) -> Result<(), WorkflowError> {
    let idx = self.locate(step_name)?;
    self.steps[idx].optional = optional;
    Ok(())
  }

  pub fn set_skip_condition(
    &mut self,
    step_name: &str,
    skip_if: Option<SkipCondition<T>>,
  ) -> Result<(), WorkflowError> {
    let idx = self.locate(step_name)?;
    self.steps[idx].skip_if = skip_if;
    Ok(())
  }
}
