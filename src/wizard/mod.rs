//! The multi-step session lifecycle: `NotStarted → InProgress → Completed`, with an
//! absorbing `Abandoned` state.

use crate::error::{ResolveError, WizardError};
use crate::model::{Answers, ConfigState, FinalConfig, Value, WizardStatus};
use crate::resolver::DependencyResolver;
use crate::schema::{ConfigSchema, Step};
use std::sync::Arc;

/// Owns one wizard session's [`ConfigState`] and drives it through the schema's steps.
///
/// Steps whose visibility does not hold are skipped entirely. Mutually exclusive
/// layouts are separate schemas, not hidden steps of a single one.
#[derive(Debug, Clone)]
pub struct WizardStateMachine {
    schema: Arc<ConfigSchema>,
    state: ConfigState,
}

impl WizardStateMachine {
    pub fn new(schema: Arc<ConfigSchema>) -> Self {
        Self {
            schema,
            state: ConfigState::new(),
        }
    }

    /// Resumes a machine from a previously captured state.
    ///
    /// The state must fit the schema: its step index in range and every answer a
    /// declared field holding a value its parent currently allows.
    pub fn from_state(
        schema: Arc<ConfigSchema>,
        state: ConfigState,
    ) -> Result<Self, WizardError> {
        if state.current_step_index >= schema.steps().len() {
            return Err(WizardError::CorruptState {
                schema: schema.name().to_string(),
                reason: format!("step index {} is out of range", state.current_step_index),
            });
        }
        if let Some(unknown) = state.answers.keys().find(|id| schema.field(id).is_none()) {
            return Err(ResolveError::UnknownField(unknown.clone()).into());
        }
        let resolver = DependencyResolver::new(&schema);
        for id in schema.topological_order() {
            if let Some(value) = state.answers.get(id) {
                resolver.validate(&state.answers, id, value)?;
            }
        }
        Ok(Self { schema, state })
    }

    pub fn schema(&self) -> &Arc<ConfigSchema> {
        &self.schema
    }

    pub fn state(&self) -> &ConfigState {
        &self.state
    }

    pub fn into_state(self) -> ConfigState {
        self.state
    }

    pub fn answers(&self) -> &Answers {
        &self.state.answers
    }

    pub fn status(&self) -> WizardStatus {
        self.state.status
    }

    fn resolver(&self) -> DependencyResolver<'_> {
        DependencyResolver::new(&self.schema)
    }

    fn require_status(
        &self,
        expected: WizardStatus,
        operation: &'static str,
    ) -> Result<(), WizardError> {
        if self.state.status == expected {
            Ok(())
        } else {
            Err(WizardError::InvalidState {
                operation,
                status: self.state.status.to_string(),
            })
        }
    }

    /// The step the session is on, while in progress.
    pub fn current_step(&self) -> Option<&Step> {
        match self.state.status {
            WizardStatus::InProgress => self.schema.steps().get(self.state.current_step_index),
            _ => None,
        }
    }

    fn current_step_id(&self) -> String {
        self.current_step()
            .map(|s| s.id.clone())
            .unwrap_or_default()
    }

    fn is_visible(&self, index: usize) -> bool {
        self.schema.steps()[index]
            .visible_if
            .holds(&self.state.answers)
    }

    fn next_visible_after(&self, index: usize) -> Option<usize> {
        (index + 1..self.schema.steps().len()).find(|&i| self.is_visible(i))
    }

    fn previous_visible_before(&self, index: usize) -> Option<usize> {
        (0..index).rev().find(|&i| self.is_visible(i))
    }

    /// Steps reachable under the current answers, in order.
    pub fn visible_steps(&self) -> Vec<&Step> {
        self.schema
            .steps()
            .iter()
            .filter(|s| s.visible_if.holds(&self.state.answers))
            .collect()
    }

    /// Seeds defaults and moves to the first visible step.
    pub fn start(&mut self) -> Result<&Step, WizardError> {
        self.require_status(WizardStatus::NotStarted, "start")?;
        let defaults = self.resolver().defaults();
        self.state.answers = defaults;

        let first = (0..self.schema.steps().len())
            .find(|&i| self.is_visible(i))
            .ok_or_else(|| WizardError::NoReachableStep {
                from: self.schema.name().to_string(),
                direction: "in schema",
            })?;
        self.enter(first);
        self.state.status = WizardStatus::InProgress;
        tracing::debug!(
            schema = %self.schema.name(),
            step = %self.schema.steps()[first].id,
            "wizard started"
        );
        Ok(&self.schema.steps()[first])
    }

    fn enter(&mut self, index: usize) {
        self.state.current_step_index = index;
        let id = self.schema.steps()[index].id.clone();
        self.state.visited_steps.insert(id);
    }

    /// Applies an answer through the dependency resolver. Returns the answers the
    /// cascade removed.
    pub fn answer(
        &mut self,
        field_id: &str,
        value: impl Into<Value>,
    ) -> Result<Vec<String>, WizardError> {
        self.require_status(WizardStatus::InProgress, "answer")?;
        let schema = Arc::clone(&self.schema);
        Ok(DependencyResolver::new(&schema).apply(&mut self.state, field_id, value.into())?)
    }

    /// Removes an answer and its dependents.
    pub fn clear(&mut self, field_id: &str) -> Result<Vec<String>, WizardError> {
        self.require_status(WizardStatus::InProgress, "clear")?;
        let schema = Arc::clone(&self.schema);
        Ok(DependencyResolver::new(&schema).clear(&mut self.state, field_id)?)
    }

    /// Required fields of the current step that apply under the current answers.
    pub fn required_fields(&self) -> Vec<&str> {
        match self.current_step() {
            Some(step) => self.resolver().required_fields(&self.state.answers, &step.id),
            None => Vec::new(),
        }
    }

    pub fn missing_required(&self) -> Vec<&str> {
        match self.current_step() {
            Some(step) => self.resolver().missing_required(&self.state.answers, &step.id),
            None => Vec::new(),
        }
    }

    /// Whether "Next"/"Finish" is enabled.
    pub fn is_current_step_complete(&self) -> bool {
        self.current_step()
            .is_some_and(|step| self.resolver().is_step_complete(&self.state, &step.id))
    }

    /// True when no visible step follows the current one.
    pub fn is_last_visible_step(&self) -> bool {
        self.current_step().is_some()
            && self
                .next_visible_after(self.state.current_step_index)
                .is_none()
    }

    fn ensure_current_complete(&self) -> Result<(), WizardError> {
        let missing = self.missing_required();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(WizardError::StepIncomplete {
                step: self.current_step_id(),
                missing: missing.into_iter().map(str::to_string).collect(),
            })
        }
    }

    /// Moves to the next visible step. Fails with `NoReachableStep` on the last
    /// visible step, leaving the state unchanged.
    pub fn advance(&mut self) -> Result<&Step, WizardError> {
        self.require_status(WizardStatus::InProgress, "advance")?;
        self.ensure_current_complete()?;

        let from = self.state.current_step_index;
        let next = self
            .next_visible_after(from)
            .ok_or_else(|| WizardError::NoReachableStep {
                from: self.current_step_id(),
                direction: "after step",
            })?;
        self.enter(next);
        tracing::debug!(
            schema = %self.schema.name(),
            from = %self.schema.steps()[from].id,
            to = %self.schema.steps()[next].id,
            "wizard advanced"
        );
        Ok(&self.schema.steps()[next])
    }

    /// Moves to the nearest previous visible step. Answers are retained.
    pub fn retreat(&mut self) -> Result<&Step, WizardError> {
        self.require_status(WizardStatus::InProgress, "retreat")?;

        let from = self.state.current_step_index;
        let previous = self
            .previous_visible_before(from)
            .ok_or_else(|| WizardError::NoReachableStep {
                from: self.current_step_id(),
                direction: "before step",
            })?;
        self.enter(previous);
        tracing::debug!(
            schema = %self.schema.name(),
            from = %self.schema.steps()[from].id,
            to = %self.schema.steps()[previous].id,
            "wizard retreated"
        );
        Ok(&self.schema.steps()[previous])
    }

    /// Finishes the session from the last visible step and returns every answer.
    ///
    /// Every visible step must be complete, not only the current one, since answers set
    /// on a later step can cascade into an earlier one.
    pub fn complete(&mut self) -> Result<FinalConfig, WizardError> {
        self.require_status(WizardStatus::InProgress, "complete")?;
        if let Some(next) = self.next_visible_after(self.state.current_step_index) {
            return Err(WizardError::StepsRemaining {
                current: self.current_step_id(),
                next: self.schema.steps()[next].id.clone(),
            });
        }

        let resolver = self.resolver();
        for step in self.visible_steps() {
            let missing = resolver.missing_required(&self.state.answers, &step.id);
            if !missing.is_empty() {
                return Err(WizardError::StepIncomplete {
                    step: step.id.clone(),
                    missing: missing.into_iter().map(str::to_string).collect(),
                });
            }
        }

        self.state.status = WizardStatus::Completed;
        tracing::info!(
            schema = %self.schema.name(),
            answers = self.state.answers.len(),
            "wizard completed"
        );
        Ok(FinalConfig {
            answers: self.state.answers.clone(),
        })
    }

    /// Discards the session. Completed sessions cannot be abandoned.
    pub fn abandon(&mut self) -> Result<(), WizardError> {
        if self.state.status == WizardStatus::Completed {
            return Err(WizardError::InvalidState {
                operation: "abandon",
                status: self.state.status.to_string(),
            });
        }
        self.state.status = WizardStatus::Abandoned;
        tracing::debug!(schema = %self.schema.name(), "wizard abandoned");
        Ok(())
    }
}
