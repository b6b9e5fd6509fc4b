//! Answer validation and cascading invalidation over a schema's dependency DAG.

use crate::error::ResolveError;
use crate::model::{Answers, ConfigState, Value};
use crate::schema::{AllowedValues, ConfigSchema, FieldSpec};

/// Applies answers to a [`ConfigState`] while keeping every dependent answer valid.
///
/// The resolver borrows its schema and holds no state of its own, so it is cheap to
/// create per operation.
#[derive(Debug, Clone, Copy)]
pub struct DependencyResolver<'s> {
    schema: &'s ConfigSchema,
}

impl<'s> DependencyResolver<'s> {
    pub fn new(schema: &'s ConfigSchema) -> Self {
        Self { schema }
    }

    pub fn schema(&self) -> &'s ConfigSchema {
        self.schema
    }

    fn spec(&self, field_id: &str) -> Result<&'s FieldSpec, ResolveError> {
        self.schema
            .field(field_id)
            .ok_or_else(|| ResolveError::UnknownField(field_id.to_string()))
    }

    /// The values `field_id` currently allows. A dependent field whose parent is
    /// unanswered is inapplicable.
    pub fn allowed_values(
        &self,
        answers: &Answers,
        field_id: &str,
    ) -> Result<AllowedValues, ResolveError> {
        let spec = self.spec(field_id)?;
        Ok(Self::allowed_for(spec, answers))
    }

    fn allowed_for(spec: &FieldSpec, answers: &Answers) -> AllowedValues {
        match &spec.depends_on {
            None => spec.value_provider.allowed_for(None),
            Some(parent) => match answers.get(parent) {
                None => AllowedValues::Inapplicable,
                Some(parent_value) => spec.value_provider.allowed_for(Some(parent_value)),
            },
        }
    }

    pub fn is_applicable(&self, answers: &Answers, field_id: &str) -> bool {
        self.allowed_values(answers, field_id)
            .is_ok_and(|allowed| allowed.is_applicable())
    }

    /// Checks `value` against the field's type and its currently allowed set.
    pub fn validate(
        &self,
        answers: &Answers,
        field_id: &str,
        value: &Value,
    ) -> Result<(), ResolveError> {
        let spec = self.spec(field_id)?;
        let reject = |reason: String| ResolveError::InvalidFieldValue {
            field: field_id.to_string(),
            value: value.to_string(),
            reason,
        };

        if !spec.value_type.accepts(value) {
            return Err(reject(format!(
                "expected a {} value, found {}",
                spec.value_type,
                value.type_name()
            )));
        }
        match Self::allowed_for(spec, answers) {
            AllowedValues::Inapplicable => Err(reject(match &spec.depends_on {
                Some(parent) => format!("field does not apply under the current '{}'", parent),
                None => "field does not apply".to_string(),
            })),
            allowed if allowed.permits(value) => Ok(()),
            AllowedValues::OneOf(options) => Err(reject(format!(
                "expected one of [{}]",
                options.join(", ")
            ))),
            AllowedValues::Any => Ok(()),
        }
    }

    /// Blank text and empty selections do not count as an answer.
    fn is_valid_answer(&self, answers: &Answers, field_id: &str) -> bool {
        answers.get(field_id).is_some_and(|value| {
            !value.is_empty() && self.validate(answers, field_id, value).is_ok()
        })
    }

    /// Returns a new state with `value` applied and invalidated dependents removed.
    ///
    /// Rejected values leave `state` untouched. Reapplying the same value yields the
    /// same answers.
    pub fn apply_answer(
        &self,
        state: &ConfigState,
        field_id: &str,
        value: Value,
    ) -> Result<ConfigState, ResolveError> {
        let mut next = state.clone();
        self.apply(&mut next, field_id, value)?;
        Ok(next)
    }

    /// In-place form of [`DependencyResolver::apply_answer`]. Returns the ids of the
    /// answers the cascade removed.
    pub fn apply(
        &self,
        state: &mut ConfigState,
        field_id: &str,
        value: Value,
    ) -> Result<Vec<String>, ResolveError> {
        self.validate(&state.answers, field_id, &value)?;
        tracing::trace!(field = %field_id, value = %value, "answer applied");
        state.answers.insert(field_id.to_string(), value);

        let mut removed = Vec::new();
        self.cascade(&mut state.answers, field_id, &mut removed);
        Ok(removed)
    }

    /// Removes an answer and everything that depended on it.
    pub fn clear(&self, state: &mut ConfigState, field_id: &str) -> Result<Vec<String>, ResolveError> {
        self.spec(field_id)?;
        let mut removed = Vec::new();
        if state.answers.remove(field_id).is_some() {
            removed.push(field_id.to_string());
            self.cascade(&mut state.answers, field_id, &mut removed);
        }
        Ok(removed)
    }

    /// Re-checks the children of `changed`, removing answers their provider no longer
    /// allows and recursing into the subtree of each removal.
    fn cascade(&self, answers: &mut Answers, changed: &str, removed: &mut Vec<String>) {
        for child in self.schema.children_of(changed) {
            let Some(answer) = answers.get(child) else {
                continue;
            };
            let Some(spec) = self.schema.field(child) else {
                continue;
            };
            if Self::allowed_for(spec, answers).permits(answer) {
                continue;
            }
            answers.remove(child);
            tracing::debug!(
                schema = %self.schema.name(),
                field = %child,
                parent = %changed,
                "dependent answer invalidated"
            );
            removed.push(child.clone());
            self.cascade(answers, child, removed);
        }
    }

    /// Answers seeded from schema defaults, parents first. A default its parent's
    /// default does not allow is skipped.
    pub fn defaults(&self) -> Answers {
        let mut answers = Answers::new();
        for spec in self.schema.fields() {
            if let Some(default) = &spec.default {
                if self.validate(&answers, &spec.id, default).is_ok() {
                    answers.insert(spec.id.clone(), default.clone());
                }
            }
        }
        answers
    }

    /// The required fields of a step that currently apply. Unknown steps have none.
    pub fn required_fields(&self, answers: &Answers, step_id: &str) -> Vec<&'s str> {
        let Some(step) = self.schema.step(step_id) else {
            return Vec::new();
        };
        step.fields
            .iter()
            .filter(|id| {
                self.schema.field(id).is_some_and(|spec| spec.required)
                    && self.is_applicable(answers, id)
            })
            .map(String::as_str)
            .collect()
    }

    /// Required, applicable fields of a step without a currently valid, non-empty answer.
    pub fn missing_required(&self, answers: &Answers, step_id: &str) -> Vec<&'s str> {
        self.required_fields(answers, step_id)
            .into_iter()
            .filter(|id| !self.is_valid_answer(answers, id))
            .collect()
    }

    /// True iff every applicable required field of the step has a valid answer.
    /// Gates the "Next" and "Finish" actions.
    pub fn is_step_complete(&self, state: &ConfigState, step_id: &str) -> bool {
        self.schema.step(step_id).is_some()
            && self.missing_required(&state.answers, step_id).is_empty()
    }
}
