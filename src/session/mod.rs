//! The caller-facing session API over the catalog, one state machine per session.

use crate::catalog::{Catalog, WizardType};
use crate::error::{ResolveError, SessionError, WizardError};
use crate::model::{Answers, ConfigState, FinalConfig, Value, WizardStatus};
use crate::preview::{Preview, PreviewRenderer};
use crate::resolver::DependencyResolver;
use crate::schema::{AllowedValues, ConfigSchema, Step};
use crate::wizard::WizardStateMachine;
use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use uuid::Uuid;

mod snapshot;
mod store;

pub use snapshot::SessionSnapshot;
pub use store::{KeyValueStore, MemoryStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SessionId {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| SessionError::UnknownSession(s.to_string()))
    }
}

/// Outcome of [`WizardService::submit_step`].
///
/// `ok` is true when the answers were accepted and the current step is complete.
/// `next_step_id` is the step now shown, or `None` when the session is on its last
/// visible step and can be finished.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepResult {
    pub ok: bool,
    pub next_step_id: Option<String>,
    pub errors: Vec<String>,
}

impl StepResult {
    fn rejected(errors: Vec<String>) -> Self {
        Self {
            ok: false,
            next_step_id: None,
            errors,
        }
    }
}

#[derive(Debug, Clone)]
struct Session {
    wizard: WizardType,
    variant: String,
    machine: WizardStateMachine,
}

/// Runs wizard sessions against a [`Catalog`] and hands finished configurations to a
/// [`KeyValueStore`] under `"<wizard>.config"`.
pub struct WizardService<S: KeyValueStore = MemoryStore> {
    catalog: Arc<Catalog>,
    renderer: PreviewRenderer,
    sessions: AHashMap<SessionId, Session>,
    store: S,
}

impl WizardService<MemoryStore> {
    pub fn in_memory(catalog: Arc<Catalog>) -> Self {
        Self::new(catalog, MemoryStore::new())
    }
}

impl<S: KeyValueStore> WizardService<S> {
    pub fn new(catalog: Arc<Catalog>, store: S) -> Self {
        let renderer = catalog.renderer();
        Self {
            catalog,
            renderer,
            sessions: AHashMap::new(),
            store,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn active_sessions(&self) -> usize {
        self.sessions.len()
    }

    fn session(&self, id: SessionId) -> Result<&Session, SessionError> {
        self.sessions
            .get(&id)
            .ok_or_else(|| SessionError::UnknownSession(id.to_string()))
    }

    fn session_mut(&mut self, id: SessionId) -> Result<&mut Session, SessionError> {
        self.sessions
            .get_mut(&id)
            .ok_or_else(|| SessionError::UnknownSession(id.to_string()))
    }

    /// Starts the default variant of a wizard.
    pub fn start_wizard(&mut self, wizard: WizardType) -> Result<SessionId, SessionError> {
        self.open(wizard, None)
    }

    pub fn start_wizard_variant(
        &mut self,
        wizard: WizardType,
        variant: &str,
    ) -> Result<SessionId, SessionError> {
        self.open(wizard, Some(variant))
    }

    fn open(
        &mut self,
        wizard: WizardType,
        variant: Option<&str>,
    ) -> Result<SessionId, SessionError> {
        let (variant, schema) = self.catalog.schema(wizard, variant)?;
        let mut machine = WizardStateMachine::new(schema);
        machine.start()?;

        let id = SessionId::new();
        tracing::info!(session = %id, wizard = %wizard, variant = %variant, "session started");
        self.sessions.insert(
            id,
            Session {
                wizard,
                variant,
                machine,
            },
        );
        Ok(id)
    }

    /// Applies a batch of answers to the current step, parents first, and advances when
    /// the step is complete. The batch is all-or-nothing: any rejected answer leaves the
    /// session unchanged and is reported in `errors`.
    pub fn submit_step(
        &mut self,
        id: SessionId,
        field_answers: Answers,
    ) -> Result<StepResult, SessionError> {
        let session = self.session_mut(id)?;
        let mut candidate = session.machine.clone();

        let schema = Arc::clone(candidate.schema());
        let position = |field: &str| {
            schema
                .topological_order()
                .iter()
                .position(|f| f == field)
                .unwrap_or(usize::MAX)
        };
        let mut ordered: Vec<(String, Value)> = field_answers.into_iter().collect();
        ordered.sort_by(|a, b| {
            position(a.0.as_str())
                .cmp(&position(b.0.as_str()))
                .then_with(|| a.0.cmp(&b.0))
        });

        let mut errors = Vec::new();
        for (field, value) in ordered {
            if let Err(e) = candidate.answer(&field, value) {
                errors.push(e.to_string());
            }
        }
        if !errors.is_empty() {
            tracing::debug!(session = %id, errors = errors.len(), "step submission rejected");
            return Ok(StepResult::rejected(errors));
        }

        let missing = candidate.missing_required();
        if !missing.is_empty() {
            let errors = missing
                .iter()
                .map(|f| format!("Required field '{}' has no valid answer", f))
                .collect();
            session.machine = candidate;
            return Ok(StepResult::rejected(errors));
        }

        let next_step_id = if candidate.is_last_visible_step() {
            None
        } else {
            Some(candidate.advance()?.id.clone())
        };
        session.machine = candidate;
        Ok(StepResult {
            ok: true,
            next_step_id,
            errors: Vec::new(),
        })
    }

    /// [`WizardService::submit_step`] for a JSON object of answers, typed by the schema.
    pub fn submit_step_json(
        &mut self,
        id: SessionId,
        field_answers: &serde_json::Value,
    ) -> Result<StepResult, SessionError> {
        let Some(object) = field_answers.as_object() else {
            return Ok(StepResult::rejected(vec![
                "Step answers must be a JSON object keyed by field id".to_string(),
            ]));
        };

        let schema = Arc::clone(self.session(id)?.machine.schema());
        let mut answers = Answers::new();
        let mut errors = Vec::new();
        for (field, json) in object {
            let Some(spec) = schema.field(field) else {
                errors.push(ResolveError::UnknownField(field.clone()).to_string());
                continue;
            };
            match spec.value_type.value_from_json(json) {
                Some(value) => {
                    answers.insert(field.clone(), value);
                }
                None => errors.push(
                    ResolveError::InvalidFieldValue {
                        field: field.clone(),
                        value: json.to_string(),
                        reason: format!("expected a {} value", spec.value_type),
                    }
                    .to_string(),
                ),
            }
        }
        if !errors.is_empty() {
            return Ok(StepResult::rejected(errors));
        }
        self.submit_step(id, answers)
    }

    /// Moves the session back to its previous visible step and returns that step's id.
    pub fn retreat(&mut self, id: SessionId) -> Result<String, SessionError> {
        let session = self.session_mut(id)?;
        Ok(session.machine.retreat()?.id.clone())
    }

    /// The schema variant a session runs.
    pub fn schema(&self, id: SessionId) -> Result<&Arc<ConfigSchema>, SessionError> {
        Ok(self.session(id)?.machine.schema())
    }

    pub fn current_step(&self, id: SessionId) -> Result<Option<&Step>, SessionError> {
        Ok(self.session(id)?.machine.current_step())
    }

    /// Required fields of the session's current step, for the caller to mark.
    pub fn required_fields(&self, id: SessionId) -> Result<Vec<String>, SessionError> {
        Ok(self
            .session(id)?
            .machine
            .required_fields()
            .into_iter()
            .map(str::to_string)
            .collect())
    }

    /// The values a field currently allows, for the caller to offer.
    pub fn allowed_values(
        &self,
        id: SessionId,
        field: &str,
    ) -> Result<AllowedValues, SessionError> {
        let machine = &self.session(id)?.machine;
        DependencyResolver::new(machine.schema())
            .allowed_values(machine.answers(), field)
            .map_err(|e| WizardError::from(e).into())
    }

    pub fn state(&self, id: SessionId) -> Result<&ConfigState, SessionError> {
        Ok(self.session(id)?.machine.state())
    }

    pub fn get_preview(&self, id: SessionId) -> Result<Preview, SessionError> {
        let session = self.session(id)?;
        Ok(self
            .renderer
            .render(session.wizard.as_str(), session.machine.answers()))
    }

    /// Completes the session, saves its configuration and closes it. A session that
    /// cannot complete stays open.
    pub fn finish_wizard(&mut self, id: SessionId) -> Result<FinalConfig, SessionError> {
        let session = self.session_mut(id)?;
        let wizard = session.wizard;
        let config = session.machine.complete()?;

        let key = format!("{}.config", wizard);
        self.store.save(&key, config.to_json())?;
        self.sessions.remove(&id);
        tracing::info!(session = %id, wizard = %wizard, key = %key, "session finished");
        Ok(config)
    }

    pub fn abandon_wizard(&mut self, id: SessionId) -> Result<(), SessionError> {
        self.session_mut(id)?.machine.abandon()?;
        self.sessions.remove(&id);
        tracing::info!(session = %id, "session abandoned");
        Ok(())
    }

    /// The last configuration saved for a wizard.
    pub fn saved_config(
        &self,
        wizard: WizardType,
    ) -> Result<Option<serde_json::Value>, SessionError> {
        Ok(self.store.load(&format!("{}.config", wizard))?)
    }

    pub fn snapshot(&self, id: SessionId) -> Result<SessionSnapshot, SessionError> {
        let session = self.session(id)?;
        Ok(SessionSnapshot {
            wizard: session.wizard,
            variant: session.variant.clone(),
            state: session.machine.state().clone(),
        })
    }

    /// Reopens a suspended session under a new id.
    ///
    /// Only in-progress snapshots that still fit the wizard's schema are accepted.
    pub fn resume(&mut self, snapshot: SessionSnapshot) -> Result<SessionId, SessionError> {
        let (variant, schema) = self
            .catalog
            .schema(snapshot.wizard, Some(&snapshot.variant))?;
        if snapshot.state.status != WizardStatus::InProgress {
            return Err(WizardError::InvalidState {
                operation: "resume",
                status: snapshot.state.status.to_string(),
            }
            .into());
        }
        let machine = WizardStateMachine::from_state(schema, snapshot.state)?;

        let id = SessionId::new();
        tracing::info!(session = %id, wizard = %snapshot.wizard, "session resumed");
        self.sessions.insert(
            id,
            Session {
                wizard: snapshot.wizard,
                variant,
                machine,
            },
        );
        Ok(id)
    }
}
