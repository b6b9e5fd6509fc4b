use super::Value;
use ahash::AHashMap;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

pub type FieldId = String;
pub type StepId = String;

/// The answers collected by a session, keyed by field id.
pub type Answers = AHashMap<FieldId, Value>;

/// Lifecycle of a wizard session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WizardStatus {
    #[default]
    NotStarted,
    InProgress,
    Completed,
    Abandoned,
}

impl fmt::Display for WizardStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WizardStatus::NotStarted => "not started",
            WizardStatus::InProgress => "in progress",
            WizardStatus::Completed => "completed",
            WizardStatus::Abandoned => "abandoned",
        };
        write!(f, "{}", name)
    }
}

/// The mutable, session-owned record of a wizard run.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ConfigState {
    pub answers: Answers,
    pub current_step_index: usize,
    pub visited_steps: BTreeSet<StepId>,
    pub status: WizardStatus,
}

impl ConfigState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn answer(&self, field_id: &str) -> Option<&Value> {
        self.answers.get(field_id)
    }
}

/// The assembled payload of a completed wizard.
///
/// Serializes to a flat JSON object keyed by field id; criteria answers become
/// nested `Criterion[]` arrays.
#[derive(Debug, Clone, PartialEq)]
pub struct FinalConfig {
    pub answers: Answers,
}

impl FinalConfig {
    pub fn get(&self, field_id: &str) -> Option<&Value> {
        self.answers.get(field_id)
    }

    pub fn to_json(&self) -> serde_json::Value {
        let map = self
            .answers
            .iter()
            .sorted_by(|a, b| a.0.cmp(b.0))
            .map(|(id, value)| (id.clone(), value.to_json()))
            .collect::<serde_json::Map<_, _>>();
        serde_json::Value::Object(map)
    }
}

impl Serialize for FinalConfig {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}
