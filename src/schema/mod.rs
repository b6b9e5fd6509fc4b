//! Static wizard structure: field specs, their dependency DAG, and ordered steps.

use ahash::AHashMap;
use std::collections::VecDeque;
use std::sync::Arc;

mod builder;
mod field;
mod step;

pub use builder::SchemaBuilder;
pub use field::{AllowedValues, FieldSpec, ProviderFn, ValueProvider, ValueType};
pub use step::{Step, Visibility, VisibilityFn};

/// One wizard variant: its fields keyed by id and its ordered steps.
///
/// Built and validated once through [`ConfigSchema::builder`]; immutable afterwards.
/// Field specs are held by `Arc` so that sibling variants can share them.
#[derive(Debug, Clone)]
pub struct ConfigSchema {
    name: String,
    fields: AHashMap<String, Arc<FieldSpec>>,
    /// Parents always precede their children.
    topological_order: Vec<String>,
    steps: Vec<Step>,
    owners: AHashMap<String, usize>,
    children: AHashMap<String, Vec<String>>,
}

impl ConfigSchema {
    pub fn builder(name: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn field(&self, field_id: &str) -> Option<&FieldSpec> {
        self.fields.get(field_id).map(Arc::as_ref)
    }

    /// The shared handle of a field, for building a sibling variant.
    pub fn shared_field(&self, field_id: &str) -> Option<Arc<FieldSpec>> {
        self.fields.get(field_id).cloned()
    }

    pub fn contains_field(&self, field_id: &str) -> bool {
        self.fields.contains_key(field_id)
    }

    /// All fields, parents before children.
    pub fn fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.topological_order
            .iter()
            .filter_map(|id| self.fields.get(id).map(Arc::as_ref))
    }

    pub fn topological_order(&self) -> &[String] {
        &self.topological_order
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn step(&self, step_id: &str) -> Option<&Step> {
        self.steps.iter().find(|s| s.id == step_id)
    }

    pub fn step_index(&self, step_id: &str) -> Option<usize> {
        self.steps.iter().position(|s| s.id == step_id)
    }

    /// The step that asks for `field_id`.
    pub fn owner_of(&self, field_id: &str) -> Option<&Step> {
        self.owners.get(field_id).map(|&i| &self.steps[i])
    }

    /// Fields whose `depends_on` is exactly `field_id`.
    pub fn children_of(&self, field_id: &str) -> &[String] {
        self.children
            .get(field_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Every field whose dependency chain passes through `field_id`, nearest first.
    pub fn dependents_of(&self, field_id: &str) -> Vec<&str> {
        let mut dependents = Vec::new();
        let mut queue: VecDeque<&str> = VecDeque::from([field_id]);
        while let Some(current) = queue.pop_front() {
            for child in self.children_of(current) {
                dependents.push(child.as_str());
                queue.push_back(child);
            }
        }
        dependents
    }
}
