use super::{ConfigSchema, FieldSpec, Step, Visibility};
use crate::error::ValidationError;
use ahash::{AHashMap, AHashSet};
use std::sync::Arc;

/// Collects fields and steps, then validates them into a [`ConfigSchema`].
pub struct SchemaBuilder {
    name: String,
    fields: Vec<Arc<FieldSpec>>,
    steps: Vec<Step>,
}

impl SchemaBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            steps: Vec::new(),
        }
    }

    /// Adds a field. Pass an `Arc<FieldSpec>` to share it with another schema.
    pub fn field(mut self, field: impl Into<Arc<FieldSpec>>) -> Self {
        self.fields.push(field.into());
        self
    }

    pub fn fields<I>(mut self, fields: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Arc<FieldSpec>>,
    {
        self.fields.extend(fields.into_iter().map(Into::into));
        self
    }

    pub fn step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    pub fn build(self) -> Result<ConfigSchema, ValidationError> {
        if self.steps.is_empty() {
            return Err(ValidationError::NoSteps(self.name));
        }

        let mut fields: AHashMap<String, Arc<FieldSpec>> = AHashMap::new();
        for field in &self.fields {
            if fields.insert(field.id.clone(), field.clone()).is_some() {
                return Err(ValidationError::DuplicateField(field.id.clone()));
            }
        }

        let mut step_ids = AHashSet::new();
        for step in &self.steps {
            if !step_ids.insert(step.id.as_str()) {
                return Err(ValidationError::DuplicateStep(step.id.clone()));
            }
        }

        for field in &self.fields {
            match &field.depends_on {
                Some(parent) if !fields.contains_key(parent) => {
                    return Err(ValidationError::UnknownParent {
                        field: field.id.clone(),
                        parent: parent.clone(),
                    });
                }
                None if field.value_provider.is_parent_keyed() => {
                    return Err(ValidationError::ProviderWithoutParent(field.id.clone()));
                }
                _ => {}
            }
        }

        Self::check_acyclic(&self.fields, &fields)?;
        let topological_order = Self::topological_order(&self.fields, &fields);

        let owners = Self::assign_owners(&self.steps, &fields)?;
        for field in &self.fields {
            if let Some(parent) = &field.depends_on {
                if owners[parent] > owners[&field.id] {
                    return Err(ValidationError::ParentOwnedLater {
                        field: field.id.clone(),
                        parent: parent.clone(),
                    });
                }
            }
        }

        for (index, step) in self.steps.iter().enumerate() {
            if let Visibility::When(criteria) = &step.visible_if {
                for referenced in criteria.fields() {
                    let answered_earlier = owners.get(referenced).is_some_and(|&o| o < index);
                    if !answered_earlier {
                        return Err(ValidationError::VisibilityField {
                            step: step.id.clone(),
                            field: referenced.to_string(),
                        });
                    }
                }
            }
        }

        for field in &self.fields {
            Self::check_default(field)?;
        }

        let mut children: AHashMap<String, Vec<String>> = AHashMap::new();
        for id in &topological_order {
            if let Some(parent) = &fields[id].depends_on {
                children.entry(parent.clone()).or_default().push(id.clone());
            }
        }

        tracing::debug!(
            schema = %self.name,
            fields = fields.len(),
            steps = self.steps.len(),
            "schema validated"
        );

        Ok(ConfigSchema {
            name: self.name,
            fields,
            topological_order,
            steps: self.steps,
            owners,
            children,
        })
    }

    /// Each field has at most one parent, so a cycle shows up as a parent chain that
    /// returns to its start within `len` hops.
    fn check_acyclic(
        declared: &[Arc<FieldSpec>],
        fields: &AHashMap<String, Arc<FieldSpec>>,
    ) -> Result<(), ValidationError> {
        for field in declared {
            let mut current = field.depends_on.as_deref();
            for _ in 0..fields.len() {
                match current {
                    Some(id) if id == field.id => {
                        return Err(ValidationError::DependencyCycle(field.id.clone()));
                    }
                    Some(id) => current = fields[id].depends_on.as_deref(),
                    None => break,
                }
            }
        }
        Ok(())
    }

    /// Orders fields so that parents precede children, keeping declaration order otherwise.
    fn topological_order(
        declared: &[Arc<FieldSpec>],
        fields: &AHashMap<String, Arc<FieldSpec>>,
    ) -> Vec<String> {
        let mut placed = AHashSet::new();
        let mut order = Vec::with_capacity(declared.len());
        for field in declared {
            let mut chain = vec![field.id.as_str()];
            let mut current = field.depends_on.as_deref();
            while let Some(id) = current {
                chain.push(id);
                current = fields[id].depends_on.as_deref();
            }
            for id in chain.into_iter().rev() {
                if placed.insert(id) {
                    order.push(id.to_string());
                }
            }
        }
        order
    }

    fn assign_owners(
        steps: &[Step],
        fields: &AHashMap<String, Arc<FieldSpec>>,
    ) -> Result<AHashMap<String, usize>, ValidationError> {
        let mut owners: AHashMap<String, usize> = AHashMap::new();
        for (index, step) in steps.iter().enumerate() {
            for field_id in &step.fields {
                if !fields.contains_key(field_id) {
                    return Err(ValidationError::UnknownStepField {
                        step: step.id.clone(),
                        field: field_id.clone(),
                    });
                }
                if let Some(&first) = owners.get(field_id) {
                    return Err(ValidationError::FieldOwnedTwice {
                        field: field_id.clone(),
                        first: steps[first].id.clone(),
                        second: step.id.clone(),
                    });
                }
                owners.insert(field_id.clone(), index);
            }
        }
        if let Some(unowned) = fields.keys().find(|id| !owners.contains_key(*id)) {
            return Err(ValidationError::UnownedField(unowned.clone()));
        }
        Ok(owners)
    }

    fn check_default(field: &FieldSpec) -> Result<(), ValidationError> {
        let Some(default) = &field.default else {
            return Ok(());
        };
        if !field.value_type.accepts(default) {
            return Err(ValidationError::InvalidDefault {
                field: field.id.clone(),
                message: format!(
                    "expected a {} value, found {}",
                    field.value_type,
                    default.type_name()
                ),
            });
        }
        if field.depends_on.is_none() && !field.value_provider.allowed_for(None).permits(default) {
            return Err(ValidationError::InvalidDefault {
                field: field.id.clone(),
                message: format!("'{}' is not one of the field's options", default),
            });
        }
        Ok(())
    }
}
