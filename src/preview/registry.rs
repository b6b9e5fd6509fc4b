use super::{Preview, PreviewTemplate};
use crate::error::ValidationError;
use crate::model::{Answers, Value};
use crate::schema::ConfigSchema;
use ahash::AHashMap;

/// How a wizard picks which of its templates to render.
#[derive(Debug, Clone, PartialEq)]
pub enum Discriminator {
    /// Always the default key.
    Fixed,
    /// The answer of `field`. For a multi-enum answer, the first entry of `priority`
    /// that is selected wins, then the first selected value.
    Field { field: String, priority: Vec<String> },
    /// Boolean fields checked in order; the first one set to `true` names the key.
    Flags(Vec<(String, String)>),
}

impl Discriminator {
    pub fn field(field: impl Into<String>) -> Self {
        Discriminator::Field {
            field: field.into(),
            priority: Vec::new(),
        }
    }

    pub fn flags<I, F, K>(flags: I) -> Self
    where
        I: IntoIterator<Item = (F, K)>,
        F: Into<String>,
        K: Into<String>,
    {
        Discriminator::Flags(
            flags
                .into_iter()
                .map(|(field, key)| (field.into(), key.into()))
                .collect(),
        )
    }

    /// The template key selected by `answers`, if the discriminating answers are set.
    pub fn select(&self, answers: &Answers) -> Option<String> {
        match self {
            Discriminator::Fixed => None,
            Discriminator::Field { field, priority } => match answers.get(field)? {
                Value::List(selected) => priority
                    .iter()
                    .find(|p| selected.contains(p))
                    .or_else(|| selected.first())
                    .cloned(),
                Value::Criteria(_) => None,
                value if value.is_empty() => None,
                value => Some(value.to_string()),
            },
            Discriminator::Flags(flags) => flags
                .iter()
                .find(|(field, _)| matches!(answers.get(field), Some(Value::Bool(true))))
                .map(|(_, key)| key.clone()),
        }
    }

    fn fields(&self) -> Vec<&str> {
        match self {
            Discriminator::Fixed => Vec::new(),
            Discriminator::Field { field, .. } => vec![field.as_str()],
            Discriminator::Flags(flags) => flags.iter().map(|(f, _)| f.as_str()).collect(),
        }
    }
}

/// A wizard's discriminator and the key used when it selects nothing.
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewPolicy {
    pub discriminator: Discriminator,
    pub default_key: String,
}

impl PreviewPolicy {
    pub fn new(discriminator: Discriminator, default_key: impl Into<String>) -> Self {
        Self {
            discriminator,
            default_key: default_key.into(),
        }
    }

    pub fn key_for(&self, answers: &Answers) -> String {
        self.discriminator
            .select(answers)
            .unwrap_or_else(|| self.default_key.clone())
    }
}

/// Read-only table of preview templates keyed by `(wizard, discriminator value)`.
#[derive(Debug, Clone, Default)]
pub struct TemplateRegistry {
    policies: AHashMap<String, PreviewPolicy>,
    templates: AHashMap<String, AHashMap<String, PreviewTemplate>>,
}

impl TemplateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(mut self, wizard: impl Into<String>, policy: PreviewPolicy) -> Self {
        self.policies.insert(wizard.into(), policy);
        self
    }

    pub fn with_template(
        mut self,
        wizard: impl Into<String>,
        key: impl Into<String>,
        template: PreviewTemplate,
    ) -> Self {
        self.templates
            .entry(wizard.into())
            .or_default()
            .insert(key.into(), template);
        self
    }

    pub fn policy(&self, wizard: &str) -> Option<&PreviewPolicy> {
        self.policies.get(wizard)
    }

    pub fn template(&self, wizard: &str, key: &str) -> Option<&PreviewTemplate> {
        self.templates.get(wizard)?.get(key)
    }

    /// Template keys registered for a wizard, sorted.
    pub fn keys(&self, wizard: &str) -> Vec<&str> {
        let mut keys: Vec<&str> = self
            .templates
            .get(wizard)
            .map(|t| t.keys().map(String::as_str).collect())
            .unwrap_or_default();
        keys.sort_unstable();
        keys
    }

    /// The template key `answers` select. Wizards without a policy use their only
    /// template key, if they have exactly one.
    pub fn key_for(&self, wizard: &str, answers: &Answers) -> Option<String> {
        match self.policies.get(wizard) {
            Some(policy) => Some(policy.key_for(answers)),
            None => match self.keys(wizard).as_slice() {
                [only] => Some(only.to_string()),
                _ => None,
            },
        }
    }

    pub fn render(&self, wizard: &str, answers: &Answers) -> Preview {
        let Some(key) = self.key_for(wizard, answers) else {
            return Preview::insufficient();
        };
        match self.template(wizard, &key) {
            Some(template) => template.render(answers),
            None => {
                tracing::trace!(wizard = %wizard, key = %key, "no preview template for key");
                Preview::insufficient()
            }
        }
    }

    /// Checks that every placeholder and discriminator field of `wizard` is declared in
    /// `schema`.
    pub fn check_against(
        &self,
        wizard: &str,
        schema: &ConfigSchema,
    ) -> Result<(), ValidationError> {
        if let Some(policy) = self.policies.get(wizard) {
            for field in policy.discriminator.fields() {
                if !schema.contains_field(field) {
                    return Err(ValidationError::UnknownPlaceholder {
                        template: format!("{}/<discriminator>", wizard),
                        field: field.to_string(),
                    });
                }
            }
        }
        for key in self.keys(wizard) {
            let Some(template) = self.template(wizard, key) else {
                continue;
            };
            for field in template.placeholders() {
                if !schema.contains_field(field) {
                    return Err(ValidationError::UnknownPlaceholder {
                        template: format!("{}/{}", wizard, key),
                        field: field.to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}
