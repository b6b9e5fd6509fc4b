use super::format::{AllowedDefinition, FieldDefinition, SchemaDefinition, StepDefinition};
use crate::criteria::CriteriaSet;
use crate::error::DefinitionError;
use crate::schema::{AllowedValues, ConfigSchema, FieldSpec, Step};

/// A trait for definition formats that can be converted into a validated [`ConfigSchema`].
///
/// This is the extension point for loading wizards from outside the crate. Implement it
/// on your own structs to translate any format into settei's builders; the built-in
/// [`SchemaDefinition`] implements it for JSON.
///
/// # Example
///
/// ```rust
/// use settei::prelude::*;
/// use settei::error::DefinitionError;
///
/// struct Questionnaire {
///     questions: Vec<String>,
/// }
///
/// impl IntoSchema for Questionnaire {
///     fn into_schema(self) -> std::result::Result<ConfigSchema, DefinitionError> {
///         let mut builder = ConfigSchema::builder("questionnaire");
///         let mut step = Step::new("questions");
///         for question in self.questions {
///             builder = builder.field(FieldSpec::new(question.as_str(), ValueType::String).required());
///             step = step.field(question);
///         }
///         Ok(builder.step(step).build()?)
///     }
/// }
///
/// let schema = Questionnaire { questions: vec!["name".into()] }.into_schema().unwrap();
/// assert!(schema.contains_field("name"));
/// ```
pub trait IntoSchema {
    /// Consumes the object and converts it into a validated schema.
    fn into_schema(self) -> Result<ConfigSchema, DefinitionError>;
}

impl IntoSchema for SchemaDefinition {
    fn into_schema(self) -> Result<ConfigSchema, DefinitionError> {
        let mut builder = ConfigSchema::builder(self.name.as_str());
        for field in self.fields {
            builder = builder.field(convert_field(field)?);
        }
        for step in self.steps {
            builder = builder.step(convert_step(step)?);
        }
        Ok(builder.build()?)
    }
}

/// Parses a JSON schema definition and validates it.
pub fn schema_from_json(json: &str) -> Result<ConfigSchema, DefinitionError> {
    SchemaDefinition::from_json(json)?.into_schema()
}

fn convert_allowed(
    field: &str,
    allowed: AllowedDefinition,
) -> Result<AllowedValues, DefinitionError> {
    match allowed {
        AllowedDefinition::Options(options) => Ok(AllowedValues::OneOf(options)),
        AllowedDefinition::Keyword(keyword) => {
            let normalized = keyword.trim().to_lowercase();
            match normalized.as_str() {
                "any" => Ok(AllowedValues::Any),
                "none" | "inapplicable" => Ok(AllowedValues::Inapplicable),
                _ => Err(DefinitionError::UnknownKeyword {
                    field: field.to_string(),
                    keyword,
                }),
            }
        }
    }
}

fn convert_field(def: FieldDefinition) -> Result<FieldSpec, DefinitionError> {
    let mut spec = FieldSpec::new(def.id.as_str(), def.value_type);
    if let Some(label) = def.label {
        spec = spec.label(label);
    }
    if def.required {
        spec = spec.required();
    }
    if let Some(options) = def.options {
        spec = spec.options(options);
    }
    if let Some(parent) = def.depends_on {
        spec = spec.depends_on(parent);
    }
    for (parent_value, allowed) in def.values_by_parent.into_iter().flatten() {
        spec = spec.when(parent_value, convert_allowed(&def.id, allowed)?);
    }
    if let Some(allowed) = def.otherwise {
        spec = spec.otherwise(convert_allowed(&def.id, allowed)?);
    }
    if let Some(json) = def.default {
        let value = def
            .value_type
            .value_from_json(&json)
            .ok_or_else(|| DefinitionError::InvalidDefault {
                field: def.id.clone(),
            })?;
        spec = spec.default_value(value);
    }
    Ok(spec)
}

fn convert_step(def: StepDefinition) -> Result<Step, DefinitionError> {
    let mut step = Step::new(def.id).fields(def.fields);
    if let Some(title) = def.title {
        step = step.title(title);
    }
    if let Some(raw) = def.visible_if {
        step = step.visible_if(CriteriaSet::parse(raw)?);
    }
    Ok(step)
}
