use crate::criteria::RawCriterion;
use crate::error::DefinitionError;
use crate::schema::ValueType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A wizard schema as written in JSON, before validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaDefinition {
    pub name: String,
    pub fields: Vec<FieldDefinition>,
    pub steps: Vec<StepDefinition>,
}

impl SchemaDefinition {
    pub fn from_json(json: &str) -> Result<Self, DefinitionError> {
        serde_json::from_str(json).map_err(|e| DefinitionError::JsonParseError(e.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub id: String,
    #[serde(rename = "type")]
    pub value_type: ValueType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depends_on: Option<String>,
    /// Static options of a root field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    /// Allowed values keyed by the parent's answer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values_by_parent: Option<BTreeMap<String, AllowedDefinition>>,
    /// Allowed values for parent answers missing from `values_by_parent`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub otherwise: Option<AllowedDefinition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,
}

/// Either an option list or one of the keywords `"any"` and `"none"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AllowedDefinition {
    Options(Vec<String>),
    Keyword(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepDefinition {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub fields: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible_if: Option<Vec<RawCriterion>>,
}
