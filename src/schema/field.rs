use crate::criteria::CriteriaSet;
use crate::model::Value;
use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// The declared type of a field's answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    String,
    Number,
    Boolean,
    Enum,
    MultiEnum,
    Criteria,
}

impl ValueType {
    pub fn accepts(&self, value: &Value) -> bool {
        matches!(
            (self, value),
            (ValueType::String | ValueType::Enum, Value::Text(_))
                | (ValueType::Number, Value::Number(_))
                | (ValueType::Boolean, Value::Bool(_))
                | (ValueType::MultiEnum, Value::List(_))
                | (ValueType::Criteria, Value::Criteria(_))
        )
    }

    /// Reads a typed value from JSON. Numbers and booleans also accept their string forms.
    pub fn value_from_json(&self, json: &serde_json::Value) -> Option<Value> {
        match self {
            ValueType::String | ValueType::Enum => json.as_str().map(Value::from),
            ValueType::Number => json
                .as_f64()
                .or_else(|| json.as_str().and_then(|s| s.trim().parse().ok()))
                .map(Value::Number),
            ValueType::Boolean => json
                .as_bool()
                .or_else(|| json.as_str().and_then(|s| s.trim().parse().ok()))
                .map(Value::Bool),
            ValueType::MultiEnum => json
                .as_array()?
                .iter()
                .map(|item| item.as_str().map(str::to_string))
                .collect::<Option<Vec<_>>>()
                .map(Value::List),
            ValueType::Criteria => CriteriaSet::from_json(json).ok().map(Value::Criteria),
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueType::String => "string",
            ValueType::Number => "number",
            ValueType::Boolean => "boolean",
            ValueType::Enum => "enum",
            ValueType::MultiEnum => "multi_enum",
            ValueType::Criteria => "criteria",
        };
        write!(f, "{}", name)
    }
}

/// The values a field may take under the current answer of its parent.
#[derive(Debug, Clone, PartialEq)]
pub enum AllowedValues {
    /// Any value of the field's type.
    Any,
    /// A closed set of options, compared by their string form.
    OneOf(Vec<String>),
    /// The field does not apply: it is hidden, never required, and rejects answers.
    Inapplicable,
}

impl AllowedValues {
    pub fn one_of<I, S>(options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        AllowedValues::OneOf(options.into_iter().map(Into::into).collect())
    }

    pub fn is_applicable(&self) -> bool {
        !matches!(self, AllowedValues::Inapplicable)
    }

    /// Whether `value` is inside the allowed set. Every element of a list must be.
    pub fn permits(&self, value: &Value) -> bool {
        match self {
            AllowedValues::Any => true,
            AllowedValues::Inapplicable => false,
            AllowedValues::OneOf(options) => value
                .text_forms()
                .iter()
                .all(|form| options.iter().any(|o| o == form)),
        }
    }

    /// Merges the sets of several parent values (a multi-enum parent).
    fn union(self, other: AllowedValues) -> AllowedValues {
        match (self, other) {
            (AllowedValues::Any, _) | (_, AllowedValues::Any) => AllowedValues::Any,
            (AllowedValues::Inapplicable, x) | (x, AllowedValues::Inapplicable) => x,
            (AllowedValues::OneOf(mut a), AllowedValues::OneOf(b)) => {
                for option in b {
                    if !a.contains(&option) {
                        a.push(option);
                    }
                }
                AllowedValues::OneOf(a)
            }
        }
    }
}

pub type ProviderFn = Arc<dyn Fn(&Value) -> AllowedValues + Send + Sync>;

/// Maps the parent's answer to the values a field currently allows.
#[derive(Clone)]
pub enum ValueProvider {
    /// Independent of any parent value.
    Static(AllowedValues),
    /// A table from the parent's value (its string form) to allowed values.
    ByParent {
        table: AHashMap<String, AllowedValues>,
        fallback: AllowedValues,
    },
    Custom(ProviderFn),
}

impl ValueProvider {
    pub fn is_parent_keyed(&self) -> bool {
        !matches!(self, ValueProvider::Static(_))
    }

    /// Resolves the allowed set for a parent answer. `None` means the field has no parent.
    pub fn allowed_for(&self, parent: Option<&Value>) -> AllowedValues {
        match self {
            ValueProvider::Static(allowed) => allowed.clone(),
            ValueProvider::ByParent { table, fallback } => match parent {
                None => AllowedValues::Inapplicable,
                Some(value) => value
                    .text_forms()
                    .iter()
                    .filter_map(|key| table.get(key).cloned())
                    .reduce(AllowedValues::union)
                    .unwrap_or_else(|| fallback.clone()),
            },
            ValueProvider::Custom(f) => match parent {
                None => AllowedValues::Inapplicable,
                Some(value) => f(value),
            },
        }
    }
}

impl fmt::Debug for ValueProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueProvider::Static(allowed) => f.debug_tuple("Static").field(allowed).finish(),
            ValueProvider::ByParent { table, fallback } => f
                .debug_struct("ByParent")
                .field("table", table)
                .field("fallback", fallback)
                .finish(),
            ValueProvider::Custom(_) => write!(f, "Custom(<fn>)"),
        }
    }
}

/// Static description of one configurable setting.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub id: String,
    pub label: Option<String>,
    pub value_type: ValueType,
    pub depends_on: Option<String>,
    pub value_provider: ValueProvider,
    pub default: Option<Value>,
    pub required: bool,
}

impl FieldSpec {
    pub fn new(id: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            id: id.into(),
            label: None,
            value_type,
            depends_on: None,
            value_provider: ValueProvider::Static(AllowedValues::Any),
            default: None,
            required: false,
        }
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Restricts a field to a fixed option list.
    pub fn options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.value_provider = ValueProvider::Static(AllowedValues::one_of(options));
        self
    }

    /// Declares the parent field. The field is inapplicable while the parent is unanswered;
    /// once it is answered, the current provider decides.
    pub fn depends_on(mut self, parent: impl Into<String>) -> Self {
        self.depends_on = Some(parent.into());
        self
    }

    /// Adds a row to the parent-keyed table. The first row replaces a static provider, and
    /// parent values without a row make the field inapplicable unless
    /// [`FieldSpec::otherwise`] says otherwise.
    pub fn when(mut self, parent_value: impl Into<String>, allowed: AllowedValues) -> Self {
        match &mut self.value_provider {
            ValueProvider::ByParent { table, .. } => {
                table.insert(parent_value.into(), allowed);
            }
            other => {
                let mut table = AHashMap::new();
                table.insert(parent_value.into(), allowed);
                *other = ValueProvider::ByParent {
                    table,
                    fallback: AllowedValues::Inapplicable,
                };
            }
        }
        self
    }

    /// Sets what parent values without a table row allow.
    pub fn otherwise(mut self, allowed: AllowedValues) -> Self {
        match &mut self.value_provider {
            ValueProvider::ByParent { fallback, .. } => *fallback = allowed,
            other => {
                *other = ValueProvider::ByParent {
                    table: AHashMap::new(),
                    fallback: allowed,
                }
            }
        }
        self
    }

    pub fn provider(mut self, provider: ValueProvider) -> Self {
        self.value_provider = provider;
        self
    }

    /// Wraps the spec for sharing between schema variants.
    pub fn shared(self) -> Arc<FieldSpec> {
        Arc::new(self)
    }

    pub fn display_name(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.id)
    }
}
