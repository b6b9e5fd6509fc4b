//! Record selection by `(field, operator, value)` criteria.
//!
//! A [`CriteriaSet`] is an ordered list of [`Criterion`] combined with AND. Evaluation is a
//! total function: a missing field, a failed number or date coercion, or a type that an
//! operator cannot inspect all make the criterion false instead of raising an error.
//!
//! ```rust
//! use settei::criteria::{CriteriaSet, Criterion, Record};
//! use settei::model::Value;
//!
//! let criteria = CriteriaSet::new(vec![
//!     Criterion::new("Total Spend", "greater_than", "1000").unwrap(),
//! ]);
//!
//! let mut record = Record::new();
//! record.insert("Total Spend".to_string(), Value::Number(1500.0));
//! assert!(criteria.evaluate(&record));
//! ```

use crate::error::ValidationError;
use crate::model::Value;
use ahash::AHashMap;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

mod coerce;
mod explain;
mod operator;

pub use explain::{CriterionOutcome, Explanation};
pub use operator::Operator;

/// A record to select on, keyed by field name. Wizard answers have the same shape.
pub type Record = AHashMap<String, Value>;

/// The serialized form of a criterion, with the operator still unparsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawCriterion {
    pub field: String,
    pub operator: String,
    #[serde(default)]
    pub value: String,
}

/// A single `(field, operator, value)` test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCriterion", into = "RawCriterion")]
pub struct Criterion {
    pub field: String,
    pub operator: Operator,
    pub value: String,
}

impl Criterion {
    /// Builds a criterion, parsing the operator from its wire name.
    pub fn new(
        field: impl Into<String>,
        operator: &str,
        value: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        Self::with_operator(field, operator.parse()?, value)
    }

    pub fn with_operator(
        field: impl Into<String>,
        operator: Operator,
        value: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let field = field.into();
        if field.trim().is_empty() {
            return Err(ValidationError::EmptyCriterionField);
        }
        Ok(Self {
            field,
            operator,
            value: value.into(),
        })
    }

    /// Tests this criterion against a record. Never fails.
    pub fn evaluate(&self, record: &Record) -> bool {
        let Some(actual) = record.get(&self.field) else {
            return self.operator == Operator::IsEmpty;
        };

        let literal = self.value.as_str();
        match self.operator {
            Operator::IsEmpty => actual.is_empty(),
            Operator::IsNotEmpty => !actual.is_empty(),
            Operator::GreaterThan => {
                coerce::compare_numbers(actual, literal) == Some(Ordering::Greater)
            }
            Operator::LessThan => coerce::compare_numbers(actual, literal) == Some(Ordering::Less),
            Operator::After => coerce::compare_dates(actual, literal) == Some(Ordering::Greater),
            Operator::Before => coerce::compare_dates(actual, literal) == Some(Ordering::Less),
            Operator::Equals => any_form(actual, |s| text_equals(s, literal)),
            Operator::NotEquals => !any_form(actual, |s| text_equals(s, literal)),
            Operator::Contains => any_form(actual, |s| lower(s).contains(&lower(literal))),
            Operator::NotContains => !any_form(actual, |s| lower(s).contains(&lower(literal))),
            Operator::StartsWith => any_form(actual, |s| lower(s).starts_with(&lower(literal))),
            Operator::EndsWith => any_form(actual, |s| lower(s).ends_with(&lower(literal))),
        }
    }
}

fn lower(s: &str) -> String {
    s.to_lowercase()
}

fn any_form(actual: &Value, test: impl Fn(&str) -> bool) -> bool {
    actual.text_forms().iter().any(|s| test(s))
}

/// Numeric sides compare as numbers, everything else as case-insensitive text.
fn text_equals(actual: &str, literal: &str) -> bool {
    match (coerce::parse_number(actual), coerce::parse_number(literal)) {
        (Some(a), Some(b)) => a == b,
        _ => actual.trim().to_lowercase() == literal.trim().to_lowercase(),
    }
}

impl TryFrom<RawCriterion> for Criterion {
    type Error = ValidationError;

    fn try_from(raw: RawCriterion) -> Result<Self, Self::Error> {
        Criterion::new(raw.field, &raw.operator, raw.value)
    }
}

impl From<Criterion> for RawCriterion {
    fn from(c: Criterion) -> Self {
        RawCriterion {
            field: c.field,
            operator: c.operator.as_str().to_string(),
            value: c.value,
        }
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.operator.is_unary() {
            write!(f, "{} {}", self.field, self.operator)
        } else {
            write!(f, "{} {} {}", self.field, self.operator, self.value)
        }
    }
}

/// An ordered, AND-combined list of criteria. Empty sets match every record.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CriteriaSet {
    criteria: Vec<Criterion>,
}

impl CriteriaSet {
    pub fn new(criteria: Vec<Criterion>) -> Self {
        Self { criteria }
    }

    /// Validates raw criteria, rejecting the whole set on the first malformed entry.
    pub fn parse(raw: Vec<RawCriterion>) -> Result<Self, ValidationError> {
        raw.into_iter()
            .map(Criterion::try_from)
            .collect::<Result<Vec<_>, _>>()
            .map(Self::new)
    }

    /// Parses a JSON `Criterion[]` array.
    pub fn from_json(json: &serde_json::Value) -> Result<Self, ValidationError> {
        let raw: Vec<RawCriterion> = serde_json::from_value(json.clone())
            .map_err(|e| ValidationError::MalformedCriteria(e.to_string()))?;
        Self::parse(raw)
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Array(
            self.criteria
                .iter()
                .map(|c| {
                    serde_json::json!({
                        "field": c.field,
                        "operator": c.operator.as_str(),
                        "value": c.value,
                    })
                })
                .collect(),
        )
    }

    pub fn push(&mut self, criterion: Criterion) {
        self.criteria.push(criterion);
    }

    pub fn is_empty(&self) -> bool {
        self.criteria.is_empty()
    }

    pub fn len(&self) -> usize {
        self.criteria.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Criterion> {
        self.criteria.iter()
    }

    /// The distinct fields these criteria read, in first-use order.
    pub fn fields(&self) -> Vec<&str> {
        self.criteria
            .iter()
            .map(|c| c.field.as_str())
            .unique()
            .collect()
    }

    /// True iff every criterion holds. An empty set matches everything.
    pub fn evaluate(&self, record: &Record) -> bool {
        self.criteria.iter().all(|c| c.evaluate(record))
    }

    /// Returns the matching records, preserving their order.
    pub fn filter<'r>(&self, records: &'r [Record]) -> Vec<&'r Record> {
        records.iter().filter(|r| self.evaluate(r)).collect()
    }

    /// Evaluates every criterion and records what it observed.
    pub fn explain<'a>(&'a self, record: &'a Record) -> Explanation<'a> {
        Explanation::new(
            self.criteria
                .iter()
                .map(|criterion| CriterionOutcome {
                    criterion,
                    observed: record.get(&criterion.field),
                    matched: criterion.evaluate(record),
                })
                .collect(),
        )
    }
}

impl fmt::Display for CriteriaSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.criteria.is_empty() {
            write!(f, "all records")
        } else {
            write!(f, "{}", self.criteria.iter().join(" AND "))
        }
    }
}

impl FromIterator<Criterion> for CriteriaSet {
    fn from_iter<I: IntoIterator<Item = Criterion>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Evaluates `criteria` against `record`; see [`CriteriaSet::evaluate`].
pub fn evaluate(criteria: &CriteriaSet, record: &Record) -> bool {
    criteria.evaluate(record)
}

/// Converts a JSON object into a record. `null` and nested objects are left out, so
/// they read as missing fields.
pub fn record_from_json(json: &serde_json::Value) -> Option<Record> {
    let object = json.as_object()?;
    Some(
        object
            .iter()
            .filter_map(|(key, value)| Value::from_json(value).map(|v| (key.clone(), v)))
            .collect(),
    )
}
