use super::Criterion;
use crate::model::Value;
use std::fmt;

/// What a single criterion saw and decided.
#[derive(Debug, Clone)]
pub struct CriterionOutcome<'a> {
    pub criterion: &'a Criterion,
    pub observed: Option<&'a Value>,
    pub matched: bool,
}

/// A record of how a criteria set was evaluated against one record.
#[derive(Debug, Clone)]
pub struct Explanation<'a> {
    pub outcomes: Vec<CriterionOutcome<'a>>,
    pub matched: bool,
}

impl<'a> Explanation<'a> {
    pub(super) fn new(outcomes: Vec<CriterionOutcome<'a>>) -> Self {
        let matched = outcomes.iter().all(|o| o.matched);
        Self { outcomes, matched }
    }

    /// A human-readable reason for the result.
    ///
    /// A match lists every criterion; a miss shows only the first failing one, since
    /// that is the criterion which decided the AND.
    pub fn reason(&self) -> String {
        if self.outcomes.is_empty() {
            return "no criteria (matches every record)".to_string();
        }
        if self.matched {
            self.outcomes
                .iter()
                .map(Self::format_outcome)
                .collect::<Vec<_>>()
                .join(" AND ")
        } else {
            self.outcomes
                .iter()
                .find(|o| !o.matched)
                .map(|o| format!("failed: {}", Self::format_outcome(o)))
                .unwrap_or_default()
        }
    }

    fn format_outcome(outcome: &CriterionOutcome<'_>) -> String {
        let criterion = outcome.criterion;
        let observed = match outcome.observed {
            Some(value) => format!("was {}", value),
            None => "missing".to_string(),
        };
        if criterion.operator.is_unary() {
            format!("{} ({}) {}", criterion.field, observed, criterion.operator)
        } else {
            format!(
                "{} ({}) {} {}",
                criterion.field, observed, criterion.operator, criterion.value
            )
        }
    }
}

impl fmt::Display for Explanation<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.reason())
    }
}
