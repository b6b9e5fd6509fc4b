use crate::criteria::CriteriaSet;
use crate::model::Answers;
use std::fmt;
use std::sync::Arc;

pub type VisibilityFn = Arc<dyn Fn(&Answers) -> bool + Send + Sync>;

/// Decides whether a step is reachable given the answers so far.
#[derive(Clone, Default)]
pub enum Visibility {
    #[default]
    Always,
    /// Reachable when the criteria hold against the answers.
    When(CriteriaSet),
    Custom(VisibilityFn),
}

impl Visibility {
    pub fn holds(&self, answers: &Answers) -> bool {
        match self {
            Visibility::Always => true,
            Visibility::When(criteria) => criteria.evaluate(answers),
            Visibility::Custom(f) => f(answers),
        }
    }
}

impl fmt::Debug for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Visibility::Always => write!(f, "Always"),
            Visibility::When(criteria) => write!(f, "When({})", criteria),
            Visibility::Custom(_) => write!(f, "Custom(<fn>)"),
        }
    }
}

/// One page of a wizard: the fields it owns and when it is shown.
#[derive(Debug, Clone)]
pub struct Step {
    pub id: String,
    pub title: Option<String>,
    pub fields: Vec<String>,
    pub visible_if: Visibility,
}

impl Step {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: None,
            fields: Vec::new(),
            visible_if: Visibility::Always,
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn field(mut self, field_id: impl Into<String>) -> Self {
        self.fields.push(field_id.into());
        self
    }

    pub fn fields<I, S>(mut self, field_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields.extend(field_ids.into_iter().map(Into::into));
        self
    }

    pub fn visible_if(mut self, criteria: CriteriaSet) -> Self {
        self.visible_if = Visibility::When(criteria);
        self
    }

    pub fn visible_when(
        mut self,
        predicate: impl Fn(&Answers) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.visible_if = Visibility::Custom(Arc::new(predicate));
        self
    }

    pub fn owns(&self, field_id: &str) -> bool {
        self.fields.iter().any(|f| f == field_id)
    }
}
