use super::Preview;
use crate::error::ValidationError;
use crate::model::Answers;
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
enum Segment {
    Literal(String),
    Field(String),
}

/// Text with `{{field_id}}` placeholders, parsed once at registration.
#[derive(Debug, Clone, PartialEq)]
pub struct TextTemplate {
    segments: Vec<Segment>,
}

impl TextTemplate {
    /// Parses `source`. `name` only labels errors.
    pub fn parse(name: &str, source: &str) -> Result<Self, ValidationError> {
        let malformed = |message: String| ValidationError::MalformedTemplate {
            template: name.to_string(),
            message,
        };

        let mut segments = Vec::new();
        let mut rest = source;
        while let Some(open) = rest.find("{{") {
            if open > 0 {
                segments.push(Segment::Literal(rest[..open].to_string()));
            }
            let after = &rest[open + 2..];
            let offset = source.len() - rest.len() + open;
            let close = after
                .find("}}")
                .ok_or_else(|| malformed(format!("unclosed placeholder at byte {}", offset)))?;
            let field = after[..close].trim();
            if field.is_empty() {
                return Err(malformed("empty placeholder".to_string()));
            }
            if field.contains("{{") {
                return Err(malformed(format!("nested placeholder in '{}'", field)));
            }
            segments.push(Segment::Field(field.to_string()));
            rest = &after[close + 2..];
        }
        if !rest.is_empty() {
            segments.push(Segment::Literal(rest.to_string()));
        }
        Ok(Self { segments })
    }

    /// Field ids read by the template, in order of appearance.
    pub fn placeholders(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Field(id) => Some(id.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// Substitutes every placeholder. `None` if any of them is unanswered or empty.
    pub fn render(&self, answers: &Answers) -> Option<String> {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Field(id) => {
                    let value = answers.get(id).filter(|v| !v.is_empty())?;
                    out.push_str(&value.to_string());
                }
            }
        }
        Some(out)
    }
}

pub type RenderFn = Arc<dyn Fn(&Answers) -> Option<String> + Send + Sync>;

/// One of the two texts of a preview.
#[derive(Clone)]
pub enum TemplateText {
    Text(TextTemplate),
    /// A pure function of the answers; `None` means insufficient configuration.
    Custom(RenderFn),
}

impl TemplateText {
    pub fn render(&self, answers: &Answers) -> Option<String> {
        match self {
            TemplateText::Text(template) => template.render(answers),
            TemplateText::Custom(f) => f(answers),
        }
    }

    fn placeholders(&self) -> Vec<&str> {
        match self {
            TemplateText::Text(template) => template.placeholders().collect(),
            TemplateText::Custom(_) => Vec::new(),
        }
    }
}

impl fmt::Debug for TemplateText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateText::Text(template) => f.debug_tuple("Text").field(template).finish(),
            TemplateText::Custom(_) => write!(f, "Custom(<fn>)"),
        }
    }
}

/// The pair of texts rendered for one discriminator value.
#[derive(Debug, Clone)]
pub struct PreviewTemplate {
    pub agent_output: TemplateText,
    pub system_prompt: TemplateText,
}

impl PreviewTemplate {
    pub fn text(
        name: &str,
        agent_output: &str,
        system_prompt: &str,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            agent_output: TemplateText::Text(TextTemplate::parse(name, agent_output)?),
            system_prompt: TemplateText::Text(TextTemplate::parse(name, system_prompt)?),
        })
    }

    pub fn custom<A, S>(agent_output: A, system_prompt: S) -> Self
    where
        A: Fn(&Answers) -> Option<String> + Send + Sync + 'static,
        S: Fn(&Answers) -> Option<String> + Send + Sync + 'static,
    {
        Self {
            agent_output: TemplateText::Custom(Arc::new(agent_output)),
            system_prompt: TemplateText::Custom(Arc::new(system_prompt)),
        }
    }

    /// Both texts, or [`Preview::insufficient`] if either cannot be produced.
    pub fn render(&self, answers: &Answers) -> Preview {
        match (
            self.agent_output.render(answers),
            self.system_prompt.render(answers),
        ) {
            (Some(agent_output), Some(system_prompt)) => Preview {
                agent_output,
                system_prompt,
            },
            _ => Preview::insufficient(),
        }
    }

    pub fn placeholders(&self) -> Vec<&str> {
        let mut ids = self.agent_output.placeholders();
        ids.extend(self.system_prompt.placeholders());
        ids
    }
}
