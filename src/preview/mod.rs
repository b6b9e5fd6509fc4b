//! Deterministic previews of a configuration: an "agent output" and a "system prompt".
//!
//! Rendering never fails. Whenever a template cannot be filled, both texts fall back
//! to [`INSUFFICIENT_CONFIGURATION`].

use crate::model::Answers;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

mod registry;
mod template;

pub use registry::{Discriminator, PreviewPolicy, TemplateRegistry};
pub use template::{PreviewTemplate, RenderFn, TemplateText, TextTemplate};

pub const INSUFFICIENT_CONFIGURATION: &str = "Insufficient configuration to generate a preview.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preview {
    pub agent_output: String,
    pub system_prompt: String,
}

impl Preview {
    pub fn insufficient() -> Self {
        Self {
            agent_output: INSUFFICIENT_CONFIGURATION.to_string(),
            system_prompt: INSUFFICIENT_CONFIGURATION.to_string(),
        }
    }

    pub fn is_sufficient(&self) -> bool {
        self.agent_output != INSUFFICIENT_CONFIGURATION
            || self.system_prompt != INSUFFICIENT_CONFIGURATION
    }
}

/// Renders previews from a shared, read-only [`TemplateRegistry`].
#[derive(Debug, Clone)]
pub struct PreviewRenderer {
    registry: Arc<TemplateRegistry>,
}

impl PreviewRenderer {
    pub fn new(registry: Arc<TemplateRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &TemplateRegistry {
        &self.registry
    }

    /// Pure function of `(wizard, answers)`.
    pub fn render(&self, wizard: &str, answers: &Answers) -> Preview {
        self.registry.render(wizard, answers)
    }
}
