//! The wizard family and the built-in schemas and preview templates.

use crate::error::{SessionError, ValidationError};
use crate::preview::{PreviewRenderer, TemplateRegistry};
use crate::schema::ConfigSchema;
use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

mod analyser;
mod churn;
mod enrichment;
mod forecast;
mod rfp;
mod sdr;

/// The agent configuration wizards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardType {
    Sdr,
    Churn,
    Analyser,
    Forecast,
    Rfp,
    EmailParser,
    RecordGeneration,
    VocTracker,
    Enrichment,
    Acquisition,
}

impl WizardType {
    pub const ALL: [WizardType; 10] = [
        WizardType::Sdr,
        WizardType::Churn,
        WizardType::Analyser,
        WizardType::Forecast,
        WizardType::Rfp,
        WizardType::EmailParser,
        WizardType::RecordGeneration,
        WizardType::VocTracker,
        WizardType::Enrichment,
        WizardType::Acquisition,
    ];

    /// The key used for templates and persisted configurations.
    pub fn as_str(&self) -> &'static str {
        match self {
            WizardType::Sdr => "sdr",
            WizardType::Churn => "churn",
            WizardType::Analyser => "analyser",
            WizardType::Forecast => "forecast",
            WizardType::Rfp => "rfp",
            WizardType::EmailParser => "email_parser",
            WizardType::RecordGeneration => "record_generation",
            WizardType::VocTracker => "voc_tracker",
            WizardType::Enrichment => "enrichment",
            WizardType::Acquisition => "acquisition",
        }
    }
}

impl fmt::Display for WizardType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for WizardType {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase().replace(['-', ' '], "_");
        WizardType::ALL
            .into_iter()
            .find(|w| w.as_str() == key)
            .ok_or_else(|| SessionError::UnknownWizard(s.to_string()))
    }
}

/// The schema variants of one wizard. The first variant is the default.
#[derive(Debug, Clone)]
pub struct WizardDefinition {
    wizard: WizardType,
    variants: Vec<(String, Arc<ConfigSchema>)>,
}

impl WizardDefinition {
    pub fn new(wizard: WizardType, variant: impl Into<String>, schema: ConfigSchema) -> Self {
        Self {
            wizard,
            variants: vec![(variant.into(), Arc::new(schema))],
        }
    }

    pub fn with_variant(mut self, variant: impl Into<String>, schema: ConfigSchema) -> Self {
        self.variants.push((variant.into(), Arc::new(schema)));
        self
    }

    pub fn wizard(&self) -> WizardType {
        self.wizard
    }

    pub fn default_variant(&self) -> (&str, &Arc<ConfigSchema>) {
        let (name, schema) = &self.variants[0];
        (name, schema)
    }

    pub fn variant(&self, name: &str) -> Option<&Arc<ConfigSchema>> {
        self.variants
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, schema)| schema)
    }

    pub fn variant_names(&self) -> impl Iterator<Item = &str> {
        self.variants.iter().map(|(n, _)| n.as_str())
    }

    pub fn variants(&self) -> impl Iterator<Item = (&str, &Arc<ConfigSchema>)> {
        self.variants.iter().map(|(n, s)| (n.as_str(), s))
    }
}

/// Registered wizard definitions plus the shared preview templates.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    definitions: AHashMap<WizardType, WizardDefinition>,
    templates: Arc<TemplateRegistry>,
}

impl Catalog {
    pub fn new(templates: TemplateRegistry) -> Self {
        Self {
            definitions: AHashMap::new(),
            templates: Arc::new(templates),
        }
    }

    pub fn with_definition(mut self, definition: WizardDefinition) -> Self {
        self.definitions.insert(definition.wizard, definition);
        self
    }

    pub fn definition(&self, wizard: WizardType) -> Option<&WizardDefinition> {
        self.definitions.get(&wizard)
    }

    pub fn contains(&self, wizard: WizardType) -> bool {
        self.definitions.contains_key(&wizard)
    }

    /// Registered wizards in declaration order.
    pub fn wizards(&self) -> Vec<WizardType> {
        WizardType::ALL
            .into_iter()
            .filter(|w| self.definitions.contains_key(w))
            .collect()
    }

    pub fn templates(&self) -> &TemplateRegistry {
        &self.templates
    }

    pub fn renderer(&self) -> PreviewRenderer {
        PreviewRenderer::new(Arc::clone(&self.templates))
    }

    /// The schema of a variant, or the default variant when `variant` is `None`.
    pub fn schema(
        &self,
        wizard: WizardType,
        variant: Option<&str>,
    ) -> Result<(String, Arc<ConfigSchema>), SessionError> {
        let definition = self
            .definition(wizard)
            .ok_or_else(|| SessionError::UnknownWizard(wizard.to_string()))?;
        match variant {
            None => {
                let (name, schema) = definition.default_variant();
                Ok((name.to_string(), Arc::clone(schema)))
            }
            Some(name) => definition
                .variant(name)
                .map(|schema| (name.to_string(), Arc::clone(schema)))
                .ok_or_else(|| SessionError::UnknownVariant {
                    wizard: wizard.to_string(),
                    variant: name.to_string(),
                }),
        }
    }

    /// Checks every registered template against every variant of its wizard.
    pub fn check_templates(&self) -> Result<(), ValidationError> {
        for definition in self.definitions.values() {
            for (_, schema) in definition.variants() {
                self.templates
                    .check_against(definition.wizard.as_str(), schema)?;
            }
        }
        Ok(())
    }
}

/// The catalog of built-in wizards: SDR (two layouts), Churn, Analyser, Forecast, RFP
/// and Enrichment.
pub fn builtin() -> Result<Catalog, ValidationError> {
    let mut templates = TemplateRegistry::new();
    templates = sdr::templates(templates)?;
    templates = churn::templates(templates)?;
    templates = analyser::templates(templates);
    templates = forecast::templates(templates)?;
    templates = rfp::templates(templates)?;
    templates = enrichment::templates(templates)?;

    let catalog = Catalog::new(templates)
        .with_definition(sdr::definition()?)
        .with_definition(churn::definition()?)
        .with_definition(analyser::definition()?)
        .with_definition(forecast::definition()?)
        .with_definition(rfp::definition()?)
        .with_definition(enrichment::definition()?);
    catalog.check_templates()?;

    tracing::debug!(wizards = catalog.definitions.len(), "built-in catalog loaded");
    Ok(catalog)
}
