use super::{WizardDefinition, WizardType};
use crate::error::ValidationError;
use crate::preview::{Discriminator, PreviewPolicy, PreviewTemplate, TemplateRegistry};
use crate::schema::{AllowedValues, ConfigSchema, FieldSpec, Step, ValueType};

const WIZARD: &str = "forecast";

pub(super) fn definition() -> Result<WizardDefinition, ValidationError> {
    let schema = ConfigSchema::builder("forecast")
        .field(
            FieldSpec::new("template_type", ValueType::Enum)
                .label("Forecast template")
                .options(["revenue", "pipeline", "churn_risk"])
                .required(),
        )
        .field(
            FieldSpec::new("period", ValueType::Enum)
                .label("Period")
                .options(["monthly", "quarterly"])
                .default_value("monthly")
                .required(),
        )
        .field(
            FieldSpec::new("horizon", ValueType::Number)
                .label("Periods ahead")
                .default_value(3.0)
                .required(),
        )
        .field(
            FieldSpec::new("segment", ValueType::Enum)
                .label("Segment by")
                .depends_on("template_type")
                .when("revenue", AllowedValues::one_of(["region", "product_line"]))
                .when("pipeline", AllowedValues::one_of(["stage", "owner"]))
                .required(),
        )
        .field(
            FieldSpec::new("include_confidence", ValueType::Boolean)
                .label("Include confidence intervals")
                .default_value(true),
        )
        .step(
            Step::new("template")
                .title("Template")
                .field("template_type"),
        )
        .step(
            Step::new("parameters")
                .title("Parameters")
                .fields(["period", "horizon", "segment"]),
        )
        .step(
            Step::new("output")
                .title("Output")
                .field("include_confidence"),
        )
        .build()?;

    Ok(WizardDefinition::new(WizardType::Forecast, "default", schema))
}

pub(super) fn templates(registry: TemplateRegistry) -> Result<TemplateRegistry, ValidationError> {
    Ok(registry
        .with_policy(
            WIZARD,
            PreviewPolicy::new(Discriminator::field("template_type"), "revenue"),
        )
        .with_template(
            WIZARD,
            "revenue",
            PreviewTemplate::text(
                "forecast/revenue",
                "Revenue forecast for the next {{horizon}} {{period}} periods, segmented by {{segment}}.",
                "You are a revenue forecasting agent. Project {{period}} revenue {{horizon}} periods ahead, broken down by {{segment}}.",
            )?,
        )
        .with_template(
            WIZARD,
            "pipeline",
            PreviewTemplate::text(
                "forecast/pipeline",
                "Pipeline forecast for the next {{horizon}} {{period}} periods, grouped by {{segment}}.",
                "You are a pipeline forecasting agent. Estimate {{period}} pipeline conversion {{horizon}} periods ahead, grouped by {{segment}}.",
            )?,
        )
        .with_template(
            WIZARD,
            "churn_risk",
            PreviewTemplate::text(
                "forecast/churn_risk",
                "Churn risk forecast for the next {{horizon}} {{period}} periods.",
                "You are a churn risk forecasting agent. Score each account's {{period}} churn risk {{horizon}} periods ahead.",
            )?,
        ))
}
