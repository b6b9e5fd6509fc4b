use super::{WizardDefinition, WizardType};
use crate::error::ValidationError;
use crate::preview::{Discriminator, PreviewPolicy, PreviewTemplate, TemplateRegistry};
use crate::schema::{AllowedValues, ConfigSchema, FieldSpec, Step, ValueType};

const WIZARD: &str = "rfp";

pub(super) fn definition() -> Result<WizardDefinition, ValidationError> {
    let schema = ConfigSchema::builder("rfp")
        .field(
            FieldSpec::new("trigger_criteria", ValueType::Criteria)
                .label("Emails that trigger a response")
                .required(),
        )
        .field(
            FieldSpec::new("response_style", ValueType::Enum)
                .label("Response style")
                .options(["formal", "concise", "technical"])
                .required(),
        )
        .field(
            FieldSpec::new("produce_report", ValueType::Boolean)
                .label("Produce a report")
                .default_value(false),
        )
        .field(
            FieldSpec::new("produce_presentation", ValueType::Boolean)
                .label("Produce a presentation")
                .default_value(false),
        )
        .field(
            FieldSpec::new("produce_summary", ValueType::Boolean)
                .label("Produce an executive summary")
                .default_value(false),
        )
        .field(
            FieldSpec::new("requires_approval", ValueType::Boolean)
                .label("Require approval before sending")
                .default_value(false),
        )
        .field(
            FieldSpec::new("approver", ValueType::String)
                .label("Approver")
                .depends_on("requires_approval")
                .when("true", AllowedValues::Any)
                .required(),
        )
        .step(
            Step::new("trigger")
                .title("Trigger")
                .field("trigger_criteria"),
        )
        .step(
            Step::new("response")
                .title("Response")
                .field("response_style"),
        )
        .step(Step::new("outputs").title("Outputs").fields([
            "produce_report",
            "produce_presentation",
            "produce_summary",
        ]))
        .step(
            Step::new("approval")
                .title("Approval")
                .fields(["requires_approval", "approver"]),
        )
        .build()?;

    Ok(WizardDefinition::new(WizardType::Rfp, "default", schema))
}

/// Several output flags may be set at once; the report outranks the presentation, which
/// outranks the summary.
pub(super) fn templates(registry: TemplateRegistry) -> Result<TemplateRegistry, ValidationError> {
    Ok(registry
        .with_policy(
            WIZARD,
            PreviewPolicy::new(
                Discriminator::flags([
                    ("produce_report", "report"),
                    ("produce_presentation", "presentation"),
                    ("produce_summary", "summary"),
                ]),
                "reply",
            ),
        )
        .with_template(
            WIZARD,
            "reply",
            PreviewTemplate::text(
                "rfp/reply",
                "Thank you for your request. Please find our {{response_style}} response attached.",
                "You are an RFP response agent. When an email matches {{trigger_criteria}}, draft a {{response_style}} reply.",
            )?,
        )
        .with_template(
            WIZARD,
            "report",
            PreviewTemplate::text(
                "rfp/report",
                "RFP Response Report\n1. Requirements\n2. Proposed solution\n3. Pricing\n(written in a {{response_style}} style)",
                "You are an RFP response agent. When an email matches {{trigger_criteria}}, produce a full {{response_style}} response report.",
            )?,
        )
        .with_template(
            WIZARD,
            "presentation",
            PreviewTemplate::text(
                "rfp/presentation",
                "Slide 1: Understanding your needs\nSlide 2: Our solution\nSlide 3: Next steps\n(written in a {{response_style}} style)",
                "You are an RFP response agent. When an email matches {{trigger_criteria}}, build a {{response_style}} slide deck answering the request.",
            )?,
        )
        .with_template(
            WIZARD,
            "summary",
            PreviewTemplate::text(
                "rfp/summary",
                "Executive summary: we meet the key requirements of this request. ({{response_style}})",
                "You are an RFP response agent. When an email matches {{trigger_criteria}}, write a one-page {{response_style}} executive summary.",
            )?,
        ))
}
