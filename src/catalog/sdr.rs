use super::{WizardDefinition, WizardType};
use crate::error::ValidationError;
use crate::preview::{Discriminator, PreviewPolicy, PreviewTemplate, TemplateRegistry};
use crate::schema::{ConfigSchema, FieldSpec, Step, ValueType};

const WIZARD: &str = "sdr";

/// Two layouts over the same fields: company first, or channel first.
pub(super) fn definition() -> Result<WizardDefinition, ValidationError> {
    let company_name = FieldSpec::new("company_name", ValueType::String)
        .label("Company name")
        .required()
        .shared();
    let product = FieldSpec::new("product", ValueType::String)
        .label("Product or service")
        .required()
        .shared();
    let tone = FieldSpec::new("tone", ValueType::Enum)
        .label("Tone")
        .options(["professional", "friendly", "casual"])
        .default_value("professional")
        .shared();
    let outreach_channel = FieldSpec::new("outreach_channel", ValueType::Enum)
        .label("Outreach channel")
        .options(["email", "linkedin", "phone"])
        .required()
        .shared();

    let layout1 = ConfigSchema::builder("sdr/layout1")
        .fields([
            company_name.clone(),
            product.clone(),
            tone.clone(),
            outreach_channel.clone(),
        ])
        .step(
            Step::new("company")
                .title("Company")
                .fields(["company_name", "product"]),
        )
        .step(
            Step::new("outreach")
                .title("Outreach")
                .fields(["outreach_channel", "tone"]),
        )
        .build()?;

    let layout2 = ConfigSchema::builder("sdr/layout2")
        .fields([outreach_channel, tone, company_name, product])
        .step(
            Step::new("channel")
                .title("Channel")
                .fields(["outreach_channel", "tone"]),
        )
        .step(
            Step::new("pitch")
                .title("Pitch")
                .fields(["company_name", "product"]),
        )
        .build()?;

    Ok(WizardDefinition::new(WizardType::Sdr, "layout1", layout1)
        .with_variant("layout2", layout2))
}

pub(super) fn templates(registry: TemplateRegistry) -> Result<TemplateRegistry, ValidationError> {
    Ok(registry
        .with_policy(
            WIZARD,
            PreviewPolicy::new(Discriminator::field("outreach_channel"), "email"),
        )
        .with_template(
            WIZARD,
            "email",
            PreviewTemplate::text(
                "sdr/email",
                "Subject: {{product}} for {{company_name}}\n\nHi there, I wanted to share how {{product}} helps teams like yours at {{company_name}}.",
                "You are a sales development representative for {{company_name}}. Write {{tone}} outreach emails that introduce {{product}} and ask for a short meeting.",
            )?,
        )
        .with_template(
            WIZARD,
            "linkedin",
            PreviewTemplate::text(
                "sdr/linkedin",
                "Hi! I saw your work and thought {{product}} from {{company_name}} could be a fit. Open to connecting?",
                "You are a sales development representative for {{company_name}}. Write {{tone}} LinkedIn messages under 300 characters that introduce {{product}}.",
            )?,
        )
        .with_template(
            WIZARD,
            "phone",
            PreviewTemplate::text(
                "sdr/phone",
                "Opening: Hello, this is a quick call from {{company_name}} about {{product}}. Do you have two minutes?",
                "You are a sales development representative for {{company_name}}. Write {{tone}} cold-call scripts that qualify interest in {{product}}.",
            )?,
        ))
}
