use super::{WizardDefinition, WizardType};
use crate::criteria::{CriteriaSet, Criterion};
use crate::error::ValidationError;
use crate::preview::{Discriminator, PreviewPolicy, PreviewTemplate, TemplateRegistry};
use crate::schema::{AllowedValues, ConfigSchema, FieldSpec, Step, ValueType};

const WIZARD: &str = "churn";

pub(super) fn definition() -> Result<WizardDefinition, ValidationError> {
    let schema = ConfigSchema::builder("churn")
        .field(
            FieldSpec::new("objective", ValueType::Enum)
                .label("Objective")
                .options(["retain", "win_back"])
                .required(),
        )
        .field(
            FieldSpec::new("target_criteria", ValueType::Criteria)
                .label("Customers to target")
                .required(),
        )
        .field(
            FieldSpec::new("offer", ValueType::Enum)
                .label("Offer")
                .depends_on("objective")
                .when(
                    "retain",
                    AllowedValues::one_of(["loyalty_discount", "priority_support", "account_review"]),
                )
                .when(
                    "win_back",
                    AllowedValues::one_of(["discount", "free_month", "feature_preview"]),
                )
                .required(),
        )
        .field(
            FieldSpec::new("discount_percent", ValueType::Number)
                .label("Discount (%)")
                .depends_on("offer")
                .when("discount", AllowedValues::Any)
                .when("loyalty_discount", AllowedValues::Any)
                .required(),
        )
        .field(
            FieldSpec::new("escalation_owner", ValueType::String)
                .label("Account owner to escalate to")
                .required(),
        )
        .step(
            Step::new("objective")
                .title("Objective")
                .field("objective"),
        )
        .step(
            Step::new("audience")
                .title("Audience")
                .field("target_criteria"),
        )
        .step(
            Step::new("offer")
                .title("Offer")
                .fields(["offer", "discount_percent"]),
        )
        .step(
            Step::new("escalation")
                .title("Escalation")
                .field("escalation_owner")
                .visible_if(CriteriaSet::new(vec![Criterion::new(
                    "objective",
                    "equals",
                    "retain",
                )?])),
        )
        .build()?;

    Ok(WizardDefinition::new(WizardType::Churn, "default", schema))
}

pub(super) fn templates(registry: TemplateRegistry) -> Result<TemplateRegistry, ValidationError> {
    Ok(registry
        .with_policy(
            WIZARD,
            PreviewPolicy::new(Discriminator::field("objective"), "retain"),
        )
        .with_template(
            WIZARD,
            "retain",
            PreviewTemplate::text(
                "churn/retain",
                "Customers matching {{target_criteria}} are at risk. Recommended action: {{offer}}, escalated to {{escalation_owner}}.",
                "You are a customer retention agent. Monitor customers where {{target_criteria}} and propose {{offer}} before they churn.",
            )?,
        )
        .with_template(
            WIZARD,
            "win_back",
            PreviewTemplate::text(
                "churn/win_back",
                "Former customers matching {{target_criteria}} will receive a {{offer}} win-back offer.",
                "You are a win-back agent. Re-engage former customers where {{target_criteria}} with a {{offer}} offer.",
            )?,
        ))
}
