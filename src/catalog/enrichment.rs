use super::{WizardDefinition, WizardType};
use crate::error::ValidationError;
use crate::preview::{PreviewTemplate, TemplateRegistry};
use crate::schema::{AllowedValues, ConfigSchema, FieldSpec, Step, ValueType};

const WIZARD: &str = "enrichment";

pub(super) fn definition() -> Result<WizardDefinition, ValidationError> {
    let schema = ConfigSchema::builder("enrichment")
        .field(
            FieldSpec::new("source_module", ValueType::Enum)
                .label("Module")
                .options(["contacts", "accounts", "leads"])
                .required(),
        )
        .field(
            FieldSpec::new("record_filter", ValueType::Criteria)
                .label("Records to enrich (empty for all)"),
        )
        .field(
            FieldSpec::new("enrich_fields", ValueType::MultiEnum)
                .label("Fields to enrich")
                .depends_on("source_module")
                .when(
                    "contacts",
                    AllowedValues::one_of(["job_title", "phone", "linkedin_url"]),
                )
                .when(
                    "accounts",
                    AllowedValues::one_of(["industry", "employee_count", "annual_revenue"]),
                )
                .when(
                    "leads",
                    AllowedValues::one_of(["company_size", "job_title", "industry"]),
                )
                .required(),
        )
        .field(
            FieldSpec::new("overwrite_existing", ValueType::Boolean)
                .label("Overwrite existing values")
                .default_value(false),
        )
        .step(
            Step::new("source")
                .title("Source")
                .fields(["source_module", "record_filter"]),
        )
        .step(
            Step::new("fields")
                .title("Fields")
                .fields(["enrich_fields", "overwrite_existing"]),
        )
        .build()?;

    Ok(WizardDefinition::new(WizardType::Enrichment, "default", schema))
}

pub(super) fn templates(registry: TemplateRegistry) -> Result<TemplateRegistry, ValidationError> {
    Ok(registry.with_template(
        WIZARD,
        "default",
        PreviewTemplate::text(
            "enrichment/default",
            "Enriching {{enrich_fields}} on {{source_module}} records.",
            "You are a data enrichment agent. For each {{source_module}} record in scope, look up and fill in {{enrich_fields}}.",
        )?,
    ))
}
