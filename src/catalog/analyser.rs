use super::{WizardDefinition, WizardType};
use crate::error::ValidationError;
use crate::model::{Answers, Value};
use crate::preview::{Discriminator, PreviewPolicy, PreviewTemplate, TemplateRegistry};
use crate::schema::{AllowedValues, ConfigSchema, FieldSpec, Step, ValueType};

const WIZARD: &str = "analyser";
const MODULES: [&str; 4] = ["sales", "support", "marketing", "finance"];

/// Function, then scope. An individual analysis targets one record of one module; a bulk
/// analysis targets several modules, optionally filtered.
pub(super) fn definition() -> Result<WizardDefinition, ValidationError> {
    let schema = ConfigSchema::builder("analyser")
        .field(
            FieldSpec::new("function_type", ValueType::Enum)
                .label("Function")
                .options(["analysis", "summary", "anomaly_detection"])
                .required(),
        )
        .field(
            FieldSpec::new("scope", ValueType::Enum)
                .label("Scope")
                .options(["individual", "bulk"])
                .required(),
        )
        .field(
            FieldSpec::new("module", ValueType::Enum)
                .label("Module")
                .depends_on("scope")
                .when("individual", AllowedValues::one_of(MODULES))
                .required(),
        )
        .field(
            FieldSpec::new("record", ValueType::String)
                .label("Record")
                .depends_on("module")
                .otherwise(AllowedValues::Any)
                .required(),
        )
        .field(
            FieldSpec::new("module_list", ValueType::MultiEnum)
                .label("Modules")
                .depends_on("scope")
                .when("bulk", AllowedValues::one_of(MODULES))
                .required(),
        )
        .field(
            FieldSpec::new("record_filter", ValueType::Criteria)
                .label("Record filter")
                .depends_on("scope")
                .when("bulk", AllowedValues::Any),
        )
        .step(
            Step::new("function")
                .title("Function")
                .field("function_type"),
        )
        .step(Step::new("scope").title("Scope").field("scope"))
        .step(
            Step::new("target")
                .title("Target")
                .fields(["module", "record", "module_list", "record_filter"]),
        )
        .build()?;

    Ok(WizardDefinition::new(WizardType::Analyser, "default", schema))
}

fn text<'a>(answers: &'a Answers, field: &str) -> Option<&'a str> {
    answers
        .get(field)
        .and_then(Value::as_text)
        .filter(|s| !s.trim().is_empty())
}

/// What the analysis reads, phrased for both texts.
fn target(answers: &Answers) -> Option<String> {
    match text(answers, "scope")? {
        "individual" => Some(format!(
            "the {} record '{}'",
            text(answers, "module")?,
            text(answers, "record")?
        )),
        "bulk" => {
            let modules = answers.get("module_list").filter(|v| !v.is_empty())?;
            let filter = match answers.get("record_filter") {
                Some(Value::Criteria(criteria)) if !criteria.is_empty() => {
                    format!(" where {}", criteria)
                }
                _ => String::new(),
            };
            Some(format!("all {} records{}", modules, filter))
        }
        _ => None,
    }
}

fn template(verb: &'static str, role: &'static str) -> PreviewTemplate {
    PreviewTemplate::custom(
        move |answers| Some(format!("{} {}.", verb, target(answers)?)),
        move |answers| {
            Some(format!(
                "You are {}. Work only with {} and report your findings clearly.",
                role,
                target(answers)?
            ))
        },
    )
}

pub(super) fn templates(registry: TemplateRegistry) -> TemplateRegistry {
    registry
        .with_policy(
            WIZARD,
            PreviewPolicy::new(Discriminator::field("function_type"), "analysis"),
        )
        .with_template(
            WIZARD,
            "analysis",
            template("Analysing trends and drivers in", "a data analyst"),
        )
        .with_template(
            WIZARD,
            "summary",
            template("Summarising", "an analyst who writes concise summaries"),
        )
        .with_template(
            WIZARD,
            "anomaly_detection",
            template("Scanning for anomalies in", "an anomaly detection analyst"),
        )
}
