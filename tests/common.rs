//! Common test utilities for building schemas, answers and records.
use settei::prelude::*;
use std::sync::Arc;

/// Field `B` depends on `A` and is only valid while `A == "x"`.
///
/// Steps: `first` owns `A`, `second` owns `B`.
#[allow(dead_code)]
pub fn create_cascade_schema() -> ConfigSchema {
    ConfigSchema::builder("cascade")
        .field(
            FieldSpec::new("A", ValueType::Enum)
                .options(["x", "y"])
                .required(),
        )
        .field(
            FieldSpec::new("B", ValueType::Enum)
                .depends_on("A")
                .when("x", AllowedValues::one_of(["b1", "b2"]))
                .required(),
        )
        .step(Step::new("first").field("A"))
        .step(Step::new("second").field("B"))
        .build()
        .expect("cascade schema is valid")
}

/// The two-step individual/bulk analysis schema.
///
/// Step 1 owns `scope`. Step 2 owns `moduleList` (required under `bulk`) and
/// `module` + `record` (required under `individual`).
#[allow(dead_code)]
pub fn create_scope_schema() -> ConfigSchema {
    ConfigSchema::builder("scope")
        .field(
            FieldSpec::new("scope", ValueType::Enum)
                .options(["individual", "bulk"])
                .required(),
        )
        .field(
            FieldSpec::new("moduleList", ValueType::MultiEnum)
                .depends_on("scope")
                .when("bulk", AllowedValues::one_of(["sales", "support", "marketing"]))
                .required(),
        )
        .field(
            FieldSpec::new("module", ValueType::Enum)
                .depends_on("scope")
                .when("individual", AllowedValues::one_of(["sales", "support", "marketing"]))
                .required(),
        )
        .field(
            FieldSpec::new("record", ValueType::String)
                .depends_on("module")
                .otherwise(AllowedValues::Any)
                .required(),
        )
        .step(Step::new("step1").title("Scope").field("scope"))
        .step(
            Step::new("step2")
                .title("Target")
                .fields(["moduleList", "module", "record"]),
        )
        .build()
        .expect("scope schema is valid")
}

/// Three steps where the middle one is only shown for `mode == "advanced"`.
#[allow(dead_code)]
pub fn create_branching_schema() -> ConfigSchema {
    ConfigSchema::builder("branching")
        .field(
            FieldSpec::new("mode", ValueType::Enum)
                .options(["basic", "advanced"])
                .required(),
        )
        .field(FieldSpec::new("detail", ValueType::String).required())
        .field(FieldSpec::new("notes", ValueType::String))
        .step(Step::new("mode").field("mode"))
        .step(
            Step::new("advanced")
                .field("detail")
                .visible_if(create_criteria(&[("mode", "equals", "advanced")])),
        )
        .step(Step::new("summary").field("notes"))
        .build()
        .expect("branching schema is valid")
}

#[allow(dead_code)]
pub fn create_wizard(schema: ConfigSchema) -> WizardStateMachine {
    WizardStateMachine::new(Arc::new(schema))
}

#[allow(dead_code)]
pub fn create_started_wizard(schema: ConfigSchema) -> WizardStateMachine {
    let mut wizard = create_wizard(schema);
    wizard.start().expect("wizard starts");
    wizard
}

/// Builds a criteria set from `(field, operator, value)` triples.
#[allow(dead_code)]
pub fn create_criteria(triples: &[(&str, &str, &str)]) -> CriteriaSet {
    triples
        .iter()
        .map(|(field, op, value)| Criterion::new(*field, op, *value).expect("valid criterion"))
        .collect()
}

#[allow(dead_code)]
pub fn create_record(pairs: Vec<(&str, Value)>) -> Record {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}

#[allow(dead_code)]
pub fn create_answers(pairs: Vec<(&str, Value)>) -> Answers {
    create_record(pairs)
}

/// Customer records for targeting tests.
#[allow(dead_code)]
pub fn create_customer_records() -> Vec<Record> {
    vec![
        create_record(vec![
            ("Name", Value::from("Acme Corp")),
            ("Total Spend", Value::from(1500.0)),
            ("Region", Value::from("EMEA")),
            ("Last Order", Value::from("2024-03-15")),
            ("Tags", Value::from(vec!["enterprise", "priority"])),
        ]),
        create_record(vec![
            ("Name", Value::from("Globex")),
            ("Total Spend", Value::from(500.0)),
            ("Region", Value::from("APAC")),
            ("Last Order", Value::from("2023-11-02")),
            ("Tags", Value::from(Vec::<String>::new())),
        ]),
        create_record(vec![
            ("Name", Value::from("Initech")),
            ("Total Spend", Value::from("2500")),
            ("Region", Value::from("emea")),
            ("Last Order", Value::from("not a date")),
        ]),
    ]
}

#[allow(dead_code)]
pub fn create_service() -> WizardService {
    let catalog = settei::catalog::builtin().expect("built-in catalog is valid");
    WizardService::in_memory(Arc::new(catalog))
}
