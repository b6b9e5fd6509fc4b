//! Built-in catalog tests
//!
//! Every registered wizard must build, agree with its templates and render a preview.
//!
mod common;
use common::*;
use settei::catalog::WizardDefinition;
use settei::prelude::*;

#[cfg(test)]
mod catalog_tests {
    use super::*;

    fn builtin() -> Catalog {
        settei::catalog::builtin().expect("built-in catalog is valid")
    }

    #[test]
    fn test_builtin_registers_six_wizards() {
        let catalog = builtin();
        assert_eq!(
            catalog.wizards(),
            vec![
                WizardType::Sdr,
                WizardType::Churn,
                WizardType::Analyser,
                WizardType::Forecast,
                WizardType::Rfp,
                WizardType::Enrichment,
            ]
        );
        for wizard in [
            WizardType::EmailParser,
            WizardType::RecordGeneration,
            WizardType::VocTracker,
            WizardType::Acquisition,
        ] {
            assert!(!catalog.contains(wizard), "{} should not be registered", wizard);
        }
        assert!(catalog.check_templates().is_ok());
    }

    #[test]
    fn test_sdr_has_two_layouts_over_shared_fields() {
        let catalog = builtin();
        let sdr = catalog.definition(WizardType::Sdr).expect("registered");
        assert_eq!(sdr.variant_names().collect::<Vec<_>>(), vec!["layout1", "layout2"]);
        assert_eq!(sdr.default_variant().0, "layout1");

        let layout1 = sdr.variant("layout1").expect("exists");
        let layout2 = sdr.variant("layout2").expect("exists");
        assert_eq!(layout1.steps()[0].id, "company");
        assert_eq!(layout2.steps()[0].id, "channel");
        assert!(std::ptr::eq(
            layout1.field("tone").expect("declared"),
            layout2.field("tone").expect("declared")
        ));
    }

    #[test]
    fn test_schema_lookup() {
        let catalog = builtin();
        let (variant, schema) = catalog.schema(WizardType::Churn, None).expect("registered");
        assert_eq!(variant, "default");
        assert_eq!(schema.name(), "churn");

        assert!(matches!(
            catalog.schema(WizardType::Sdr, Some("layout3")),
            Err(SessionError::UnknownVariant { ref variant, .. }) if variant == "layout3"
        ));
        assert!(matches!(
            catalog.schema(WizardType::VocTracker, None),
            Err(SessionError::UnknownWizard(_))
        ));
    }

    #[test]
    fn test_wizard_type_names() {
        assert_eq!(WizardType::ALL.len(), 10);
        assert_eq!("sdr".parse::<WizardType>().expect("known"), WizardType::Sdr);
        assert_eq!(
            "Email-Parser".parse::<WizardType>().expect("known"),
            WizardType::EmailParser
        );
        assert_eq!(
            "voc tracker".parse::<WizardType>().expect("known"),
            WizardType::VocTracker
        );
        assert!(matches!(
            "fax_bot".parse::<WizardType>(),
            Err(SessionError::UnknownWizard(name)) if name == "fax_bot"
        ));
        for wizard in WizardType::ALL {
            assert_eq!(wizard.to_string().parse::<WizardType>().expect("known"), wizard);
        }
        assert_eq!(
            serde_json::to_value(WizardType::RecordGeneration).expect("serializes"),
            serde_json::json!("record_generation")
        );
    }

    #[test]
    fn test_analyser_bulk_preview_includes_filter() {
        let catalog = builtin();
        let answers = create_answers(vec![
            ("function_type", "anomaly_detection".into()),
            ("scope", "bulk".into()),
            ("module_list", vec!["sales", "finance"].into()),
            (
                "record_filter",
                create_criteria(&[("Amount", "greater_than", "10000")]).into(),
            ),
        ]);
        let preview = catalog.renderer().render("analyser", &answers);
        assert_eq!(
            preview.agent_output,
            "Scanning for anomalies in all sales, finance records where Amount greater than 10000."
        );
        assert!(preview.system_prompt.starts_with("You are an anomaly detection analyst."));
    }

    #[test]
    fn test_every_wizard_starts_insufficient() {
        let catalog = builtin();
        let renderer = catalog.renderer();
        for wizard in catalog.wizards() {
            let (_, schema) = catalog.schema(wizard, None).expect("registered");
            let mut machine = create_wizard((*schema).clone());
            machine.start().expect("starts");
            let preview = renderer.render(wizard.as_str(), machine.answers());
            assert!(!preview.is_sufficient(), "{} rendered from defaults alone", wizard);
        }
    }

    #[test]
    fn test_forecast_defaults_are_seeded() {
        let catalog = builtin();
        let (_, schema) = catalog.schema(WizardType::Forecast, None).expect("registered");
        let defaults = DependencyResolver::new(&schema).defaults();
        assert_eq!(defaults.get("period"), Some(&Value::from("monthly")));
        assert_eq!(defaults.get("horizon"), Some(&Value::from(3.0)));
        assert_eq!(defaults.get("include_confidence"), Some(&Value::from(true)));
        assert!(defaults.get("segment").is_none());
    }

    #[test]
    fn test_custom_catalog_checks_templates() {
        let schema = ConfigSchema::builder("voc")
            .field(FieldSpec::new("channel", ValueType::String).required())
            .step(Step::new("only").field("channel"))
            .build()
            .expect("valid schema");
        let templates = TemplateRegistry::new().with_template(
            "voc_tracker",
            "default",
            PreviewTemplate::text("voc", "Tracking {{chanel}}", "Prompt").expect("valid"),
        );
        let catalog = Catalog::new(templates)
            .with_definition(WizardDefinition::new(WizardType::VocTracker, "default", schema));

        assert!(catalog.contains(WizardType::VocTracker));
        assert!(matches!(
            catalog.check_templates(),
            Err(ValidationError::UnknownPlaceholder { ref field, .. }) if field == "chanel"
        ));
    }
}
