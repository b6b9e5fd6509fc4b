//! Wizard service tests
//!
//! Step submission, previews, persistence of finished configurations and suspended sessions.
//!
mod common;
use common::*;
use serde_json::json;
use settei::error::StoreError;
use settei::session::{KeyValueStore, SessionSnapshot};
use settei::prelude::*;
use std::sync::Arc;

#[cfg(test)]
mod session_tests {
    use super::*;

    fn submit(
        service: &mut WizardService,
        id: SessionId,
        answers: serde_json::Value,
    ) -> StepResult {
        service
            .submit_step_json(id, &answers)
            .expect("session exists")
    }

    #[test]
    fn test_analyser_individual_end_to_end() {
        let mut service = create_service();
        let id = service.start_wizard(WizardType::Analyser).expect("starts");
        assert_eq!(
            service.current_step(id).expect("exists").map(|s| s.id.as_str()),
            Some("function")
        );

        let result = submit(&mut service, id, json!({ "function_type": "summary" }));
        assert!(result.ok);
        assert_eq!(result.next_step_id.as_deref(), Some("scope"));

        let result = submit(&mut service, id, json!({ "scope": "individual" }));
        assert_eq!(result.next_step_id.as_deref(), Some("target"));
        assert_eq!(service.required_fields(id).expect("exists"), vec!["module"]);

        let result = submit(
            &mut service,
            id,
            json!({ "record": "sales-001", "module": "sales" }),
        );
        assert_eq!(
            result,
            StepResult {
                ok: true,
                next_step_id: None,
                errors: Vec::new(),
            }
        );

        let preview = service.get_preview(id).expect("exists");
        assert_eq!(preview.agent_output, "Summarising the sales record 'sales-001'.");

        let config = service.finish_wizard(id).expect("finishes");
        let expected = json!({
            "function_type": "summary",
            "scope": "individual",
            "module": "sales",
            "record": "sales-001"
        });
        assert_eq!(config.to_json(), expected);
        assert_eq!(
            service.saved_config(WizardType::Analyser).expect("store reads"),
            Some(expected)
        );
        assert_eq!(service.active_sessions(), 0);
        assert!(matches!(
            service.state(id),
            Err(SessionError::UnknownSession(_))
        ));
    }

    #[test]
    fn test_missing_required_field_is_reported() {
        let mut service = create_service();
        let id = service.start_wizard(WizardType::Analyser).expect("starts");

        let result = submit(&mut service, id, json!({}));
        assert!(!result.ok);
        assert_eq!(
            result.errors,
            vec!["Required field 'function_type' has no valid answer".to_string()]
        );
        assert_eq!(service.state(id).expect("exists").current_step_index, 0);
    }

    #[test]
    fn test_partial_step_keeps_valid_answers() {
        let mut service = create_service();
        let id = service.start_wizard(WizardType::Analyser).expect("starts");
        submit(&mut service, id, json!({ "function_type": "analysis" }));
        submit(&mut service, id, json!({ "scope": "individual" }));

        let result = submit(&mut service, id, json!({ "module": "support" }));
        assert!(!result.ok);
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].contains("'record'"));
        assert_eq!(
            service.state(id).expect("exists").answer("module"),
            Some(&Value::from("support"))
        );
    }

    #[test]
    fn test_invalid_answer_rejects_the_whole_batch() {
        let mut service = create_service();
        let id = service.start_wizard(WizardType::Analyser).expect("starts");
        submit(&mut service, id, json!({ "function_type": "analysis" }));
        submit(&mut service, id, json!({ "scope": "individual" }));
        let before = service.state(id).expect("exists").clone();

        let result = submit(
            &mut service,
            id,
            json!({ "module": "sales", "record": "r-1", "module_list": ["sales"] }),
        );
        assert!(!result.ok);
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].contains("module_list"));
        assert_eq!(service.state(id).expect("exists"), &before);
    }

    #[test]
    fn test_json_answers_are_typed_by_schema() {
        let mut service = create_service();
        let id = service.start_wizard(WizardType::Forecast).expect("starts");
        submit(&mut service, id, json!({ "template_type": "revenue" }));

        let result = submit(
            &mut service,
            id,
            json!({ "horizon": "six", "segment": "region" }),
        );
        assert!(!result.ok);
        assert!(result.errors[0].contains("expected a number value"));

        let result = submit(
            &mut service,
            id,
            json!({ "horizon": 6, "segment": "region", "unknown": 1 }),
        );
        assert!(!result.ok);
        assert_eq!(
            result.errors,
            vec!["Field 'unknown' is not declared in the schema".to_string()]
        );

        let result = submit(&mut service, id, json!(["not", "an", "object"]));
        assert!(!result.ok);

        let result = submit(&mut service, id, json!({ "horizon": 6, "segment": "region" }));
        assert_eq!(result.next_step_id.as_deref(), Some("output"));
        assert_eq!(
            service.get_preview(id).expect("exists").agent_output,
            "Revenue forecast for the next 6 monthly periods, segmented by region."
        );
    }

    #[test]
    fn test_churn_retain_flow_with_criteria_answer() {
        let mut service = create_service();
        let id = service.start_wizard(WizardType::Churn).expect("starts");
        submit(&mut service, id, json!({ "objective": "retain" }));

        let result = submit(
            &mut service,
            id,
            json!({ "target_criteria": [
                { "field": "Total Spend", "operator": "greater_than", "value": "1000" }
            ] }),
        );
        assert_eq!(result.next_step_id.as_deref(), Some("offer"));

        let result = submit(&mut service, id, json!({ "offer": "loyalty_discount" }));
        assert!(!result.ok);
        assert!(result.errors[0].contains("'discount_percent'"));

        let result = submit(&mut service, id, json!({ "discount_percent": 15 }));
        assert_eq!(result.next_step_id.as_deref(), Some("escalation"));

        let result = submit(&mut service, id, json!({ "escalation_owner": "Dana" }));
        assert!(result.ok);
        assert_eq!(result.next_step_id, None);

        assert_eq!(
            service.get_preview(id).expect("exists").agent_output,
            "Customers matching Total Spend greater than 1000 are at risk. Recommended action: loyalty_discount, escalated to Dana."
        );

        let config = service.finish_wizard(id).expect("finishes");
        assert_eq!(
            config.to_json()["target_criteria"],
            json!([{ "field": "Total Spend", "operator": "greater_than", "value": "1000" }])
        );
    }

    #[test]
    fn test_churn_win_back_skips_escalation() {
        let mut service = create_service();
        let id = service.start_wizard(WizardType::Churn).expect("starts");
        submit(&mut service, id, json!({ "objective": "win_back" }));
        submit(
            &mut service,
            id,
            json!({ "target_criteria": [{ "field": "Status", "operator": "equals", "value": "churned" }] }),
        );

        // A retain-only offer is not allowed here.
        let result = submit(&mut service, id, json!({ "offer": "loyalty_discount" }));
        assert!(!result.ok);

        let result = submit(&mut service, id, json!({ "offer": "free_month" }));
        assert!(result.ok);
        assert_eq!(result.next_step_id, None);
        assert!(service.finish_wizard(id).is_ok());
    }

    #[test]
    fn test_finish_before_last_step_keeps_session_open() {
        let mut service = create_service();
        let id = service.start_wizard(WizardType::Sdr).expect("starts");

        let err = service.finish_wizard(id).unwrap_err();
        assert!(matches!(
            err,
            SessionError::Wizard(WizardError::StepsRemaining { .. })
        ));
        assert_eq!(service.active_sessions(), 1);
        assert_eq!(service.saved_config(WizardType::Sdr).expect("store reads"), None);
    }

    #[test]
    fn test_retreat_returns_previous_step() {
        let mut service = create_service();
        let id = service.start_wizard(WizardType::Sdr).expect("starts");
        submit(
            &mut service,
            id,
            json!({ "company_name": "Acme", "product": "Widgets" }),
        );
        assert_eq!(service.retreat(id).expect("moves back"), "company");
        assert!(matches!(
            service.retreat(id),
            Err(SessionError::Wizard(WizardError::NoReachableStep { .. }))
        ));
    }

    #[test]
    fn test_sdr_preview_follows_channel() {
        let mut service = create_service();
        let id = service.start_wizard(WizardType::Sdr).expect("starts");
        assert!(!service.get_preview(id).expect("exists").is_sufficient());

        submit(
            &mut service,
            id,
            json!({ "company_name": "Acme", "product": "Widgets" }),
        );
        let email = service.get_preview(id).expect("exists");
        assert!(email.agent_output.starts_with("Subject: Widgets for Acme"));
        assert!(email.system_prompt.contains("professional"));

        let result = submit(
            &mut service,
            id,
            json!({ "outreach_channel": "phone", "tone": "casual" }),
        );
        assert!(result.ok);
        let phone = service.get_preview(id).expect("exists");
        assert!(phone.agent_output.starts_with("Opening:"));
        assert!(phone.system_prompt.contains("casual cold-call scripts"));
    }

    #[test]
    fn test_sdr_second_layout_asks_channel_first() {
        let mut service = create_service();
        let id = service
            .start_wizard_variant(WizardType::Sdr, "layout2")
            .expect("starts");
        assert_eq!(
            service.current_step(id).expect("exists").map(|s| s.id.as_str()),
            Some("channel")
        );
        assert_eq!(service.schema(id).expect("exists").name(), "sdr/layout2");

        assert!(matches!(
            service.start_wizard_variant(WizardType::Sdr, "layout9"),
            Err(SessionError::UnknownVariant { .. })
        ));
    }

    #[test]
    fn test_rfp_flags_pick_highest_priority_output() {
        let mut service = create_service();
        let id = service.start_wizard(WizardType::Rfp).expect("starts");
        submit(
            &mut service,
            id,
            json!({ "trigger_criteria": [{ "field": "Subject", "operator": "contains", "value": "RFP" }] }),
        );
        submit(&mut service, id, json!({ "response_style": "formal" }));
        assert!(
            service
                .get_preview(id)
                .expect("exists")
                .agent_output
                .starts_with("Thank you")
        );

        submit(
            &mut service,
            id,
            json!({ "produce_summary": true, "produce_presentation": true }),
        );
        assert!(
            service
                .get_preview(id)
                .expect("exists")
                .agent_output
                .starts_with("Slide 1")
        );

        let result = submit(&mut service, id, json!({ "requires_approval": true }));
        assert!(!result.ok);
        assert!(result.errors[0].contains("'approver'"));
        let result = submit(&mut service, id, json!({ "approver": "Dana" }));
        assert!(result.ok);

        let config = service.finish_wizard(id).expect("finishes");
        assert_eq!(config.get("approver"), Some(&Value::from("Dana")));
        assert_eq!(config.get("produce_report"), Some(&Value::from(false)));
    }

    #[test]
    fn test_unregistered_wizard_and_unknown_session() {
        let mut service = create_service();
        assert!(matches!(
            service.start_wizard(WizardType::EmailParser),
            Err(SessionError::UnknownWizard(name)) if name == "email_parser"
        ));

        let ghost = SessionId::new();
        assert!(matches!(
            service.submit_step(ghost, Answers::new()),
            Err(SessionError::UnknownSession(_))
        ));
        assert!(matches!(
            service.finish_wizard(ghost),
            Err(SessionError::UnknownSession(_))
        ));
    }

    #[test]
    fn test_abandon_closes_session() {
        let mut service = create_service();
        let id = service.start_wizard(WizardType::Enrichment).expect("starts");
        service.abandon_wizard(id).expect("abandons");

        assert_eq!(service.active_sessions(), 0);
        assert!(service.get_preview(id).is_err());
        assert_eq!(
            service.saved_config(WizardType::Enrichment).expect("store reads"),
            None
        );
    }

    #[test]
    fn test_session_id_parsing() {
        let id = SessionId::new();
        assert_eq!(id.to_string().parse::<SessionId>().expect("round trips"), id);
        assert!(matches!(
            "not-a-session".parse::<SessionId>(),
            Err(SessionError::UnknownSession(_))
        ));
        assert_ne!(SessionId::new(), SessionId::new());
    }

    #[test]
    fn test_snapshot_resume_from_bytes() {
        let mut service = create_service();
        let id = service.start_wizard(WizardType::Enrichment).expect("starts");
        submit(
            &mut service,
            id,
            json!({
                "source_module": "contacts",
                "record_filter": [{ "field": "Job Title", "operator": "is_empty" }]
            }),
        );

        let snapshot = service.snapshot(id).expect("exists");
        let bytes = snapshot.to_bytes().expect("encodes");
        let decoded = SessionSnapshot::from_bytes(&bytes).expect("decodes");
        assert_eq!(decoded, snapshot);

        let resumed = service.resume(decoded).expect("resumes");
        assert_ne!(resumed, id);
        assert_eq!(
            service.current_step(resumed).expect("exists").map(|s| s.id.as_str()),
            Some("fields")
        );

        let result = submit(
            &mut service,
            resumed,
            json!({ "enrich_fields": ["job_title", "phone"] }),
        );
        assert!(result.ok);
        assert_eq!(
            service.get_preview(resumed).expect("exists").agent_output,
            "Enriching job_title, phone on contacts records."
        );
    }

    #[test]
    fn test_snapshot_file_round_trip() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("session.bin");
        let path = path.to_str().expect("utf-8 path");

        let mut service = create_service();
        let id = service.start_wizard(WizardType::Sdr).expect("starts");
        submit(
            &mut service,
            id,
            json!({ "company_name": "Acme", "product": "Widgets" }),
        );
        service.snapshot(id).expect("exists").save(path).expect("saves");

        let mut fresh = create_service();
        let resumed = fresh
            .resume(SessionSnapshot::from_file(path).expect("loads"))
            .expect("resumes");
        assert_eq!(
            fresh.state(resumed).expect("exists").answer("company_name"),
            Some(&Value::from("Acme"))
        );

        assert!(matches!(
            SessionSnapshot::from_file("/definitely/not/here.bin"),
            Err(StoreError::Io { .. })
        ));
        assert!(matches!(
            SessionSnapshot::from_bytes(&[0xff, 0x00]),
            Err(StoreError::Decode(_))
        ));
    }

    #[test]
    fn test_resume_rejects_snapshots_that_do_not_fit() {
        let mut service = create_service();
        let id = service.start_wizard(WizardType::Sdr).expect("starts");
        submit(
            &mut service,
            id,
            json!({ "company_name": "Acme", "product": "Widgets" }),
        );
        let snapshot = service.snapshot(id).expect("exists");

        let mut out_of_range = snapshot.clone();
        out_of_range.state.current_step_index = 7;
        assert!(matches!(
            service.resume(out_of_range),
            Err(SessionError::Wizard(WizardError::CorruptState { .. }))
        ));

        let mut finished = snapshot.clone();
        finished.state.status = WizardStatus::Completed;
        assert!(matches!(
            service.resume(finished),
            Err(SessionError::Wizard(WizardError::InvalidState { operation: "resume", .. }))
        ));

        let mut bad_answer = snapshot.clone();
        bad_answer
            .state
            .answers
            .insert("outreach_channel".to_string(), Value::from("carrier pigeon"));
        assert!(matches!(
            service.resume(bad_answer),
            Err(SessionError::Wizard(WizardError::Resolve(_)))
        ));

        let resumed = service.resume(snapshot).expect("untouched snapshot resumes");
        assert!(service.retreat(resumed).is_ok());
    }

    #[derive(Default)]
    struct RecordingStore {
        saved: Vec<(String, serde_json::Value)>,
    }

    impl KeyValueStore for RecordingStore {
        fn save(&mut self, key: &str, value: serde_json::Value) -> std::result::Result<(), StoreError> {
            self.saved.push((key.to_string(), value));
            Ok(())
        }

        fn load(&self, key: &str) -> std::result::Result<Option<serde_json::Value>, StoreError> {
            Ok(self
                .saved
                .iter()
                .rev()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.clone()))
        }
    }

    #[test]
    fn test_custom_store_receives_finished_config() {
        let catalog = settei::catalog::builtin().expect("valid catalog");
        let mut service = WizardService::new(Arc::new(catalog), RecordingStore::default());
        let id = service.start_wizard(WizardType::Enrichment).expect("starts");
        service
            .submit_step_json(id, &json!({ "source_module": "leads" }))
            .expect("exists");
        service
            .submit_step_json(id, &json!({ "enrich_fields": ["industry"] }))
            .expect("exists");
        service.finish_wizard(id).expect("finishes");

        let saved = &service.store().saved;
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].0, "enrichment.config");
        assert_eq!(
            saved[0].1,
            json!({
                "source_module": "leads",
                "enrich_fields": ["industry"],
                "overwrite_existing": false
            })
        );
    }
}
