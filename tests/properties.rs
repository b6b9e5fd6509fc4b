//! Property tests
//!
//! Invariants that must hold for any sequence of answers or any record.
//!
mod common;
use common::*;
use proptest::prelude::*;
use settei::prelude::*;

const SCOPES: [&str; 3] = ["individual", "bulk", "team"];
const MODULES: [&str; 4] = ["sales", "support", "marketing", "hr"];

fn answer_strategy() -> impl Strategy<Value = (String, Value)> {
    prop_oneof![
        prop::sample::select(SCOPES.to_vec()).prop_map(|s| ("scope".to_string(), Value::from(s))),
        prop::sample::select(MODULES.to_vec()).prop_map(|m| ("module".to_string(), Value::from(m))),
        prop::sample::subsequence(MODULES.to_vec(), 0..=MODULES.len())
            .prop_map(|ms| ("moduleList".to_string(), Value::from(ms))),
        "[a-z0-9-]{1,8}".prop_map(|r| ("record".to_string(), Value::from(r))),
    ]
}

fn operator_strategy() -> impl Strategy<Value = Operator> {
    prop::sample::select(Operator::ALL.to_vec())
}

fn record_strategy() -> impl Strategy<Value = Record> {
    prop::collection::vec(
        (
            prop::sample::select(vec!["Name", "Total Spend", "Region"]),
            prop_oneof![
                "[A-Za-z ]{0,6}".prop_map(Value::from),
                (-5000.0f64..5000.0).prop_map(Value::from),
                any::<bool>().prop_map(Value::from),
            ],
        ),
        0..4,
    )
    .prop_map(|pairs| pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect())
}

proptest! {
    /// Whatever is answered, and in whatever order, no stored answer is outside the set
    /// its parent currently allows.
    #[test]
    fn prop_answers_stay_consistent(answers in prop::collection::vec(answer_strategy(), 0..20)) {
        let schema = create_scope_schema();
        let resolver = DependencyResolver::new(&schema);
        let mut state = ConfigState::new();

        for (field, value) in answers {
            let before = state.clone();
            if resolver.apply(&mut state, &field, value).is_err() {
                prop_assert_eq!(&state, &before);
            }
            for (id, answer) in &state.answers {
                prop_assert!(resolver.validate(&state.answers, id, answer).is_ok());
            }
        }
    }

    /// Applying the same answer twice changes nothing the second time.
    #[test]
    fn prop_reapplying_is_idempotent(
        answers in prop::collection::vec(answer_strategy(), 0..10),
        last in answer_strategy(),
    ) {
        let schema = create_scope_schema();
        let resolver = DependencyResolver::new(&schema);
        let mut state = ConfigState::new();
        for (field, value) in answers {
            let _ = resolver.apply(&mut state, &field, value);
        }

        let (field, value) = last;
        if let Ok(once) = resolver.apply_answer(&state, &field, value.clone()) {
            let twice = resolver.apply_answer(&once, &field, value).expect("still valid");
            prop_assert_eq!(once, twice);
        }
    }

    /// Evaluation is a pure function of the criteria and the record.
    #[test]
    fn prop_criteria_evaluation_is_deterministic(
        record in record_strategy(),
        operator in operator_strategy(),
        literal in "[A-Za-z0-9 ]{0,6}",
    ) {
        let criterion = Criterion::with_operator("Total Spend", operator, literal.as_str())
            .expect("field is named");
        let criteria = CriteriaSet::new(vec![criterion]);
        prop_assert_eq!(criteria.evaluate(&record), criteria.evaluate(&record));
        prop_assert_eq!(criteria.explain(&record).matched, criteria.evaluate(&record));
        prop_assert!(CriteriaSet::default().evaluate(&record));
    }

    /// A missing field fails every operator except `is_empty`.
    #[test]
    fn prop_missing_field_fails_closed(operator in operator_strategy(), literal in "[a-z0-9]{0,5}") {
        let criterion = Criterion::with_operator("absent", operator, literal.as_str())
            .expect("field is named");
        prop_assert_eq!(criterion.evaluate(&Record::new()), operator == Operator::IsEmpty);
    }

    /// Filtering keeps exactly the matching records, in their original order.
    #[test]
    fn prop_filter_matches_evaluate(records in prop::collection::vec(record_strategy(), 0..8)) {
        let criteria = create_criteria(&[("Total Spend", "greater_than", "0")]);
        let expected: Vec<&Record> = records.iter().filter(|r| criteria.evaluate(r)).collect();
        prop_assert_eq!(criteria.filter(&records), expected);
    }
}
