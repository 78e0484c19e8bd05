// Dispatch tests for casemap
//
// Handler selection, exhaustiveness, and failure reporting for runtime sums

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use casemap_core::data::Value;
use casemap_core::dispatch::{CaseMap, ExtraCasePolicy};
use casemap_core::error::{BuildError, DispatchError};
use casemap_core::schema::{SumSchema, ValueSchema, VariantSchema};
use common::*;
use proptest::prelude::*;

fn option() -> SumSchema {
    SumSchema::option(ValueSchema::Int)
}

/// Handlers that record which case ran and echo the payload back
fn recording_map(
    schema: &SumSchema,
    calls: &Arc<Mutex<Vec<String>>>,
) -> CaseMap<'static, (String, Value)> {
    let mut builder = CaseMap::builder(schema.clone());
    for name in schema.names() {
        let name = name.to_string();
        let calls = Arc::clone(calls);
        builder = builder.case(name.clone(), move |payload: &Value| {
            calls.lock().unwrap().push(name.clone());
            (name.clone(), payload.clone())
        });
    }
    builder.build().unwrap()
}

#[test]
fn test_present_and_absent_select_their_handlers() {
    let schema = option();
    let cases = CaseMap::builder(schema.clone())
        .case("absent", |_| None)
        .case("present", |x: &Value| Some(x.take_int().unwrap()))
        .build()
        .unwrap();

    let present = schema.construct("present", Value::Int(5)).unwrap();
    let absent = schema.constructor("absent").unwrap().unit().unwrap();

    assert_eq!(cases.dispatch(&present), Ok(Some(5)));
    assert_eq!(cases.dispatch(&absent), Ok(None));
}

#[test]
fn test_is_present_mapping() {
    let schema = option();
    let is_present = CaseMap::builder(schema.clone())
        .case("absent", |_| false)
        .case("present", |_| true)
        .build()
        .unwrap();

    let present = schema.construct("present", Value::Int(5)).unwrap();
    let absent = schema.construct("absent", Value::Unit).unwrap();

    assert_eq!(is_present.dispatch(&present), Ok(true));
    assert_eq!(is_present.dispatch(&absent), Ok(false));
}

#[test]
fn test_missing_case_is_rejected_at_build() {
    let result = CaseMap::builder(option())
        .case("present", |x: &Value| x.clone())
        .build();

    assert_eq!(
        result.unwrap_err(),
        BuildError::MissingCases {
            sum: "option".to_string(),
            cases: vec!["absent".to_string()],
        }
    );
}

#[test]
fn test_missing_case_fails_identifiably_at_dispatch() {
    let schema = option();
    let cases = CaseMap::builder(schema.clone())
        .case("present", |x: &Value| x.clone())
        .build_partial()
        .unwrap();

    let absent = schema.construct("absent", Value::Unit).unwrap();
    assert_eq!(
        cases.dispatch(&absent),
        Err(DispatchError::MissingCase {
            sum: "option".to_string(),
            case: "absent".to_string(),
            tag: 0,
        })
    );

    let present = schema.construct("present", Value::Int(5)).unwrap();
    assert_eq!(cases.dispatch(&present), Ok(Value::Int(5)));
}

#[test]
fn test_unknown_case_rejected_by_default() {
    let result = CaseMap::builder(option())
        .case("absent", |_| 0)
        .case("present", |_| 1)
        .case("presnet", |_| 2)
        .build();

    assert_eq!(
        result.unwrap_err(),
        BuildError::UnknownCase {
            sum: "option".to_string(),
            case: "presnet".to_string(),
        }
    );
}

#[test]
fn test_unknown_case_ignored_on_request() {
    let cases = CaseMap::builder(option())
        .extra_cases(ExtraCasePolicy::Ignore)
        .case("absent", |_| 0)
        .case("present", |_| 1)
        .case("presnet", |_| 2)
        .build()
        .unwrap();

    assert!(cases.is_exhaustive());
    assert_eq!(cases.dispatch(&Value::variant(1, Value::Int(9))), Ok(1));
}

#[test]
fn test_ignored_unknown_case_does_not_cover_missing_case() {
    let result = CaseMap::builder(option())
        .extra_cases(ExtraCasePolicy::Ignore)
        .case("absent", |_| 0)
        .case("presnet", |_| 2)
        .build();

    assert!(matches!(
        result,
        Err(BuildError::MissingCases { ref cases, .. }) if cases == &["present".to_string()]
    ));
}

#[test]
fn test_unknown_tag_is_reported() {
    let cases = CaseMap::builder(option())
        .case("absent", |_| 0)
        .case("present", |_| 1)
        .build()
        .unwrap();

    assert_eq!(
        cases.dispatch(&Value::variant(42, Value::Unit)),
        Err(DispatchError::UnknownTag {
            sum: "option".to_string(),
            tag: 42,
        })
    );
}

#[test]
fn test_handler_errors_pass_through_unchanged() {
    let cases = CaseMap::builder(option())
        .case("absent", |_| Err("nothing here".to_string()))
        .case("present", |x: &Value| x.take_int().map_err(|e| e.to_string()))
        .build()
        .unwrap();

    assert_eq!(
        cases.dispatch(&Value::variant(0, Value::Unit)),
        Ok(Err("nothing here".to_string()))
    );
    assert_eq!(cases.dispatch(&Value::variant(1, Value::Int(3))), Ok(Ok(3)));
}

#[test]
#[should_panic(expected = "handler panicked")]
fn test_handler_panic_is_not_caught() {
    let cases = CaseMap::builder(option())
        .case("absent", |_| panic!("handler panicked"))
        .case("present", |_| ())
        .build()
        .unwrap();

    let _ = cases.dispatch(&Value::variant(0, Value::Unit));
}

#[test]
fn test_matcher_is_reusable() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let cases = CaseMap::builder(option())
        .case("absent", |_| 0)
        .case("present", move |x: &Value| {
            counter.fetch_add(1, Ordering::SeqCst);
            x.take_int().unwrap()
        })
        .build()
        .unwrap();

    let get_or_zero = cases.matcher();
    let values = [
        Value::variant(1, Value::Int(4)),
        Value::variant(0, Value::Unit),
        Value::variant(1, Value::Int(6)),
    ];
    let results: Vec<i64> = values.iter().map(|v| get_or_zero(v).unwrap()).collect();

    assert_eq!(results, vec![4, 0, 6]);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn test_concurrent_dispatch_shares_one_mapping() {
    let schema = SumSchema::new(
        "light",
        vec![
            VariantSchema::new("red", 0, ValueSchema::Unit),
            VariantSchema::new("amber", 1, ValueSchema::Unit),
            VariantSchema::new("green", 2, ValueSchema::Unit),
        ],
    )
    .unwrap();
    let cases = CaseMap::builder(schema)
        .case("red", |_| "stop")
        .case("amber", |_| "slow")
        .case("green", |_| "go")
        .build()
        .unwrap();

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..3u32)
            .map(|tag| {
                let cases = &cases;
                scope.spawn(move || {
                    (0..100)
                        .map(|_| cases.dispatch(&Value::variant(tag, Value::Unit)).unwrap())
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let expected = ["stop", "slow", "go"];
        for (handle, expected) in handles.into_iter().zip(expected) {
            let results = handle.join().unwrap();
            assert!(results.iter().all(|r| *r == expected));
        }
    });
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Only the handler keyed by the value's case runs, once, with the payload
    #[test]
    fn test_dispatch_invokes_exactly_the_matching_handler(
        (schema, value) in arb_sum_and_value()
    ) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let cases = recording_map(&schema, &calls);

        let (name, payload) = cases.dispatch(&value)?;

        let expected = schema.variant_by_tag(value.tag().unwrap()).unwrap();
        prop_assert_eq!(&name, &expected.name);
        prop_assert_eq!(Some(&payload), value.payload());
        prop_assert_eq!(calls.lock().unwrap().clone(), vec![expected.name.clone()]);
    }

    /// Dispatching twice behaves like two independent calls
    #[test]
    fn test_dispatch_is_repeatable(
        (schema, value) in arb_sum_and_value()
    ) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let cases = recording_map(&schema, &calls);

        let first = cases.dispatch(&value)?;
        let second = cases.dispatch(&value)?;

        prop_assert_eq!(first, second);
        let calls = calls.lock().unwrap();
        prop_assert_eq!(calls.len(), 2);
        prop_assert_eq!(&calls[0], &calls[1]);
    }

    /// Dropping any one handler is caught at build and, when partial, at dispatch
    #[test]
    fn test_missing_handler_is_always_identified(
        (schema, value) in arb_sum_and_value()
    ) {
        let missing = schema
            .variant_by_tag(value.tag().unwrap())
            .unwrap()
            .name
            .clone();

        let builder = || {
            let mut builder = CaseMap::builder(schema.clone());
            for name in schema.names().filter(|n| *n != missing) {
                builder = builder.case(name, |_: &Value| ());
            }
            builder
        };

        prop_assert_eq!(
            builder().build().unwrap_err(),
            BuildError::MissingCases {
                sum: schema.name().to_string(),
                cases: vec![missing.clone()],
            }
        );

        let partial = builder().build_partial().unwrap();
        prop_assert_eq!(
            partial.dispatch(&value),
            Err(DispatchError::MissingCase {
                sum: schema.name().to_string(),
                case: missing,
                tag: value.tag().unwrap(),
            })
        );
    }

    /// Tags the sum does not declare are never routed to a handler
    #[test]
    fn test_undeclared_tags_are_reported(
        schema in arb_sum_schema(),
        tag in any::<u32>()
    ) {
        prop_assume!(schema.variant_by_tag(tag).is_none());

        let calls = Arc::new(Mutex::new(Vec::new()));
        let cases = recording_map(&schema, &calls);

        prop_assert_eq!(
            cases.dispatch(&Value::variant(tag, Value::Unit)),
            Err(DispatchError::UnknownTag {
                sum: schema.name().to_string(),
                tag,
            })
        );
        prop_assert!(calls.lock().unwrap().is_empty());
    }
}
