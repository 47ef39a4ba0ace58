//! Property-based tests for request validation and schema normalization
//!
//! - Amount: every well-formed positive amount passes, malformed ones fail
//! - Description: suggestions always satisfy the description rule; overlong
//!   or tainted descriptions never do
//! - Status classification is deterministic
//! - V1 and V2 availability shapes normalize to the same entries

use momo_protocol::{
    normalizer::{classify_status, normalize_availability, AvailabilityIndex},
    validation::{suggest_description, validate_amount, validate_description},
    OperationKind, SchemaVersion, TransactionStatus,
};
use proptest::prelude::*;
use serde_json::{json, Value};

/// Strategy for well-formed positive amounts
fn amount_strategy() -> impl Strategy<Value = String> {
    ("[1-9][0-9]{0,17}", prop::option::of("[0-9]{1,2}")).prop_map(|(int, frac)| match frac {
        Some(frac) => format!("{}.{}", int, frac),
        None => int,
    })
}

/// Strategy for gateway status tokens
fn status_token_strategy() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        Just("ACCEPTED"),
        Just("SUBMITTED"),
        Just("ENQUEUED"),
        Just("PROCESSING"),
        Just("IN_RECONCILIATION"),
        Just("COMPLETED"),
        Just("FAILED"),
        Just("REJECTED"),
    ]
}

/// Strategy for operator availability: code and (operation, status) pairs
fn operator_strategy() -> impl Strategy<Value = (String, Vec<(String, String)>)> {
    (
        "[A-Z]{3,6}_[A-Z]{3}",
        prop::collection::btree_map(
            prop_oneof![Just("DEPOSIT"), Just("PAYOUT"), Just("REFUND")],
            prop_oneof![Just("OPERATIONAL"), Just("DELAYED"), Just("CLOSED")],
            1..3,
        ),
    )
        .prop_map(|(code, ops)| {
            (
                code,
                ops.into_iter()
                    .map(|(op, status)| (op.to_string(), status.to_string()))
                    .collect(),
            )
        })
}

fn v1_payload(country: &str, operators: &[(String, Vec<(String, String)>)]) -> Value {
    let correspondents: Vec<Value> = operators
        .iter()
        .map(|(code, ops)| {
            let op_types: Vec<Value> = ops
                .iter()
                .map(|(op, status)| json!({"operationType": op, "status": status}))
                .collect();
            json!({"correspondent": code, "operationTypes": op_types})
        })
        .collect();
    json!([{"country": country, "correspondents": correspondents}])
}

fn v2_payload(country: &str, operators: &[(String, Vec<(String, String)>)]) -> Value {
    let providers: Vec<Value> = operators
        .iter()
        .map(|(code, ops)| {
            let op_types: serde_json::Map<String, Value> = ops
                .iter()
                .map(|(op, status)| (op.clone(), Value::String(status.clone())))
                .collect();
            json!({"provider": code, "operationTypes": op_types})
        })
        .collect();
    json!([{"country": country, "providers": providers}])
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Property: well-formed positive amounts are accepted
    #[test]
    fn prop_well_formed_amounts_accepted(amount in amount_strategy()) {
        prop_assert!(validate_amount(&amount).is_ok());
    }

    /// Property: three or more fraction digits are always rejected
    #[test]
    fn prop_long_fractions_rejected(int in "[1-9][0-9]{0,5}", frac in "[0-9]{3,6}") {
        let amount = format!("{}.{}", int, frac);
        prop_assert!(validate_amount(&amount).is_err());
    }

    /// Property: a non-blank suggestion is itself a valid description
    #[test]
    fn prop_suggestion_is_valid(input in ".{0,40}") {
        let suggestion = suggest_description(&input);
        if !suggestion.is_empty() {
            prop_assert!(validate_description(&suggestion, "statementDescription").is_ok());
        }
    }

    /// Property: allowed characters past the length limit are rejected
    #[test]
    fn prop_overlong_descriptions_rejected(description in "[A-Za-z0-9 ]{23,40}") {
        prop_assert!(validate_description(&description, "statementDescription").is_err());
    }

    /// Property: a single disallowed character taints an otherwise valid description
    #[test]
    fn prop_disallowed_character_rejected(
        head in "[A-Za-z0-9 ]{0,10}",
        bad in "[^A-Za-z0-9 ]",
        tail in "[A-Za-z0-9 ]{0,10}",
    ) {
        let description = format!("{}{}{}", head, bad, tail);
        prop_assert!(validate_description(&description, "statementDescription").is_err());
    }

    /// Property: classification depends only on its inputs
    #[test]
    fn prop_classification_is_deterministic(token in status_token_strategy()) {
        let body = json!([{"status": token, "depositId": "d-1"}]);
        let a = classify_status("d-1", OperationKind::Deposit, SchemaVersion::V1, &body);
        let b = classify_status("d-1", OperationKind::Deposit, SchemaVersion::V1, &body);
        prop_assert_eq!(a, b);
    }

    /// Property: a V1 record and its V2 envelope classify to the same status
    #[test]
    fn prop_v1_and_v2_status_agree(token in status_token_strategy()) {
        let v1 = classify_status("p", OperationKind::Payout, SchemaVersion::V1, &json!([{"status": token}]));
        let v2 = classify_status(
            "p",
            OperationKind::Payout,
            SchemaVersion::V2,
            &json!({"status": "FOUND", "data": {"status": token}}),
        );
        prop_assert_eq!(v1.status, v2.status);
        prop_assert_eq!(v1.message, v2.message);
    }

    /// Property: the same availability in either shape yields the same index
    #[test]
    fn prop_availability_shapes_agree(operators in prop::collection::vec(operator_strategy(), 1..4)) {
        let v1 = normalize_availability(SchemaVersion::V1, &v1_payload("UGA", &operators)).unwrap();
        let v2 = normalize_availability(SchemaVersion::V2, &v2_payload("UGA", &operators)).unwrap();

        let mut sorted_v1 = v1.clone();
        let mut sorted_v2 = v2.clone();
        sorted_v1.sort();
        sorted_v2.sort();
        prop_assert_eq!(sorted_v1, sorted_v2);
        prop_assert_eq!(AvailabilityIndex::from_entries(v1), AvailabilityIndex::from_entries(v2));
    }
}

#[test]
fn test_v2_not_found_is_processing() {
    let result = classify_status(
        "dep-9",
        OperationKind::Deposit,
        SchemaVersion::V2,
        &json!({"status": "NOT_FOUND"}),
    );
    assert_eq!(result.status, TransactionStatus::Processing);
    assert!(result.failure_message.is_none());
}

#[test]
fn test_v1_completed_array() {
    let result = classify_status(
        "dep-1",
        OperationKind::Deposit,
        SchemaVersion::V1,
        &json!([{"depositId": "dep-1", "status": "COMPLETED"}]),
    );
    assert_eq!(result.status, TransactionStatus::Completed);
    assert!(result.success());
    assert_eq!(result.message, "Deposit processed successfully.");
}

#[test]
fn test_normalization_is_idempotent() {
    let payload = v2_payload(
        "ZMB",
        &[("MTN_MOMO_ZMB".to_string(), vec![("PAYOUT".to_string(), "OPERATIONAL".to_string())])],
    );
    let first = normalize_availability(SchemaVersion::V2, &payload).unwrap();
    let second = normalize_availability(SchemaVersion::V2, &payload).unwrap();
    assert_eq!(first, second);
}
