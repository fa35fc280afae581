use autoready::readiness::condition::{
    Condition, ConditionStatus, REASON_AVAILABLE, REASON_RECONCILE_ERROR, TYPE_NO_ERRORS,
};
use serde_json::json;

#[test]
fn parses_full_record() {
    let value = json!({
        "type": "Ready",
        "status": "False",
        "reason": "ReconcileError",
        "message": "boom",
        "lastTransitionTime": "2024-01-01T00:00:00Z"
    });

    let condition = Condition::from_value(&value).expect("well-formed condition");

    assert_eq!(condition.condition_type, "Ready");
    assert_eq!(condition.status, ConditionStatus::False);
    assert_eq!(condition.reason, "ReconcileError");
    assert_eq!(condition.message, "boom");
}

#[test]
fn missing_optional_fields_default_to_empty() {
    let value = json!({"status": "True"});

    let condition = Condition::from_value(&value).expect("status alone is enough");

    assert_eq!(condition.condition_type, "");
    assert_eq!(condition.reason, "");
    assert_eq!(condition.message, "");
    assert!(condition.status.is_true());
}

#[test]
fn mistyped_optional_fields_default_to_empty() {
    let value = json!({
        "type": 7,
        "status": "Unknown",
        "reason": ["not", "a", "string"],
        "message": 42
    });

    let condition = Condition::from_value(&value).expect("optional fields may be mistyped");

    assert_eq!(condition.condition_type, "");
    assert_eq!(condition.reason, "");
    assert_eq!(condition.message, "");
    assert_eq!(condition.status, ConditionStatus::Unknown);
}

#[test]
fn missing_status_is_malformed() {
    let value = json!({"type": "Ready", "reason": "Creating"});

    Condition::from_value(&value).expect_err("status is required");
}

#[test]
fn mistyped_status_is_malformed() {
    let value = json!({"type": "Ready", "status": true});

    Condition::from_value(&value).expect_err("boolean status is not a string");
}

#[test]
fn out_of_domain_status_is_malformed() {
    let value = json!({"type": "Ready", "status": "Banana"});

    Condition::from_value(&value).expect_err("status must be tri-state");
}

#[test]
fn non_object_entry_is_malformed() {
    let value = json!("not a record");

    Condition::from_value(&value).expect_err("condition entries must be objects");
}

#[test]
fn available_outcome_is_healthy_and_stamped() {
    let condition = Condition::available(TYPE_NO_ERRORS);

    assert_eq!(condition.condition_type, TYPE_NO_ERRORS);
    assert!(condition.status.is_true());
    assert_eq!(condition.reason, REASON_AVAILABLE);
    assert_eq!(condition.message, "");
    assert!(condition.last_transition_time.is_some());
}

#[test]
fn reconcile_error_outcome_carries_digest() {
    let condition = Condition::reconcile_error(TYPE_NO_ERRORS, "Unready conditions:\n x".into());

    assert_eq!(condition.status, ConditionStatus::False);
    assert_eq!(condition.reason, REASON_RECONCILE_ERROR);
    assert!(condition.message.contains("Unready conditions"));
    assert!(condition.last_transition_time.is_some());
}

#[test]
fn serialized_shape_uses_camel_case_keys() {
    let condition = Condition::available(TYPE_NO_ERRORS);

    let value = serde_json::to_value(&condition).expect("condition serializes");
    let entry = value.as_object().expect("condition is an object");

    assert_eq!(entry["type"], "NoErrors");
    assert_eq!(entry["status"], "True");
    assert_eq!(entry["reason"], "Available");
    assert_eq!(entry["message"], "");
    assert!(entry.contains_key("lastTransitionTime"));
}
