use autoready::readiness::condition::{Condition, TYPE_NO_ERRORS};
use autoready::resource::{DesiredResource, Ready, ResourceDocument};
use serde_json::{json, Value};

#[test]
fn accessors_read_document_metadata() {
    let document = ResourceDocument::new(json!({
        "apiVersion": "example.org/v1",
        "kind": "Database",
        "metadata": {"name": "my-db"}
    }));

    assert_eq!(document.api_version(), "example.org/v1");
    assert_eq!(document.kind(), "Database");
    assert_eq!(document.name(), "my-db");
}

#[test]
fn accessors_default_to_empty_strings() {
    let document = ResourceDocument::default();

    assert_eq!(document.api_version(), "");
    assert_eq!(document.kind(), "");
    assert_eq!(document.name(), "");
    assert!(document.conditions().is_none());
}

#[test]
fn conditions_require_a_list() {
    let list = ResourceDocument::new(json!({
        "status": {"conditions": [{"type": "Ready", "status": "True"}]}
    }));
    let scalar = ResourceDocument::new(json!({"status": {"conditions": 3}}));
    let absent = ResourceDocument::new(json!({"status": {}}));

    assert_eq!(list.conditions().map(<[Value]>::len), Some(1));
    assert!(scalar.conditions().is_none());
    assert!(absent.conditions().is_none());
}

#[test]
fn set_condition_creates_the_status_path() {
    let mut document = ResourceDocument::default();

    document.set_condition(&Condition::available(TYPE_NO_ERRORS));

    let conditions = document.conditions().expect("conditions list created");
    assert_eq!(conditions.len(), 1);
    assert_eq!(conditions[0]["type"], "NoErrors");
    assert_eq!(conditions[0]["status"], "True");
    assert!(conditions[0]["lastTransitionTime"].is_string());
}

#[test]
fn set_condition_replaces_matching_type() {
    let mut document = ResourceDocument::new(json!({
        "status": {
            "conditions": [
                {"type": "Synced", "status": "True"},
                {"type": "NoErrors", "status": "False", "reason": "ReconcileError"}
            ]
        }
    }));

    document.set_condition(&Condition::available(TYPE_NO_ERRORS));

    let conditions = document.conditions().expect("conditions list present");
    assert_eq!(conditions.len(), 2);
    assert_eq!(conditions[0]["type"], "Synced");
    assert_eq!(conditions[1]["type"], "NoErrors");
    assert_eq!(conditions[1]["status"], "True");
    assert_eq!(conditions[1]["reason"], "Available");
}

#[test]
fn set_condition_appends_new_type() {
    let mut document = ResourceDocument::new(json!({
        "status": {"conditions": [{"type": "Synced", "status": "True"}]}
    }));

    document.set_condition(&Condition::available(TYPE_NO_ERRORS));

    let conditions = document.conditions().expect("conditions list present");
    assert_eq!(conditions.len(), 2);
    assert_eq!(conditions[1]["type"], "NoErrors");
}

#[test]
fn unspecified_readiness_is_omitted_from_the_wire() {
    let unspecified = DesiredResource::default();
    let ready = DesiredResource {
        ready: Ready::True,
        ..DesiredResource::default()
    };

    let unspecified_value = serde_json::to_value(&unspecified).expect("serializes");
    let ready_value = serde_json::to_value(&ready).expect("serializes");

    assert!(unspecified_value.get("ready").is_none());
    assert_eq!(ready_value["ready"], "True");
}

#[test]
fn missing_readiness_deserializes_to_unspecified() {
    let desired: DesiredResource =
        serde_json::from_value(json!({"resource": {"kind": "Instance"}}))
            .expect("desired resource decodes");

    assert_eq!(desired.ready, Ready::Unspecified);
    assert_eq!(desired.resource.kind(), "Instance");
}
