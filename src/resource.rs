#![forbid(unsafe_code)]

use crate::readiness::condition::Condition;
use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Observed composed resources keyed by composition resource name.
pub type ObservedMap = BTreeMap<String, ObservedResource>;
/// Desired composed resources keyed by composition resource name.
pub type DesiredMap = BTreeMap<String, DesiredResource>;

/// A loosely typed resource manifest as exchanged with the pipeline runtime.
///
/// The document is kept as raw JSON; only the handful of paths the aggregator
/// cares about get typed accessors.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceDocument(Value);

impl ResourceDocument {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    pub fn api_version(&self) -> &str {
        self.0
            .get("apiVersion")
            .and_then(Value::as_str)
            .unwrap_or("")
    }

    pub fn kind(&self) -> &str {
        self.0.get("kind").and_then(Value::as_str).unwrap_or("")
    }

    pub fn name(&self) -> &str {
        self.0
            .get("metadata")
            .and_then(|metadata| metadata.get("name"))
            .and_then(Value::as_str)
            .unwrap_or("")
    }

    /// The `status.conditions` list, or `None` when the path is absent or not a list.
    pub fn conditions(&self) -> Option<&[Value]> {
        self.0
            .get("status")?
            .get("conditions")?
            .as_array()
            .map(Vec::as_slice)
    }

    /// Insert or replace the condition with the same `type` under `status.conditions`.
    ///
    /// Missing intermediate objects are created; a non-object document is replaced by
    /// one holding only the condition.
    pub fn set_condition(&mut self, condition: &Condition) {
        if !self.0.is_object() {
            self.0 = Value::Object(Map::new());
        }
        let Some(root) = self.0.as_object_mut() else {
            return;
        };

        let status = root
            .entry("status")
            .or_insert_with(|| Value::Object(Map::new()));
        if !status.is_object() {
            *status = Value::Object(Map::new());
        }
        let Some(status) = status.as_object_mut() else {
            return;
        };

        let conditions = status
            .entry("conditions")
            .or_insert_with(|| Value::Array(Vec::new()));
        if !conditions.is_array() {
            *conditions = Value::Array(Vec::new());
        }
        let Some(entries) = conditions.as_array_mut() else {
            return;
        };

        let entry = condition_entry(condition);
        let existing = entries.iter_mut().find(|value| {
            value.get("type").and_then(Value::as_str) == Some(condition.condition_type.as_str())
        });
        match existing {
            Some(slot) => *slot = entry,
            None => entries.push(entry),
        }
    }
}

fn condition_entry(condition: &Condition) -> Value {
    let mut entry = Map::new();
    entry.insert(
        "type".to_string(),
        Value::String(condition.condition_type.clone()),
    );
    entry.insert(
        "status".to_string(),
        Value::String(condition.status.as_str().to_string()),
    );
    entry.insert(
        "reason".to_string(),
        Value::String(condition.reason.clone()),
    );
    entry.insert(
        "message".to_string(),
        Value::String(condition.message.clone()),
    );
    if let Some(at) = condition.last_transition_time {
        entry.insert(
            "lastTransitionTime".to_string(),
            Value::String(at.to_rfc3339_opts(SecondsFormat::Secs, true)),
        );
    }
    Value::Object(entry)
}

/// Readiness flag carried by desired composed resources.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Ready {
    #[default]
    Unspecified,
    True,
    False,
}

impl Ready {
    pub fn as_str(self) -> &'static str {
        match self {
            Ready::Unspecified => "Unspecified",
            Ready::True => "True",
            Ready::False => "False",
        }
    }

    pub fn is_unspecified(&self) -> bool {
        matches!(self, Ready::Unspecified)
    }
}

/// A composed resource as last observed by the pipeline runtime.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ObservedResource {
    #[serde(default)]
    pub resource: ResourceDocument,
}

impl ObservedResource {
    pub fn new(value: Value) -> Self {
        Self {
            resource: ResourceDocument::new(value),
        }
    }
}

/// A composed resource as desired by the composition pipeline.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DesiredResource {
    #[serde(default)]
    pub resource: ResourceDocument,
    #[serde(default, skip_serializing_if = "Ready::is_unspecified")]
    pub ready: Ready,
}

impl DesiredResource {
    pub fn new(value: Value) -> Self {
        Self {
            resource: ResourceDocument::new(value),
            ready: Ready::Unspecified,
        }
    }
}
