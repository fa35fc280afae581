use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub const TYPE_READY: &str = "Ready";
pub const TYPE_NO_ERRORS: &str = "NoErrors";

pub const REASON_AVAILABLE: &str = "Available";
pub const REASON_CREATING: &str = "Creating";
pub const REASON_RECONCILE_ERROR: &str = "ReconcileError";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConditionStatus {
    True,
    False,
    Unknown,
}

impl ConditionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ConditionStatus::True => "True",
            ConditionStatus::False => "False",
            ConditionStatus::Unknown => "Unknown",
        }
    }

    pub fn is_true(self) -> bool {
        matches!(self, ConditionStatus::True)
    }

    fn parse(value: &str) -> Option<Self> {
        match value {
            "True" => Some(ConditionStatus::True),
            "False" => Some(ConditionStatus::False),
            "Unknown" => Some(ConditionStatus::Unknown),
            _ => None,
        }
    }
}

/// A condition entry whose `status` field is missing or outside the tri-state domain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("condition entry is not a well-formed record")]
pub struct MalformedCondition;

/// A structured health signal reported on a resource's `status.conditions` list.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    #[serde(rename = "type")]
    pub condition_type: String,
    pub status: ConditionStatus,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_transition_time: Option<DateTime<Utc>>,
}

impl Condition {
    /// Read a condition out of a loosely typed list entry.
    ///
    /// `status` must be present and tri-state; `type`, `reason` and `message` default to
    /// the empty string when missing or mistyped. Extra fields are ignored.
    pub fn from_value(value: &Value) -> Result<Self, MalformedCondition> {
        let entry = value.as_object().ok_or(MalformedCondition)?;
        let status = entry
            .get("status")
            .and_then(Value::as_str)
            .and_then(ConditionStatus::parse)
            .ok_or(MalformedCondition)?;

        Ok(Self {
            condition_type: string_or_empty(entry.get("type")),
            status,
            reason: string_or_empty(entry.get("reason")),
            message: string_or_empty(entry.get("message")),
            last_transition_time: None,
        })
    }

    /// The healthy composite outcome, stamped with the evaluation time.
    pub fn available(condition_type: &str) -> Self {
        Self {
            condition_type: condition_type.to_string(),
            status: ConditionStatus::True,
            reason: REASON_AVAILABLE.to_string(),
            message: String::new(),
            last_transition_time: Some(Utc::now()),
        }
    }

    /// The unhealthy composite outcome carrying the aggregated digest.
    pub fn reconcile_error(condition_type: &str, message: String) -> Self {
        Self {
            condition_type: condition_type.to_string(),
            status: ConditionStatus::False,
            reason: REASON_RECONCILE_ERROR.to_string(),
            message,
            last_transition_time: Some(Utc::now()),
        }
    }
}

fn string_or_empty(value: Option<&Value>) -> String {
    value
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}
