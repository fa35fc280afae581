//! The typed snapshot exchanged with the pipeline runtime.
//!
//! One call carries the observed and desired state of a composite resource and its
//! composed resources; the response returns the possibly-updated desired state plus
//! any fatal results. The transport wrapping this exchange is external.

use crate::config::FunctionConfig;
use crate::error::{Error, Result};
use crate::readiness::ReadinessAggregator;
use crate::resource::{DesiredMap, DesiredResource, ObservedMap, ObservedResource};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestMeta {
    #[serde(default)]
    pub tag: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ObservedState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub composite: Option<ObservedResource>,
    #[serde(default)]
    pub resources: ObservedMap,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DesiredState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub composite: Option<DesiredResource>,
    #[serde(default)]
    pub resources: DesiredMap,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RunRequest {
    #[serde(default)]
    pub meta: RequestMeta,
    #[serde(default)]
    pub observed: Option<ObservedState>,
    #[serde(default)]
    pub desired: Option<DesiredState>,
}

impl RunRequest {
    pub fn observed_composite(&self) -> Result<&ObservedResource> {
        self.observed
            .as_ref()
            .and_then(|state| state.composite.as_ref())
            .ok_or_else(|| Error::request("no observed composite resource"))
    }

    pub fn observed_resources(&self) -> Result<&ObservedMap> {
        self.observed
            .as_ref()
            .map(|state| &state.resources)
            .ok_or_else(|| Error::request("no observed state"))
    }

    pub fn desired_resources(&self) -> Result<DesiredMap> {
        self.desired
            .as_ref()
            .map(|state| state.resources.clone())
            .ok_or_else(|| Error::request("no desired state"))
    }

    /// The desired composite resource, or an empty one when the caller has not
    /// built it yet. The desired section itself must be present.
    pub fn desired_composite(&self) -> Result<DesiredResource> {
        self.desired
            .as_ref()
            .map(|state| state.composite.clone().unwrap_or_default())
            .ok_or_else(|| Error::request("no desired state"))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Fatal,
    Warning,
    Normal,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Fatal => "Fatal",
            Severity::Warning => "Warning",
            Severity::Normal => "Normal",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResultEntry {
    pub severity: Severity,
    pub message: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResponseMeta {
    #[serde(default)]
    pub tag: String,
    #[serde(with = "ttl")]
    pub ttl: Duration,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunResponse {
    pub meta: ResponseMeta,
    #[serde(default)]
    pub desired: DesiredState,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub results: Vec<ResultEntry>,
}

impl RunResponse {
    /// Seed a response from a request: the tag is echoed back and the desired state
    /// starts as whatever the caller sent.
    pub fn to(request: &RunRequest, ttl: Duration) -> Self {
        Self {
            meta: ResponseMeta {
                tag: request.meta.tag.clone(),
                ttl,
            },
            desired: request.desired.clone().unwrap_or_default(),
            results: Vec::new(),
        }
    }

    pub fn empty(ttl: Duration) -> Self {
        Self {
            meta: ResponseMeta {
                tag: String::new(),
                ttl,
            },
            desired: DesiredState::default(),
            results: Vec::new(),
        }
    }

    pub fn fatal(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::error!(error = %message, "fatal function result");
        self.results.push(ResultEntry {
            severity: Severity::Fatal,
            message,
        });
    }
}

/// Run one readiness evaluation over a decoded request.
///
/// Missing top-level inputs become a `Fatal` result on the response; per-resource
/// degradation is handled inside the aggregator and never surfaces here.
pub fn run(request: &RunRequest, config: &FunctionConfig) -> RunResponse {
    let mut response = RunResponse::to(request, config.response_ttl);
    tracing::info!(tag = %request.meta.tag, "running readiness function");

    let composite = match request.observed_composite() {
        Ok(observed) => &observed.resource,
        Err(err) => {
            response.fatal(err.to_string());
            return response;
        }
    };
    tracing::debug!(
        composite_api_version = composite.api_version(),
        composite_kind = composite.kind(),
        composite_name = composite.name(),
        "found observed composite resource"
    );

    let observed = match request.observed_resources() {
        Ok(observed) => observed,
        Err(err) => {
            response.fatal(err.to_string());
            return response;
        }
    };

    let desired = match request.desired_resources() {
        Ok(desired) => desired,
        Err(err) => {
            response.fatal(err.to_string());
            return response;
        }
    };

    let mut desired_composite = match request.desired_composite() {
        Ok(composite) => composite,
        Err(err) => {
            response.fatal(err.to_string());
            return response;
        }
    };
    tracing::debug!(count = desired.len() as u64, "found desired resources");

    let aggregator = ReadinessAggregator::from_config(config);
    let evaluation = aggregator.evaluate(composite, observed, desired);

    desired_composite.resource.set_condition(&evaluation.condition);
    response.desired.composite = Some(desired_composite);
    if config.policy.sets_readiness() {
        response.desired.resources = evaluation.desired;
    }

    response
}

/// Decode a raw request document, run the function, encode the response document.
///
/// A request that does not decode still yields a well-formed response carrying a
/// single `Fatal` result.
pub fn handle(request: Value, config: &FunctionConfig) -> Result<Value> {
    let response = match serde_json::from_value::<RunRequest>(request) {
        Ok(request) => run(&request, config),
        Err(err) => {
            let mut response = RunResponse::empty(config.response_ttl);
            response.fatal(format!("cannot decode request: {err}"));
            response
        }
    };
    Ok(serde_json::to_value(&response)?)
}

mod ttl {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(ttl: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(&humantime::format_duration(*ttl))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        humantime::parse_duration(&value).map_err(serde::de::Error::custom)
    }
}
