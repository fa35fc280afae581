use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use serde_yaml::Value as YamlValue;
use std::collections::BTreeMap;
use std::fmt;
use std::io::Read;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_RESPONSE_TTL: Duration = Duration::from_secs(60);

const TOP_LEVEL_FIELDS: &str = "readiness_policy, response_ttl";

/// Process-level settings resolved from the environment and an optional local file.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub function_config_path: Option<String>,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name("config/local").required(false))
            .add_source(Environment::with_prefix("AUTOREADY").separator("__"))
            .build()?
            .try_deserialize()
    }
}

/// How the aggregator propagates what it learns about composed resources.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ReadinessPolicy {
    /// Mark Unspecified desired resources ready and synthesize the composite condition.
    #[default]
    SetReadiness,
    /// Synthesize the composite condition only; desired resources are left untouched.
    ConditionOnly,
}

impl ReadinessPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            ReadinessPolicy::SetReadiness => "set_readiness",
            ReadinessPolicy::ConditionOnly => "condition_only",
        }
    }

    pub fn sets_readiness(self) -> bool {
        matches!(self, ReadinessPolicy::SetReadiness)
    }

    fn parse(value: &str) -> Option<Self> {
        match value {
            "set_readiness" => Some(ReadinessPolicy::SetReadiness),
            "condition_only" => Some(ReadinessPolicy::ConditionOnly),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionConfig {
    pub policy: ReadinessPolicy,
    pub response_ttl: Duration,
}

impl Default for FunctionConfig {
    fn default() -> Self {
        Self {
            policy: ReadinessPolicy::default(),
            response_ttl: DEFAULT_RESPONSE_TTL,
        }
    }
}

impl FunctionConfig {
    pub fn from_reader(mut reader: impl Read) -> Result<Self, FunctionConfigError> {
        let mut contents = String::new();
        reader.read_to_string(&mut contents)?;
        Self::from_yaml_str(&contents)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, FunctionConfigError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    fn from_yaml_str(contents: &str) -> Result<Self, FunctionConfigError> {
        let raw: RawFunctionFile = serde_yaml::from_str(contents)?;
        Self::from_raw(raw).map_err(FunctionConfigError::Invalid)
    }

    fn from_raw(raw: RawFunctionFile) -> Result<Self, FunctionConfigValidationError> {
        let RawFunctionFile {
            readiness_policy,
            response_ttl,
            extra_fields,
        } = raw;

        let mut errors = Vec::new();

        for key in extra_fields.keys() {
            errors.push(format!(
                "error[root]: unknown top-level key \"{key}\" (expected one of {TOP_LEVEL_FIELDS})"
            ));
        }

        let policy = match readiness_policy {
            None => ReadinessPolicy::default(),
            Some(value) => match ReadinessPolicy::parse(&value) {
                Some(policy) => policy,
                None => {
                    errors.push(format!(
                        "error[readiness_policy]: unknown policy \"{value}\" (expected set_readiness or condition_only)"
                    ));
                    ReadinessPolicy::default()
                }
            },
        };

        let response_ttl = match response_ttl {
            None => DEFAULT_RESPONSE_TTL,
            Some(value) => match humantime::parse_duration(&value) {
                Ok(ttl) if !ttl.is_zero() => ttl,
                Ok(_) => {
                    errors.push(
                        "error[response_ttl]: response TTL must be greater than zero".to_string(),
                    );
                    DEFAULT_RESPONSE_TTL
                }
                Err(err) => {
                    errors.push(format!(
                        "error[response_ttl]: cannot parse \"{value}\" as a duration: {err}"
                    ));
                    DEFAULT_RESPONSE_TTL
                }
            },
        };

        if errors.is_empty() {
            Ok(Self {
                policy,
                response_ttl,
            })
        } else {
            Err(FunctionConfigValidationError { errors })
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawFunctionFile {
    #[serde(default)]
    readiness_policy: Option<String>,
    #[serde(default)]
    response_ttl: Option<String>,
    #[serde(flatten)]
    extra_fields: BTreeMap<String, YamlValue>,
}

#[derive(Debug, Error)]
pub enum FunctionConfigError {
    #[error("cannot read function config: {0}")]
    Io(#[from] std::io::Error),
    #[error("cannot parse function config: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("{0}")]
    Invalid(FunctionConfigValidationError),
}

#[derive(Debug)]
pub struct FunctionConfigValidationError {
    pub errors: Vec<String>,
}

impl fmt::Display for FunctionConfigValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "function config is invalid:")?;
        for error in &self.errors {
            writeln!(f, "  {error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for FunctionConfigValidationError {}
