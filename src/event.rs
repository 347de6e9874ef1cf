//! Inbound events and the closed set of event kinds this crate handles.

use crate::error::ValidationError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Bearer token issued for exactly one event. Wiped on drop and never
/// printed or serialized in clear.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Credential([REDACTED])")
    }
}

impl Serialize for Credential {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str("[REDACTED]")
    }
}

impl<'de> Deserialize<'de> for Credential {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventAuth {
    #[serde(rename = "accessToken")]
    pub access_token: Credential,
}

/// One inbound trigger, as delivered by the platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    #[serde(rename = "eventName")]
    pub name: String,
    #[serde(rename = "eventArgs", default)]
    pub args: Map<String, Value>,
    pub auth: EventAuth,
}

impl Event {
    pub fn new(name: impl Into<String>, args: Map<String, Value>, token: &str) -> Self {
        Self {
            name: name.into(),
            args,
            auth: EventAuth {
                access_token: Credential::new(token),
            },
        }
    }

    pub fn credential(&self) -> &Credential {
        &self.auth.access_token
    }

    /// String argument, trimmed; blank counts as missing.
    pub fn arg(&self, name: &'static str) -> Result<&str, ValidationError> {
        match self.args.get(name) {
            Some(Value::String(value)) if !value.trim().is_empty() => Ok(value.trim()),
            Some(Value::String(_)) | Some(Value::Null) | None => {
                Err(ValidationError::MissingArg(name))
            }
            Some(other) => Err(ValidationError::InvalidArg {
                name,
                reason: format!("expected a string, got {other}"),
            }),
        }
    }

    /// Numeric or string argument kept as raw text for later parsing.
    fn raw_arg(&self, name: &'static str) -> String {
        match self.args.get(name) {
            Some(Value::String(value)) => value.clone(),
            Some(Value::Number(value)) => value.to_string(),
            _ => String::new(),
        }
    }

    /// `eventArgs.entry[0].uuid`, as sent by webhook subscriptions.
    fn webhook_entry_uuid(&self) -> Result<&str, ValidationError> {
        self.args
            .get("entry")
            .and_then(Value::as_array)
            .and_then(|entries| entries.first())
            .and_then(|entry| entry.get("uuid"))
            .and_then(Value::as_str)
            .filter(|uuid| !uuid.trim().is_empty())
            .map(str::trim)
            .ok_or(ValidationError::MissingArg("entry[0].uuid"))
    }
}

/// Raw pool calculator form values. Parsed and validated by the handler so
/// bad input becomes an "invalid input" page rather than a dispatch error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolCalcArgs {
    pub job_uuid: String,
    pub pool_volume_litres: String,
    pub current_ph: String,
    pub desired_ph: String,
}

/// Every event this crate answers, with its typed payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    ShowWeatherInfo { job_uuid: String },
    WebhookSubscription { job_uuid: String },
    PoolCalcStart { job_uuid: String },
    PoolCalcCalculate(PoolCalcArgs),
    ShowcaseMainMenu { job_uuid: String },
    RequestJobData { job_uuid: String },
    HelloWorld { job_uuid: String },
    Unknown(String),
}

impl EventKind {
    /// Resolve the event name and pull its arguments. Unknown names are not
    /// an error; missing arguments of known events are.
    pub fn from_event(event: &Event) -> Result<Self, ValidationError> {
        let job_uuid = |name| event.arg(name).map(ToOwned::to_owned);

        let kind = match event.name.as_str() {
            "show_weather_info" => Self::ShowWeatherInfo {
                job_uuid: job_uuid("jobUUID")?,
            },
            "webhook_subscription" => Self::WebhookSubscription {
                job_uuid: event.webhook_entry_uuid()?.to_owned(),
            },
            "pool_calc_start" => Self::PoolCalcStart {
                job_uuid: job_uuid("jobUUID")?,
            },
            "pool_calc_calculate" => Self::PoolCalcCalculate(PoolCalcArgs {
                job_uuid: event.raw_arg("job_uuid"),
                pool_volume_litres: event.raw_arg("pool_volume_litres"),
                current_ph: event.raw_arg("current_ph"),
                desired_ph: event.raw_arg("desired_ph"),
            }),
            "showcase_main_menu" => Self::ShowcaseMainMenu {
                job_uuid: job_uuid("jobUUID")?,
            },
            "request_job_data_event" => Self::RequestJobData {
                job_uuid: job_uuid("jobUUID")?,
            },
            "hello_world" => Self::HelloWorld {
                job_uuid: job_uuid("jobUUID")?,
            },
            other => Self::Unknown(other.to_owned()),
        };
        Ok(kind)
    }
}
