//! Resource API records read by the handlers.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

pub const JOB: &str = "Job";
pub const JOB_ACTIVITY: &str = "JobActivity";
pub const ATTACHMENT: &str = "Attachment";
pub const NOTE: &str = "Note";

/// The API reports flags as `0`/`1`, `"0"`/`"1"` or booleans depending on
/// the endpoint and date-format header.
fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Bool(b) => b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !matches!(s.trim(), "" | "0" | "false"),
        _ => false,
    })
}

/// Blank or null is "no coordinate"; anything else must be a finite number.
fn coordinate<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    let parsed = match Value::deserialize(deserializer)? {
        Value::Null => return Ok(None),
        Value::String(s) if s.trim().is_empty() => return Ok(None),
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        other => return Err(D::Error::custom(format!("invalid coordinate {other}"))),
    };
    parsed
        .filter(|value: &f64| value.is_finite())
        .map(Some)
        .ok_or_else(|| D::Error::custom("invalid coordinate: not a finite number"))
}

fn display_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

/// A job: the resource whose location and bookings the weather view uses.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Job {
    pub uuid: String,
    #[serde(default, deserialize_with = "coordinate")]
    pub lat: Option<f64>,
    #[serde(default, deserialize_with = "coordinate")]
    pub lng: Option<f64>,
    #[serde(default, deserialize_with = "flag")]
    pub geo_is_valid: bool,
    #[serde(default, deserialize_with = "display_number")]
    pub generated_job_id: String,
}

impl Job {
    /// `(lat, lng)` when the API vouches for the location and both are set.
    pub fn location(&self) -> Option<(f64, f64)> {
        if !self.geo_is_valid {
            return None;
        }
        Some((self.lat?, self.lng?))
    }
}

/// A job activity: either a scheduled booking or recorded check-in time.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ScheduledActivity {
    #[serde(default)]
    pub uuid: String,
    #[serde(default)]
    pub job_uuid: String,
    /// Start time with an embedded UTC offset, e.g. `2017-04-05T07:00:00+0930`.
    #[serde(default)]
    pub start_date: String,
    #[serde(default, deserialize_with = "flag")]
    pub active: bool,
    #[serde(default, deserialize_with = "flag")]
    pub activity_was_scheduled: bool,
}

/// An attachment record, as far as duplicate detection needs it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AttachmentRecord {
    #[serde(default)]
    pub uuid: String,
    #[serde(default)]
    pub attachment_name: String,
}
