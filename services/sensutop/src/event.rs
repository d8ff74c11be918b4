//! Monitoring events and severity classification

use std::fmt;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Number, Value};

/// One monitoring result reported by an endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub client: String,
    pub check: String,
    pub output: String,
    #[serde(deserialize_with = "deserialize_status")]
    pub status: i64,
}

/// Accept any JSON integer. Values beyond the `i64` range saturate, which
/// still classifies them as unknown. Fractional numbers are rejected.
fn deserialize_status<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let number = Number::deserialize(deserializer)?;
    if let Some(status) = number.as_i64() {
        return Ok(status);
    }
    if number.is_u64() {
        return Ok(i64::MAX);
    }
    match number.as_f64() {
        // Integer literals past u64::MAX arrive as floats
        Some(f) if f.fract() == 0.0 && f.abs() >= i64::MAX as f64 => {
            Ok(if f < 0.0 { i64::MIN } else { i64::MAX })
        }
        _ => Err(D::Error::custom(format!("status {number} is not an integer"))),
    }
}

impl Event {
    pub fn severity(&self) -> Severity {
        Severity::from_status(self.status)
    }
}

/// Fixed four-way classification of an event status code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Ok,
    Warning,
    Critical,
    Unknown,
}

impl Severity {
    pub fn from_status(status: i64) -> Self {
        match status {
            0 => Severity::Ok,
            1 => Severity::Warning,
            2 => Severity::Critical,
            _ => Severity::Unknown,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Ok => write!(f, "ok"),
            Severity::Warning => write!(f, "warning"),
            Severity::Critical => write!(f, "critical"),
            Severity::Unknown => write!(f, "unknown"),
        }
    }
}

/// Parse an `/events` response body.
///
/// The body must be a JSON array. Entries that lack one of the required
/// fields, or carry them with the wrong type, are skipped.
pub fn parse_events(body: &str) -> crate::Result<Vec<Event>> {
    let entries: Vec<Value> = serde_json::from_str(body)?;
    let total = entries.len();

    let events: Vec<Event> = entries
        .into_iter()
        .filter_map(|entry| match serde_json::from_value::<Event>(entry) {
            Ok(event) => Some(event),
            Err(e) => {
                tracing::debug!("Skipping malformed event: {}", e);
                None
            }
        })
        .collect();

    if events.len() < total {
        tracing::debug!("Kept {} of {} events", events.len(), total);
    }
    Ok(events)
}
