//! Raw talk records as delivered by the feed.
//!
//! Records are untrusted. Only `id`, `start_time`, `end_time` and `title`
//! are read, and each of them is read leniently: a field of the wrong
//! shape becomes `None` rather than failing the whole record.

use chrono::{DateTime, Utc};
use oxtalks_core::{from_epoch_seconds, parse_datetime};
use serde::{Deserialize, Deserializer};
use serde_json::{Number, Value};

/// A talk record from the listing payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RawTalk {
    /// Talk identifier, rendered as text (integral numbers without a fraction).
    #[serde(default, deserialize_with = "lenient_text")]
    pub id: Option<String>,

    /// Start of the talk. The feed sends epoch seconds.
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub start_time: Option<DateTime<Utc>>,

    /// End of the talk.
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub end_time: Option<DateTime<Utc>>,

    /// Talk title.
    #[serde(default, deserialize_with = "lenient_text")]
    pub title: Option<String>,
}

impl RawTalk {
    /// Reads a record from one element of the payload list.
    ///
    /// Returns `None` if the element is not a JSON object.
    pub fn from_value(value: &Value) -> Option<Self> {
        if !value.is_object() {
            return None;
        }
        RawTalk::deserialize(value).ok()
    }
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(number_text(&n)),
        _ => None,
    })
}

/// Renders `1.0` as `1`; other numbers keep their JSON form.
fn number_text(n: &Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e15 => (f as i64).to_string(),
        _ => n.to_string(),
    }
}

fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
            .and_then(from_epoch_seconds),
        Value::String(s) => match s.trim().parse::<i64>() {
            Ok(secs) => from_epoch_seconds(secs),
            Err(_) => parse_datetime(&s).ok(),
        },
        _ => None,
    })
}
