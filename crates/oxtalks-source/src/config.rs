//! Event source configuration.
//!
//! A [`SourceConfig`] is what the host hands to every registered classifier
//! and transformer. Hosts typically build one per configured calendar feed,
//! either in code with the `with_*` builders or by deserializing JSON.
//!
//! ```
//! use oxtalks_source::SourceConfig;
//!
//! let config = SourceConfig::from_json_str(
//!     r#"{"url": "https://talks.ox.ac.uk/show/index/42/", "data": {"limit": 10}}"#,
//! )
//! .unwrap();
//! assert!(config.type_tag.is_none());
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use oxtalks_core::GenericEvent;
use serde::{Deserialize, Serialize};

use crate::error::{SourceError, SourceResult};

/// Request parameters attached to a source, keyed by query-parameter name.
pub type Parameters = BTreeMap<String, ParamValue>;

/// Callback invoked with the mapped events once a fetch succeeds.
pub type CompletionCallback = Arc<dyn Fn(&[GenericEvent]) + Send + Sync>;

/// A single request parameter value.
///
/// Deserialization is untagged: RFC 3339 strings become [`ParamValue::DateTime`],
/// any other string stays [`ParamValue::Text`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    /// An explicit null.
    Null,
    /// A boolean flag.
    Bool(bool),
    /// An integer.
    Integer(i64),
    /// A floating point number.
    Float(f64),
    /// An in-process date/time value.
    DateTime(DateTime<Utc>),
    /// Free text, possibly a human-entered date.
    Text(String),
}

impl ParamValue {
    /// Returns whether the host would treat this value as "set".
    ///
    /// `Null`, `false`, zero, NaN and the empty string are falsy; every
    /// date/time is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Null => false,
            Self::Bool(b) => *b,
            Self::Integer(n) => *n != 0,
            Self::Float(f) => *f != 0.0 && !f.is_nan(),
            Self::DateTime(_) => true,
            Self::Text(s) => !s.is_empty(),
        }
    }

    /// Renders the value the way it is sent in a query string.
    pub fn to_query_value(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::Bool(b) => b.to_string(),
            Self::Integer(n) => n.to_string(),
            Self::Float(f) => f.to_string(),
            Self::DateTime(dt) => dt.to_rfc3339(),
            Self::Text(s) => s.clone(),
        }
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<DateTime<Utc>> for ParamValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::DateTime(value)
    }
}

/// Configuration of one event source, as seen by classifiers and transformers.
#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Feed endpoint or listing page.
    #[serde(alias = "url")]
    pub address: Option<String>,

    /// Source type tag. `None` means "infer from the address".
    #[serde(alias = "dataType")]
    pub type_tag: Option<String>,

    /// Whether the host may let users edit events from this source.
    pub editable: Option<bool>,

    /// Extra request parameters.
    #[serde(alias = "data")]
    pub parameters: Option<Parameters>,

    /// Invoked with the mapped events after a successful fetch.
    #[serde(skip)]
    pub on_complete: Option<CompletionCallback>,
}

impl SourceConfig {
    /// Creates a configuration for the given address.
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: Some(address.into()),
            ..Default::default()
        }
    }

    /// Parses a configuration from JSON.
    ///
    /// # Errors
    ///
    /// Returns an `InvalidConfiguration` error if the JSON is malformed or
    /// does not describe a source object.
    pub fn from_json_str(json: &str) -> SourceResult<Self> {
        serde_json::from_str(json).map_err(|e| {
            SourceError::configuration(format!("invalid source configuration: {e}"))
                .with_source(e)
        })
    }

    /// Builder method to set the type tag.
    pub fn with_type_tag(mut self, type_tag: impl Into<String>) -> Self {
        self.type_tag = Some(type_tag.into());
        self
    }

    /// Builder method to set editability.
    pub fn with_editable(mut self, editable: bool) -> Self {
        self.editable = Some(editable);
        self
    }

    /// Builder method to add a single request parameter.
    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.parameters
            .get_or_insert_with(Parameters::new)
            .insert(key.into(), value.into());
        self
    }

    /// Builder method to replace all request parameters.
    pub fn with_parameters(mut self, parameters: Parameters) -> Self {
        self.parameters = Some(parameters);
        self
    }

    /// Builder method to set the completion callback.
    pub fn on_complete<F>(mut self, callback: F) -> Self
    where
        F: Fn(&[GenericEvent]) + Send + Sync + 'static,
    {
        self.on_complete = Some(Arc::new(callback));
        self
    }

    /// Returns the address, or an empty string if none is configured.
    pub fn address_str(&self) -> &str {
        self.address.as_deref().unwrap_or_default()
    }

    /// Returns true if the type tag equals `tag`.
    pub fn has_type_tag(&self, tag: &str) -> bool {
        self.type_tag.as_deref() == Some(tag)
    }
}

impl fmt::Debug for SourceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceConfig")
            .field("address", &self.address)
            .field("type_tag", &self.type_tag)
            .field("editable", &self.editable)
            .field("parameters", &self.parameters)
            .field("on_complete", &self.on_complete.as_ref().map(|_| "<callback>"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::sync::Mutex;

    #[test]
    fn truthiness() {
        assert!(!ParamValue::Null.is_truthy());
        assert!(!ParamValue::Bool(false).is_truthy());
        assert!(ParamValue::Bool(true).is_truthy());
        assert!(!ParamValue::Integer(0).is_truthy());
        assert!(ParamValue::Integer(-3).is_truthy());
        assert!(!ParamValue::Float(0.0).is_truthy());
        assert!(!ParamValue::Float(f64::NAN).is_truthy());
        assert!(!ParamValue::from("").is_truthy());
        assert!(ParamValue::from("0").is_truthy());
        assert!(ParamValue::from(Utc.timestamp_opt(0, 0).unwrap()).is_truthy());
    }

    #[test]
    fn query_values() {
        assert_eq!(ParamValue::Null.to_query_value(), "");
        assert_eq!(ParamValue::Bool(true).to_query_value(), "true");
        assert_eq!(ParamValue::Integer(42).to_query_value(), "42");
        assert_eq!(ParamValue::from("abc").to_query_value(), "abc");
        let dt = Utc.with_ymd_and_hms(2013, 10, 1, 9, 30, 0).unwrap();
        assert_eq!(
            ParamValue::from(dt).to_query_value(),
            "2013-10-01T09:30:00+00:00"
        );
    }

    #[test]
    fn builder() {
        let config = SourceConfig::new("https://talks.ox.ac.uk/show/index/1/")
            .with_type_tag("oxtalks")
            .with_editable(true)
            .with_parameter("limit", 10_i64)
            .with_parameter("x_start_datetime", "2013-10-01");

        assert_eq!(config.address_str(), "https://talks.ox.ac.uk/show/index/1/");
        assert!(config.has_type_tag("oxtalks"));
        assert_eq!(config.editable, Some(true));
        let params = config.parameters.unwrap();
        assert_eq!(params.get("limit"), Some(&ParamValue::Integer(10)));
        assert_eq!(
            params.get("x_start_datetime"),
            Some(&ParamValue::from("2013-10-01"))
        );
    }

    #[test]
    fn missing_address_is_empty() {
        assert_eq!(SourceConfig::default().address_str(), "");
    }

    #[test]
    fn deserialize_host_field_names() {
        let config = SourceConfig::from_json_str(
            r#"{
                "url": "http://talks.ox.ac.uk/show/index/5/",
                "dataType": "oxtalks",
                "editable": true,
                "data": {
                    "x_start_datetime": "2013-10-01T09:30:00Z",
                    "start_time": 999,
                    "ratio": 0.5,
                    "flag": false,
                    "note": "hello",
                    "nothing": null
                }
            }"#,
        )
        .unwrap();

        assert_eq!(config.address_str(), "http://talks.ox.ac.uk/show/index/5/");
        assert_eq!(config.type_tag.as_deref(), Some("oxtalks"));
        assert_eq!(config.editable, Some(true));

        let params = config.parameters.unwrap();
        assert_eq!(
            params["x_start_datetime"],
            ParamValue::DateTime(Utc.with_ymd_and_hms(2013, 10, 1, 9, 30, 0).unwrap())
        );
        assert_eq!(params["start_time"], ParamValue::Integer(999));
        assert_eq!(params["ratio"], ParamValue::Float(0.5));
        assert_eq!(params["flag"], ParamValue::Bool(false));
        assert_eq!(params["note"], ParamValue::from("hello"));
        assert_eq!(params["nothing"], ParamValue::Null);
    }

    #[test]
    fn host_type_field_is_not_the_type_tag() {
        let config = SourceConfig::from_json_str(
            r#"{"url": "https://talks.ox.ac.uk/show/index/42/", "type": "GET"}"#,
        )
        .unwrap();
        assert!(config.type_tag.is_none());

        let config = SourceConfig::from_json_str(
            r#"{"url": "x", "type": "POST", "dataType": "oxtalks"}"#,
        )
        .unwrap();
        assert_eq!(config.type_tag.as_deref(), Some("oxtalks"));
    }

    #[test]
    fn deserialize_native_field_names() {
        let config = SourceConfig::from_json_str(
            r#"{"address": "https://example.org/feed", "type_tag": "ics"}"#,
        )
        .unwrap();
        assert_eq!(config.address_str(), "https://example.org/feed");
        assert!(config.has_type_tag("ics"));
        assert!(config.editable.is_none());
        assert!(config.parameters.is_none());
    }

    #[test]
    fn malformed_json_is_configuration_error() {
        let err = SourceConfig::from_json_str("[1, 2").unwrap_err();
        assert_eq!(err.code(), crate::SourceErrorCode::InvalidConfiguration);
    }

    #[test]
    fn completion_callback_is_shared_by_clones() {
        let seen = Arc::new(Mutex::new(0usize));
        let counter = Arc::clone(&seen);
        let config = SourceConfig::new("x").on_complete(move |events| {
            *counter.lock().unwrap() += events.len();
        });
        let copy = config.clone();

        let callback = copy.on_complete.unwrap();
        callback(&[GenericEvent::new("1", "a", "u")]);
        assert_eq!(*seen.lock().unwrap(), 1);
        assert!(format!("{:?}", config).contains("<callback>"));
    }
}
