//! Request parameter and timestamp translation.
//!
//! Users describe the date range of a listing with human date values under
//! `x_start_datetime` / `x_end_datetime`. The feed only understands
//! `start_time` / `end_time` in epoch seconds, so those keys are converted
//! and any legacy value they override is dropped.

use std::borrow::Cow;

use chrono::{DateTime, Utc};
use oxtalks_core::{DateWindow, epoch_seconds, from_epoch_millis, parse_datetime};

use crate::config::{ParamValue, Parameters};
use crate::diagnostics::{Diagnostic, DiagnosticSink};

/// New-style start of the listing range (human date value).
pub const X_START_DATETIME: &str = "x_start_datetime";
/// New-style end of the listing range (human date value).
pub const X_END_DATETIME: &str = "x_end_datetime";
/// Feed start parameter (epoch seconds).
pub const START_TIME: &str = "start_time";
/// Feed end parameter (epoch seconds).
pub const END_TIME: &str = "end_time";

/// Returns true if `parameters` holds either new-style date key.
///
/// Presence is what counts, not the value.
pub fn needs_translation(parameters: &Parameters) -> bool {
    parameters.contains_key(X_START_DATETIME) || parameters.contains_key(X_END_DATETIME)
}

/// Converts a parameter value to epoch seconds.
///
/// - falsy or absent values mean `now`
/// - date/times are used directly
/// - text is parsed with [`parse_datetime`]
/// - numbers are milliseconds since the epoch, `true` is one millisecond
///
/// Returns `None` if the value cannot be read as a date/time.
pub fn to_epoch_seconds(value: Option<&ParamValue>, now: DateTime<Utc>) -> Option<i64> {
    let Some(value) = value.filter(|v| v.is_truthy()) else {
        return Some(epoch_seconds(now));
    };

    let datetime = match value {
        ParamValue::DateTime(dt) => Some(*dt),
        ParamValue::Text(text) => parse_datetime(text).ok(),
        ParamValue::Integer(millis) => from_epoch_millis(*millis),
        ParamValue::Float(millis) if millis.is_finite() => from_epoch_millis(millis.trunc() as i64),
        // `true` counts as one millisecond.
        ParamValue::Bool(true) => from_epoch_millis(1),
        ParamValue::Float(_) | ParamValue::Bool(false) | ParamValue::Null => None,
    };

    datetime.map(epoch_seconds)
}

/// Translates new-style date parameters into feed parameters.
///
/// Without `x_start_datetime` or `x_end_datetime` the input is returned
/// borrowed and untouched. Otherwise a new mapping is built where:
///
/// - `x_start_datetime` / `x_end_datetime` become `start_time` / `end_time`
/// - a legacy `start_time` / `end_time` survives only if the matching
///   new-style value is falsy (an empty string or `0` still lets the legacy
///   value through)
/// - every other key is copied unchanged
///
/// A falsy new-style value only resolves to "now" when there is no legacy
/// value to fall back on.
pub fn translate_parameters<'a>(
    parameters: &'a Parameters,
    now: DateTime<Utc>,
    sink: &dyn DiagnosticSink,
) -> Cow<'a, Parameters> {
    if !needs_translation(parameters) {
        return Cow::Borrowed(parameters);
    }

    let start_overridden = parameters
        .get(X_START_DATETIME)
        .is_some_and(ParamValue::is_truthy);
    let end_overridden = parameters
        .get(X_END_DATETIME)
        .is_some_and(ParamValue::is_truthy);
    let start_fallback = !start_overridden && parameters.contains_key(START_TIME);
    let end_fallback = !end_overridden && parameters.contains_key(END_TIME);

    let mut translated = Parameters::new();
    for (key, value) in parameters {
        match key.as_str() {
            X_START_DATETIME if start_fallback => {}
            X_END_DATETIME if end_fallback => {}
            X_START_DATETIME => convert_into(&mut translated, START_TIME, key, value, now, sink),
            X_END_DATETIME => convert_into(&mut translated, END_TIME, key, value, now, sink),
            START_TIME if start_overridden => {}
            END_TIME if end_overridden => {}
            _ => {
                translated.insert(key.clone(), value.clone());
            }
        }
    }

    sink.record(Diagnostic::ParametersTranslated {
        keys: translated.keys().cloned().collect(),
    });
    Cow::Owned(translated)
}

/// Returns true if any of the four date keys is configured.
pub fn has_date_keys(parameters: &Parameters) -> bool {
    [X_START_DATETIME, X_END_DATETIME, START_TIME, END_TIME]
        .iter()
        .any(|key| parameters.contains_key(*key))
}

/// Fills `start_time` / `end_time` from the visible window.
pub fn inject_window(parameters: &mut Parameters, window: &DateWindow) {
    let (start, end) = window.as_epoch_seconds();
    parameters.insert(START_TIME.to_string(), ParamValue::Integer(start));
    parameters.insert(END_TIME.to_string(), ParamValue::Integer(end));
}

fn convert_into(
    translated: &mut Parameters,
    target: &str,
    key: &str,
    value: &ParamValue,
    now: DateTime<Utc>,
    sink: &dyn DiagnosticSink,
) {
    match to_epoch_seconds(Some(value), now) {
        Some(secs) => {
            translated.insert(target.to_string(), ParamValue::Integer(secs));
        }
        None => sink.record(Diagnostic::UnparseableDate {
            key: key.to_string(),
            value: value.to_query_value(),
        }),
    }
}
