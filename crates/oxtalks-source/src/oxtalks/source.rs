//! The Oxford Talks classifier and transformer.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use oxtalks_core::DateWindow;

use super::OXTALKS_TYPE_TAG;
use super::address::{has_show_path, is_listing_address, rewrite_address};
use super::mapper::map_response;
use super::params::{has_date_keys, inject_window, translate_parameters};
use crate::config::{Parameters, SourceConfig};
use crate::diagnostics::{Diagnostic, DiagnosticSink, DiscardSink};
use crate::fetch::{FetchSpecification, HttpMethod, ResponseFormat};
use crate::registry::{SourceClassifier, SourceTransformer};

/// Adapter that lets the host load an Oxford Talks listing as an event source.
///
/// One value serves as both classifier and transformer; see
/// [`register`](super::register).
#[derive(Clone)]
pub struct OxTalksSource {
    sink: Arc<dyn DiagnosticSink>,
    inject_visible_range: bool,
}

impl Default for OxTalksSource {
    fn default() -> Self {
        Self {
            sink: Arc::new(DiscardSink),
            inject_visible_range: false,
        }
    }
}

impl OxTalksSource {
    /// Creates an adapter that discards diagnostics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to report diagnostics to `sink`.
    pub fn with_sink(mut self, sink: impl DiagnosticSink + 'static) -> Self {
        self.sink = Arc::new(sink);
        self
    }

    /// Builder method to report diagnostics to a sink shared with the caller.
    pub fn with_shared_sink(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Builder method to fill `start_time` / `end_time` from the visible
    /// window when the configuration names no date parameter at all.
    pub fn with_range_injection(mut self, enabled: bool) -> Self {
        self.inject_visible_range = enabled;
        self
    }

    /// Returns true if `config` belongs to the feed.
    ///
    /// Either the type tag says so, or there is no type tag and the address
    /// is a feed address.
    pub fn matches(&self, config: &SourceConfig) -> bool {
        match config.type_tag.as_deref() {
            Some(tag) => tag == OXTALKS_TYPE_TAG,
            None => is_listing_address(config.address_str()),
        }
    }

    /// Builds the fetch specification for `config`, using the current time
    /// for falsy date parameters.
    pub fn build(&self, config: &SourceConfig, window: &DateWindow) -> FetchSpecification {
        self.build_at(config, window, Utc::now())
    }

    /// Builds the fetch specification for `config` as of `now`.
    pub fn build_at(
        &self,
        config: &SourceConfig,
        window: &DateWindow,
        now: DateTime<Utc>,
    ) -> FetchSpecification {
        let address = match config.address.as_deref() {
            Some(address) => {
                if !has_show_path(address) {
                    self.sink.record(Diagnostic::AddressNotRewritten {
                        address: address.to_string(),
                    });
                }
                address
            }
            None => {
                self.sink.record(Diagnostic::MissingAddress);
                ""
            }
        };

        let mut parameters = match config.parameters {
            Some(ref parameters) => {
                translate_parameters(parameters, now, self.sink.as_ref()).into_owned()
            }
            None => Parameters::new(),
        };

        let configured_dates = config.parameters.as_ref().is_some_and(has_date_keys);
        if self.inject_visible_range && !configured_dates {
            inject_window(&mut parameters, window);
        }

        let success_sink = Arc::clone(&self.sink);
        let error_sink = Arc::clone(&self.sink);

        FetchSpecification::new(rewrite_address(address))
            .with_method(HttpMethod::Get)
            .with_response_format(ResponseFormat::ScriptCallback)
            .with_parameters(parameters)
            .with_editable(config.editable)
            .with_success_handler(move |payload| map_response(Some(payload), success_sink.as_ref()))
            .with_error_handler(move |error| {
                error_sink.record(Diagnostic::FetchFailed {
                    message: error.to_string(),
                });
            })
            .with_completion(config.on_complete.clone())
    }
}

impl SourceClassifier for OxTalksSource {
    fn source_type(&self) -> &str {
        OXTALKS_TYPE_TAG
    }

    fn classify(&self, config: &mut SourceConfig) -> bool {
        if !self.matches(config) {
            return false;
        }

        config.type_tag = Some(OXTALKS_TYPE_TAG.to_string());
        // Feed events are read-only unless the caller said otherwise.
        if config.editable.is_none() {
            config.editable = Some(false);
        }
        true
    }
}

impl SourceTransformer for OxTalksSource {
    fn source_type(&self) -> &str {
        OXTALKS_TYPE_TAG
    }

    fn transform(&self, config: &SourceConfig, window: &DateWindow) -> Option<FetchSpecification> {
        config
            .has_type_tag(OXTALKS_TYPE_TAG)
            .then(|| self.build(config, window))
    }
}

impl fmt::Debug for OxTalksSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OxTalksSource")
            .field("inject_visible_range", &self.inject_visible_range)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParamValue;
    use crate::diagnostics::CapturingSink;
    use crate::error::SourceError;
    use chrono::TimeZone;
    use serde_json::json;
    use std::sync::Mutex;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
    }

    fn window() -> DateWindow {
        DateWindow::new(utc(2013, 10, 1, 0, 0, 0), utc(2013, 11, 1, 0, 0, 0))
    }

    fn now() -> DateTime<Utc> {
        utc(2013, 10, 15, 12, 0, 0)
    }

    mod classify {
        use super::*;

        #[test]
        fn listing_address_without_tag_matches() {
            let mut config = SourceConfig::new("https://talks.ox.ac.uk/show/index/42/");
            assert!(OxTalksSource::new().classify(&mut config));
            assert_eq!(config.type_tag.as_deref(), Some("oxtalks"));
            assert_eq!(config.editable, Some(false));
        }

        #[test]
        fn host_config_with_http_method_matches() {
            let mut config = SourceConfig::from_json_str(
                r#"{"url": "https://talks.ox.ac.uk/show/index/42/", "type": "GET"}"#,
            )
            .unwrap();
            assert!(OxTalksSource::new().classify(&mut config));
            assert_eq!(config.type_tag.as_deref(), Some("oxtalks"));
        }

        #[test]
        fn explicit_tag_matches_without_address() {
            let mut config = SourceConfig::default().with_type_tag("oxtalks");
            assert!(OxTalksSource::new().classify(&mut config));
            assert_eq!(config.editable, Some(false));
        }

        #[test]
        fn explicit_tag_matches_any_address() {
            let mut config = SourceConfig::new("https://example.org/feed").with_type_tag("oxtalks");
            assert!(OxTalksSource::new().classify(&mut config));
        }

        #[test]
        fn explicit_editable_is_kept() {
            let mut config =
                SourceConfig::new("http://talks.ox.ac.uk/show/index/42/").with_editable(true);
            assert!(OxTalksSource::new().classify(&mut config));
            assert_eq!(config.editable, Some(true));
        }

        #[test]
        fn other_address_is_untouched() {
            let mut config = SourceConfig::new("https://example.org/calendar.json");
            assert!(!OxTalksSource::new().classify(&mut config));
            assert!(config.type_tag.is_none());
            assert!(config.editable.is_none());
        }

        #[test]
        fn other_tag_wins_over_listing_address() {
            let mut config =
                SourceConfig::new("https://talks.ox.ac.uk/show/index/42/").with_type_tag("json");
            assert!(!OxTalksSource::new().classify(&mut config));
            assert_eq!(config.type_tag.as_deref(), Some("json"));
            assert!(config.editable.is_none());
        }

        #[test]
        fn missing_address_and_tag_does_not_match() {
            let mut config = SourceConfig::default();
            assert!(!OxTalksSource::new().classify(&mut config));
            assert!(config.type_tag.is_none());
        }
    }

    mod transform {
        use super::*;

        #[test]
        fn ignores_other_sources() {
            let config = SourceConfig::new("https://talks.ox.ac.uk/show/index/42/");
            assert!(OxTalksSource::new().transform(&config, &window()).is_none());

            let config = SourceConfig::new("x").with_type_tag("ics");
            assert!(OxTalksSource::new().transform(&config, &window()).is_none());
        }

        #[test]
        fn builds_script_callback_request() {
            let config =
                SourceConfig::new("http://talks.ox.ac.uk/show/index/42/").with_type_tag("oxtalks");
            let spec = OxTalksSource::new().transform(&config, &window()).unwrap();

            assert_eq!(spec.address, "http://talks.ox.ac.uk/show/json/?callback=?");
            assert_eq!(spec.method, HttpMethod::Get);
            assert_eq!(spec.response_format, ResponseFormat::ScriptCallback);
            assert!(spec.start_param.is_none());
            assert!(spec.end_param.is_none());
            assert!(!spec.allows_range_injection());
            assert!(spec.parameters.is_empty());
        }

        #[test]
        fn carries_editable_default() {
            let mut config = SourceConfig::new("https://talks.ox.ac.uk/show/index/42/");
            let source = OxTalksSource::new();
            source.classify(&mut config);
            let spec = source.transform(&config, &window()).unwrap();
            assert_eq!(spec.editable, Some(false));
        }

        #[test]
        fn translates_parameters() {
            let config = SourceConfig::new("https://talks.ox.ac.uk/show/index/42/")
                .with_type_tag("oxtalks")
                .with_parameter("x_start_datetime", utc(2013, 10, 1, 9, 30, 0))
                .with_parameter("start_time", 999_i64)
                .with_parameter("limit", 5_i64);
            let spec = OxTalksSource::new().build_at(&config, &window(), now());

            assert_eq!(spec.parameters.len(), 2);
            assert_eq!(
                spec.parameters["start_time"],
                ParamValue::Integer(1_380_619_800)
            );
            assert_eq!(spec.parameters["limit"], ParamValue::Integer(5));

            let original = config.parameters.unwrap();
            assert_eq!(original["start_time"], ParamValue::Integer(999));
            assert!(original.contains_key("x_start_datetime"));
        }

        #[test]
        fn empty_new_style_start_keeps_legacy_start() {
            let config = SourceConfig::new("https://talks.ox.ac.uk/show/index/42/")
                .with_parameter("x_start_datetime", "")
                .with_parameter("start_time", 5_i64);
            let spec = OxTalksSource::new().build_at(&config, &window(), now());

            assert_eq!(spec.parameters.len(), 1);
            assert_eq!(spec.parameters["start_time"], ParamValue::Integer(5));
        }

        #[test]
        fn window_is_ignored_by_default() {
            let config = SourceConfig::new("https://talks.ox.ac.uk/show/index/42/")
                .with_type_tag("oxtalks")
                .with_parameter("limit", 5_i64);
            let spec = OxTalksSource::new().build_at(&config, &window(), now());
            assert!(!spec.parameters.contains_key("start_time"));
            assert!(!spec.parameters.contains_key("end_time"));
        }

        #[test]
        fn window_injection_when_enabled() {
            let config =
                SourceConfig::new("https://talks.ox.ac.uk/show/index/42/").with_type_tag("oxtalks");
            let spec = OxTalksSource::new()
                .with_range_injection(true)
                .build_at(&config, &window(), now());

            assert_eq!(
                spec.parameters["start_time"],
                ParamValue::Integer(1_380_585_600)
            );
            assert_eq!(
                spec.parameters["end_time"],
                ParamValue::Integer(1_383_264_000)
            );
        }

        #[test]
        fn window_injection_defers_to_configured_dates() {
            let config = SourceConfig::new("https://talks.ox.ac.uk/show/index/42/")
                .with_type_tag("oxtalks")
                .with_parameter("x_end_datetime", "2013-10-02");
            let spec = OxTalksSource::new()
                .with_range_injection(true)
                .build_at(&config, &window(), now());

            assert_eq!(spec.parameters.len(), 1);
            assert_eq!(
                spec.parameters["end_time"],
                ParamValue::Integer(1_380_672_000)
            );
        }

        #[test]
        fn missing_address_is_reported() {
            let sink = Arc::new(CapturingSink::new());
            let config = SourceConfig::default().with_type_tag("oxtalks");
            let spec = OxTalksSource::new()
                .with_shared_sink(sink.clone())
                .build_at(&config, &window(), now());

            assert_eq!(spec.address, "?callback=?");
            assert_eq!(sink.diagnostics(), vec![Diagnostic::MissingAddress]);
        }

        #[test]
        fn unexpected_address_shape_is_reported() {
            let sink = Arc::new(CapturingSink::new());
            let config = SourceConfig::new("https://example.org/talks").with_type_tag("oxtalks");
            let spec = OxTalksSource::new()
                .with_shared_sink(sink.clone())
                .build_at(&config, &window(), now());

            assert_eq!(spec.address, "https://example.org/talks?callback=?");
            assert!(sink.contains(|d| matches!(d, Diagnostic::AddressNotRewritten { .. })));
        }
    }

    mod handlers {
        use super::*;

        fn spec_with_sink(sink: Arc<CapturingSink>) -> FetchSpecification {
            let config =
                SourceConfig::new("https://talks.ox.ac.uk/show/index/42/").with_type_tag("oxtalks");
            OxTalksSource::new()
                .with_shared_sink(sink)
                .build_at(&config, &window(), now())
        }

        #[test]
        fn success_maps_payload() {
            let spec = spec_with_sink(Arc::new(CapturingSink::new()));
            let events = spec.handle_success(&json!([
                {"id": 1, "start_time": 100, "end_time": 200, "title": "T"}
            ]));

            assert_eq!(events.len(), 1);
            assert_eq!(events[0].url, "https://talks.ox.ac.uk/talk/index/1");
            assert!(!events[0].all_day);
        }

        #[test]
        fn success_with_null_payload_is_empty() {
            let spec = spec_with_sink(Arc::new(CapturingSink::new()));
            assert!(spec.handle_success(&serde_json::Value::Null).is_empty());
        }

        #[test]
        fn error_is_swallowed_and_reported() {
            let sink = Arc::new(CapturingSink::new());
            let spec = spec_with_sink(sink.clone());
            spec.handle_error(&SourceError::transport("HTTP 502").with_source_type("oxtalks"));

            assert_eq!(
                sink.diagnostics(),
                vec![Diagnostic::FetchFailed {
                    message: "[oxtalks] transport: HTTP 502".to_string()
                }]
            );
        }

        #[test]
        fn completion_callback_sees_events() {
            let seen = Arc::new(Mutex::new(Vec::new()));
            let recorder = Arc::clone(&seen);
            let config = SourceConfig::new("https://talks.ox.ac.uk/show/index/42/")
                .with_type_tag("oxtalks")
                .on_complete(move |events| {
                    recorder
                        .lock()
                        .unwrap()
                        .extend(events.iter().map(|e| e.title.clone()));
                });
            let spec = OxTalksSource::new().build_at(&config, &window(), now());

            spec.handle_success(&json!([{"id": 1, "title": "A"}, {"id": 2, "title": "B"}]));
            assert_eq!(*seen.lock().unwrap(), vec!["A".to_string(), "B".to_string()]);
        }
    }
}
