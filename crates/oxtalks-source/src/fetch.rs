//! Fetch specifications produced by source transformers.
//!
//! A [`FetchSpecification`] is everything the host's generic fetch executor
//! needs to load one source: where to send the request, how, which
//! parameters to attach, and what to do with the response. The executor
//! performs the request itself and calls back into
//! [`FetchSpecification::handle_success`] or
//! [`FetchSpecification::handle_error`].

use std::fmt;
use std::sync::Arc;

use oxtalks_core::GenericEvent;
use serde_json::Value;
use url::form_urlencoded;

use crate::config::{CompletionCallback, Parameters};
use crate::error::SourceError;

/// Placeholder the executor replaces with its generated callback name.
pub const CALLBACK_PLACEHOLDER: &str = "callback=?";

/// Maps a raw response payload to events.
pub type SuccessHandler = Arc<dyn Fn(&Value) -> Vec<GenericEvent> + Send + Sync>;

/// Observes a failed fetch.
pub type ErrorHandler = Arc<dyn Fn(&SourceError) + Send + Sync>;

/// HTTP method of the request.
///
/// Script-callback delivery is always a GET.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HttpMethod {
    #[default]
    Get,
}

/// How the remote delivers its response body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResponseFormat {
    /// Plain JSON.
    #[default]
    Json,
    /// JSON wrapped in a caller-named function call (JSONP).
    ScriptCallback,
}

/// A fully resolved request for the host's fetch executor.
#[derive(Clone)]
pub struct FetchSpecification {
    /// Request address, possibly containing [`CALLBACK_PLACEHOLDER`].
    pub address: String,
    /// HTTP method.
    pub method: HttpMethod,
    /// Response delivery format.
    pub response_format: ResponseFormat,
    /// Name of the query parameter the host may use to inject the visible
    /// range start. `None` disables injection.
    pub start_param: Option<String>,
    /// Name of the query parameter for the visible range end. `None`
    /// disables injection.
    pub end_param: Option<String>,
    /// Query parameters to send.
    pub parameters: Parameters,
    /// Whether events from this source may be edited by the user.
    pub editable: Option<bool>,
    success_handler: SuccessHandler,
    error_handler: ErrorHandler,
    on_complete: Option<CompletionCallback>,
}

impl FetchSpecification {
    /// Creates a GET specification for plain JSON with host range
    /// injection left disabled and no-op handlers.
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            method: HttpMethod::Get,
            response_format: ResponseFormat::Json,
            start_param: None,
            end_param: None,
            parameters: Parameters::new(),
            editable: None,
            success_handler: Arc::new(no_events),
            error_handler: Arc::new(ignore_error),
            on_complete: None,
        }
    }

    /// Builder method to set the HTTP method.
    pub fn with_method(mut self, method: HttpMethod) -> Self {
        self.method = method;
        self
    }

    /// Builder method to set the response format.
    pub fn with_response_format(mut self, format: ResponseFormat) -> Self {
        self.response_format = format;
        self
    }

    /// Builder method to let the host inject the visible range under the
    /// given parameter names.
    pub fn with_range_params(mut self, start: impl Into<String>, end: impl Into<String>) -> Self {
        self.start_param = Some(start.into());
        self.end_param = Some(end.into());
        self
    }

    /// Builder method to set the request parameters.
    pub fn with_parameters(mut self, parameters: Parameters) -> Self {
        self.parameters = parameters;
        self
    }

    /// Builder method to set editability.
    pub fn with_editable(mut self, editable: Option<bool>) -> Self {
        self.editable = editable;
        self
    }

    /// Builder method to set the success handler.
    pub fn with_success_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&Value) -> Vec<GenericEvent> + Send + Sync + 'static,
    {
        self.success_handler = Arc::new(handler);
        self
    }

    /// Builder method to set the error handler.
    pub fn with_error_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&SourceError) + Send + Sync + 'static,
    {
        self.error_handler = Arc::new(handler);
        self
    }

    /// Builder method to set the completion callback.
    pub fn with_completion(mut self, callback: Option<CompletionCallback>) -> Self {
        self.on_complete = callback;
        self
    }

    /// Returns true if the host may inject its own range parameters.
    pub fn allows_range_injection(&self) -> bool {
        self.start_param.is_some() || self.end_param.is_some()
    }

    /// Maps a successful response payload to events.
    ///
    /// The completion callback, if any, sees the events before they are
    /// returned.
    pub fn handle_success(&self, payload: &Value) -> Vec<GenericEvent> {
        let events = (self.success_handler)(payload);
        if let Some(ref callback) = self.on_complete {
            callback(&events);
        }
        events
    }

    /// Reports a failed fetch to the error handler.
    pub fn handle_error(&self, error: &SourceError) {
        (self.error_handler)(error);
    }

    /// Builds the full request URL.
    ///
    /// Replaces [`CALLBACK_PLACEHOLDER`] with `callback=<callback_name>` and
    /// appends the parameters form-urlencoded.
    pub fn request_url(&self, callback_name: &str) -> String {
        let mut url = self
            .address
            .replacen(CALLBACK_PLACEHOLDER, &format!("callback={callback_name}"), 1);

        if self.parameters.is_empty() {
            return url;
        }

        let mut query = form_urlencoded::Serializer::new(String::new());
        for (key, value) in &self.parameters {
            query.append_pair(key, &value.to_query_value());
        }

        url.push(if url.contains('?') { '&' } else { '?' });
        url.push_str(&query.finish());
        url
    }
}

fn no_events(_payload: &Value) -> Vec<GenericEvent> {
    Vec::new()
}

fn ignore_error(_error: &SourceError) {}

impl fmt::Debug for FetchSpecification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FetchSpecification")
            .field("address", &self.address)
            .field("method", &self.method)
            .field("response_format", &self.response_format)
            .field("start_param", &self.start_param)
            .field("end_param", &self.end_param)
            .field("parameters", &self.parameters)
            .field("editable", &self.editable)
            .finish_non_exhaustive()
    }
}
