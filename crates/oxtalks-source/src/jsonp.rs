//! Script-callback (JSONP) response bodies.
//!
//! A script-callback response wraps its JSON in a call to a function named
//! by the requester: `cb123([{"id": 1}]);`. Executors that receive such a
//! body as text use [`unwrap_script_callback`] to get the JSON back before
//! handing it to a fetch specification.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use tracing::trace;

use crate::error::{SourceError, SourceResult};

/// Matches `name( ... )` with an optional trailing semicolon.
static CALLBACK_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^([A-Za-z_$][\w$.]*)\s*\((.*)\)\s*;?$").expect("Invalid callback regex")
});

/// Extracts and parses the JSON payload of a script-callback body.
///
/// Bodies that are already plain JSON are parsed as-is.
///
/// # Errors
///
/// Returns an `InvalidResponse` error if the payload is not valid JSON.
pub fn unwrap_script_callback(body: &str) -> SourceResult<Value> {
    let body = body.trim();
    let payload = match CALLBACK_REGEX.captures(body) {
        Some(caps) => {
            trace!(callback = &caps[1], "unwrapping script callback");
            caps.get(2).map_or("", |inner| inner.as_str())
        }
        None => body,
    };

    serde_json::from_str(payload.trim()).map_err(|e| {
        SourceError::invalid_response(format!("callback payload is not JSON: {e}")).with_source(e)
    })
}
