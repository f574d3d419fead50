//! Diagnostic reporting for source adapters.
//!
//! Adapters never surface feed problems to the host as errors. They describe
//! what happened to a [`DiagnosticSink`] instead, which by default throws
//! everything away ([`DiscardSink`]). Hosts that want the messages in their
//! logs install [`TracingSink`]; tests use [`CapturingSink`].

use std::fmt;
use std::sync::{Arc, Mutex};

use tracing::{debug, warn};

/// Something an adapter noticed while classifying, transforming or mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// A matched source has no address to rewrite.
    MissingAddress,
    /// The address did not have the shape the rewriter expects.
    AddressNotRewritten {
        /// The address as configured.
        address: String,
    },
    /// Date parameters were converted for the feed.
    ParametersTranslated {
        /// Parameter names in the translated mapping.
        keys: Vec<String>,
    },
    /// A date parameter could not be read and was left out of the request.
    UnparseableDate {
        /// Parameter name as configured.
        key: String,
        /// The value as configured.
        value: String,
    },
    /// The host reported a failed fetch.
    FetchFailed {
        /// Human-readable description of the failure.
        message: String,
    },
    /// The response payload was present but not a list.
    PayloadNotList,
    /// A list element could not be read as a record.
    MalformedRecord {
        /// Position of the element in the payload.
        index: usize,
    },
}

impl Diagnostic {
    /// Returns true for diagnostics that describe a failure.
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Self::MissingAddress
                | Self::UnparseableDate { .. }
                | Self::FetchFailed { .. }
                | Self::PayloadNotList
                | Self::MalformedRecord { .. }
        )
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingAddress => write!(f, "source has no address"),
            Self::AddressNotRewritten { address } => {
                write!(f, "address {} does not match the listing pattern", address)
            }
            Self::ParametersTranslated { keys } => {
                write!(f, "translated parameters: {}", keys.join(", "))
            }
            Self::UnparseableDate { key, value } => {
                write!(f, "cannot read {} = {:?} as a date", key, value)
            }
            Self::FetchFailed { message } => write!(f, "fetch failed: {}", message),
            Self::PayloadNotList => write!(f, "response payload is not a list"),
            Self::MalformedRecord { index } => write!(f, "record {} is not an object", index),
        }
    }
}

/// Receives diagnostics from adapters.
pub trait DiagnosticSink: Send + Sync {
    /// Records a single diagnostic.
    fn record(&self, diagnostic: Diagnostic);
}

/// A sink that drops everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct DiscardSink;

impl DiagnosticSink for DiscardSink {
    fn record(&self, _diagnostic: Diagnostic) {}
}

/// A sink that forwards diagnostics to `tracing`.
///
/// Failures are logged at `warn`, everything else at `debug`.
#[derive(Debug, Clone)]
pub struct TracingSink {
    source_type: String,
}

impl TracingSink {
    /// Creates a sink that tags each event with the given source type.
    pub fn new(source_type: impl Into<String>) -> Self {
        Self {
            source_type: source_type.into(),
        }
    }
}

impl DiagnosticSink for TracingSink {
    fn record(&self, diagnostic: Diagnostic) {
        if diagnostic.is_failure() {
            warn!(source_type = %self.source_type, "{}", diagnostic);
        } else {
            debug!(source_type = %self.source_type, "{}", diagnostic);
        }
    }
}

/// A sink that keeps every diagnostic in memory.
#[derive(Debug, Default)]
pub struct CapturingSink {
    captured: Mutex<Vec<Diagnostic>>,
}

impl CapturingSink {
    /// Creates an empty capturing sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of everything recorded so far.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.captured
            .lock()
            .map(|captured| captured.clone())
            .unwrap_or_default()
    }

    /// Returns true if any recorded diagnostic satisfies `predicate`.
    pub fn contains(&self, predicate: impl Fn(&Diagnostic) -> bool) -> bool {
        self.diagnostics().iter().any(predicate)
    }
}

impl DiagnosticSink for CapturingSink {
    fn record(&self, diagnostic: Diagnostic) {
        if let Ok(mut captured) = self.captured.lock() {
            captured.push(diagnostic);
        }
    }
}

impl<S: DiagnosticSink + ?Sized> DiagnosticSink for Arc<S> {
    fn record(&self, diagnostic: Diagnostic) {
        (**self).record(diagnostic);
    }
}
