//! Event-source registry and the Oxford Talks feed adapter.
//!
//! This crate provides the seam between a calendar host and the feeds it
//! renders:
//!
//! - [`SourceConfig`] - How the host describes a configured source
//! - [`SourceClassifier`] / [`SourceTransformer`] - The two extension points
//! - [`SourceRegistry`] - Host-owned, ordered list of both
//! - [`FetchSpecification`] - What a transformer hands back for execution
//! - [`DiagnosticSink`] - Where adapters report problems instead of failing
//! - [`oxtalks`] - The Oxford Talks adapter
//!
//! # Architecture
//!
//! ```text
//!  configuration time              refresh time
//! ┌──────────────────┐        ┌──────────────────┐
//! │  SourceConfig    │        │  DateWindow      │
//! └────────┬─────────┘        └────────┬─────────┘
//!          │ classify()                │
//!          ▼                           ▼
//! ┌──────────────────┐  resolve() ┌────────────────────┐
//! │ SourceRegistry   │ ─────────▶ │ FetchSpecification │
//! └──────────────────┘            └─────────┬──────────┘
//!                                           │ host executes request
//!                                           ▼ handle_success()
//!                                  ┌──────────────────┐
//!                                  │ Vec<GenericEvent>│
//!                                  └──────────────────┘
//! ```

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod fetch;
pub mod jsonp;
pub mod oxtalks;
pub mod registry;

// Re-export main types at crate root
pub use config::{CompletionCallback, ParamValue, Parameters, SourceConfig};
pub use diagnostics::{CapturingSink, Diagnostic, DiagnosticSink, DiscardSink, TracingSink};
pub use error::{SourceError, SourceErrorCode, SourceResult};
pub use fetch::{
    CALLBACK_PLACEHOLDER, ErrorHandler, FetchSpecification, HttpMethod, ResponseFormat,
    SuccessHandler,
};
pub use jsonp::unwrap_script_callback;
pub use registry::{SourceClassifier, SourceRegistry, SourceTransformer};
