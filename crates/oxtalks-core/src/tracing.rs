//! Log subscriber for hosts embedding the adapters.
//!
//! Adapters report through a diagnostic sink. A host that forwards those
//! diagnostics to `tracing` installs a subscriber once at startup:
//!
//! ```ignore
//! use oxtalks_core::tracing::{init_tracing, LogFormat, TracingConfig};
//!
//! init_tracing(&TracingConfig::default().with_format(LogFormat::Json))?;
//! ```
//!
//! `RUST_LOG` takes precedence over the configured level unless an explicit
//! filter is given.

use std::io;

use thiserror::Error;
use tracing::{Level, Subscriber};
use tracing_subscriber::{EnvFilter, fmt, fmt::MakeWriter, prelude::*};

/// Target prefix of every adapter crate (`oxtalks_core`, `oxtalks_source`).
const LOG_TARGET_PREFIX: &str = "oxtalks";

/// Errors raised while installing the subscriber.
#[derive(Debug, Error)]
pub enum TracingError {
    /// A global subscriber is already installed.
    #[error("failed to set global tracing subscriber: {0}")]
    SetGlobalSubscriber(#[from] tracing::subscriber::SetGlobalDefaultError),

    /// The filter directive does not parse.
    #[error("failed to parse env filter: {0}")]
    EnvFilter(#[from] tracing_subscriber::filter::ParseError),
}

/// Line format of emitted events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Compact single-line text.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

/// Subscriber settings.
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Level for adapter targets when neither `RUST_LOG` nor `filter` is set.
    pub level: Level,
    pub format: LogFormat,
    /// Colour text output.
    pub ansi: bool,
    /// Explicit filter directive; ignores `RUST_LOG` when set.
    pub filter: Option<String>,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            format: LogFormat::Text,
            ansi: true,
            filter: None,
        }
    }
}

impl TracingConfig {
    /// Builder method to set the adapter log level.
    #[must_use]
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Builder method to set the line format.
    #[must_use]
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Builder method to set an explicit filter directive.
    #[must_use]
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    fn env_filter(&self) -> Result<EnvFilter, TracingError> {
        match &self.filter {
            Some(filter) => Ok(EnvFilter::try_new(filter)?),
            None => Ok(EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_directive(self.level)))),
        }
    }
}

/// Builds a subscriber writing to `writer`, without installing it.
///
/// # Errors
///
/// Returns an error if the filter directive is invalid.
pub fn build_subscriber<W>(
    config: &TracingConfig,
    writer: W,
) -> Result<Box<dyn Subscriber + Send + Sync>, TracingError>
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let registry = tracing_subscriber::registry().with(config.env_filter()?);
    let subscriber: Box<dyn Subscriber + Send + Sync> = match config.format {
        LogFormat::Text => Box::new(
            registry.with(
                fmt::layer()
                    .compact()
                    .with_ansi(config.ansi)
                    .with_writer(writer),
            ),
        ),
        LogFormat::Json => Box::new(registry.with(fmt::layer().json().with_writer(writer))),
    };
    Ok(subscriber)
}

/// Installs a stderr subscriber as the global default.
///
/// # Errors
///
/// Returns an error if a global subscriber is already set or if the filter
/// directive is invalid.
pub fn init_tracing(config: &TracingConfig) -> Result<(), TracingError> {
    tracing::subscriber::set_global_default(build_subscriber(config, io::stderr)?)?;
    Ok(())
}

fn default_directive(level: Level) -> String {
    format!("{LOG_TARGET_PREFIX}={level}")
}
