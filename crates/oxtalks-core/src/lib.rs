//! Core types: date windows, generic events, epoch timestamps, tracing

pub mod event;
pub mod time;
pub mod tracing;

pub use event::GenericEvent;
pub use time::{
    DateParseError, DateWindow, epoch_seconds, from_epoch_millis, from_epoch_seconds,
    parse_datetime,
};
pub use self::tracing::{LogFormat, TracingConfig, TracingError, build_subscriber, init_tracing};
