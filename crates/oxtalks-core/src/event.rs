//! Event types handed to the calendar host.
//!
//! [`GenericEvent`] is the normalized shape every source adapter produces and
//! the rendering host consumes, regardless of the feed it came from.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A calendar event in the host's generic shape.
///
/// Times are optional because feed records are untrusted: a record with an
/// unreadable timestamp still yields an event so the output keeps one entry
/// per input record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenericEvent {
    /// Identifier of the event within its source, rendered verbatim.
    pub id: String,
    /// When the event starts.
    pub start: Option<DateTime<Utc>>,
    /// When the event ends.
    pub end: Option<DateTime<Utc>>,
    /// The event title.
    pub title: String,
    /// Link to a page describing the event.
    pub url: String,
    /// Whether the event spans whole days rather than precise times.
    pub all_day: bool,
}

impl GenericEvent {
    /// Creates a timed event with the required fields.
    pub fn new(id: impl Into<String>, title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            start: None,
            end: None,
            title: title.into(),
            url: url.into(),
            all_day: false,
        }
    }

    /// Builder method to set the start and end times.
    pub fn with_times(mut self, start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Self {
        self.start = start;
        self.end = end;
        self
    }

    /// Builder method to mark the event as all-day.
    pub fn with_all_day(mut self, all_day: bool) -> Self {
        self.all_day = all_day;
        self
    }
}
