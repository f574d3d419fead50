//! Response payload to [`GenericEvent`] mapping.

use oxtalks_core::GenericEvent;
use serde_json::Value;

use super::DETAIL_URL_PREFIX;
use super::raw_talk::RawTalk;
use crate::diagnostics::{Diagnostic, DiagnosticSink};

/// Returns the detail page link for a talk identifier.
///
/// Always https, whatever scheme the listing was requested with.
pub fn detail_url(id: &str) -> String {
    format!("{DETAIL_URL_PREFIX}{id}")
}

/// Maps a listing payload to events, one per record, in input order.
///
/// An absent, null or empty payload gives no events. So does a payload that
/// is not a list, which is also reported to `sink`. Elements that are not
/// objects still produce an (empty) event so the output keeps one entry per
/// input record.
pub fn map_response(payload: Option<&Value>, sink: &dyn DiagnosticSink) -> Vec<GenericEvent> {
    let records = match payload {
        None | Some(Value::Null) => return Vec::new(),
        Some(Value::Array(records)) => records,
        Some(_) => {
            sink.record(Diagnostic::PayloadNotList);
            return Vec::new();
        }
    };

    records
        .iter()
        .enumerate()
        .map(|(index, record)| {
            let talk = RawTalk::from_value(record).unwrap_or_else(|| {
                sink.record(Diagnostic::MalformedRecord { index });
                RawTalk::default()
            });
            to_event(talk)
        })
        .collect()
}

/// Converts one raw talk to a timed event.
fn to_event(talk: RawTalk) -> GenericEvent {
    let id = talk.id.unwrap_or_default();
    let url = detail_url(&id);
    GenericEvent::new(id, talk.title.unwrap_or_default(), url)
        .with_times(talk.start_time, talk.end_time)
        .with_all_day(false)
}
