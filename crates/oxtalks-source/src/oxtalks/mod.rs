//! Oxford Talks feed adapter.
//!
//! Lets the host consume a talks.ox.ac.uk listing as a native event source.
//! Any source whose address looks like
//!
//! ```text
//! http(s)://talks.ox.ac.uk/show/<format>/<listing>/
//! ```
//!
//! or whose type tag is `oxtalks` is picked up, pointed at the listing's
//! script-callback JSON endpoint, and its records mapped to
//! [`GenericEvent`](oxtalks_core::GenericEvent)s.
//!
//! # Example
//!
//! ```
//! use chrono::{TimeZone, Utc};
//! use oxtalks_core::DateWindow;
//! use oxtalks_source::{SourceConfig, SourceRegistry, oxtalks};
//!
//! let mut registry = SourceRegistry::new();
//! oxtalks::register(&mut registry);
//!
//! let mut config = SourceConfig::new("https://talks.ox.ac.uk/show/index/42/")
//!     .with_parameter("x_start_datetime", "2013-10-01");
//! registry.classify(&mut config);
//!
//! let window = DateWindow::new(
//!     Utc.with_ymd_and_hms(2013, 10, 1, 0, 0, 0).unwrap(),
//!     Utc.with_ymd_and_hms(2013, 11, 1, 0, 0, 0).unwrap(),
//! );
//! let spec = registry.resolve(&config, &window).unwrap();
//! assert_eq!(spec.address, "https://talks.ox.ac.uk/show/json/?callback=?");
//! ```

mod address;
mod mapper;
mod params;
mod raw_talk;
mod source;


use std::sync::Arc;

use crate::registry::{SourceClassifier, SourceRegistry, SourceTransformer};

pub use address::{has_show_path, is_listing_address, rewrite_address};
pub use mapper::{detail_url, map_response};
pub use params::{
    END_TIME, START_TIME, X_END_DATETIME, X_START_DATETIME, needs_translation, to_epoch_seconds,
    translate_parameters,
};
pub use raw_talk::RawTalk;
pub use source::OxTalksSource;

/// Type tag of feed-backed sources.
pub const OXTALKS_TYPE_TAG: &str = "oxtalks";

/// Replacement for the `show/<path>/` segment of a listing address.
pub const JSON_LIST_PATH: &str = "://talks.ox.ac.uk/show/json/";

/// Query suffix requesting script-callback delivery.
pub const SCRIPT_CALLBACK_SUFFIX: &str = "?callback=?";

/// Prefix of a talk's detail page; the identifier is appended verbatim.
pub const DETAIL_URL_PREFIX: &str = "https://talks.ox.ac.uk/talk/index/";

/// Registers the adapter with default settings.
pub fn register(registry: &mut SourceRegistry) {
    register_with(registry, OxTalksSource::default());
}

/// Registers `source` as both a classifier and a transformer.
pub fn register_with(registry: &mut SourceRegistry, source: OxTalksSource) {
    let source = Arc::new(source);
    registry.register_classifier(Arc::clone(&source) as Arc<dyn SourceClassifier>);
    registry.register_transformer(source as Arc<dyn SourceTransformer>);
}
