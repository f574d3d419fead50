//! Classifier and transformer traits, and the host-owned registry.
//!
//! A host keeps one [`SourceRegistry`] and lets adapters register into it
//! once at startup. The registry then drives two phases:
//!
//! 1. **Classification** (configuration time): every classifier sees every
//!    source and may tag it with its type and fill in defaults.
//! 2. **Transformation** (refresh time): transformers are asked in
//!    registration order; the first one that recognises the source returns
//!    the [`FetchSpecification`] the host executes.

use std::sync::Arc;

use oxtalks_core::DateWindow;

use crate::config::SourceConfig;
use crate::fetch::FetchSpecification;

/// Decides whether a source configuration belongs to an adapter.
pub trait SourceClassifier: Send + Sync {
    /// Returns the type tag this classifier assigns (e.g., "oxtalks").
    fn source_type(&self) -> &str;

    /// Tags `config` and fills in defaults when it matches.
    ///
    /// Returns true on match. A classifier that does not match must leave
    /// `config` untouched.
    fn classify(&self, config: &mut SourceConfig) -> bool;
}

/// Turns a classified source into a fetch specification.
pub trait SourceTransformer: Send + Sync {
    /// Returns the type tag this transformer handles.
    fn source_type(&self) -> &str;

    /// Builds the request for `config` over the visible `window`.
    ///
    /// Returns `None` when the source belongs to some other adapter.
    fn transform(&self, config: &SourceConfig, window: &DateWindow) -> Option<FetchSpecification>;
}

/// Ordered lists of classifiers and transformers owned by the host.
#[derive(Default, Clone)]
pub struct SourceRegistry {
    classifiers: Vec<Arc<dyn SourceClassifier>>,
    transformers: Vec<Arc<dyn SourceTransformer>>,
}

impl SourceRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a classifier.
    pub fn register_classifier(&mut self, classifier: Arc<dyn SourceClassifier>) {
        self.classifiers.push(classifier);
    }

    /// Appends a transformer.
    pub fn register_transformer(&mut self, transformer: Arc<dyn SourceTransformer>) {
        self.transformers.push(transformer);
    }

    /// Number of registered classifiers.
    pub fn classifier_count(&self) -> usize {
        self.classifiers.len()
    }

    /// Number of registered transformers.
    pub fn transformer_count(&self) -> usize {
        self.transformers.len()
    }

    /// Runs every classifier over `config`, in registration order.
    ///
    /// Returns true if at least one classifier matched.
    pub fn classify(&self, config: &mut SourceConfig) -> bool {
        let mut matched = false;
        for classifier in &self.classifiers {
            if classifier.classify(config) {
                tracing::trace!(source_type = classifier.source_type(), "source classified");
                matched = true;
            }
        }
        matched
    }

    /// Asks transformers in registration order and returns the first
    /// specification produced.
    pub fn resolve(&self, config: &SourceConfig, window: &DateWindow) -> Option<FetchSpecification> {
        self.transformers
            .iter()
            .find_map(|transformer| transformer.transform(config, window))
    }
}

impl std::fmt::Debug for SourceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let classifiers: Vec<&str> = self.classifiers.iter().map(|c| c.source_type()).collect();
        let transformers: Vec<&str> = self.transformers.iter().map(|t| t.source_type()).collect();
        f.debug_struct("SourceRegistry")
            .field("classifiers", &classifiers)
            .field("transformers", &transformers)
            .finish()
    }
}
