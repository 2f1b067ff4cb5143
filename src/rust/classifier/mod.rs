//! Sentiment classifier backends and the contract they share.
//!
//! Every backend implements [`SentimentClassifier`]. The runner only ever sees
//! the trait, so local and remote backends are interchangeable.

mod builder;
mod embedding;
mod error;
mod lexicon;
mod prototype;
mod remote;
mod utils;

pub use builder::{default_sentiment_classes, ClassDefinition, PrototypeClassifierBuilder};
pub use error::ClassifierError;
pub use lexicon::{LexiconClassifier, DEFAULT_THRESHOLD};
pub use prototype::PrototypeClassifier;
pub use remote::{BatchScoreClassifier, RemoteEndpoint, RemoteSentimentClassifier};

use crate::Label;

/// How the runner should feed texts to a classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Invocation {
    /// One `classify` call per item.
    PerItem,
    /// One `classify_batch` call per label bucket.
    Batch,
}

/// A pluggable sentiment backend.
///
/// Implementations own whatever model, lexicon or HTTP client they need and
/// are fully configured at construction. `classify` may fail; the failure is
/// returned, never panicked, and the caller decides how to degrade.
pub trait SentimentClassifier {
    /// Unique name used as the key in results and reports.
    fn name(&self) -> &str;

    /// Predicts the sentiment of one text.
    fn classify(&self, text: &str) -> Result<Label, ClassifierError>;

    /// Preferred invocation style. Defaults to one call per item.
    fn invocation(&self) -> Invocation {
        Invocation::PerItem
    }

    /// Predicts the sentiment of several texts.
    ///
    /// The returned vector must be the same length as `texts` and in the same
    /// order. The default calls `classify` per item and maps failures to
    /// `Unknown`.
    fn classify_batch(&self, texts: &[String]) -> Result<Vec<Label>, ClassifierError> {
        Ok(texts
            .iter()
            .map(|text| self.classify(text).unwrap_or(Label::Unknown))
            .collect())
    }
}
