//! Compare sentiment classifiers on one hand-labeled corpus.
//!
//! Every backend implements [`SentimentClassifier`]. A [`Runner`] feeds each
//! registered backend every example of a [`Corpus`], bucket by bucket, and
//! counts per label how many examples come back with their true label. The
//! resulting [`ResultTable`] renders as a [`ComparisonTable`].
//!
//! # Basic Usage
//!
//! ```rust
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use showdown::{ComparisonTable, Corpus, Label, LexiconClassifier, NullSink, Registry, Runner};
//!
//! let corpus = Corpus::from_yaml_str(
//!     "negative: [This is awful, I hate it]\npositive: [What a great day]\n",
//! )?;
//!
//! let mut registry = Registry::new();
//! registry.register(LexiconClassifier::new())?;
//!
//! let table = Runner::new(NullSink).run(&registry, &corpus)?;
//! assert_eq!(table.score("lexicon"), Some(3));
//!
//! println!("{}", ComparisonTable::from_results(&table, &Label::ALL)?);
//! # Ok(())
//! # }
//! ```

pub mod classifier;
pub mod config;
pub mod corpus;
pub mod evaluation;
pub mod label;
pub mod model_manager;
pub mod models;
pub mod registry;
pub mod report;
mod runtime;

pub use classifier::{
    default_sentiment_classes, BatchScoreClassifier, ClassDefinition, ClassifierError, Invocation,
    LexiconClassifier, PrototypeClassifier, PrototypeClassifierBuilder, RemoteEndpoint,
    RemoteSentimentClassifier, SentimentClassifier,
};
pub use config::{Credentials, ShowdownConfig};
pub use corpus::{Corpus, DatasetError};
pub use evaluation::{
    ConsoleReporter, EvaluationError, EvaluationResult, LabelCounts, NullSink, ReportSink,
    ResultTable, Runner,
};
pub use label::Label;
pub use model_manager::{ModelError, ModelManager};
pub use models::{BuiltinModel, ModelCharacteristics, ModelInfo};
pub use registry::Registry;
pub use report::{ComparisonTable, ReportError, ReportRow};

pub fn init_logger() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
}
