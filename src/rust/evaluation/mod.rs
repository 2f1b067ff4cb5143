//! The evaluation engine: run classifiers over the corpus and aggregate
//! per-label recall.

mod events;
mod results;
mod runner;

pub use events::{ConsoleReporter, NullSink, ReportSink};
pub use results::{EvaluationResult, LabelCounts, ResultTable};
pub use runner::Runner;

use crate::Label;

/// Misuse of the result aggregator. None of these occur in a run over a
/// well-formed corpus; they signal a bug rather than a bad classifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EvaluationError {
    #[error("No results registered for adapter '{0}'")]
    UnknownAdapter(String),
    #[error("Adapter '{0}' is registered twice")]
    DuplicateAdapter(String),
    #[error("Adapter '{adapter}' has no expectation for label '{label}'")]
    UnknownLabel { adapter: String, label: Label },
    #[error("Expectation for '{label}' under '{adapter}' is already set")]
    ExpectationAlreadySet { adapter: String, label: Label },
    #[error("Adapter '{adapter}' would match more than {expected} '{label}' items")]
    MatchOverflow {
        adapter: String,
        label: Label,
        expected: usize,
    },
}
