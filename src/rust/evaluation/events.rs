use std::io::{self, Write};

use log::debug;

use super::results::LabelCounts;
use crate::Label;

/// Receives progress events from the runner.
///
/// Events are for display only; nothing a sink does can change the counts.
/// Every method defaults to doing nothing.
pub trait ReportSink {
    fn adapter_started(&mut self, _adapter: &str) {}

    fn label_started(&mut self, _adapter: &str, _label: Label, _items: usize) {}

    /// One prediction. `expected` is the bucket the text came from.
    fn item_classified(
        &mut self,
        _adapter: &str,
        _expected: Label,
        _text: &str,
        _predicted: Label,
    ) {
    }

    fn label_finished(&mut self, _adapter: &str, _label: Label, _counts: LabelCounts) {}

    fn adapter_finished(&mut self, _adapter: &str, _score: usize) {}
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl ReportSink for NullSink {}

impl<S: ReportSink + ?Sized> ReportSink for &mut S {
    fn adapter_started(&mut self, adapter: &str) {
        (**self).adapter_started(adapter)
    }

    fn label_started(&mut self, adapter: &str, label: Label, items: usize) {
        (**self).label_started(adapter, label, items)
    }

    fn item_classified(&mut self, adapter: &str, expected: Label, text: &str, predicted: Label) {
        (**self).item_classified(adapter, expected, text, predicted)
    }

    fn label_finished(&mut self, adapter: &str, label: Label, counts: LabelCounts) {
        (**self).label_finished(adapter, label, counts)
    }

    fn adapter_finished(&mut self, adapter: &str, score: usize) {
        (**self).adapter_finished(adapter, score)
    }
}

const INDENT: &str = "  ";

/// Nested, human-readable progress narration.
///
/// ```text
/// lexicon
///   negative
///     This is awful... negative
///   done (1/1)
/// done (score 1)
/// ```
pub struct ConsoleReporter<W: Write> {
    out: W,
    complete: String,
}

impl ConsoleReporter<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> ConsoleReporter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            complete: "done".to_string(),
        }
    }

    /// Word printed when a block finishes.
    pub fn with_complete_string(mut self, complete: impl Into<String>) -> Self {
        self.complete = complete.into();
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, depth: usize, text: &str) {
        let result = writeln!(self.out, "{}{}", INDENT.repeat(depth), text)
            .and_then(|_| self.out.flush());
        if let Err(e) = result {
            debug!("Progress output failed: {}", e);
        }
    }
}

impl<W: Write> ReportSink for ConsoleReporter<W> {
    fn adapter_started(&mut self, adapter: &str) {
        self.line(0, adapter);
    }

    fn label_started(&mut self, _adapter: &str, label: Label, _items: usize) {
        self.line(1, label.as_str());
    }

    fn item_classified(&mut self, _adapter: &str, _expected: Label, text: &str, predicted: Label) {
        let line = format!("{}... {}", text, predicted);
        self.line(2, &line);
    }

    fn label_finished(&mut self, _adapter: &str, _label: Label, counts: LabelCounts) {
        let line = format!("{} ({}/{})", self.complete, counts.matched, counts.expected);
        self.line(1, &line);
    }

    fn adapter_finished(&mut self, _adapter: &str, score: usize) {
        let line = format!("{} (score {})", self.complete, score);
        self.line(0, &line);
    }
}
