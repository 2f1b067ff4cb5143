use std::thread;
use std::time::Duration;

use log::{debug, info, warn};

use super::events::ReportSink;
use super::results::{EvaluationResult, ResultTable};
use super::EvaluationError;
use crate::classifier::{Invocation, SentimentClassifier};
use crate::{Corpus, Label, Registry};

/// Feeds the corpus through classifiers, one at a time, and counts how many
/// items of each bucket come back with their own label.
///
/// Classification failures never stop a run: the item is counted as an
/// `Unknown` prediction, which matches no bucket.
pub struct Runner<S: ReportSink> {
    sink: S,
    call_delay: Duration,
}

impl<S: ReportSink> Runner<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            call_delay: Duration::ZERO,
        }
    }

    /// Pause between consecutive classifier calls of one adapter. Only
    /// throttles remote services; it has no effect on the counts.
    pub fn with_call_delay(mut self, delay: Duration) -> Self {
        self.call_delay = delay;
        self
    }

    /// Evaluates every registered classifier, in registration order.
    pub fn run(
        &mut self,
        registry: &Registry,
        corpus: &Corpus,
    ) -> Result<ResultTable, EvaluationError> {
        let mut table = ResultTable::new();
        for adapter in registry.iter() {
            let result = self.evaluate(adapter, corpus)?;
            table.insert(result)?;
        }
        Ok(table)
    }

    /// Evaluates one classifier over the whole corpus.
    pub fn evaluate(
        &mut self,
        adapter: &dyn SentimentClassifier,
        corpus: &Corpus,
    ) -> Result<EvaluationResult, EvaluationError> {
        let name = adapter.name().to_string();
        info!("Evaluating '{}' on {} examples", name, corpus.len());
        self.sink.adapter_started(&name);

        let mut result = EvaluationResult::new(name.as_str());
        // Labels missing from the corpus still get a 0/0 row.
        for label in Label::ALL {
            result.record_expectation(label, corpus.expected(label))?;
        }

        let mut first_call = true;
        for (label, items) in corpus.buckets() {
            self.sink.label_started(&name, label, items.len());

            match adapter.invocation() {
                Invocation::PerItem => {
                    for text in items {
                        self.pause(&mut first_call);
                        let predicted = classify_one(adapter, text);
                        self.observe(&mut result, label, text, predicted)?;
                    }
                }
                Invocation::Batch => {
                    if !items.is_empty() {
                        self.pause(&mut first_call);
                    }
                    let predictions = classify_bucket(adapter, label, items);
                    for (text, predicted) in items.iter().zip(predictions) {
                        self.observe(&mut result, label, text, predicted)?;
                    }
                }
            }

            let counts = result.counts(label).unwrap_or_default();
            debug!("'{}' {}: {}/{}", name, label, counts.matched, counts.expected);
            self.sink.label_finished(&name, label, counts);
        }

        info!("'{}' recovered {}/{} examples", name, result.score(), result.total());
        self.sink.adapter_finished(&name, result.score());
        Ok(result)
    }

    fn observe(
        &mut self,
        result: &mut EvaluationResult,
        expected: Label,
        text: &str,
        predicted: Label,
    ) -> Result<(), EvaluationError> {
        self.sink.item_classified(result.adapter(), expected, text, predicted);
        if predicted == expected {
            result.record_match(predicted)?;
        }
        Ok(())
    }

    fn pause(&self, first_call: &mut bool) {
        if !*first_call && !self.call_delay.is_zero() {
            thread::sleep(self.call_delay);
        }
        *first_call = false;
    }
}

fn classify_one(adapter: &dyn SentimentClassifier, text: &str) -> Label {
    match adapter.classify(text) {
        Ok(label) => label,
        Err(e) => {
            warn!("'{}' failed on {:?}: {}", adapter.name(), text, e);
            Label::Unknown
        }
    }
}

/// One prediction per item, in item order, whatever the backend returns.
fn classify_bucket(
    adapter: &dyn SentimentClassifier,
    label: Label,
    items: &[String],
) -> Vec<Label> {
    if items.is_empty() {
        return Vec::new();
    }
    match adapter.classify_batch(items) {
        Ok(predictions) if predictions.len() == items.len() => predictions,
        Ok(predictions) => {
            warn!(
                "'{}' returned {} predictions for {} {} items; counting the bucket as unknown",
                adapter.name(),
                predictions.len(),
                items.len(),
                label
            );
            vec![Label::Unknown; items.len()]
        }
        Err(e) => {
            warn!("'{}' failed on the {} bucket: {}", adapter.name(), label, e);
            vec![Label::Unknown; items.len()]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::ClassifierError;
    use crate::evaluation::{LabelCounts, NullSink};

    struct Fixed(Label);

    impl SentimentClassifier for Fixed {
        fn name(&self) -> &str {
            "fixed"
        }

        fn classify(&self, _text: &str) -> Result<Label, ClassifierError> {
            Ok(self.0)
        }
    }

    struct ShortBatch;

    impl SentimentClassifier for ShortBatch {
        fn name(&self) -> &str {
            "short"
        }

        fn invocation(&self) -> Invocation {
            Invocation::Batch
        }

        fn classify(&self, _text: &str) -> Result<Label, ClassifierError> {
            Ok(Label::Negative)
        }

        fn classify_batch(&self, texts: &[String]) -> Result<Vec<Label>, ClassifierError> {
            Ok(vec![Label::Negative; texts.len().saturating_sub(1)])
        }
    }

    fn corpus() -> Corpus {
        Corpus::new(vec![
            (Label::Negative, vec!["bad", "awful"]),
            (Label::Positive, vec!["great"]),
        ])
        .unwrap()
    }

    #[test]
    fn test_expected_counts_match_corpus() {
        let result = Runner::new(NullSink).evaluate(&Fixed(Label::Neutral), &corpus()).unwrap();
        assert_eq!(result.counts(Label::Negative).unwrap().expected, 2);
        assert_eq!(result.counts(Label::Positive).unwrap().expected, 1);
        assert_eq!(result.score(), 0);
    }

    #[test]
    fn test_absent_label_reads_zero() {
        let result = Runner::new(NullSink).evaluate(&Fixed(Label::Neutral), &corpus()).unwrap();
        assert_eq!(
            result.counts(Label::Neutral),
            Some(LabelCounts {
                expected: 0,
                matched: 0
            })
        );
    }

    #[test]
    fn test_short_batch_counts_as_unknown() {
        let result = Runner::new(NullSink).evaluate(&ShortBatch, &corpus()).unwrap();
        assert_eq!(result.counts(Label::Negative).unwrap().matched, 0);
        assert_eq!(result.score(), 0);
    }

    #[test]
    fn test_delay_does_not_change_counts() {
        let fast = Runner::new(NullSink).evaluate(&Fixed(Label::Negative), &corpus()).unwrap();
        let slow = Runner::new(NullSink)
            .with_call_delay(Duration::from_millis(1))
            .evaluate(&Fixed(Label::Negative), &corpus())
            .unwrap();
        assert_eq!(fast, slow);
    }
}
