use std::collections::BTreeMap;

use serde::Serialize;

use super::EvaluationError;
use crate::Label;

/// Recall counters for one label under one adapter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LabelCounts {
    /// Size of the label's bucket
    pub expected: usize,
    /// Items of the bucket predicted as their own label
    pub matched: usize,
}

/// Per-label counters for a single adapter.
///
/// `expected` is set once per label; `matched` only grows and never exceeds
/// `expected`. A misprediction is not recorded anywhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EvaluationResult {
    adapter: String,
    counts: BTreeMap<Label, LabelCounts>,
}

impl EvaluationResult {
    pub fn new(adapter: impl Into<String>) -> Self {
        Self {
            adapter: adapter.into(),
            counts: BTreeMap::new(),
        }
    }

    pub fn adapter(&self) -> &str {
        &self.adapter
    }

    /// Sets the bucket size for `label`. Allowed once per label.
    pub fn record_expectation(
        &mut self,
        label: Label,
        count: usize,
    ) -> Result<(), EvaluationError> {
        if label.is_unknown() {
            return Err(EvaluationError::UnknownLabel {
                adapter: self.adapter.clone(),
                label,
            });
        }
        if self.counts.contains_key(&label) {
            return Err(EvaluationError::ExpectationAlreadySet {
                adapter: self.adapter.clone(),
                label,
            });
        }
        self.counts.insert(
            label,
            LabelCounts {
                expected: count,
                matched: 0,
            },
        );
        Ok(())
    }

    /// Counts one correct prediction of `label`.
    pub fn record_match(&mut self, label: Label) -> Result<(), EvaluationError> {
        let counts = self.counts.get_mut(&label).ok_or_else(|| EvaluationError::UnknownLabel {
            adapter: self.adapter.clone(),
            label,
        })?;
        if counts.matched >= counts.expected {
            return Err(EvaluationError::MatchOverflow {
                adapter: self.adapter.clone(),
                label,
                expected: counts.expected,
            });
        }
        counts.matched += 1;
        Ok(())
    }

    pub fn counts(&self, label: Label) -> Option<LabelCounts> {
        self.counts.get(&label).copied()
    }

    pub fn labels(&self) -> impl Iterator<Item = Label> + '_ {
        self.counts.keys().copied()
    }

    /// Sum of matched counts over every label.
    pub fn score(&self) -> usize {
        self.counts.values().map(|c| c.matched).sum()
    }

    /// Sum of expected counts over every label.
    pub fn total(&self) -> usize {
        self.counts.values().map(|c| c.expected).sum()
    }
}

/// Results of every adapter in a run, in the order the adapters ran.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResultTable {
    results: Vec<EvaluationResult>,
}

impl ResultTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an empty entry for `adapter`. Names must be unique.
    pub fn register_adapter(&mut self, adapter: &str) -> Result<(), EvaluationError> {
        self.insert(EvaluationResult::new(adapter))
    }

    /// Adds a finished result. Names must be unique.
    pub fn insert(&mut self, result: EvaluationResult) -> Result<(), EvaluationError> {
        if self.get(result.adapter()).is_some() {
            return Err(EvaluationError::DuplicateAdapter(result.adapter().to_string()));
        }
        self.results.push(result);
        Ok(())
    }

    pub fn record_expectation(
        &mut self,
        adapter: &str,
        label: Label,
        count: usize,
    ) -> Result<(), EvaluationError> {
        self.get_mut(adapter)?.record_expectation(label, count)
    }

    pub fn record_match(&mut self, adapter: &str, label: Label) -> Result<(), EvaluationError> {
        self.get_mut(adapter)?.record_match(label)
    }

    pub fn get(&self, adapter: &str) -> Option<&EvaluationResult> {
        self.results.iter().find(|r| r.adapter() == adapter)
    }

    fn get_mut(&mut self, adapter: &str) -> Result<&mut EvaluationResult, EvaluationError> {
        self.results
            .iter_mut()
            .find(|r| r.adapter() == adapter)
            .ok_or_else(|| EvaluationError::UnknownAdapter(adapter.to_string()))
    }

    pub fn counts(&self, adapter: &str, label: Label) -> Option<LabelCounts> {
        self.get(adapter).and_then(|r| r.counts(label))
    }

    pub fn score(&self, adapter: &str) -> Option<usize> {
        self.get(adapter).map(EvaluationResult::score)
    }

    pub fn results(&self) -> &[EvaluationResult] {
        &self.results
    }

    pub fn adapters(&self) -> impl Iterator<Item = &str> {
        self.results.iter().map(EvaluationResult::adapter)
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_and_score() {
        let mut table = ResultTable::new();
        table.register_adapter("lexicon").unwrap();
        table.record_expectation("lexicon", Label::Negative, 2).unwrap();
        table.record_expectation("lexicon", Label::Positive, 1).unwrap();

        table.record_match("lexicon", Label::Negative).unwrap();
        table.record_match("lexicon", Label::Negative).unwrap();

        assert_eq!(
            table.counts("lexicon", Label::Negative),
            Some(LabelCounts { expected: 2, matched: 2 })
        );
        assert_eq!(
            table.counts("lexicon", Label::Positive),
            Some(LabelCounts { expected: 1, matched: 0 })
        );
        assert_eq!(table.score("lexicon"), Some(2));
        assert_eq!(table.get("lexicon").unwrap().total(), 3);
    }

    #[test]
    fn test_matched_never_exceeds_expected() {
        let mut result = EvaluationResult::new("a");
        result.record_expectation(Label::Positive, 1).unwrap();
        result.record_match(Label::Positive).unwrap();
        assert!(matches!(
            result.record_match(Label::Positive),
            Err(EvaluationError::MatchOverflow { expected: 1, .. })
        ));
        assert_eq!(result.counts(Label::Positive).unwrap().matched, 1);
    }

    #[test]
    fn test_empty_bucket() {
        let mut result = EvaluationResult::new("a");
        result.record_expectation(Label::Neutral, 0).unwrap();
        assert!(result.record_match(Label::Neutral).is_err());
        assert_eq!(result.counts(Label::Neutral), Some(LabelCounts::default()));
        assert_eq!(result.score(), 0);
    }

    #[test]
    fn test_expectation_is_set_once() {
        let mut result = EvaluationResult::new("a");
        result.record_expectation(Label::Negative, 3).unwrap();
        assert!(matches!(
            result.record_expectation(Label::Negative, 4),
            Err(EvaluationError::ExpectationAlreadySet { .. })
        ));
        assert!(result.record_expectation(Label::Unknown, 1).is_err());
        assert_eq!(result.counts(Label::Negative).unwrap().expected, 3);
    }

    #[test]
    fn test_unknown_adapter_and_label() {
        let mut table = ResultTable::new();
        assert!(matches!(
            table.record_match("ghost", Label::Negative),
            Err(EvaluationError::UnknownAdapter(_))
        ));
        table.register_adapter("a").unwrap();
        assert!(matches!(
            table.record_match("a", Label::Unknown),
            Err(EvaluationError::UnknownLabel { .. })
        ));
        assert!(matches!(
            table.register_adapter("a"),
            Err(EvaluationError::DuplicateAdapter(_))
        ));
    }

    #[test]
    fn test_registration_order_is_kept() {
        let mut table = ResultTable::new();
        for name in ["zeta", "alpha", "mid"] {
            table.register_adapter(name).unwrap();
        }
        assert_eq!(table.adapters().collect::<Vec<_>>(), vec!["zeta", "alpha", "mid"]);
    }
}
