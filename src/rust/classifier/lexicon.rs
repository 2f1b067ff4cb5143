use std::collections::HashMap;
use std::fs;
use std::path::Path;

use lazy_static::lazy_static;
use log::{debug, info};

use super::error::ClassifierError;
use super::utils::word_tokens;
use super::SentimentClassifier;
use crate::Label;

/// Decision threshold used when none is configured.
pub const DEFAULT_THRESHOLD: f32 = 0.1;

/// Longest phrase, in words, a lexicon entry may span.
const MAX_NGRAM: usize = 3;

lazy_static! {
    static ref DEFAULT_LEXICON: HashMap<String, f32> = DEFAULT_ENTRIES
        .iter()
        .map(|(term, score)| (term.to_string(), *score))
        .collect();
}

const DEFAULT_ENTRIES: &[(&str, f32)] = &[
    // positive
    ("good", 0.6),
    ("great", 0.8),
    ("excellent", 0.9),
    ("amazing", 0.9),
    ("awesome", 0.9),
    ("wonderful", 0.9),
    ("fantastic", 0.9),
    ("brilliant", 0.8),
    ("superb", 0.9),
    ("outstanding", 0.9),
    ("perfect", 0.9),
    ("love", 0.8),
    ("loved", 0.8),
    ("loving", 0.7),
    ("like", 0.3),
    ("liked", 0.4),
    ("enjoy", 0.6),
    ("enjoyed", 0.6),
    ("happy", 0.7),
    ("glad", 0.6),
    ("pleased", 0.6),
    ("delighted", 0.8),
    ("nice", 0.5),
    ("lovely", 0.7),
    ("beautiful", 0.7),
    ("best", 0.8),
    ("better", 0.4),
    ("fun", 0.5),
    ("helpful", 0.5),
    ("recommend", 0.5),
    ("impressive", 0.7),
    ("impressed", 0.7),
    ("smooth", 0.3),
    ("fast", 0.3),
    ("reliable", 0.5),
    ("favorite", 0.6),
    ("thanks", 0.4),
    ("thank you", 0.5),
    ("well done", 0.7),
    ("works great", 0.8),
    ("win", 0.5),
    ("exciting", 0.6),
    ("excited", 0.6),
    ("satisfied", 0.5),
    ("solid", 0.3),
    ("clean", 0.2),
    ("friendly", 0.5),
    ("comfortable", 0.4),
    ("cheerful", 0.6),
    ("joy", 0.7),
    // negative
    ("bad", -0.6),
    ("awful", -0.9),
    ("terrible", -0.9),
    ("horrible", -0.9),
    ("dreadful", -0.8),
    ("worst", -0.9),
    ("worse", -0.5),
    ("poor", -0.5),
    ("hate", -0.8),
    ("hated", -0.8),
    ("dislike", -0.5),
    ("disappointed", -0.7),
    ("disappointing", -0.7),
    ("sad", -0.6),
    ("angry", -0.7),
    ("annoying", -0.6),
    ("annoyed", -0.6),
    ("broken", -0.6),
    ("useless", -0.8),
    ("waste", -0.7),
    ("boring", -0.6),
    ("ugly", -0.6),
    ("slow", -0.3),
    ("fail", -0.6),
    ("failed", -0.6),
    ("failure", -0.6),
    ("problem", -0.4),
    ("problems", -0.4),
    ("bug", -0.3),
    ("crash", -0.5),
    ("crashes", -0.5),
    ("wrong", -0.4),
    ("never", -0.2),
    ("unfortunately", -0.4),
    ("painful", -0.6),
    ("mess", -0.5),
    ("rude", -0.7),
    ("refund", -0.3),
    ("scam", -0.9),
    ("expensive", -0.3),
    ("frustrating", -0.7),
    ("frustrated", -0.7),
    ("nasty", -0.7),
    ("sucks", -0.8),
    ("not good", -1.2),
    ("not great", -1.1),
    ("not happy", -1.2),
    ("not recommend", -1.0),
    ("do not like", -0.9),
    ("don't like", -0.9),
    ("doesn't work", -0.8),
    ("stopped working", -0.8),
    ("waste of time", -0.6),
];

/// Scores text by summing lexicon values of the words and short phrases it
/// contains, then compares the sum with a symmetric threshold.
///
/// Deterministic and infallible: `classify` always returns `Ok`.
#[derive(Debug, Clone)]
pub struct LexiconClassifier {
    name: String,
    lexicon: HashMap<String, f32>,
    threshold: f32,
}

impl Default for LexiconClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl LexiconClassifier {
    /// A classifier over the built-in lexicon with the default threshold.
    pub fn new() -> Self {
        Self {
            name: "lexicon".to_string(),
            lexicon: DEFAULT_LEXICON.clone(),
            threshold: DEFAULT_THRESHOLD,
        }
    }

    /// Replaces the built-in lexicon with entries parsed from tab-separated
    /// `term<TAB>score` lines. Blank lines and lines starting with `#` are
    /// skipped.
    pub fn from_tsv_str(source: &str) -> Result<Self, ClassifierError> {
        let mut lexicon = HashMap::new();
        for (i, line) in source.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let (term, score) = line.split_once('\t').ok_or_else(|| {
                ClassifierError::BuildError(format!("Lexicon line {} is not tab-separated", i + 1))
            })?;
            let score: f32 = score.trim().parse().map_err(|_| {
                ClassifierError::BuildError(format!("Lexicon line {} has an invalid score", i + 1))
            })?;
            let term = word_tokens(term).join(" ");
            if term.is_empty() {
                return Err(ClassifierError::BuildError(format!(
                    "Lexicon line {} has an empty term",
                    i + 1
                )));
            }
            lexicon.insert(term, score);
        }
        if lexicon.is_empty() {
            return Err(ClassifierError::BuildError("Lexicon has no entries".into()));
        }
        Ok(Self {
            lexicon,
            ..Self::new()
        })
    }

    pub fn from_tsv_file<P: AsRef<Path>>(path: P) -> Result<Self, ClassifierError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|e| {
            ClassifierError::BuildError(format!("Failed to read lexicon {:?}: {}", path, e))
        })?;
        let classifier = Self::from_tsv_str(&source)?;
        info!("Loaded {} lexicon entries from {:?}", classifier.lexicon.len(), path);
        Ok(classifier)
    }

    /// Sets the decision threshold. Must be finite and non-negative.
    pub fn with_threshold(mut self, threshold: f32) -> Result<Self, ClassifierError> {
        if !threshold.is_finite() || threshold < 0.0 {
            return Err(ClassifierError::ValidationError(format!(
                "Threshold must be a non-negative number, got {}",
                threshold
            )));
        }
        self.threshold = threshold;
        Ok(self)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Raw lexicon score of a text: the sum over every 1..=3 word window that
    /// appears in the lexicon.
    pub fn score(&self, text: &str) -> f32 {
        let tokens = word_tokens(text);
        let mut total = 0.0;
        for n in 1..=MAX_NGRAM.min(tokens.len()) {
            for window in tokens.windows(n) {
                if let Some(score) = self.lexicon.get(&window.join(" ")) {
                    total += score;
                }
            }
        }
        total
    }
}

impl SentimentClassifier for LexiconClassifier {
    fn name(&self) -> &str {
        &self.name
    }

    fn classify(&self, text: &str) -> Result<Label, ClassifierError> {
        let score = self.score(text);
        debug!("lexicon score {:.3} for {:?}", score, text);
        let label = if score > self.threshold {
            Label::Positive
        } else if score < -self.threshold {
            Label::Negative
        } else {
            Label::Neutral
        };
        Ok(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_lexicon() {
        let classifier = LexiconClassifier::new();
        assert_eq!(classifier.classify("What a great day").unwrap(), Label::Positive);
        assert_eq!(classifier.classify("This is awful").unwrap(), Label::Negative);
        assert_eq!(classifier.classify("The meeting is at noon").unwrap(), Label::Neutral);
        assert_eq!(classifier.classify("").unwrap(), Label::Neutral);
    }

    #[test]
    fn test_phrases_are_scored() {
        let classifier = LexiconClassifier::new();
        // "good" +0.6 and "not good" -1.2
        assert!((classifier.score("not good") + 0.6).abs() < 1e-6);
        assert_eq!(classifier.classify("It was not good").unwrap(), Label::Negative);
    }

    #[test]
    fn test_threshold() {
        let lenient = LexiconClassifier::new();
        let strict = LexiconClassifier::new().with_threshold(0.5).unwrap();
        // "like" scores 0.3
        assert_eq!(lenient.classify("I like it").unwrap(), Label::Positive);
        assert_eq!(strict.classify("I like it").unwrap(), Label::Neutral);

        assert!(LexiconClassifier::new().with_threshold(-0.1).is_err());
        assert!(LexiconClassifier::new().with_threshold(f32::NAN).is_err());
    }

    #[test]
    fn test_custom_lexicon() {
        let classifier = LexiconClassifier::from_tsv_str(
            "# custom\nyay\t1.0\nboo\t-1.0\n\nmeh meh\t-0.5\n",
        )
        .unwrap()
        .with_name("custom");

        assert_eq!(classifier.name(), "custom");
        assert_eq!(classifier.classify("yay!").unwrap(), Label::Positive);
        assert_eq!(classifier.classify("BOO").unwrap(), Label::Negative);
        assert_eq!(classifier.classify("meh meh").unwrap(), Label::Negative);
        assert_eq!(classifier.classify("great").unwrap(), Label::Neutral);
    }

    #[test]
    fn test_malformed_lexicon() {
        assert!(matches!(
            LexiconClassifier::from_tsv_str("word 1.0"),
            Err(ClassifierError::BuildError(_))
        ));
        assert!(LexiconClassifier::from_tsv_str("word\tlots").is_err());
        assert!(LexiconClassifier::from_tsv_str("# only comments\n").is_err());
    }

    #[test]
    fn test_deterministic() {
        let classifier = LexiconClassifier::new();
        let text = "Great product but the support was terrible";
        assert_eq!(classifier.score(text), classifier.score(text));
    }
}
