use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Scores below this are negative.
pub const NEGATIVE_UPPER_BOUND: f64 = 0.33;
/// Scores at or above this are positive.
pub const POSITIVE_LOWER_BOUND: f64 = 0.66;

/// A sentiment category, or the `Unknown` sentinel for indeterminate results.
///
/// The declaration order of the real labels is the column order of the
/// comparison table, so `Ord` is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    Negative,
    Neutral,
    Positive,
    Unknown,
}

impl Label {
    /// The closed set of real labels, in display order.
    pub const ALL: [Label; 3] = [Label::Negative, Label::Neutral, Label::Positive];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Negative => "negative",
            Self::Neutral => "neutral",
            Self::Positive => "positive",
            Self::Unknown => "unknown",
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }

    /// Maps a numeric sentiment score to a label. Scores are nominally in
    /// `[0, 1]`; values outside it still fall on the nearest side of the
    /// thresholds. Only NaN and infinities yield `Unknown`.
    ///
    /// ```
    /// use showdown::Label;
    ///
    /// assert_eq!(Label::from_score(0.10), Label::Negative);
    /// assert_eq!(Label::from_score(0.50), Label::Neutral);
    /// assert_eq!(Label::from_score(0.70), Label::Positive);
    /// assert_eq!(Label::from_score(f64::NAN), Label::Unknown);
    /// ```
    pub fn from_score(score: f64) -> Self {
        if !score.is_finite() {
            return Self::Unknown;
        }
        if score < NEGATIVE_UPPER_BOUND {
            Self::Negative
        } else if score < POSITIVE_LOWER_BOUND {
            Self::Neutral
        } else {
            Self::Positive
        }
    }

    /// Lenient conversion used for labels coming back from classifier
    /// backends: anything unrecognised becomes `Unknown`.
    pub fn from_prediction(raw: &str) -> Self {
        raw.parse().unwrap_or(Self::Unknown)
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not one of the real sentiment labels.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{0}' is not a sentiment label (expected negative, neutral or positive)")]
pub struct ParseLabelError(pub String);

impl FromStr for Label {
    type Err = ParseLabelError;

    /// Parses one of the real labels. `unknown` is deliberately rejected: it
    /// can be predicted but never used as ground truth.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "negative" => Ok(Self::Negative),
            "neutral" => Ok(Self::Neutral),
            "positive" => Ok(Self::Positive),
            _ => Err(ParseLabelError(s.to_string())),
        }
    }
}
