use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::label::{Label, ParseLabelError};

/// Default location of the labeled examples, relative to the working directory.
pub const DEFAULT_DATASET_PATH: &str = "data/sentiment.yml";

#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("Failed to read dataset {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Malformed dataset: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Unknown label in dataset: {0}")]
    UnknownLabel(#[from] ParseLabelError),
    #[error("Dataset contains no labels")]
    Empty,
}

/// The hand-labeled examples, grouped into one ordered bucket per true label.
///
/// A `Corpus` is immutable once built. Buckets iterate in label order and the
/// items of a bucket always come back in the order they were loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Corpus {
    buckets: BTreeMap<Label, Vec<String>>,
}

impl Corpus {
    /// Builds a corpus from label buckets.
    ///
    /// # Errors
    /// - `DatasetError::Empty` if no buckets are given
    /// - `DatasetError::UnknownLabel` if a bucket is keyed by `Label::Unknown`
    pub fn new<I, S>(buckets: I) -> Result<Self, DatasetError>
    where
        I: IntoIterator<Item = (Label, Vec<S>)>,
        S: Into<String>,
    {
        let mut map = BTreeMap::new();
        for (label, items) in buckets {
            if label.is_unknown() {
                return Err(DatasetError::UnknownLabel(ParseLabelError(label.to_string())));
            }
            map.entry(label)
                .or_insert_with(Vec::new)
                .extend(items.into_iter().map(Into::into));
        }
        if map.is_empty() {
            return Err(DatasetError::Empty);
        }
        for (label, items) in &map {
            if items.is_empty() {
                warn!("Label '{}' has no examples; its recall will read 0/0", label);
            }
        }
        Ok(Self { buckets: map })
    }

    /// Parses a YAML mapping of label name to a list of texts.
    ///
    /// ```
    /// use showdown::{Corpus, Label};
    ///
    /// let corpus = Corpus::from_yaml_str("negative: [bad, awful]\npositive: [great]\n").unwrap();
    /// assert_eq!(corpus.expected(Label::Negative), 2);
    /// ```
    pub fn from_yaml_str(source: &str) -> Result<Self, DatasetError> {
        if source.trim().is_empty() {
            return Err(DatasetError::Empty);
        }
        let raw: Option<BTreeMap<String, Option<Vec<String>>>> = serde_yaml::from_str(source)?;
        let raw = raw.ok_or(DatasetError::Empty)?;
        let buckets = raw
            .into_iter()
            .map(|(name, items)| Ok((name.parse::<Label>()?, items.unwrap_or_default())))
            .collect::<Result<Vec<_>, DatasetError>>()?;
        Self::new(buckets)
    }

    /// Loads the corpus from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, DatasetError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| DatasetError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let corpus = Self::from_yaml_str(&source)?;
        info!(
            "Loaded {} examples across {} labels from {:?}",
            corpus.len(),
            corpus.buckets.len(),
            path
        );
        Ok(corpus)
    }

    /// The labels present, in display order.
    pub fn labels(&self) -> Vec<Label> {
        self.buckets.keys().copied().collect()
    }

    /// The ordered items of one bucket; empty if the label is absent.
    pub fn bucket(&self, label: Label) -> &[String] {
        self.buckets.get(&label).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Iterates `(label, items)` pairs in label order.
    pub fn buckets(&self) -> impl Iterator<Item = (Label, &[String])> {
        self.buckets.iter().map(|(label, items)| (*label, items.as_slice()))
    }

    /// The size of a bucket, i.e. the expected count for that label.
    pub fn expected(&self, label: Label) -> usize {
        self.bucket(label).len()
    }

    /// Total number of examples across all buckets.
    pub fn len(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bucket_order_is_stable() {
        let corpus = Corpus::from_yaml_str(
            "positive:\n  - great\n  - lovely\nnegative:\n  - bad\n  - awful\n  - dreadful\n",
        )
        .unwrap();

        assert_eq!(corpus.labels(), vec![Label::Negative, Label::Positive]);
        assert_eq!(corpus.bucket(Label::Negative), ["bad", "awful", "dreadful"]);
        let first: Vec<_> = corpus.buckets().map(|(l, items)| (l, items.to_vec())).collect();
        let second: Vec<_> = corpus.buckets().map(|(l, items)| (l, items.to_vec())).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_unknown_label_is_rejected() {
        let result = Corpus::from_yaml_str("mixed:\n  - meh\n");
        assert!(matches!(result, Err(DatasetError::UnknownLabel(_))));

        let result = Corpus::new(vec![(Label::Unknown, vec!["x"])]);
        assert!(matches!(result, Err(DatasetError::UnknownLabel(_))));
    }

    #[test]
    fn test_empty_document_is_rejected() {
        assert!(matches!(Corpus::from_yaml_str(""), Err(DatasetError::Empty)));
        assert!(matches!(Corpus::from_yaml_str("{}"), Err(DatasetError::Empty)));
    }

    #[test]
    fn test_malformed_yaml() {
        let result = Corpus::from_yaml_str("negative: [unclosed");
        assert!(matches!(result, Err(DatasetError::Parse(_))));

        let result = Corpus::from_yaml_str("- just\n- a list\n");
        assert!(matches!(result, Err(DatasetError::Parse(_))));
    }

    #[test]
    fn test_empty_bucket_is_allowed() {
        let corpus = Corpus::from_yaml_str("neutral:\npositive: [fine]\n").unwrap();
        assert_eq!(corpus.expected(Label::Neutral), 0);
        assert_eq!(corpus.expected(Label::Positive), 1);
        assert_eq!(corpus.expected(Label::Negative), 0);
        assert_eq!(corpus.len(), 1);
    }

    #[test]
    fn test_missing_file() {
        let result = Corpus::load("/definitely/not/here.yml");
        assert!(matches!(result, Err(DatasetError::Io { .. })));
    }
}
