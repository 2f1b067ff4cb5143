use std::collections::HashMap;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::classifier::{ClassifierError, RemoteEndpoint, DEFAULT_THRESHOLD};
use crate::corpus::DEFAULT_DATASET_PATH;

pub const SINGLE_API_KEY_VAR: &str = "SHOWDOWN_SINGLE_API_KEY";
pub const SINGLE_ENDPOINT_VAR: &str = "SHOWDOWN_SINGLE_ENDPOINT";
pub const BATCH_API_KEY_VAR: &str = "SHOWDOWN_BATCH_API_KEY";
pub const BATCH_ENDPOINT_VAR: &str = "SHOWDOWN_BATCH_ENDPOINT";

pub const DEFAULT_SINGLE_ENDPOINT: &str = "https://alchemy.p.mashape.com/text/TextGetTextSentiment";
pub const DEFAULT_SINGLE_KEY_HEADER: &str = "X-Mashape-Key";
pub const DEFAULT_BATCH_ENDPOINT: &str =
    "https://westus.api.cognitive.microsoft.com/text/analytics/v2.0/sentiment";
pub const DEFAULT_BATCH_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";

/// Settings for one evaluation run.
#[derive(Debug, Clone)]
pub struct ShowdownConfig {
    pub dataset_path: PathBuf,
    /// Decision threshold for the lexicon classifier
    pub lexicon_threshold: f32,
    /// Optional tab-separated lexicon replacing the built-in one
    pub lexicon_path: Option<PathBuf>,
    /// Pause between per-item calls, to stay under remote rate limits
    pub item_delay: Duration,
    /// Adapter names to run; empty means every adapter that can be built
    pub adapters: Vec<String>,
    /// Build the embedding prototype classifier (needs the model download)
    pub use_model: bool,
    pub fresh_download: bool,
}

impl Default for ShowdownConfig {
    fn default() -> Self {
        Self {
            dataset_path: PathBuf::from(DEFAULT_DATASET_PATH),
            lexicon_threshold: DEFAULT_THRESHOLD,
            lexicon_path: None,
            item_delay: Duration::ZERO,
            adapters: Vec::new(),
            use_model: true,
            fresh_download: false,
        }
    }
}

impl ShowdownConfig {
    /// True if `name` should be run under the adapter filter.
    pub fn wants(&self, name: &str) -> bool {
        self.adapters.is_empty() || self.adapters.iter().any(|a| a.eq_ignore_ascii_case(name))
    }

    /// True if `name` was asked for by name, making its construction
    /// failure fatal instead of a skipped adapter.
    pub fn requires(&self, name: &str) -> bool {
        self.adapters.iter().any(|a| a.eq_ignore_ascii_case(name))
    }
}

/// Read-only view of the secrets the remote classifiers need.
///
/// Values are captured once; classifiers receive fully built
/// [`RemoteEndpoint`]s and never touch the environment themselves.
#[derive(Clone, Default)]
pub struct Credentials {
    values: HashMap<String, String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut keys: Vec<_> = self.values.keys().collect();
        keys.sort();
        f.debug_struct("Credentials").field("keys", &keys).finish()
    }
}

impl Credentials {
    pub fn from_env() -> Self {
        let names = [
            SINGLE_API_KEY_VAR,
            SINGLE_ENDPOINT_VAR,
            BATCH_API_KEY_VAR,
            BATCH_ENDPOINT_VAR,
        ];
        let values = names
            .into_iter()
            .filter_map(|name| env::var(name).ok().map(|value| (name.to_string(), value)))
            .collect();
        Self { values }
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values
            .get(name)
            .map(String::as_str)
            .filter(|value| !value.trim().is_empty())
    }

    fn require(&self, name: &str) -> Result<&str, ClassifierError> {
        self.get(name).ok_or_else(|| {
            ClassifierError::ConfigurationError(format!("Environment variable {} is not set", name))
        })
    }

    /// Endpoint for the per-item remote classifier.
    pub fn single_endpoint(&self) -> Result<RemoteEndpoint, ClassifierError> {
        let key = self.require(SINGLE_API_KEY_VAR)?;
        let url = self.get(SINGLE_ENDPOINT_VAR).unwrap_or(DEFAULT_SINGLE_ENDPOINT);
        Ok(RemoteEndpoint::new(url, key)?.with_key_header(DEFAULT_SINGLE_KEY_HEADER))
    }

    /// Endpoint for the batch remote classifier.
    pub fn batch_endpoint(&self) -> Result<RemoteEndpoint, ClassifierError> {
        let key = self.require(BATCH_API_KEY_VAR)?;
        let url = self.get(BATCH_ENDPOINT_VAR).unwrap_or(DEFAULT_BATCH_ENDPOINT);
        Ok(RemoteEndpoint::new(url, key)?.with_key_header(DEFAULT_BATCH_KEY_HEADER))
    }
}
