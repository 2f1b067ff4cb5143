use std::time::Duration;

use log::{debug, warn};
use reqwest::blocking::Client;
use reqwest::Url;
use serde::{Deserialize, Serialize};

use super::error::ClassifierError;
use super::{Invocation, SentimentClassifier};
use crate::Label;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Where a remote scoring service lives and how to authenticate with it.
#[derive(Clone)]
pub struct RemoteEndpoint {
    url: Url,
    api_key: String,
    key_header: String,
    timeout: Duration,
}

// Keeps the API key out of logs.
impl std::fmt::Debug for RemoteEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteEndpoint")
            .field("url", &self.url.as_str())
            .field("key_header", &self.key_header)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl RemoteEndpoint {
    pub fn new(url: &str, api_key: impl Into<String>) -> Result<Self, ClassifierError> {
        let url = Url::parse(url).map_err(|e| {
            ClassifierError::ConfigurationError(format!("Invalid endpoint URL '{}': {}", url, e))
        })?;
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(ClassifierError::ConfigurationError(format!(
                "API key for {} is empty",
                url
            )));
        }
        Ok(Self {
            url,
            api_key,
            key_header: "X-API-Key".to_string(),
            timeout: DEFAULT_TIMEOUT,
        })
    }

    pub fn with_key_header(mut self, header: impl Into<String>) -> Self {
        self.key_header = header.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    fn client(&self) -> Result<Client, ClassifierError> {
        Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| {
                ClassifierError::ConfigurationError(format!("Failed to build HTTP client: {}", e))
            })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DocumentSentimentResponse {
    doc_sentiment: Option<DocumentSentiment>,
}

#[derive(Debug, Deserialize)]
struct DocumentSentiment {
    #[serde(rename = "type")]
    kind: String,
}

/// Reads `{"docSentiment": {"type": "positive"}}`.
///
/// A well-formed body naming a sentiment we don't know (e.g. `mixed`) is a
/// valid `Unknown` prediction, not an error.
pub(crate) fn parse_document_sentiment(body: &str) -> Result<Label, ClassifierError> {
    let response: DocumentSentimentResponse = serde_json::from_str(body)
        .map_err(|e| ClassifierError::ResponseError(format!("Invalid sentiment body: {}", e)))?;
    let sentiment = response
        .doc_sentiment
        .ok_or_else(|| ClassifierError::ResponseError("Response has no docSentiment".into()))?;
    Ok(Label::from_prediction(&sentiment.kind))
}

/// Remote service scoring one text per HTTP GET.
#[derive(Debug)]
pub struct RemoteSentimentClassifier {
    name: String,
    endpoint: RemoteEndpoint,
    client: Client,
}

impl RemoteSentimentClassifier {
    pub fn new(name: impl Into<String>, endpoint: RemoteEndpoint) -> Result<Self, ClassifierError> {
        let client = endpoint.client()?;
        Ok(Self {
            name: name.into(),
            endpoint,
            client,
        })
    }
}

impl SentimentClassifier for RemoteSentimentClassifier {
    fn name(&self) -> &str {
        &self.name
    }

    fn classify(&self, text: &str) -> Result<Label, ClassifierError> {
        let response = self
            .client
            .get(self.endpoint.url.clone())
            .query(&[("outputMode", "json"), ("showSourceText", "false"), ("text", text)])
            .header(self.endpoint.key_header.as_str(), self.endpoint.api_key.as_str())
            .header(reqwest::header::ACCEPT, "application/json")
            .send()?
            .error_for_status()?;
        let body = response.text()?;
        debug!("{} answered {}", self.name, body);
        parse_document_sentiment(&body)
    }
}

#[derive(Debug, Serialize)]
struct BatchRequest<'a> {
    documents: Vec<BatchDocument<'a>>,
}

#[derive(Debug, Serialize)]
struct BatchDocument<'a> {
    id: String,
    language: &'static str,
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct BatchResponse {
    documents: Vec<ScoredDocument>,
    #[serde(default)]
    errors: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct ScoredDocument {
    id: String,
    score: Option<f64>,
}

/// Reads `{"documents": [{"id": "0", "score": 0.93}, ...]}` for a request of
/// `expected` documents and returns one label per submitted document, in
/// submission order.
///
/// Documents are matched back by `id`, so the service may answer in any
/// order. Documents missing from the response or without a score become
/// `Unknown`.
pub(crate) fn parse_batch_scores(
    body: &str,
    expected: usize,
) -> Result<Vec<Label>, ClassifierError> {
    let response: BatchResponse = serde_json::from_str(body)
        .map_err(|e| ClassifierError::ResponseError(format!("Invalid batch body: {}", e)))?;
    if !response.errors.is_empty() {
        warn!("Batch service reported {} document errors", response.errors.len());
    }

    let mut labels: Vec<Option<Label>> = vec![None; expected];
    for document in response.documents {
        let index: usize = document.id.parse().map_err(|_| {
            ClassifierError::ResponseError(format!("Unexpected document id '{}'", document.id))
        })?;
        let slot = labels.get_mut(index).ok_or_else(|| {
            ClassifierError::ResponseError(format!("Document id {} out of range", index))
        })?;
        if slot.is_some() {
            return Err(ClassifierError::ResponseError(format!(
                "Document id {} returned twice",
                index
            )));
        }
        *slot = Some(document.score.map_or(Label::Unknown, Label::from_score));
    }
    Ok(labels.into_iter().map(|label| label.unwrap_or(Label::Unknown)).collect())
}

/// Remote service scoring a whole bucket per HTTP POST; each score is mapped
/// to a label with [`Label::from_score`].
#[derive(Debug)]
pub struct BatchScoreClassifier {
    name: String,
    endpoint: RemoteEndpoint,
    client: Client,
}

impl BatchScoreClassifier {
    pub fn new(name: impl Into<String>, endpoint: RemoteEndpoint) -> Result<Self, ClassifierError> {
        let client = endpoint.client()?;
        Ok(Self {
            name: name.into(),
            endpoint,
            client,
        })
    }
}

impl SentimentClassifier for BatchScoreClassifier {
    fn name(&self) -> &str {
        &self.name
    }

    fn invocation(&self) -> Invocation {
        Invocation::Batch
    }

    fn classify(&self, text: &str) -> Result<Label, ClassifierError> {
        let labels = self.classify_batch(&[text.to_string()])?;
        labels
            .into_iter()
            .next()
            .ok_or_else(|| ClassifierError::ResponseError("Empty batch response".into()))
    }

    fn classify_batch(&self, texts: &[String]) -> Result<Vec<Label>, ClassifierError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let request = BatchRequest {
            documents: texts
                .iter()
                .enumerate()
                .map(|(i, text)| BatchDocument {
                    id: i.to_string(),
                    language: "en",
                    text,
                })
                .collect(),
        };
        let response = self
            .client
            .post(self.endpoint.url.clone())
            .header(self.endpoint.key_header.as_str(), self.endpoint.api_key.as_str())
            .json(&request)
            .send()?
            .error_for_status()?;
        let body = response.text()?;
        debug!("{} scored {} documents", self.name, texts.len());
        parse_batch_scores(&body, texts.len())
    }
}
