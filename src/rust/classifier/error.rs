use ort::Error as OrtError;
use std::fmt;

/// Errors raised by sentiment classifier backends.
///
/// Construction-time variants (`BuildError`, `ConfigurationError`) keep an
/// adapter from being registered. Invocation-time variants (`RequestError`,
/// `ResponseError`, `PredictionError`, ...) are per item and the runner turns
/// them into an `unknown` prediction.
#[derive(Debug)]
pub enum ClassifierError {
    /// Error occurred while loading or using the tokenizer
    TokenizerError(String),
    /// Error occurred while loading or running the ONNX model
    ModelError(String),
    /// Error occurred during the build phase
    BuildError(String),
    /// Error occurred while making predictions
    PredictionError(String),
    /// Error occurred due to invalid input parameters
    ValidationError(String),
    /// A required credential or setting is missing or invalid
    ConfigurationError(String),
    /// The remote service could not be reached or answered with a non-2xx status
    RequestError(String),
    /// The remote service answered with a body we cannot interpret
    ResponseError(String),
}

impl fmt::Display for ClassifierError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TokenizerError(msg) => write!(f, "Tokenizer error: {}", msg),
            Self::ModelError(msg) => write!(f, "Model error: {}", msg),
            Self::BuildError(msg) => write!(f, "Build error: {}", msg),
            Self::PredictionError(msg) => write!(f, "Prediction error: {}", msg),
            Self::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            Self::ConfigurationError(msg) => write!(f, "Configuration error: {}", msg),
            Self::RequestError(msg) => write!(f, "Request error: {}", msg),
            Self::ResponseError(msg) => write!(f, "Response error: {}", msg),
        }
    }
}

impl std::error::Error for ClassifierError {}

impl From<OrtError> for ClassifierError {
    fn from(err: OrtError) -> Self {
        ClassifierError::BuildError(err.to_string())
    }
}

impl From<reqwest::Error> for ClassifierError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClassifierError::ResponseError(err.to_string())
        } else {
            ClassifierError::RequestError(err.to_string())
        }
    }
}
