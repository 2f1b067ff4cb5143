use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use log::{error, info};
use ndarray::Array1;
use ort::session::Session;
use tokenizers::Tokenizer;

use super::embedding::TextEmbedding;
use super::error::ClassifierError;
use super::prototype::PrototypeClassifier;
use super::utils::{average_vectors, normalize_vector};
use crate::runtime::{create_session_builder, RuntimeConfig};
use crate::{BuiltinModel, Label, ModelCharacteristics, ModelManager};

const MAX_DESCRIPTION_LENGTH: usize = 1000;

/// One sentiment class: its label, a short description and the seed examples
/// whose averaged embedding becomes the class prototype.
#[derive(Debug, Clone)]
pub struct ClassDefinition {
    pub label: Label,
    pub description: String,
    pub examples: Vec<String>,
}

impl ClassDefinition {
    pub fn new(label: Label, description: impl Into<String>) -> Self {
        Self {
            label,
            description: description.into(),
            examples: Vec::new(),
        }
    }

    pub fn with_examples(mut self, examples: Vec<impl Into<String>>) -> Self {
        self.examples = examples.into_iter().map(Into::into).collect();
        self
    }
}

/// Seed examples for the three sentiment classes.
pub fn default_sentiment_classes() -> Vec<ClassDefinition> {
    vec![
        ClassDefinition::new(Label::Negative, "Content expressing negative sentiment")
            .with_examples(vec![
                "This is terrible and I hate it",
                "What an awful, disappointing experience",
                "The service was rude and slow",
                "It broke after one day, complete waste of money",
                "I am so frustrated and angry right now",
            ]),
        ClassDefinition::new(Label::Neutral, "Content without a clear sentiment")
            .with_examples(vec![
                "The meeting is scheduled for Tuesday at 3pm",
                "The package contains two cables and a manual",
                "She moved to the city last year",
                "The report covers the first quarter",
                "Trains leave every fifteen minutes",
            ]),
        ClassDefinition::new(Label::Positive, "Content expressing positive sentiment")
            .with_examples(vec![
                "This is wonderful, I love it",
                "What a fantastic experience, highly recommended",
                "The staff were friendly and helpful",
                "Works perfectly, best purchase this year",
                "I am so happy and excited right now",
            ]),
    ]
}

/// Fluent construction of a [`PrototypeClassifier`].
///
/// ```no_run
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use showdown::{default_sentiment_classes, BuiltinModel, PrototypeClassifier};
///
/// let mut builder = PrototypeClassifier::builder().with_model(BuiltinModel::MiniLM)?;
/// for class in default_sentiment_classes() {
///     builder = builder.add_class(class)?;
/// }
/// let classifier = builder.build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct PrototypeClassifierBuilder {
    name: String,
    model_path: Option<String>,
    tokenizer: Option<Tokenizer>,
    session: Option<Session>,
    classes: BTreeMap<Label, ClassDefinition>,
    model_characteristics: Option<ModelCharacteristics>,
}

impl Default for PrototypeClassifierBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TextEmbedding for PrototypeClassifierBuilder {
    fn tokenizer(&self) -> Option<&Tokenizer> {
        self.tokenizer.as_ref()
    }

    fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    fn max_sequence_length(&self) -> Option<usize> {
        self.model_characteristics.as_ref().map(|c| c.max_sequence_length)
    }
}

impl PrototypeClassifierBuilder {
    pub fn new() -> Self {
        Self {
            name: "prototype".to_string(),
            model_path: None,
            tokenizer: None,
            session: None,
            classes: BTreeMap::new(),
            model_characteristics: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Loads a built-in model from the default cache directory.
    pub fn with_model(self, model: BuiltinModel) -> Result<Self, ClassifierError> {
        let manager = ModelManager::new_default().map_err(|e| {
            ClassifierError::BuildError(format!("Failed to create model manager: {}", e))
        })?;
        self.with_model_from(&manager, model)
    }

    /// Loads a built-in model from the given cache. The model must already be
    /// downloaded.
    pub fn with_model_from(
        mut self,
        manager: &ModelManager,
        model: BuiltinModel,
    ) -> Result<Self, ClassifierError> {
        if self.model_path.is_some() {
            return Err(ClassifierError::BuildError("Model already set".to_string()));
        }
        if !manager.is_model_downloaded(model) {
            return Err(ClassifierError::BuildError(format!(
                "Model '{:?}' is not downloaded. \
                 Download it first with ModelManager::download_model()",
                model
            )));
        }

        let model_path = manager.get_model_path(model);
        let tokenizer_path = manager.get_tokenizer_path(model);
        self.load(&model_path, &tokenizer_path)?;
        self.model_characteristics = Some(model.characteristics());
        Ok(self)
    }

    /// Loads an ONNX encoder and tokenizer from arbitrary paths.
    /// `max_sequence_length` defaults to 256 tokens.
    pub fn with_custom_model(
        mut self,
        model_path: &str,
        tokenizer_path: &str,
        max_sequence_length: Option<usize>,
    ) -> Result<Self, ClassifierError> {
        if model_path.is_empty() || tokenizer_path.is_empty() {
            return Err(ClassifierError::BuildError(
                "Model and tokenizer paths cannot be empty".to_string(),
            ));
        }
        if self.model_path.is_some() {
            return Err(ClassifierError::BuildError("Model already set".to_string()));
        }
        for path in [model_path, tokenizer_path] {
            if !Path::new(path).exists() {
                return Err(ClassifierError::BuildError(format!("File not found: {}", path)));
            }
        }

        self.load(Path::new(model_path), Path::new(tokenizer_path))?;

        let max_sequence_length = max_sequence_length.unwrap_or(256);
        self.model_characteristics = Some(ModelCharacteristics {
            embedding_size: 0,
            max_sequence_length,
            model_size_mb: 0,
        });
        let embedding_size = self.embed_text("Test input to infer embedding size")?.len();
        info!("Inferred embedding size from model: {}", embedding_size);
        self.model_characteristics = Some(ModelCharacteristics {
            embedding_size,
            max_sequence_length,
            model_size_mb: 0,
        });
        Ok(self)
    }

    fn load(&mut self, model_path: &Path, tokenizer_path: &Path) -> Result<(), ClassifierError> {
        let tokenizer = Tokenizer::from_file(tokenizer_path).map_err(|e| {
            error!("Failed to load tokenizer: {}", e);
            ClassifierError::BuildError(format!("Failed to load tokenizer: {}", e))
        })?;

        let session =
            create_session_builder(&RuntimeConfig::default())?.commit_from_file(model_path)?;
        Self::validate_model(&session)?;
        info!("Loaded encoder from {:?}", model_path);

        self.model_path = Some(model_path.to_string_lossy().to_string());
        self.tokenizer = Some(tokenizer);
        self.session = Some(session);
        Ok(())
    }

    fn validate_class(class: &ClassDefinition) -> Result<(), ClassifierError> {
        if class.label.is_unknown() {
            return Err(ClassifierError::ValidationError(
                "The unknown label cannot be used as a class".into(),
            ));
        }
        if class.description.is_empty() {
            return Err(ClassifierError::ValidationError(
                "Class description cannot be empty".into(),
            ));
        }
        if class.description.len() > MAX_DESCRIPTION_LENGTH {
            return Err(ClassifierError::ValidationError(format!(
                "Class description is too long ({} chars, max is {})",
                class.description.len(),
                MAX_DESCRIPTION_LENGTH
            )));
        }
        if class.examples.is_empty() {
            return Err(ClassifierError::ValidationError(format!(
                "Class '{}' must have at least one example",
                class.label
            )));
        }
        if let Some(pos) = class.examples.iter().position(|e| e.trim().is_empty()) {
            return Err(ClassifierError::ValidationError(format!(
                "Example {} of class '{}' cannot be empty",
                pos + 1,
                class.label
            )));
        }
        Ok(())
    }

    pub fn add_class(mut self, class: ClassDefinition) -> Result<Self, ClassifierError> {
        Self::validate_class(&class)?;
        if self.classes.contains_key(&class.label) {
            return Err(ClassifierError::ValidationError(format!(
                "Class '{}' was already added",
                class.label
            )));
        }
        self.classes.insert(class.label, class);
        Ok(self)
    }

    /// Embeds every seed example and folds them into one normalized prototype
    /// per class.
    pub fn build(mut self) -> Result<PrototypeClassifier, ClassifierError> {
        if self.model_path.is_none() {
            return Err(ClassifierError::BuildError("A model must be set".to_string()));
        }
        if self.classes.is_empty() {
            return Err(ClassifierError::BuildError("At least one class must be added".to_string()));
        }
        let model_characteristics = self
            .model_characteristics
            .clone()
            .ok_or_else(|| {
                ClassifierError::BuildError("Model characteristics not set".to_string())
            })?;

        let mut prototypes = BTreeMap::new();
        for (label, class) in &self.classes {
            let embedded: Vec<Array1<f32>> = class
                .examples
                .iter()
                .enumerate()
                .filter_map(|(i, text)| match self.embed_text(text) {
                    Ok(embedding) => Some(embedding),
                    Err(e) => {
                        error!("Failed to embed example {} for class '{}': {}", i + 1, label, e);
                        None
                    }
                })
                .collect();
            if embedded.is_empty() {
                return Err(ClassifierError::BuildError(format!(
                    "No valid embeddings generated for class '{}'",
                    label
                )));
            }
            let average = average_vectors(&embedded, model_characteristics.embedding_size);
            prototypes.insert(*label, normalize_vector(&average));
        }

        let tokenizer = self
            .tokenizer
            .take()
            .ok_or_else(|| ClassifierError::BuildError("No tokenizer loaded".into()))?;
        let session = self
            .session
            .take()
            .ok_or_else(|| ClassifierError::BuildError("No ONNX model loaded".into()))?;
        info!("Built '{}' with {} class prototypes", self.name, prototypes.len());
        Ok(PrototypeClassifier {
            name: self.name,
            tokenizer: Arc::new(tokenizer),
            session: Arc::new(session),
            prototypes: Arc::new(prototypes),
            model_characteristics,
        })
    }

    /// The encoder needs `input_ids` and `attention_mask` inputs and at least
    /// one output.
    fn validate_model(session: &Session) -> Result<(), ClassifierError> {
        if session.inputs.len() < 2 {
            return Err(ClassifierError::ModelError(format!(
                "Model must have at least 2 inputs (input_ids and attention_mask), found {}",
                session.inputs.len()
            )));
        }
        if session.outputs.is_empty() {
            return Err(ClassifierError::ModelError(
                "Model must have at least 1 output for embeddings".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_validation() {
        let builder = PrototypeClassifierBuilder::new();
        let builder = builder
            .add_class(
                ClassDefinition::new(Label::Positive, "Positive").with_examples(vec!["great"]),
            )
            .unwrap();

        let duplicate = ClassDefinition::new(Label::Positive, "Again").with_examples(vec!["nice"]);
        assert!(matches!(
            PrototypeClassifierBuilder::new()
                .add_class(duplicate.clone())
                .and_then(|b| b.add_class(duplicate)),
            Err(ClassifierError::ValidationError(_))
        ));

        assert!(builder
            .add_class(ClassDefinition::new(Label::Negative, "No examples"))
            .is_err());
        assert!(PrototypeClassifierBuilder::new()
            .add_class(ClassDefinition::new(Label::Negative, "").with_examples(vec!["bad"]))
            .is_err());
        assert!(PrototypeClassifierBuilder::new()
            .add_class(ClassDefinition::new(Label::Negative, "Blank").with_examples(vec!["  "]))
            .is_err());
        assert!(PrototypeClassifierBuilder::new()
            .add_class(ClassDefinition::new(Label::Unknown, "Unknown").with_examples(vec!["x"]))
            .is_err());
        assert!(PrototypeClassifierBuilder::new()
            .add_class(
                ClassDefinition::new(Label::Negative, "a".repeat(1001)).with_examples(vec!["bad"])
            )
            .is_err());
    }

    #[test]
    fn test_build_requires_model() {
        let result = PrototypeClassifierBuilder::new()
            .add_class(
                ClassDefinition::new(Label::Positive, "Positive").with_examples(vec!["great"]),
            )
            .unwrap()
            .build();
        assert!(matches!(result, Err(ClassifierError::BuildError(_))));
    }

    #[test]
    fn test_custom_model_paths_are_checked() {
        assert!(matches!(
            PrototypeClassifierBuilder::new().with_custom_model("", "tokenizer.json", None),
            Err(ClassifierError::BuildError(_))
        ));
        assert!(matches!(
            PrototypeClassifierBuilder::new().with_custom_model(
                "/missing/model.onnx",
                "/missing/tokenizer.json",
                None
            ),
            Err(ClassifierError::BuildError(_))
        ));
    }

    #[test]
    fn test_model_must_be_downloaded() {
        let dir = tempfile::tempdir().unwrap();
        let manager = ModelManager::new(dir.path()).unwrap();
        let result =
            PrototypeClassifierBuilder::new().with_model_from(&manager, BuiltinModel::MiniLM);
        assert!(matches!(result, Err(ClassifierError::BuildError(_))));
    }

    #[test]
    fn test_default_classes_are_valid() {
        let classes = default_sentiment_classes();
        let labels: Vec<Label> = classes.iter().map(|c| c.label).collect();
        assert_eq!(labels, Label::ALL.to_vec());
        for class in &classes {
            assert!(PrototypeClassifierBuilder::validate_class(class).is_ok());
        }
    }
}
