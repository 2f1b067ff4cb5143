use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use ndarray::Array1;
use ort::session::Session;
use tokenizers::Tokenizer;

use super::builder::PrototypeClassifierBuilder;
use super::embedding::TextEmbedding;
use super::error::ClassifierError;
use super::SentimentClassifier;
use crate::{Label, ModelCharacteristics};

/// Nearest-prototype sentiment classifier on top of an ONNX sentence encoder.
///
/// Each class prototype is the normalized mean embedding of its seed
/// examples; a text gets the label of the prototype with the highest cosine
/// similarity. Given a fixed model and fixed seeds, predictions are
/// deterministic.
#[derive(Debug)]
pub struct PrototypeClassifier {
    pub(crate) name: String,
    pub(crate) tokenizer: Arc<Tokenizer>,
    pub(crate) session: Arc<Session>,
    pub(crate) prototypes: Arc<BTreeMap<Label, Array1<f32>>>,
    pub(crate) model_characteristics: ModelCharacteristics,
}

impl TextEmbedding for PrototypeClassifier {
    fn tokenizer(&self) -> Option<&Tokenizer> {
        Some(&self.tokenizer)
    }

    fn session(&self) -> Option<&Session> {
        Some(&self.session)
    }

    fn max_sequence_length(&self) -> Option<usize> {
        Some(self.model_characteristics.max_sequence_length)
    }
}

impl PrototypeClassifier {
    pub fn builder() -> PrototypeClassifierBuilder {
        PrototypeClassifierBuilder::new()
    }

    /// Predicts the label of `text` and returns the similarity to every class.
    pub fn predict(&self, text: &str) -> Result<(Label, HashMap<Label, f32>), ClassifierError> {
        if text.trim().is_empty() {
            return Err(ClassifierError::ValidationError("Input text cannot be empty".into()));
        }

        let input_vector = self.embed_text(text)?;
        let scores: HashMap<Label, f32> = self
            .prototypes
            .iter()
            .map(|(label, prototype)| (*label, input_vector.dot(prototype)))
            .collect();

        // Ties go to the earlier label so repeated runs agree.
        let best = self
            .prototypes
            .keys()
            .copied()
            .fold(None::<(Label, f32)>, |best, label| {
                let score = scores[&label];
                match best {
                    Some((_, best_score)) if best_score >= score => best,
                    _ => Some((label, score)),
                }
            })
            .map(|(label, _)| label)
            .ok_or_else(|| ClassifierError::PredictionError("No class prototypes".into()))?;

        Ok((best, scores))
    }
}

impl SentimentClassifier for PrototypeClassifier {
    fn name(&self) -> &str {
        &self.name
    }

    fn classify(&self, text: &str) -> Result<Label, ClassifierError> {
        self.predict(text).map(|(label, _)| label)
    }
}

// Compile-time verification of thread-safety
const _: () = {
    fn assert_send_sync<T: Send + Sync>() {}
    fn verify_thread_safety() {
        assert_send_sync::<PrototypeClassifier>();
    }
};
