use std::collections::HashMap;

use log::debug;
use ndarray::{Array1, Array2};
use ort::session::Session;
use ort::value::Tensor;
use tokenizers::Tokenizer;

use super::error::ClassifierError;
use super::utils::normalize_vector;

/// Turns text into a normalized sentence embedding with an ONNX encoder.
///
/// The encoder is expected to take `input_ids` and `attention_mask`
/// (both `[1, sequence_length]`, i64) and return token embeddings shaped
/// `[1, sequence_length, embedding_size]`. The first token's embedding is used
/// as the sentence embedding.
pub(crate) trait TextEmbedding {
    fn tokenizer(&self) -> Option<&Tokenizer>;

    fn session(&self) -> Option<&Session>;

    fn max_sequence_length(&self) -> Option<usize>;

    /// Token IDs for the text, truncated to the model's maximum sequence length.
    fn tokenize(&self, text: &str) -> Result<Vec<u32>, ClassifierError> {
        let tokenizer = self
            .tokenizer()
            .ok_or_else(|| ClassifierError::TokenizerError("Tokenizer not initialized".into()))?;
        let max_length = self
            .max_sequence_length()
            .ok_or_else(|| ClassifierError::TokenizerError("Max sequence length not set".into()))?;

        let encoding = tokenizer
            .encode(text, false)
            .map_err(|e| ClassifierError::TokenizerError(e.to_string()))?;
        let mut token_ids = encoding.get_ids().to_vec();
        if token_ids.is_empty() {
            return Err(ClassifierError::ValidationError(
                "Input text produced no tokens".into(),
            ));
        }
        if token_ids.len() > max_length {
            debug!("Truncating input from {} to {} tokens", token_ids.len(), max_length);
            token_ids.truncate(max_length);
        }
        Ok(token_ids)
    }

    fn embed_text(&self, text: &str) -> Result<Array1<f32>, ClassifierError> {
        let tokens = self.tokenize(text)?;
        self.get_embedding(&tokens)
    }

    fn get_embedding(&self, tokens: &[u32]) -> Result<Array1<f32>, ClassifierError> {
        let session = self
            .session()
            .ok_or_else(|| ClassifierError::ModelError("Session not initialized".into()))?;

        let input_array = Array2::from_shape_vec(
            (1, tokens.len()),
            tokens.iter().map(|&x| x as i64).collect(),
        )
        .map_err(|e| ClassifierError::ModelError(format!("Failed to create input array: {}", e)))?;
        let input_dyn = input_array.into_dyn();
        let input_ids = input_dyn.as_standard_layout();

        // Every token is real: inputs are never padded.
        let mask_array = Array2::from_elem((1, tokens.len()), 1i64);
        let mask_dyn = mask_array.into_dyn();
        let attention_mask = mask_dyn.as_standard_layout();

        let mut input_tensors = HashMap::new();
        input_tensors.insert(
            "input_ids",
            Tensor::from_array(&input_ids).map_err(|e| {
                ClassifierError::ModelError(format!("Failed to create input tensor: {}", e))
            })?,
        );
        input_tensors.insert(
            "attention_mask",
            Tensor::from_array(&attention_mask).map_err(|e| {
                ClassifierError::ModelError(format!("Failed to create mask tensor: {}", e))
            })?,
        );

        let outputs = session
            .run(input_tensors)
            .map_err(|e| ClassifierError::ModelError(format!("Failed to run model: {}", e)))?;
        let output_tensor = outputs[0].try_extract_tensor::<f32>().map_err(|e| {
            ClassifierError::ModelError(format!("Failed to extract output tensor: {}", e))
        })?;
        if output_tensor.ndim() != 3 {
            return Err(ClassifierError::ModelError(format!(
                "Expected a rank-3 output tensor, got rank {}",
                output_tensor.ndim()
            )));
        }

        let embedding =
            Array1::from_iter(output_tensor.slice(ndarray::s![0, 0, ..]).iter().cloned());
        Ok(normalize_vector(&embedding))
    }
}
