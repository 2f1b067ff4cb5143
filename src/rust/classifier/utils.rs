use ndarray::Array1;

pub(crate) fn normalize_vector(vec: &Array1<f32>) -> Array1<f32> {
    let norm: f32 = vec.iter().map(|&x| x * x).sum::<f32>().sqrt();
    if norm > 1e-10 {
        vec / norm
    } else {
        Array1::zeros(vec.len())
    }
}

/// Mean of the example embeddings for one sentiment class.
pub(crate) fn average_vectors(vectors: &[Array1<f32>], embedding_size: usize) -> Array1<f32> {
    if vectors.is_empty() {
        return Array1::zeros(embedding_size);
    }
    let sum = vectors.iter().fold(Array1::zeros(vectors[0].len()), |acc, v| acc + v);
    sum / vectors.len() as f32
}

/// Splits text into lowercase word tokens, keeping inner apostrophes
/// ("don't") and dropping all other punctuation.
pub(crate) fn word_tokens(text: &str) -> Vec<String> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '\''))
        .map(|token| token.trim_matches('\'').to_lowercase())
        .filter(|token| !token.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_normalize_vector() {
        let v = normalize_vector(&array![3.0, 4.0]);
        assert!((v[0] - 0.6).abs() < 1e-6);
        assert!((v[1] - 0.8).abs() < 1e-6);
        assert_eq!(normalize_vector(&array![0.0, 0.0]), array![0.0, 0.0]);
    }

    #[test]
    fn test_average_vectors() {
        let avg = average_vectors(&[array![1.0, 3.0], array![3.0, 5.0]], 2);
        assert_eq!(avg, array![2.0, 4.0]);
        assert_eq!(average_vectors(&[], 3), Array1::<f32>::zeros(3));
    }

    #[test]
    fn test_word_tokens() {
        assert_eq!(
            word_tokens("I don't LIKE it... 'Really'!"),
            vec!["i", "don't", "like", "it", "really"]
        );
        assert!(word_tokens("  ?! ").is_empty());
    }
}
