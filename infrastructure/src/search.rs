use domain::error::RagError;
use domain::models::{RankedResult, TextEmbeddingPair};

pub struct SearchEngine;

impl SearchEngine {
    /// Cosine similarity of `a` and `b`, in `[-1, 1]`.
    ///
    /// Zero-norm or non-finite vectors are rejected instead of producing
    /// NaN, which would poison the ranking order.
    pub fn relatedness(a: &[f32], b: &[f32]) -> Result<f32, RagError> {
        if a.len() != b.len() {
            return Err(RagError::DimensionMismatch {
                expected: a.len(),
                found: b.len(),
            });
        }
        let norm_a = Self::checked_norm(a)?;
        let norm_b = Self::checked_norm(b)?;
        let dot_product: f64 = a
            .iter()
            .zip(b.iter())
            .map(|(x, y)| f64::from(*x) * f64::from(*y))
            .sum();
        Ok((dot_product / (norm_a * norm_b)).clamp(-1.0, 1.0) as f32)
    }

    fn checked_norm(v: &[f32]) -> Result<f64, RagError> {
        if let Some(pos) = v.iter().position(|x| !x.is_finite()) {
            return Err(RagError::InvalidVector(format!(
                "non-finite component at position {pos}"
            )));
        }
        let norm = v.iter().map(|x| f64::from(*x).powi(2)).sum::<f64>().sqrt();
        if norm == 0.0 {
            return Err(RagError::InvalidVector("zero norm".to_string()));
        }
        Ok(norm)
    }

    /// Ranks `corpus` against `query_embedding`, most related first.
    ///
    /// The sort is stable, so equally related texts keep corpus order.
    pub fn rank(
        query_embedding: &[f32],
        corpus: &[TextEmbeddingPair],
        top_n: usize,
    ) -> Result<Vec<RankedResult>, RagError> {
        let mut ranked = corpus
            .iter()
            .map(|pair| {
                Ok(RankedResult {
                    text: pair.text.clone(),
                    relatedness: Self::relatedness(query_embedding, &pair.embedding)?,
                })
            })
            .collect::<Result<Vec<_>, RagError>>()?;

        ranked.sort_by(|a, b| b.relatedness.total_cmp(&a.relatedness));
        ranked.truncate(top_n);
        Ok(ranked)
    }
}
