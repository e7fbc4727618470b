use domain::error::RagError;
use domain::models::{IndexedEmbedding, TextEmbeddingPair};
use domain::providers::EmbeddingProvider;
use tracing::debug;

/// Inputs per embeddings request. The API accepts up to 2048.
pub const BATCH_SIZE: usize = 1000;

pub struct Embedder<P> {
    provider: P,
    model: String,
    batch_size: usize,
}

impl<P: EmbeddingProvider> Embedder<P> {
    pub fn new(provider: P, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            batch_size: BATCH_SIZE,
        }
    }

    #[cfg(test)]
    fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    #[cfg(test)]
    fn provider(&self) -> &P {
        &self.provider
    }

    /// Embeds `texts` in consecutive batches. Output order matches input.
    pub async fn generate_embeddings(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, RagError> {
        let mut embeddings = Vec::with_capacity(texts.len());

        for (batch_no, chunk) in texts.chunks(self.batch_size).enumerate() {
            debug!(batch = batch_no, size = chunk.len(), model = %self.model, "embedding batch");
            let response = self.provider.embed_batch(&self.model, chunk).await?;
            embeddings.extend(verify_order(chunk.len(), response)?);
        }
        Ok(embeddings)
    }

    pub async fn embed_corpus(&self, texts: Vec<String>) -> Result<Vec<TextEmbeddingPair>, RagError> {
        let vectors = self.generate_embeddings(&texts).await?;
        Ok(texts
            .into_iter()
            .zip(vectors)
            .map(|(text, embedding)| TextEmbeddingPair { text, embedding })
            .collect())
    }

    pub async fn embed_query(&self, query: &str) -> Result<Vec<f32>, RagError> {
        let mut vectors = self.generate_embeddings(&[query.to_string()]).await?;
        vectors
            .pop()
            .ok_or_else(|| RagError::Provider("no embedding returned for query".to_string()))
    }
}

/// Checks that the provider answered every input, in request order.
fn verify_order(expected: usize, items: Vec<IndexedEmbedding>) -> Result<Vec<Vec<f32>>, RagError> {
    if items.len() != expected {
        return Err(RagError::CountMismatch {
            expected,
            found: items.len(),
        });
    }
    items
        .into_iter()
        .enumerate()
        .map(|(position, item)| {
            if item.index == position {
                Ok(item.vector)
            } else {
                Err(RagError::OrderMismatch {
                    position,
                    found: item.index,
                })
            }
        })
        .collect()
}
