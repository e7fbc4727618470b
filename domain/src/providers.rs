//! Seams to the remote model API. The HTTP client implements all three;
//! tests plug in in-memory fakes.

use crate::chat::ChatMessage;
use crate::error::RagError;
use crate::models::{CompletionRequest, IndexedEmbedding};
use std::future::Future;

pub trait EmbeddingProvider {
    /// Embeds one batch. Items come back tagged with the index the
    /// provider assigned; callers must verify the order.
    fn embed_batch(
        &self,
        model: &str,
        inputs: &[String],
    ) -> impl Future<Output = Result<Vec<IndexedEmbedding>, RagError>> + Send;
}

pub trait ChatProvider {
    fn chat(
        &self,
        model: &str,
        messages: &[ChatMessage],
        temperature: f32,
    ) -> impl Future<Output = Result<String, RagError>> + Send;
}

pub trait CompletionProvider {
    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl Future<Output = Result<String, RagError>> + Send;
}

/// Counts model tokens in a string.
pub trait TokenCounter {
    fn count(&self, text: &str) -> usize;
}

impl<F> TokenCounter for F
where
    F: Fn(&str) -> usize,
{
    fn count(&self, text: &str) -> usize {
        self(text)
    }
}
