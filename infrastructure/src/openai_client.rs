use crate::config::Config;
use domain::chat::ChatMessage;
use domain::error::RagError;
use domain::models::{CompletionRequest, IndexedEmbedding};
use domain::providers::{ChatProvider, CompletionProvider, EmbeddingProvider};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use tracing::debug;

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    index: usize,
    embedding: Vec<f32>,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    text: String,
}

/// Client for an OpenAI-compatible HTTP API.
#[derive(Clone)]
pub struct OpenAiClient {
    client: Arc<Client>,
    base_url: String,
    api_key: String,
}

impl OpenAiClient {
    pub fn new(config: &Config) -> Self {
        Self::with_base_url(&config.api_key, &config.base_url)
    }

    pub fn with_base_url(api_key: &str, base_url: &str) -> Self {
        Self {
            client: Arc::new(Client::new()),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R, RagError>
    where
        B: Serialize + Sync + ?Sized,
        R: DeserializeOwned,
    {
        let url = self.url(path);
        debug!(%url, "POST");
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|err| RagError::Provider(format!("request to {url} failed: {err}")))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|err| RagError::Provider(format!("reading response from {url}: {err}")))?;
        if !status.is_success() {
            return Err(RagError::Provider(format!("API error {status}: {text}")));
        }
        parse_body(&text)
    }
}

fn parse_body<R: DeserializeOwned>(text: &str) -> Result<R, RagError> {
    serde_json::from_str(text)
        .map_err(|err| RagError::Provider(format!("malformed response: {err}")))
}

fn chat_content(response: ChatResponse) -> Result<String, RagError> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| RagError::Provider("chat response has no content".to_string()))
}

fn completion_text(response: CompletionResponse) -> Result<String, RagError> {
    response
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.text.trim().to_string())
        .ok_or_else(|| RagError::Provider("completion response has no choices".to_string()))
}

impl EmbeddingProvider for OpenAiClient {
    fn embed_batch(
        &self,
        model: &str,
        inputs: &[String],
    ) -> impl Future<Output = Result<Vec<IndexedEmbedding>, RagError>> + Send {
        async move {
            let request = EmbeddingRequest {
                model,
                input: inputs,
            };
            let response: EmbeddingResponse = self.post_json("embeddings", &request).await?;
            Ok(response
                .data
                .into_iter()
                .map(|item| IndexedEmbedding {
                    index: item.index,
                    vector: item.embedding,
                })
                .collect())
        }
    }
}

impl ChatProvider for OpenAiClient {
    fn chat(
        &self,
        model: &str,
        messages: &[ChatMessage],
        temperature: f32,
    ) -> impl Future<Output = Result<String, RagError>> + Send {
        async move {
            let request = ChatRequest {
                model,
                messages,
                temperature,
            };
            let response: ChatResponse = self.post_json("chat/completions", &request).await?;
            chat_content(response)
        }
    }
}

impl CompletionProvider for OpenAiClient {
    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl Future<Output = Result<String, RagError>> + Send {
        async move {
            let response: CompletionResponse = self.post_json("completions", request).await?;
            completion_text(response)
        }
    }
}
