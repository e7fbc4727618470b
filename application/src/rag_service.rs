use anyhow::Context;
use domain::chat::{ChatMessage, Conversation};
use domain::models::{RankedResult, TextEmbeddingPair};
use domain::providers::{ChatProvider, EmbeddingProvider, TokenCounter};
use infrastructure::embedder::Embedder;
use infrastructure::prompt_builder::{build_prompt, review_block, DEFAULT_INTRODUCTION};
use infrastructure::search::SearchEngine;
use shared::telemetry::Telemetry;
use shared::types::Result;
use tracing::{debug, info};

pub const ANSWER_SYSTEM_PROMPT: &str = "You answer questions about a banking app features.";
pub const REWRITE_SYSTEM_PROMPT: &str = "You rephrase text to first person.";

/// Context window of the default chat model minus room for the answer.
pub const DEFAULT_TOKEN_BUDGET: usize = 4096 - 500;
pub const DEFAULT_TOP_N: usize = 100;

#[derive(Debug, Clone)]
pub struct AskOptions {
    pub chat_model: String,
    pub introduction: String,
    pub top_n: usize,
    pub token_budget: usize,
    pub temperature: f32,
}

impl AskOptions {
    pub fn new(chat_model: impl Into<String>) -> Self {
        Self {
            chat_model: chat_model.into(),
            introduction: DEFAULT_INTRODUCTION.to_string(),
            top_n: DEFAULT_TOP_N,
            token_budget: DEFAULT_TOKEN_BUDGET,
            temperature: 0.0,
        }
    }
}

/// Everything produced while answering one question.
#[derive(Debug, Clone)]
pub struct AskOutcome {
    pub prompt: String,
    pub answer: String,
    pub first_person: String,
}

pub struct RagService<E, C, T> {
    embedder: Embedder<E>,
    chat: C,
    counter: T,
    options: AskOptions,
}

impl<E, C, T> RagService<E, C, T>
where
    E: EmbeddingProvider,
    C: ChatProvider,
    T: TokenCounter,
{
    pub fn new(embedder: Embedder<E>, chat: C, counter: T, options: AskOptions) -> Self {
        Self {
            embedder,
            chat,
            counter,
            options,
        }
    }

    pub async fn build_corpus(&self, texts: Vec<String>) -> Result<Vec<TextEmbeddingPair>> {
        let telemetry = Telemetry::new();
        let count = texts.len();
        let corpus = self
            .embedder
            .embed_corpus(texts)
            .await
            .context("embedding corpus")?;
        info!(count, elapsed_ms = telemetry.elapsed_ms(), "corpus embedded");
        Ok(corpus)
    }

    /// Embeds `query` and ranks `corpus` against it.
    pub async fn rank(
        &self,
        query: &str,
        corpus: &[TextEmbeddingPair],
        top_n: usize,
    ) -> Result<Vec<RankedResult>> {
        let query_embedding = self
            .embedder
            .embed_query(query)
            .await
            .context("embedding query")?;
        Ok(SearchEngine::rank(&query_embedding, corpus, top_n)?)
    }

    /// Builds the budgeted prompt for `query` from the most related texts.
    pub async fn query_message(&self, query: &str, corpus: &[TextEmbeddingPair]) -> Result<String> {
        let ranked = self.rank(query, corpus, self.options.top_n).await?;
        let texts: Vec<&str> = ranked.iter().map(|r| r.text.as_str()).collect();
        let prompt = build_prompt(
            &texts,
            query,
            &self.options.introduction,
            &self.counter,
            self.options.token_budget,
        )?;
        debug!(tokens = self.counter.count(&prompt), "query message ready");
        Ok(prompt)
    }

    /// First stage: answer the assembled prompt.
    pub async fn answer_question(&self, prompt: &str) -> Result<String> {
        let conversation = Conversation::with_system(ANSWER_SYSTEM_PROMPT).push_user(prompt);
        self.chat_once(&conversation.messages)
            .await
            .context("answering question")
    }

    /// Second stage: restate an answer in first person.
    pub async fn rewrite_first_person(&self, answer: &str) -> Result<String> {
        let messages = [
            ChatMessage::system(REWRITE_SYSTEM_PROMPT),
            ChatMessage::user(review_block(answer)),
        ];
        self.chat_once(&messages)
            .await
            .context("rewriting answer in first person")
    }

    pub async fn ask(&self, query: &str, corpus: &[TextEmbeddingPair]) -> Result<AskOutcome> {
        self.ask_with(query, corpus, |_| {}).await
    }

    /// Like [`ask`](Self::ask), handing the assembled prompt to `on_prompt`
    /// before it is sent.
    pub async fn ask_with<F>(
        &self,
        query: &str,
        corpus: &[TextEmbeddingPair],
        on_prompt: F,
    ) -> Result<AskOutcome>
    where
        F: FnOnce(&str),
    {
        let telemetry = Telemetry::new();
        let prompt = self.query_message(query, corpus).await?;
        on_prompt(&prompt);
        let answer = self.answer_question(&prompt).await?;
        let first_person = self.rewrite_first_person(&answer).await?;
        info!(elapsed_ms = telemetry.elapsed_ms(), "question answered");
        Ok(AskOutcome {
            prompt,
            answer,
            first_person,
        })
    }

    async fn chat_once(&self, messages: &[ChatMessage]) -> Result<String> {
        Ok(self
            .chat
            .chat(&self.options.chat_model, messages, self.options.temperature)
            .await?)
    }
}
