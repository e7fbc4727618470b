use serde::{Deserialize, Serialize};

/// A text together with the embedding computed for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextEmbeddingPair {
    pub text: String,
    pub embedding: Vec<f32>,
}

impl TextEmbeddingPair {
    pub fn new(text: impl Into<String>, embedding: Vec<f32>) -> Self {
        Self {
            text: text.into(),
            embedding,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedResult {
    pub text: String,
    pub relatedness: f32,
}

/// One item of an embeddings response, tagged with the position the
/// provider claims it has in the request.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedEmbedding {
    pub index: usize,
    pub vector: Vec<f32>,
}

/// A review as read from the dataset CSV.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewRow {
    pub date_updated: String,
    pub rating: String,
    pub title: String,
    pub text: String,
}

/// A review plus the prompt that was run and what came back.
///
/// Fields are spelled out rather than flattened so the CSV writer can
/// serialize it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewrittenRow {
    #[serde(rename = "dateUpdated")]
    pub date_updated: String,
    #[serde(rename = "reviews.rating")]
    pub rating: String,
    #[serde(rename = "reviews.title")]
    pub title: String,
    #[serde(rename = "reviews.text")]
    pub text: String,
    #[serde(rename = "what-to-run")]
    pub what_to_run: String,
    pub result: String,
}

impl RewrittenRow {
    pub fn new(review: ReviewRow, what_to_run: String, result: String) -> Self {
        Self {
            date_updated: review.date_updated,
            rating: review.rating,
            title: review.title,
            text: review.text,
            what_to_run,
            result,
        }
    }
}

/// Parameters of a plain text-completion call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRequest {
    pub model: String,
    pub prompt: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub top_p: f32,
    pub frequency_penalty: f32,
    pub presence_penalty: f32,
    pub stop: Option<Vec<String>>,
}

impl CompletionRequest {
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            temperature: 0.0,
            max_tokens: 150,
            top_p: 1.0,
            frequency_penalty: 0.0,
            presence_penalty: 0.0,
            stop: None,
        }
    }
}
