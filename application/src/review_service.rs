use domain::models::{CompletionRequest, ReviewRow, RewrittenRow};
use domain::providers::CompletionProvider;
use infrastructure::dataset;
use shared::telemetry::Telemetry;
use shared::types::Result;
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct GenerateOptions {
    pub topic: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl GenerateOptions {
    pub fn new(topic: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            model: model.into(),
            max_tokens: 150,
            temperature: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RewriteSummary {
    pub total: usize,
    pub failed: usize,
}

pub fn rewrite_prompt(topic: &str, title: &str, text: &str) -> String {
    format!(
        "Change the following customer review so that it is about a {topic}.\n\nReview title: {title}\nReview description: {text}"
    )
}

/// Sends every review through a completion call, one row at a time.
pub struct ReviewRewriteService<C> {
    completion: C,
    options: GenerateOptions,
}

impl<C: CompletionProvider> ReviewRewriteService<C> {
    pub fn new(completion: C, options: GenerateOptions) -> Self {
        Self {
            completion,
            options,
        }
    }

    fn request_for(&self, prompt: &str) -> CompletionRequest {
        let mut request = CompletionRequest::new(&self.options.model, prompt);
        request.max_tokens = self.options.max_tokens;
        request.temperature = self.options.temperature;
        request
    }

    /// Rewrites one row. A failed call is logged and leaves `result`
    /// empty so the rest of the batch still goes through.
    pub async fn rewrite_row(&self, row: ReviewRow) -> (RewrittenRow, bool) {
        let prompt = rewrite_prompt(&self.options.topic, &row.title, &row.text);
        let request = self.request_for(&prompt);
        match self.completion.complete(&request).await {
            Ok(result) => (RewrittenRow::new(row, prompt, result), true),
            Err(err) => {
                warn!(title = %row.title, error = %err, "completion failed, leaving result empty");
                (RewrittenRow::new(row, prompt, String::new()), false)
            }
        }
    }

    pub async fn rewrite_all(&self, rows: Vec<ReviewRow>) -> (Vec<RewrittenRow>, RewriteSummary) {
        let total = rows.len();
        let mut out = Vec::with_capacity(total);
        let mut failed = 0;
        for (n, row) in rows.into_iter().enumerate() {
            info!(row = n + 1, total, "rewriting review");
            let (rewritten, ok) = self.rewrite_row(row).await;
            if !ok {
                failed += 1;
            }
            out.push(rewritten);
        }
        (out, RewriteSummary { total, failed })
    }

    /// Reads `input`, rewrites every row and writes the result to `output`.
    pub async fn run(&self, input: &Path, output: &Path) -> Result<RewriteSummary> {
        let telemetry = Telemetry::new();
        let rows = dataset::read_reviews(input)?;
        let (rewritten, summary) = self.rewrite_all(rows).await;
        dataset::write_rewritten(output, &rewritten)?;
        info!(
            total = summary.total,
            failed = summary.failed,
            elapsed_ms = telemetry.elapsed_ms(),
            output = %output.display(),
            "dataset rewritten"
        );
        Ok(summary)
    }
}
