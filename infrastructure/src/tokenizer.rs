use anyhow::Context;
use domain::providers::TokenCounter;
use shared::types::Result;
use tiktoken_rs::{get_bpe_from_model, CoreBPE};

/// BPE token counter matching the accounting of an OpenAI model.
pub struct TiktokenCounter {
    bpe: CoreBPE,
}

impl TiktokenCounter {
    pub fn for_model(model: &str) -> Result<Self> {
        let bpe = get_bpe_from_model(model)
            .with_context(|| format!("no tokenizer known for model {model}"))?;
        Ok(Self { bpe })
    }
}

impl TokenCounter for TiktokenCounter {
    fn count(&self, text: &str) -> usize {
        self.bpe.encode_with_special_tokens(text).len()
    }
}
