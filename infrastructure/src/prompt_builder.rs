use domain::error::RagError;
use domain::providers::TokenCounter;
use tracing::debug;

pub const DEFAULT_INTRODUCTION: &str = "Use the below reviews of a banking app to answer the subsequent. If the answer cannot be found, write \"I am not sure.\"";

/// Wraps a text in the delimited block used for both context reviews and
/// the first-person rewrite request.
pub fn review_block(text: &str) -> String {
    format!("\n\nReview:\n\"\"\"\n{text}\n\"\"\"")
}

pub fn question_suffix(question: &str) -> String {
    format!("\n\nQuestion: {question}")
}

/// Greedily packs `ranked_texts` (most related first) between
/// `introduction` and the question until the next block would exceed
/// `budget` tokens. Packing stops at the first text that does not fit.
pub fn build_prompt<S, C>(
    ranked_texts: &[S],
    question: &str,
    introduction: &str,
    counter: &C,
    budget: usize,
) -> Result<String, RagError>
where
    S: AsRef<str>,
    C: TokenCounter + ?Sized,
{
    let suffix = question_suffix(question);

    let skeleton = counter.count(&format!("{introduction}{suffix}"));
    if skeleton > budget {
        return Err(RagError::BudgetTooSmall {
            required: skeleton,
            budget,
        });
    }

    let mut message = introduction.to_string();
    let mut included = 0;
    for text in ranked_texts {
        let block = review_block(text.as_ref());
        let candidate = format!("{message}{block}{suffix}");
        if counter.count(&candidate) > budget {
            break;
        }
        message.push_str(&block);
        included += 1;
    }

    debug!(
        included,
        available = ranked_texts.len(),
        budget,
        "prompt assembled"
    );
    message.push_str(&suffix);
    Ok(message)
}
