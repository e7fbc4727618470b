use thiserror::Error;

/// Failures of the ranking, prompt and provider layers.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RagError {
    #[error("invalid vector: {0}")]
    InvalidVector(String),

    #[error("dimension mismatch: expected {expected}, got {found}")]
    DimensionMismatch { expected: usize, found: usize },

    #[error("token budget {budget} is too small, introduction and question alone need {required}")]
    BudgetTooSmall { required: usize, budget: usize },

    #[error("embedding response out of order: position {position} carries index {found}")]
    OrderMismatch { position: usize, found: usize },

    #[error("embedding response has {found} items for {expected} inputs")]
    CountMismatch { expected: usize, found: usize },

    #[error("API key not found: {0}")]
    MissingApiKey(String),

    #[error("missing setting: {0}")]
    MissingSetting(String),

    #[error("provider error: {0}")]
    Provider(String),
}
