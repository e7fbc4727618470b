use domain::error::RagError;
use dotenvy::dotenv;
use std::env;
use std::fmt;

pub const ENV_API_KEY: &str = "OPENAI_API_KEY";
pub const ENV_BASE_URL: &str = "OPENAI_BASE_URL";
pub const ENV_TARGET_TOPIC: &str = "TARGET_TOPIC";
pub const ENV_EMBEDDING_MODEL: &str = "EMBEDDING_MODEL";
pub const ENV_CHAT_MODEL: &str = "CHAT_MODEL";
pub const ENV_COMPLETION_MODEL: &str = "COMPLETION_MODEL";

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-ada-002";
pub const DEFAULT_CHAT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_COMPLETION_MODEL: &str = "text-davinci-003";

#[derive(Clone)]
pub struct Config {
    pub api_key: String,
    pub base_url: String,
    pub embedding_model: String,
    pub chat_model: String,
    pub completion_model: String,
    pub target_topic: Option<String>,
}

impl Config {
    /// Reads `.env` (if any) and then the process environment.
    pub fn load() -> Result<Self, RagError> {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from an arbitrary variable lookup. Blank values
    /// count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, RagError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let api_key = get(ENV_API_KEY).ok_or_else(|| RagError::MissingApiKey(ENV_API_KEY.to_string()))?;

        Ok(Self {
            api_key,
            base_url: get(ENV_BASE_URL)
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            embedding_model: get(ENV_EMBEDDING_MODEL)
                .unwrap_or_else(|| DEFAULT_EMBEDDING_MODEL.to_string()),
            chat_model: get(ENV_CHAT_MODEL).unwrap_or_else(|| DEFAULT_CHAT_MODEL.to_string()),
            completion_model: get(ENV_COMPLETION_MODEL)
                .unwrap_or_else(|| DEFAULT_COMPLETION_MODEL.to_string()),
            target_topic: get(ENV_TARGET_TOPIC),
        })
    }

    pub fn require_topic(&self) -> Result<&str, RagError> {
        self.target_topic
            .as_deref()
            .ok_or_else(|| RagError::MissingSetting(ENV_TARGET_TOPIC.to_string()))
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("embedding_model", &self.embedding_model)
            .field("chat_model", &self.chat_model)
            .field("completion_model", &self.completion_model)
            .field("target_topic", &self.target_topic)
            .finish()
    }
}
