use std::fmt;

pub mod keywords;
pub mod models;
pub mod outline;

pub const DEFAULT_MODEL_NAME: &str = "gpt-4o-mini";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

#[derive(Clone)]
pub struct Config {
    pub api_key: Option<String>,
    pub model_name: Option<String>,
    pub base_url: Option<String>,
}

impl Config {
    pub fn model_name(&self) -> &str {
        self.model_name.as_deref().unwrap_or(DEFAULT_MODEL_NAME)
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            model_name: None,
            base_url: None,
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &self.api_key.as_deref().map(|_| "<redacted>"))
            .field("model_name", &self.model_name())
            .field("base_url", &self.base_url())
            .finish()
    }
}

pub use keywords::KeywordExtractor;
pub use models::{create_model, ModelKind};
pub use outline::OutlineGenerator;

pub mod prelude {
    pub use super::models::{create_model, ModelKind};
    pub use super::{Config, KeywordExtractor, OutlineGenerator};
    pub use or_core::{CompletionRequest, Error, Result, TextModel};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults_and_redaction() {
        let config = Config {
            api_key: Some("sk-secret".to_string()),
            ..Default::default()
        };
        assert_eq!(config.model_name(), "gpt-4o-mini");
        assert_eq!(config.base_url(), "https://api.openai.com/v1");

        let debug = format!("{:?}", config);
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("<redacted>"));
    }
}
