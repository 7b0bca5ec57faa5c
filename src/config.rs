use std::env;

use crate::logger::LoggerConfig;

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-image-preview";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_ASPECT_RATIO: &str = "1:1";

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub aspect_ratio: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub gemini: GeminiConfig,
    pub logger: LoggerConfig,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        GeminiConfig {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            aspect_ratio: Some(DEFAULT_ASPECT_RATIO.to_string()),
        }
    }
}

impl GeminiConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads `GEMINI_API_KEY` (or `API_KEY`), `GEMINI_MODEL` and `GEMINI_BASE_URL`.
    /// A missing key is kept as `None`; the client rejects it at call time.
    pub fn from_env() -> Self {
        let api_key = env::var("GEMINI_API_KEY")
            .or_else(|_| env::var("API_KEY"))
            .ok()
            .filter(|key| !key.trim().is_empty());
        let mut config = GeminiConfig {
            api_key,
            ..Default::default()
        };

        if let Ok(model) = env::var("GEMINI_MODEL") {
            config.model = model;
        }
        if let Ok(base_url) = env::var("GEMINI_BASE_URL") {
            config.base_url = base_url;
        }

        config
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_aspect_ratio(mut self, aspect_ratio: Option<String>) -> Self {
        self.aspect_ratio = aspect_ratio;
        self
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key
            .as_deref()
            .map_or(false, |key| !key.trim().is_empty())
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            gemini: GeminiConfig::default(),
            logger: LoggerConfig::default(),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let logger = match env::var("APP_ENV").as_deref() {
            Ok("production") => LoggerConfig::production(),
            Ok("development") => LoggerConfig::development(),
            _ => LoggerConfig::default(),
        };

        Config {
            gemini: GeminiConfig::from_env(),
            logger,
        }
    }

    pub fn with_gemini(mut self, config: GeminiConfig) -> Self {
        self.gemini = config;
        self
    }

    pub fn with_logger(mut self, config: LoggerConfig) -> Self {
        self.logger = config;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GeminiConfig::new();
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.aspect_ratio.as_deref(), Some("1:1"));
        assert!(!config.has_api_key());
    }

    #[test]
    fn test_builders() {
        let config = GeminiConfig::new()
            .with_api_key("secret")
            .with_model("custom-model")
            .with_base_url("http://localhost:9000/v1/")
            .with_aspect_ratio(None);

        assert!(config.has_api_key());
        assert_eq!(config.model, "custom-model");
        assert_eq!(config.base_url, "http://localhost:9000/v1");
        assert!(config.aspect_ratio.is_none());
    }

    #[test]
    fn test_blank_key_is_not_a_key() {
        let config = GeminiConfig::new().with_api_key("   ");
        assert!(!config.has_api_key());
    }
}
