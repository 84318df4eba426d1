use crate::error::ListingSmithError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable holding the provider credential
pub const API_KEY_VAR: &str = "API_KEY_OPENROUTER";

/// ListingSmith application configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Provider API key
    #[serde(skip_serializing)]
    pub api_key: String,

    /// OpenAI-compatible API base URL
    pub llm_base_url: String,

    /// Model identifier sent with every request
    pub llm_model: String,

    /// Sampling temperature
    pub temperature: f32,

    /// Nucleus sampling
    pub top_p: f32,

    /// Maximum tokens to generate
    pub max_tokens: u32,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Log level
    pub log_level: String,

    /// Optional log directory (console only when unset)
    pub log_dir: Option<PathBuf>,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &"<redacted>")
            .field("llm_base_url", &self.llm_base_url)
            .field("llm_model", &self.llm_model)
            .field("temperature", &self.temperature)
            .field("top_p", &self.top_p)
            .field("max_tokens", &self.max_tokens)
            .field("timeout_secs", &self.timeout_secs)
            .field("log_level", &self.log_level)
            .field("log_dir", &self.log_dir)
            .finish()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            llm_base_url: "https://openrouter.ai/api/v1".to_string(),
            llm_model: "deepseek/deepseek-chat".to_string(),
            temperature: 0.7,
            top_p: 0.8,
            max_tokens: 2048,
            timeout_secs: 60,
            log_level: "warn".to_string(),
            log_dir: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables and .env file
    pub fn from_env() -> Result<Self, ListingSmithError> {
        // Load .env file (ignore if not exists)
        let _ = dotenv::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    ///
    /// The credential is required; every other key falls back to its default.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ListingSmithError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let api_key = lookup(API_KEY_VAR)
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
            .ok_or_else(|| {
                ListingSmithError::config(format!(
                    "{API_KEY_VAR} is not set (export it or add it to a .env file)"
                ))
            })?;

        let config = Self {
            api_key,
            llm_base_url: lookup("LLM_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.llm_base_url),
            llm_model: lookup("LLM_MODEL").unwrap_or(defaults.llm_model),
            temperature: parse_var(&lookup, "LLM_TEMPERATURE")?.unwrap_or(defaults.temperature),
            top_p: parse_var(&lookup, "LLM_TOP_P")?.unwrap_or(defaults.top_p),
            max_tokens: parse_var(&lookup, "LLM_MAX_TOKENS")?.unwrap_or(defaults.max_tokens),
            timeout_secs: parse_var(&lookup, "LLM_TIMEOUT_SECS")?
                .unwrap_or(defaults.timeout_secs),
            log_level: lookup("LOG_LEVEL").unwrap_or(defaults.log_level),
            log_dir: lookup("LOG_DIR").map(PathBuf::from),
        };

        config.validate()?;

        Ok(config)
    }

    /// Chat completions endpoint
    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.llm_base_url)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ListingSmithError> {
        if self.api_key.is_empty() {
            return Err(ListingSmithError::config(format!("{API_KEY_VAR} cannot be empty")));
        }

        if !self.llm_base_url.starts_with("http://") && !self.llm_base_url.starts_with("https://")
        {
            return Err(ListingSmithError::config(
                "LLM base URL must start with http:// or https://",
            ));
        }

        if self.llm_model.is_empty() {
            return Err(ListingSmithError::config("LLM model name cannot be empty"));
        }

        if self.timeout_secs == 0 {
            return Err(ListingSmithError::config("LLM timeout cannot be 0"));
        }

        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ListingSmithError::config("LLM temperature must be within 0.0-2.0"));
        }

        if !(0.0..=1.0).contains(&self.top_p) || self.top_p == 0.0 {
            return Err(ListingSmithError::config("LLM top_p must be within (0.0, 1.0]"));
        }

        Ok(())
    }
}

fn parse_var<F, T>(lookup: &F, key: &str) -> Result<Option<T>, ListingSmithError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ListingSmithError::config(format!("{key} has an invalid value '{raw}'"))),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.llm_model, "deepseek/deepseek-chat");
        assert_eq!(config.timeout_secs, 60);
        assert_eq!(config.completions_url(), "https://openrouter.ai/api/v1/chat/completions");
    }

    #[test]
    fn test_missing_credential_is_config_error() {
        let result = AppConfig::from_lookup(lookup_from(&[]));
        assert!(matches!(result, Err(ListingSmithError::Config(_))));

        let result = AppConfig::from_lookup(lookup_from(&[(API_KEY_VAR, "   ")]));
        assert!(matches!(result, Err(ListingSmithError::Config(_))));
    }

    #[test]
    fn test_overrides_from_lookup() {
        let config = AppConfig::from_lookup(lookup_from(&[
            (API_KEY_VAR, "sk-test"),
            ("LLM_BASE_URL", "http://localhost:8080/v1/"),
            ("LLM_MODEL", "openai/gpt-4o-mini"),
            ("LLM_TIMEOUT_SECS", "15"),
            ("LOG_DIR", "/tmp/listingsmith"),
        ]))
        .unwrap();

        assert_eq!(config.api_key, "sk-test");
        assert_eq!(config.completions_url(), "http://localhost:8080/v1/chat/completions");
        assert_eq!(config.llm_model, "openai/gpt-4o-mini");
        assert_eq!(config.timeout_secs, 15);
        assert_eq!(config.log_dir, Some(PathBuf::from("/tmp/listingsmith")));
    }

    #[test]
    fn test_unparseable_number_is_rejected() {
        let result = AppConfig::from_lookup(lookup_from(&[
            (API_KEY_VAR, "sk-test"),
            ("LLM_MAX_TOKENS", "lots"),
        ]));
        assert!(matches!(result, Err(ListingSmithError::Config(_))));
    }

    #[test]
    fn test_validate() {
        let mut config = AppConfig {
            api_key: "sk-test".to_string(),
            ..AppConfig::default()
        };
        assert!(config.validate().is_ok());

        config.timeout_secs = 0;
        assert!(config.validate().is_err());

        config.timeout_secs = 60;
        config.llm_base_url = "ftp://example.com".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_debug_redacts_key() {
        let config = AppConfig {
            api_key: "sk-secret".to_string(),
            ..AppConfig::default()
        };
        let printed = format!("{config:?}");
        assert!(!printed.contains("sk-secret"));
    }
}
