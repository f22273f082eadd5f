//! Configuration types for the clinical synthesis service.

use std::path::{Path, PathBuf};

use evidence_search::SearchConfig;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{ClinicalError, Result};

/// Environment variable holding the language model API key.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Environment variable pointing at an alternative config file.
pub const CONFIG_PATH_ENV: &str = "CLINSYNTH_CONFIG";

/// Top-level configuration for the service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP listener settings.
    pub server: ServerConfig,
    /// Language model settings.
    pub llm: LlmConfig,
    /// Evidence search settings.
    pub search: SearchConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host/IP to bind to.
    pub host: String,
    /// Port to bind to. Use `0` for auto-assign.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 3000,
        }
    }
}

/// Language model configuration (any OpenAI-compatible chat completions API).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Base URL for the API server.
    pub api_url: String,
    /// Model name to request from the API.
    pub api_model: String,
    /// API key for the provider.
    ///
    /// For local servers (Ollama/LM Studio/vLLM), this is typically empty.
    /// [`API_KEY_ENV`] overrides the file value.
    pub api_key: String,
    /// Sampling temperature (0.0 = greedy, higher = more random).
    pub temperature: f64,
    /// Maximum tokens to generate per answer.
    pub max_tokens: usize,
    /// Request timeout in seconds.
    pub timeout_seconds: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.openai.com".to_owned(),
            api_model: "gpt-4o-mini".to_owned(),
            api_key: String::new(),
            temperature: 0.3,
            max_tokens: 2000,
            timeout_seconds: 60,
        }
    }
}

impl LlmConfig {
    /// Validates the model settings.
    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.api_url)
            .map_err(|e| ClinicalError::Config(format!("llm.api_url is not a valid URL: {e}")))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ClinicalError::Config(
                "llm.api_url must use http or https".into(),
            ));
        }
        if self.api_model.trim().is_empty() {
            return Err(ClinicalError::Config("llm.api_model must not be empty".into()));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ClinicalError::Config(
                "llm.temperature must be between 0.0 and 2.0".into(),
            ));
        }
        if self.max_tokens == 0 {
            return Err(ClinicalError::Config(
                "llm.max_tokens must be greater than 0".into(),
            ));
        }
        if self.timeout_seconds == 0 {
            return Err(ClinicalError::Config(
                "llm.timeout_seconds must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| ClinicalError::Config(e.to_string()))
    }

    /// Save configuration to a TOML file, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or the config cannot be serialized.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| ClinicalError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Returns the default config file path: `~/.config/clinsynth/config.toml`.
    pub fn default_config_path() -> PathBuf {
        if let Some(config) = std::env::var_os("XDG_CONFIG_HOME") {
            PathBuf::from(config).join("clinsynth").join("config.toml")
        } else if let Some(home) = std::env::var_os("HOME") {
            PathBuf::from(home)
                .join(".config")
                .join("clinsynth")
                .join("config.toml")
        } else {
            PathBuf::from("/tmp/clinsynth-config/config.toml")
        }
    }

    /// Load the effective configuration for the running process.
    ///
    /// Reads [`CONFIG_PATH_ENV`] if set, else [`Self::default_config_path`];
    /// a missing file means defaults. Environment overrides are applied and
    /// the result validated.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing file cannot be parsed or the result
    /// is invalid.
    pub fn load() -> Result<Self> {
        let path = std::env::var_os(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(Self::default_config_path);

        let mut config = if path.exists() {
            tracing::info!(path = %path.display(), "loading config");
            Self::from_file(&path)?
        } else {
            tracing::info!(path = %path.display(), "no config file, using defaults");
            Self::default()
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Apply environment-style overrides from `lookup`.
    ///
    /// Only non-blank values override.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(key) = lookup(API_KEY_ENV).filter(|k| !k.trim().is_empty()) {
            self.llm.api_key = key.trim().to_owned();
        }
    }

    /// Validates every section.
    ///
    /// # Errors
    ///
    /// Returns [`ClinicalError::Config`] or [`ClinicalError::Search`] naming
    /// the first invalid field.
    pub fn validate(&self) -> Result<()> {
        if self.server.host.trim().is_empty() {
            return Err(ClinicalError::Config("server.host must not be empty".into()));
        }
        self.llm.validate()?;
        self.search.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.llm.api_model, "gpt-4o-mini");
        assert_eq!(config.search.max_results, 20);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [server]
            port = 8080

            [search]
            cache_ttl_seconds = 300
            "#,
        )
        .unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.search.cache_ttl_seconds, 300);
        assert_eq!(config.search.timeout_seconds, 10);
        assert_eq!(config.llm, LlmConfig::default());
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = AppConfig::default();
        config.llm.api_model = "local-model".into();
        config.search.health_web_enabled = false;
        config.save_to_file(&path).unwrap();

        let loaded = AppConfig::from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn from_file_nonexistent_returns_error() {
        let result = AppConfig::from_file(Path::new("/nonexistent/path/config.toml"));
        assert!(matches!(result, Err(ClinicalError::Io(_))));
    }

    #[test]
    fn from_file_invalid_toml_returns_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "this is not valid toml {{{").unwrap();
        assert!(matches!(
            AppConfig::from_file(&path),
            Err(ClinicalError::Config(_))
        ));
    }

    #[test]
    fn default_config_path_ends_with_config_toml() {
        let path = AppConfig::default_config_path();
        let path_str = path.to_string_lossy();
        assert!(path_str.ends_with("config.toml"));
        assert!(path_str.contains("clinsynth"));
    }

    #[test]
    fn api_key_override_applies() {
        let mut config = AppConfig::default();
        config.apply_overrides(|key| (key == API_KEY_ENV).then(|| " sk-test ".to_owned()));
        assert_eq!(config.llm.api_key, "sk-test");
    }

    #[test]
    fn blank_override_is_ignored() {
        let mut config = AppConfig::default();
        config.llm.api_key = "from-file".into();
        config.apply_overrides(|_| Some("   ".to_owned()));
        assert_eq!(config.llm.api_key, "from-file");
    }

    #[test]
    fn invalid_llm_settings_rejected() {
        let mut config = AppConfig::default();
        config.llm.api_url = "ftp://example.org".into();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.llm.temperature = 3.5;
        assert!(config.validate().unwrap_err().to_string().contains("temperature"));

        let mut config = AppConfig::default();
        config.llm.max_tokens = 0;
        assert!(config.validate().unwrap_err().to_string().contains("max_tokens"));
    }

    #[test]
    fn invalid_search_settings_rejected() {
        let mut config = AppConfig::default();
        config.search.max_results = 0;
        assert!(matches!(
            config.validate(),
            Err(ClinicalError::Search(_))
        ));
    }
}
