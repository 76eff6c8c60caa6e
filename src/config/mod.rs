//! Configuration management.
//!
//! Settings are layered, lowest precedence first:
//!
//! 1. Built-in defaults
//! 2. A TOML file (`--config <path>`, else `arxiv-chat.toml` in the working directory)
//! 3. `ARXIV_CHAT_` environment variables, with `__` between section and key
//!    (e.g. `ARXIV_CHAT_ANTHROPIC__MODEL`)
//! 4. `ANTHROPIC_API_KEY` for the API key
//!
//! # Configuration File Format
//!
//! ```toml
//! [anthropic]
//! model = "claude-3-7-sonnet-20250219"
//! max_tokens = 2024
//! base_url = "https://api.anthropic.com"
//!
//! [storage]
//! papers_dir = "papers"
//!
//! [http]
//! timeout_secs = 30
//! connect_timeout_secs = 10
//!
//! [logging]
//! level = "info"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default config file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "arxiv-chat.toml";

/// Environment variable holding the Anthropic API key
pub const API_KEY_ENV: &str = "ANTHROPIC_API_KEY";

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// LLM settings
    #[serde(default)]
    pub anthropic: AnthropicConfig,

    /// Where paper metadata is stored
    #[serde(default)]
    pub storage: StorageConfig,

    /// HTTP client settings
    #[serde(default)]
    pub http: HttpConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Anthropic Messages API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnthropicConfig {
    /// API key (normally supplied through `ANTHROPIC_API_KEY`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Model name
    #[serde(default = "default_model")]
    pub model: String,

    /// Generation budget per model call
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// API base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            max_tokens: default_max_tokens(),
            base_url: default_base_url(),
        }
    }
}

fn default_model() -> String {
    "claude-3-7-sonnet-20250219".to_string()
}

fn default_max_tokens() -> u32 {
    2024
}

fn default_base_url() -> String {
    "https://api.anthropic.com".to_string()
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root directory for per-topic metadata files
    #[serde(default = "default_papers_dir")]
    pub papers_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            papers_dir: default_papers_dir(),
        }
    }
}

fn default_papers_dir() -> PathBuf {
    PathBuf::from("papers")
}

/// HTTP client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Whole-request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Connect timeout in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            connect_timeout_secs: default_connect_timeout(),
        }
    }
}

fn default_timeout() -> u64 {
    30
}

fn default_connect_timeout() -> u64 {
    10
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Load configuration from defaults, an optional file, and the environment.
///
/// An explicit `path` must exist; the default file is optional.
pub fn load_config(path: Option<&Path>) -> Result<Config, config::ConfigError> {
    let file = match path {
        Some(path) => config::File::from(path).required(true),
        None => config::File::from(Path::new(DEFAULT_CONFIG_FILE)).required(false),
    };

    let settings = config::Config::builder()
        .add_source(config::Config::try_from(&Config::default())?)
        .add_source(file)
        .add_source(
            config::Environment::with_prefix("ARXIV_CHAT")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    let mut config: Config = settings.try_deserialize()?;
    if let Ok(key) = std::env::var(API_KEY_ENV) {
        if !key.trim().is_empty() {
            config.anthropic.api_key = Some(key);
        }
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.anthropic.max_tokens, 2024);
        assert_eq!(config.anthropic.model, "claude-3-7-sonnet-20250219");
        assert_eq!(config.storage.papers_dir, PathBuf::from("papers"));
        assert_eq!(config.http.timeout_secs, 30);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_load_config_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("arxiv-chat.toml");

        let toml_content = r#"
[anthropic]
model = "claude-test"
max_tokens = 512

[storage]
papers_dir = "/tmp/papers"
"#;
        let mut file = File::create(&path).unwrap();
        file.write_all(toml_content.as_bytes()).unwrap();

        let config = load_config(Some(&path)).unwrap();

        assert_eq!(config.anthropic.model, "claude-test");
        assert_eq!(config.anthropic.max_tokens, 512);
        assert_eq!(config.storage.papers_dir, PathBuf::from("/tmp/papers"));
        // Untouched sections keep their defaults
        assert_eq!(config.anthropic.base_url, "https://api.anthropic.com");
        assert_eq!(config.http.connect_timeout_secs, 10);
    }

    #[test]
    fn test_load_config_missing_explicit_file() {
        let result = load_config(Some(Path::new("/nonexistent/arxiv-chat.toml")));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_invalid_toml() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("invalid.toml");
        std::fs::write(&path, "invalid = toml = content").unwrap();

        assert!(load_config(Some(&path)).is_err());
    }
}
