use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::services::AnthropicOptions;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    #[serde(default)]
    pub anthropic: AnthropicSettings,
    #[serde(default)]
    pub data: DataSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

/// Reasoning service settings
///
/// When `api_key` is unset the service runs in deterministic mode: exact-code
/// matching, demo transcripts, and no advisor emails.
#[derive(Debug, Clone, Deserialize)]
pub struct AnthropicSettings {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_api_version")]
    pub api_version: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for AnthropicSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            base_url: default_base_url(),
            api_version: default_api_version(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl AnthropicSettings {
    /// Client options, or `None` when no usable API key is configured
    pub fn options(&self) -> Option<AnthropicOptions> {
        let api_key = self.api_key.as_deref().map(str::trim).filter(|k| !k.is_empty())?;

        Some(AnthropicOptions {
            base_url: self.base_url.clone(),
            api_key: api_key.to_string(),
            model: self.model.clone(),
            api_version: self.api_version.clone(),
            timeout_secs: self.timeout_secs,
        })
    }
}

fn default_model() -> String { "claude-3-5-haiku-20241022".to_string() }
fn default_base_url() -> String { "https://api.anthropic.com".to_string() }
fn default_api_version() -> String { "2023-06-01".to_string() }
fn default_timeout_secs() -> u64 { 60 }

#[derive(Debug, Clone, Deserialize)]
pub struct DataSettings {
    #[serde(default = "default_equivalencies_path")]
    pub equivalencies_path: String,
    #[serde(default = "default_sample_transcript_path")]
    pub sample_transcript_path: String,
}

impl Default for DataSettings {
    fn default() -> Self {
        Self {
            equivalencies_path: default_equivalencies_path(),
            sample_transcript_path: default_sample_transcript_path(),
        }
    }
}

fn default_equivalencies_path() -> String { "data/equivalencies.json".to_string() }
fn default_sample_transcript_path() -> String { "data/sample-transcript.json".to_string() }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with TRANSFER__)
    /// 5. ANTHROPIC_API_KEY / ANTHROPIC_MODEL_ID
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., TRANSFER__SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix("TRANSFER")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        apply_anthropic_env(settings)?.try_deserialize()
    }
}

/// Honor the conventional Anthropic environment variables
fn apply_anthropic_env(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let mut builder = Config::builder().add_source(settings);

    if let Ok(api_key) = env::var("ANTHROPIC_API_KEY") {
        builder = builder.set_override("anthropic.api_key", api_key)?;
    }
    if let Ok(model) = env::var("ANTHROPIC_MODEL_ID") {
        builder = builder.set_override("anthropic.model", model)?;
    }

    builder.build()
}
