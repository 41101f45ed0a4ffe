use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub directory: DirectorySettings,
    pub ai: AiSettings,
    pub cache: CacheSettings,
    pub rate_limit: RateLimitSettings,
    pub matching: MatchingSettings,
    pub scoring: ScoringSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DirectorySettings {
    pub endpoint: String,
    pub api_key: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AiSettings {
    #[serde(default = "default_ai_provider")]
    pub provider: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default = "default_ai_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_ai_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_ai_provider() -> String { "openai".to_string() }
fn default_ai_max_tokens() -> u32 { 800 }
fn default_ai_timeout_secs() -> u64 { 30 }

#[derive(Debug, Clone, Deserialize)]
pub struct CacheSettings {
    #[serde(default)]
    pub redis_url: Option<String>,
    pub l1_cache_size: Option<u64>,
    pub ttl_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitSettings {
    #[serde(default = "default_rate_max_requests")]
    pub max_requests: usize,
    #[serde(default = "default_rate_window_secs")]
    pub window_secs: u64,
}

fn default_rate_max_requests() -> usize { 5 }
fn default_rate_window_secs() -> u64 { 300 }

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            max_requests: default_rate_max_requests(),
            window_secs: default_rate_window_secs(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatchingSettings {
    pub shortlist_size: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScoringSettings {
    #[serde(default)]
    pub weights: WeightsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeightsConfig {
    #[serde(default = "default_cognitive_weight")]
    pub cognitive: f64,
    #[serde(default = "default_subject_weight")]
    pub subject: f64,
}

impl Default for WeightsConfig {
    fn default() -> Self {
        Self {
            cognitive: default_cognitive_weight(),
            subject: default_subject_weight(),
        }
    }
}

fn default_cognitive_weight() -> f64 { 0.70 }
fn default_subject_weight() -> f64 { 0.30 }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Environment variables (prefixed with COGNI_)
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            // Add default config file
            .add_source(File::with_name("config/default").required(false))
            // Add local config file (for development overrides)
            .add_source(File::with_name("config/local").required(false))
            // Add environment variables (prefixed with COGNI_)
            // e.g., COGNI_SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix("COGNI")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        // Pull provider API keys from their conventional variables
        let settings = substitute_env_vars(settings)?;

        settings.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("COGNI")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }
}

/// Overlay provider-conventional environment variables
///
/// The AI key may come from OPENAI_API_KEY or GEMINI_API_KEY depending on
/// the configured provider; an explicit COGNI_AI__API_KEY wins over both.
fn substitute_env_vars(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let provider = settings
        .get_string("ai.provider")
        .unwrap_or_else(|_| "openai".to_string());

    let provider_key = match provider.to_lowercase().as_str() {
        "gemini" => env::var("GEMINI_API_KEY").ok(),
        _ => env::var("OPENAI_API_KEY").ok(),
    };

    let explicit_key = settings.get_string("ai.api_key").ok();

    let mut builder = Config::builder().add_source(settings);

    if explicit_key.is_none() {
        if let Some(key) = provider_key {
            builder = builder.set_override("ai.api_key", key)?;
        }
    }

    builder.build()
}
