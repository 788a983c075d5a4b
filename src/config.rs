use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

/// Upper bound on validation retries, whatever the configuration says.
pub const MAX_VALIDATION_RETRIES: u32 = 3;

/// Main configuration structure, loaded once at start-up
#[derive(Debug, Deserialize, Clone)]
pub struct ExtractorConfig {
    /// Generic page fetching
    #[serde(default)]
    pub fetch: FetchConfig,
    /// Instagram post fetching
    #[serde(default)]
    pub instagram: InstagramConfig,
    /// Provider to use when not specified
    #[serde(default = "default_provider")]
    pub default_provider: String,
    /// Map of provider name to provider configuration
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
    /// Extraction service request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,
    /// Retry behaviour for responses that fail validation
    #[serde(default)]
    pub retry: RetryConfig,
}

/// Configuration for a specific extraction provider
#[derive(Debug, Deserialize, Clone)]
pub struct ProviderConfig {
    /// Whether this provider is enabled
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Model identifier (e.g., "gpt-4o-mini", "claude-sonnet-4-5")
    #[serde(default)]
    pub model: String,
    /// Temperature for generation (0.0-1.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Maximum tokens to generate
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// API key for authentication (can also be set via environment variable)
    pub api_key: Option<String>,
    /// Base URL for API endpoint (for custom or proxy endpoints)
    pub base_url: Option<String>,
}

impl ProviderConfig {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            enabled: true,
            model: model.into(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            api_key: None,
            base_url: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct FetchConfig {
    #[serde(default = "default_fetch_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_fetch_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct InstagramConfig {
    /// Internal GraphQL query endpoint
    #[serde(default = "default_graphql_url")]
    pub graphql_url: String,
    /// Persisted query id for post documents
    #[serde(default = "default_doc_id")]
    pub doc_id: String,
    #[serde(default = "default_fetch_timeout")]
    pub timeout_secs: u64,
}

impl Default for InstagramConfig {
    fn default() -> Self {
        Self {
            graphql_url: default_graphql_url(),
            doc_id: default_doc_id(),
            timeout_secs: default_fetch_timeout(),
        }
    }
}

impl InstagramConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct RetryConfig {
    /// Extra attempts with stricter instructions after a validation failure
    #[serde(default = "default_validation_retries")]
    pub validation_retries: u32,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            validation_retries: default_validation_retries(),
        }
    }
}

impl RetryConfig {
    /// Configured retries, capped at [`MAX_VALIDATION_RETRIES`].
    pub fn bounded(&self) -> u32 {
        self.validation_retries.min(MAX_VALIDATION_RETRIES)
    }
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            fetch: FetchConfig::default(),
            instagram: InstagramConfig::default(),
            default_provider: default_provider(),
            providers: HashMap::new(),
            timeout: default_timeout(),
            retry: RetryConfig::default(),
        }
    }
}

// Default value functions
fn default_provider() -> String {
    "openai".to_string()
}

fn default_enabled() -> bool {
    true
}

fn default_temperature() -> f32 {
    0.0
}

fn default_max_tokens() -> u32 {
    4000
}

fn default_timeout() -> u64 {
    30
}

fn default_fetch_timeout() -> u64 {
    10
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string()
}

fn default_graphql_url() -> String {
    "https://www.instagram.com/graphql/query".to_string()
}

fn default_doc_id() -> String {
    "8845758582119845".to_string()
}

fn default_validation_retries() -> u32 {
    1
}

impl ExtractorConfig {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. Environment variables with RECIPE_EXTRACT__ prefix
    /// 2. recipe-extract.toml file in current directory
    /// 3. Default values
    ///
    /// Environment variable format: RECIPE_EXTRACT__PROVIDERS__OPENAI__API_KEY
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            // Optional config file (can be missing)
            .add_source(File::with_name("recipe-extract").required(false))
            .add_source(
                Environment::with_prefix("RECIPE_EXTRACT")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }

    pub fn service_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    /// Configuration for `name`, falling back to a default model so that a
    /// provider can run from environment API keys alone.
    pub fn provider(&self, name: &str) -> ProviderConfig {
        self.providers
            .get(name)
            .cloned()
            .unwrap_or_else(|| ProviderConfig::new(default_model(name)))
    }
}

/// Default model for a provider name.
pub fn default_model(provider: &str) -> &'static str {
    match provider {
        "anthropic" => "claude-sonnet-4-5",
        "ollama" => "llama3.1",
        _ => "gpt-4o-mini",
    }
}
