use serde::Deserialize;
use std::time::Duration;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// PostgreSQL database connection URL
    ///
    /// When unset the service runs against the in-process store, which is not durable.
    #[serde(default)]
    pub database_url: Option<String>,

    /// Redis connection URL used to cache generated summaries
    #[serde(default)]
    pub redis_url: Option<String>,

    /// Seconds a generated summary stays in the cache
    #[serde(default = "default_summary_cache_ttl")]
    pub summary_cache_ttl: u64,

    /// OpenAI API key. Without it the summarizer gateway has no provider.
    #[serde(default)]
    pub openai_api_key: Option<String>,

    /// OpenAI API base URL
    #[serde(default = "default_openai_api_url")]
    pub openai_api_url: String,

    /// Chat model used for summaries
    #[serde(default = "default_openai_model")]
    pub openai_model: String,

    /// Token budget for a single completion
    #[serde(default = "default_openai_max_tokens")]
    pub openai_max_tokens: u32,

    /// Upper bound on a single summarizer call
    #[serde(default = "default_summary_timeout_secs")]
    pub summary_timeout_secs: u64,

    /// Allowed CORS origin; any origin when unset
    #[serde(default)]
    pub cors_origin: Option<String>,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_summary_cache_ttl() -> u64 {
    86_400
}

fn default_openai_api_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_openai_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_openai_max_tokens() -> u32 {
    150
}

fn default_summary_timeout_secs() -> u64 {
    10
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    pub fn summary_timeout(&self) -> Duration {
        Duration::from_secs(self.summary_timeout_secs)
    }

    /// Socket address string the server binds to
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
