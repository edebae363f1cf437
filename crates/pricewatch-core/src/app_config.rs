use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Immutable run configuration, built once at startup and passed into the
/// engine and adapters at construction time.
#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    pub catalog_path: PathBuf,
    /// Append-only CSV log of price observations.
    pub output_path: PathBuf,
    pub timeseries_api_key: Option<String>,
    pub marketplace_api_token: Option<String>,
    pub timeseries_base_url: String,
    /// Keepa locale id (`4` is amazon.fr).
    pub timeseries_domain: String,
    pub marketplace_base_url: String,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub inter_request_delay_ms: u64,
    /// Additional attempts after a transient transport failure. `0` keeps a
    /// single attempt per fetch.
    pub max_retries: u32,
    pub retry_backoff_base_secs: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("catalog_path", &self.catalog_path)
            .field("output_path", &self.output_path)
            .field(
                "timeseries_api_key",
                &self.timeseries_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field(
                "marketplace_api_token",
                &self.marketplace_api_token.as_ref().map(|_| "[redacted]"),
            )
            .field("timeseries_base_url", &self.timeseries_base_url)
            .field("timeseries_domain", &self.timeseries_domain)
            .field("marketplace_base_url", &self.marketplace_base_url)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("inter_request_delay_ms", &self.inter_request_delay_ms)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_base_secs", &self.retry_backoff_base_secs)
            .finish()
    }
}
