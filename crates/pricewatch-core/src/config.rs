use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Browser-like `User-Agent` sent to scraped pages. Plain library agents are
/// blocked outright by most storefront anti-bot layers.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Name of the credential holding the price-history API key.
pub const TIMESERIES_API_KEY: &str = "TIMESERIES_API_KEY";

/// Name of the credential holding the marketplace bearer token.
pub const MARKETPLACE_API_TOKEN: &str = "MARKETPLACE_API_TOKEN";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so tests can drive it with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    // Empty secrets are treated the same as unset ones.
    let optional_secret = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let env = parse_environment(&or_default("PRICEWATCH_ENV", "development"))?;
    let log_level = or_default("PRICEWATCH_LOG_LEVEL", "info");
    let catalog_path = PathBuf::from(or_default(
        "PRICEWATCH_CATALOG_PATH",
        "./config/catalog.yaml",
    ));
    let output_path = PathBuf::from(or_default("PRICEWATCH_OUTPUT_PATH", "./prices.csv"));

    let timeseries_api_key = optional_secret(TIMESERIES_API_KEY);
    let marketplace_api_token = optional_secret(MARKETPLACE_API_TOKEN);

    let timeseries_base_url = or_default("PRICEWATCH_TIMESERIES_BASE_URL", "https://api.keepa.com");
    let timeseries_domain = or_default("PRICEWATCH_TIMESERIES_DOMAIN", "4");
    let marketplace_base_url = or_default(
        "PRICEWATCH_MARKETPLACE_BASE_URL",
        "https://api.backmarket.dev",
    );

    let request_timeout_secs = parse_u64("PRICEWATCH_REQUEST_TIMEOUT_SECS", "15")?;
    if request_timeout_secs == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "PRICEWATCH_REQUEST_TIMEOUT_SECS".to_string(),
            reason: "timeout must be at least one second".to_string(),
        });
    }
    let user_agent = or_default("PRICEWATCH_USER_AGENT", DEFAULT_USER_AGENT);
    let inter_request_delay_ms = parse_u64("PRICEWATCH_INTER_REQUEST_DELAY_MS", "3000")?;
    let max_retries = parse_u32("PRICEWATCH_MAX_RETRIES", "0")?;
    let retry_backoff_base_secs = parse_u64("PRICEWATCH_RETRY_BACKOFF_BASE_SECS", "5")?;

    Ok(AppConfig {
        env,
        log_level,
        catalog_path,
        output_path,
        timeseries_api_key,
        marketplace_api_token,
        timeseries_base_url,
        timeseries_domain,
        marketplace_base_url,
        request_timeout_secs,
        user_agent,
        inter_request_delay_ms,
        max_retries,
        retry_backoff_base_secs,
    })
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidEnvVar`] for anything other than
/// `development`, `test`, or `production`.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "PRICEWATCH_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
