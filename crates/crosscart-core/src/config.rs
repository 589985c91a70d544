use thiserror::Error;

use crate::app_config::{AppConfig, Environment};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for env var {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a set env var holds an unparseable value.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the
/// process, without touching `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a set env var holds an unparseable value.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration from the provided env-var lookup.
///
/// Decoupled from the real environment so tests can drive it with a plain
/// `HashMap` lookup. Every variable has a default; the proxy key is the only
/// genuinely optional input and its absence is not an error.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let or_default =
        |var: &str, default: &str| lookup(var).unwrap_or_else(|_| default.to_string());

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        or_default(var, default)
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let env = parse_environment(&or_default("CROSSCART_ENV", "development"));
    let bind_addr = parse_addr("CROSSCART_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("CROSSCART_LOG_LEVEL", "info");

    // Empty string counts as unset so a blank .env line does not enable the
    // proxy strategy with a useless credential.
    let scraper_api_key = lookup("SCRAPER_API_KEY").ok().filter(|k| !k.is_empty());
    let proxy_base_url = or_default("CROSSCART_PROXY_BASE_URL", "https://api.scraperapi.com/");

    let fetch_timeout_secs = parse_u64("CROSSCART_FETCH_TIMEOUT_SECS", "30")?;
    let connect_timeout_secs = parse_u64("CROSSCART_CONNECT_TIMEOUT_SECS", "10")?;
    let resolve_timeout_secs = parse_u64("CROSSCART_RESOLVE_TIMEOUT_SECS", "15")?;
    let resolve_max_hops = parse_usize("CROSSCART_RESOLVE_MAX_HOPS", "5")?;

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        scraper_api_key,
        proxy_base_url,
        fetch_timeout_secs,
        connect_timeout_secs,
        resolve_timeout_secs,
        resolve_max_hops,
    })
}

fn parse_environment(raw: &str) -> Environment {
    match raw.to_ascii_lowercase().as_str() {
        "production" | "prod" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
