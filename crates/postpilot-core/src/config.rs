use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files — useful for testing
/// or when the caller manages env setup.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// This is the core parsing/validation logic, decoupled from the actual environment
/// so it can be tested with a pure `HashMap` lookup — no `set_var`/`remove_var` needed.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let instagram_client_id = require("INSTAGRAM_CLIENT_ID")?;
    let instagram_client_secret = require("INSTAGRAM_CLIENT_SECRET")?;
    let instagram_redirect_uri = require("INSTAGRAM_REDIRECT_URI")?;
    let state_signing_secret = require("POSTPILOT_STATE_SIGNING_SECRET")?;

    let env = parse_environment(&or_default("POSTPILOT_ENV", "development"));
    let log_level = or_default("POSTPILOT_LOG_LEVEL", "info");

    let graph_api_base = or_default("POSTPILOT_GRAPH_API_BASE", "https://graph.instagram.com");
    let oauth_api_base = or_default("POSTPILOT_OAUTH_API_BASE", "https://api.instagram.com");

    let request_timeout_secs = parse_u64("POSTPILOT_REQUEST_TIMEOUT_SECS", "30")?;
    let max_concurrent_requests = parse_usize("POSTPILOT_MAX_CONCURRENT_REQUESTS", "4")?;

    Ok(AppConfig {
        env,
        log_level,
        instagram_client_id,
        instagram_client_secret,
        instagram_redirect_uri,
        state_signing_secret,
        graph_api_base,
        oauth_api_base,
        request_timeout_secs,
        max_concurrent_requests,
    })
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}
