//! Core configuration and credential types for postpilot.
//!
//! Holds the environment-driven application configuration and the
//! [`AccountCredential`] domain type binding a long-lived Instagram access
//! token to an internal account. Persistence of credentials is the caller's
//! concern; this crate only models them.

pub mod app_config;
pub mod config;
pub mod credentials;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use credentials::{AccountCredential, TOKEN_VALIDITY_DAYS};

use thiserror::Error;

/// Startup-time configuration failures. Fatal: the process cannot run
/// without a complete Instagram app configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for environment variable {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
