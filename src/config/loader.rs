//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::GatewayConfig;
use crate::config::validation::{find_overlaps, validate_config, ValidationError};

/// Environment variable overriding `session.auth_url`.
pub const ENV_AUTH_URL: &str = "GATE_AUTH_URL";
/// Environment variable overriding `session.anon_key`.
pub const ENV_ANON_KEY: &str = "GATE_AUTH_ANON_KEY";
/// Environment variable overriding `admin.api_key`.
pub const ENV_ADMIN_API_KEY: &str = "GATE_ADMIN_API_KEY";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<GatewayConfig, ConfigError> {
    finalize(read_config(path)?)
}

/// Parse a TOML file without validating it.
pub fn read_config(path: &Path) -> Result<GatewayConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Apply environment overrides, validate, and report rule overlaps.
pub fn finalize(mut config: GatewayConfig) -> Result<GatewayConfig, ConfigError> {
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());

    validate_config(&config).map_err(ConfigError::Validation)?;

    for overlap in find_overlaps(&config) {
        tracing::warn!(%overlap, "Overlapping route rules; API gating is evaluated first");
    }

    Ok(config)
}

/// Overwrite secret-bearing fields from the environment.
pub fn apply_env_overrides<F>(config: &mut GatewayConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup(ENV_AUTH_URL) {
        config.session.auth_url = url;
    }
    if let Some(key) = lookup(ENV_ANON_KEY) {
        config.session.anon_key = key;
    }
    if let Some(key) = lookup(ENV_ADMIN_API_KEY) {
        config.admin.api_key = key;
    }
}
