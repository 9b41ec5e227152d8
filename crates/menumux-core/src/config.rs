use crate::app_config::{AppConfig, Environment, ProviderSettings};
use crate::provider::{Provider, ProviderMap};
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
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
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

    let env = parse_environment(&or_default("MENUMUX_ENV", "development"))?;
    let log_level = or_default("MENUMUX_LOG_LEVEL", "info");
    let request_timeout_secs = parse_u64("MENUMUX_REQUEST_TIMEOUT_SECS", "30")?;
    let user_agent = or_default("MENUMUX_USER_AGENT", "menumux/0.1 (catalog-aggregator)");
    let max_retries = parse_u32("MENUMUX_MAX_RETRIES", "2")?;
    let retry_backoff_base_ms = parse_u64("MENUMUX_RETRY_BACKOFF_BASE_MS", "500")?;
    let token_default_ttl_secs = parse_u64("MENUMUX_TOKEN_DEFAULT_TTL_SECS", "3600")?;

    let mut providers = ProviderMap::new();
    for provider in Provider::ALL {
        providers.set(provider, provider_settings(&lookup, provider)?);
    }

    Ok(AppConfig {
        env,
        log_level,
        request_timeout_secs,
        user_agent,
        max_retries,
        retry_backoff_base_ms,
        token_default_ttl_secs,
        providers,
    })
}

fn provider_settings<F>(lookup: &F, provider: Provider) -> Result<ProviderSettings, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let prefix = format!("MENUMUX_PROVIDER_{provider}");
    let base_var = format!("{prefix}_BASE_URL");
    let base_url = lookup(&base_var).map_err(|_| ConfigError::MissingEnvVar(base_var.clone()))?;
    if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
        return Err(ConfigError::InvalidEnvVar {
            var: base_var,
            reason: format!("expected an http(s) URL, got \"{base_url}\""),
        });
    }

    let optional = |suffix: &str| {
        lookup(&format!("{prefix}_{suffix}"))
            .ok()
            .filter(|v| !v.is_empty())
    };

    Ok(ProviderSettings {
        base_url: base_url.trim_end_matches('/').to_owned(),
        client_id: optional("CLIENT_ID"),
        secret: optional("SECRET"),
    })
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` for unrecognized values.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "MENUMUX_ENV".to_string(),
            reason: format!("expected development|test|production, got \"{other}\""),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
