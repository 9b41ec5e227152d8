use std::collections::HashMap;
use std::env::VarError;

use super::*;

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

/// Returns a map with all required env vars populated with valid defaults.
fn full_env<'a>() -> HashMap<&'a str, &'a str> {
    let mut m = HashMap::new();
    m.insert("MENUMUX_PROVIDER_A_BASE_URL", "https://a.example.com");
    m.insert("MENUMUX_PROVIDER_B_BASE_URL", "https://b.example.com/");
    m.insert("MENUMUX_PROVIDER_C_BASE_URL", "http://localhost:9000");
    m
}

#[test]
fn parse_environment_known_values() {
    assert_eq!(
        parse_environment("development").unwrap(),
        Environment::Development
    );
    assert_eq!(parse_environment("test").unwrap(), Environment::Test);
    assert_eq!(
        parse_environment("production").unwrap(),
        Environment::Production
    );
}

#[test]
fn parse_environment_unknown_fails() {
    let err = parse_environment("staging").unwrap_err();
    assert!(matches!(err, ConfigError::InvalidEnvVar { ref var, .. } if var == "MENUMUX_ENV"));
}

#[test]
fn build_app_config_succeeds_with_all_required_vars() {
    let map = full_env();
    let result = build_app_config(lookup_from_map(&map));
    assert!(result.is_ok(), "expected Ok, got: {result:?}");
    let cfg = result.unwrap();
    assert_eq!(cfg.env, Environment::Development);
    assert_eq!(cfg.log_level, "info");
    assert_eq!(cfg.request_timeout_secs, 30);
    assert_eq!(cfg.user_agent, "menumux/0.1 (catalog-aggregator)");
    assert_eq!(cfg.max_retries, 2);
    assert_eq!(cfg.retry_backoff_base_ms, 500);
    assert_eq!(cfg.token_default_ttl_secs, 3600);
    assert_eq!(cfg.providers.len(), 3);
}

#[test]
fn build_app_config_fails_without_provider_base_url() {
    let mut map = full_env();
    map.remove("MENUMUX_PROVIDER_B_BASE_URL");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::MissingEnvVar(ref v)) if v == "MENUMUX_PROVIDER_B_BASE_URL"),
        "expected MissingEnvVar(MENUMUX_PROVIDER_B_BASE_URL), got: {result:?}"
    );
}

#[test]
fn build_app_config_rejects_non_http_base_url() {
    let mut map = full_env();
    map.insert("MENUMUX_PROVIDER_C_BASE_URL", "ftp://c.example.com");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "MENUMUX_PROVIDER_C_BASE_URL"),
        "expected InvalidEnvVar(MENUMUX_PROVIDER_C_BASE_URL), got: {result:?}"
    );
}

#[test]
fn build_app_config_trims_trailing_slash_from_base_url() {
    let map = full_env();
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(
        cfg.provider(Provider::B).unwrap().base_url,
        "https://b.example.com"
    );
}

#[test]
fn build_app_config_reads_optional_credentials() {
    let mut map = full_env();
    map.insert("MENUMUX_PROVIDER_B_CLIENT_ID", "client-b");
    map.insert("MENUMUX_PROVIDER_B_SECRET", "s3cret");
    map.insert("MENUMUX_PROVIDER_C_CLIENT_ID", "");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();

    let b = cfg.provider(Provider::B).unwrap();
    assert_eq!(b.client_id.as_deref(), Some("client-b"));
    assert_eq!(b.secret.as_deref(), Some("s3cret"));
    assert!(cfg.provider(Provider::C).unwrap().client_id.is_none());
    assert!(cfg.provider(Provider::A).unwrap().secret.is_none());
}

#[test]
fn debug_output_redacts_provider_secret() {
    let mut map = full_env();
    map.insert("MENUMUX_PROVIDER_B_SECRET", "s3cret");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    let rendered = format!("{cfg:?}");
    assert!(!rendered.contains("s3cret"));
    assert!(rendered.contains("[redacted]"));
}

#[test]
fn build_app_config_max_retries_override() {
    let mut map = full_env();
    map.insert("MENUMUX_MAX_RETRIES", "5");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.max_retries, 5);
}

#[test]
fn build_app_config_max_retries_invalid() {
    let mut map = full_env();
    map.insert("MENUMUX_MAX_RETRIES", "not-a-number");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "MENUMUX_MAX_RETRIES"),
        "expected InvalidEnvVar(MENUMUX_MAX_RETRIES), got: {result:?}"
    );
}

#[test]
fn build_app_config_token_ttl_override() {
    let mut map = full_env();
    map.insert("MENUMUX_TOKEN_DEFAULT_TTL_SECS", "120");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.token_default_ttl_secs, 120);
}

#[test]
fn build_app_config_request_timeout_invalid() {
    let mut map = full_env();
    map.insert("MENUMUX_REQUEST_TIMEOUT_SECS", "-3");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "MENUMUX_REQUEST_TIMEOUT_SECS"),
        "expected InvalidEnvVar(MENUMUX_REQUEST_TIMEOUT_SECS), got: {result:?}"
    );
}
