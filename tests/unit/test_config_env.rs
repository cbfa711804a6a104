//! Configuration read from the process environment.

use diagram_sync::config::{AppEnv, ClientConfig, ConfigError, ServerConfig};
use serial_test::serial;
use std::time::Duration;

const SERVER_KEYS: [&str; 6] = [
    "PORT",
    "APP_ENV",
    "JWT_SECRET",
    "DIAGRAM_DATA_DIR",
    "AUTH_DEV_USER",
    "RATE_LIMIT_PER_MINUTE",
];

fn clear(keys: &[&str]) {
    for key in keys {
        // SAFETY: tests touching the environment are serialized.
        unsafe { std::env::remove_var(key) };
    }
}

fn set(key: &str, value: &str) {
    // SAFETY: tests touching the environment are serialized.
    unsafe { std::env::set_var(key, value) };
}

#[test]
#[serial]
fn test_server_config_from_env() {
    clear(&SERVER_KEYS);
    set("APP_ENV", "production");
    set("JWT_SECRET", "a-production-secret-that-is-long-enough");
    set("PORT", "9090");
    set("DIAGRAM_DATA_DIR", "/var/lib/diagrams");
    set("RATE_LIMIT_PER_MINUTE", "250");

    let config = ServerConfig::from_env().unwrap();

    assert_eq!(config.app_env, AppEnv::Production);
    assert_eq!(config.port, 9090);
    assert_eq!(
        config.data_dir.as_deref(),
        Some(std::path::Path::new("/var/lib/diagrams"))
    );
    assert_eq!(config.rate_limit_per_minute, 250);
    clear(&SERVER_KEYS);
}

#[test]
#[serial]
fn test_server_config_defaults_to_production() {
    clear(&SERVER_KEYS);

    assert_eq!(
        ServerConfig::from_env().unwrap_err(),
        ConfigError::Missing("JWT_SECRET")
    );
}

#[test]
#[serial]
fn test_invalid_rate_limit() {
    clear(&SERVER_KEYS);
    set("APP_ENV", "development");
    set("RATE_LIMIT_PER_MINUTE", "0");

    assert!(matches!(
        ServerConfig::from_env(),
        Err(ConfigError::Invalid {
            key: "RATE_LIMIT_PER_MINUTE",
            ..
        })
    ));
    clear(&SERVER_KEYS);
}

#[test]
#[serial]
fn test_client_config_from_env() {
    clear(&["DIAGRAM_API_BASE_URL", "DIAGRAM_API_TIMEOUT_SECS"]);
    assert_eq!(ClientConfig::from_env().unwrap(), ClientConfig::default());

    set("DIAGRAM_API_BASE_URL", "not a url");
    assert!(ClientConfig::from_env().is_err());

    set("DIAGRAM_API_BASE_URL", "http://store.internal:8081/api/v1");
    set("DIAGRAM_API_TIMEOUT_SECS", "3");
    let config = ClientConfig::from_env().unwrap();
    assert_eq!(config.base_url, "http://store.internal:8081/api/v1");
    assert_eq!(config.timeout, Duration::from_secs(3));

    clear(&["DIAGRAM_API_BASE_URL", "DIAGRAM_API_TIMEOUT_SECS"]);
}
