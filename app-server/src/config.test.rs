use std::sync::Mutex;

use super::*;

// Serializes tests that mutate process-wide OCTAVE_* environment variables
// so they don't race each other.
static ENV_LOCK: Mutex<()> = Mutex::new(());

#[test]
fn defaults_bind_loopback_on_the_documented_port() {
    let config = AppConfig::default();
    assert_eq!(config.http_addr, IpAddr::V4(Ipv4Addr::LOCALHOST));
    assert_eq!(config.http_port, DEFAULT_HTTP_PORT);
    assert_eq!(config.log_directive, "info");
}

// All four OCTAVE_* vars are exercised in one test to avoid cross-test races
// on shared process environment state.
#[test]
fn from_env_layers_all_four_octave_vars_over_defaults() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    // SAFETY: single test owns this process's OCTAVE_* vars; restored at the end.
    unsafe {
        std::env::set_var("OCTAVE_DATA_DIR", "/tmp/octave-test-data");
        std::env::set_var("OCTAVE_HTTP_PORT", "4242");
        std::env::set_var("OCTAVE_LOG", "debug");
        std::env::set_var("OCTAVE_COMPACT_CLI", "/usr/local/bin/my-cli");
    }

    let config = AppConfig::from_env().unwrap_or_else(|e| panic!("{e}"));

    assert_eq!(config.data_dir, PathBuf::from("/tmp/octave-test-data"));
    assert_eq!(config.http_port, 4242);
    assert_eq!(config.log_directive, "debug");
    assert_eq!(config.compact_cli, "/usr/local/bin/my-cli");
    assert_eq!(config.http_addr, IpAddr::V4(Ipv4Addr::LOCALHOST));

    unsafe {
        std::env::remove_var("OCTAVE_DATA_DIR");
        std::env::remove_var("OCTAVE_HTTP_PORT");
        std::env::remove_var("OCTAVE_LOG");
        std::env::remove_var("OCTAVE_COMPACT_CLI");
    }
}

#[test]
fn invalid_port_is_a_config_error_not_a_panic() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    // SAFETY: restored immediately after the assertion.
    unsafe { std::env::set_var("OCTAVE_HTTP_PORT", "not-a-port") };
    let result = AppConfig::from_env();
    unsafe { std::env::remove_var("OCTAVE_HTTP_PORT") };
    assert!(matches!(result, Err(ConfigError::InvalidPort { .. })));
}
