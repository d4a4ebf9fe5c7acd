//! Configuration validation tests
//!
//! Tests that verify configuration defaults and structure.

use iperf3_exporter::config::{Config, ProbeConfig, ServerConfig};
use iperf3_exporter::error::ExporterError;
use std::time::Duration;

#[test]
fn test_default_server_config() {
    let config = ServerConfig::default();

    assert_eq!(config.listen_address, ":9579");
    assert_eq!(config.metrics_path, "/metrics");
}

#[test]
fn test_default_probe_config() {
    let config = ProbeConfig::default();

    assert_eq!(config.timeout, Duration::from_secs(30));
    assert_eq!(config.command, "iperf3");
    assert_eq!(config.cache_time, Duration::from_secs(3600));
}

#[test]
fn test_bare_port_binds_all_interfaces() {
    let config = ServerConfig::default();
    assert_eq!(config.bind_address(), "0.0.0.0:9579");

    let config = ServerConfig {
        listen_address: "127.0.0.1:9000".to_string(),
        metrics_path: "/metrics".to_string(),
    };
    assert_eq!(config.bind_address(), "127.0.0.1:9000");
}

#[test]
fn test_config_load() {
    // This assumes config/Default.toml exists relative to where cargo test is run
    let config = Config::load("config/Default.toml").expect("Failed to load default config");

    assert_eq!(config.server.metrics_path, "/metrics");
    assert_eq!(config.probe.timeout, Duration::from_secs(30));
}

#[test]
fn test_missing_config_file_uses_defaults() {
    let config = Config::load("config/does-not-exist").expect("Missing file is optional");

    assert_eq!(config.server.listen_address, ":9579");
    assert_eq!(config.probe.command, "iperf3");
}

fn server_config(metrics_path: &str) -> ServerConfig {
    ServerConfig {
        metrics_path: metrics_path.to_string(),
        ..Default::default()
    }
}

#[test]
fn test_metrics_path_gets_leading_slash() {
    assert_eq!(server_config("metrics").normalized_metrics_path(), "/metrics");
    assert_eq!(server_config("/metrics").normalized_metrics_path(), "/metrics");
    assert!(server_config("metrics").validate().is_ok());
}

#[test]
fn test_metrics_path_may_not_shadow_builtin_endpoints() {
    for path in ["/", "", "/probe", "probe"] {
        let err = server_config(path).validate().unwrap_err();
        assert!(matches!(err, ExporterError::Config(_)), "path {path:?}");
        assert!(err.to_string().starts_with("Configuration error: metrics path"));
        assert!(err.to_string().contains("collides with a built-in endpoint"));
    }
}

#[test]
fn test_metrics_path_must_be_literal() {
    for path in ["/{id}", "/metrics/:name", "/*rest", "/a}b"] {
        let err = server_config(path).validate().unwrap_err();
        assert!(matches!(err, ExporterError::Config(_)), "path {path:?}");
        assert!(err.to_string().contains("must be a literal path"));
    }
}
