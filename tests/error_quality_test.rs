//! Error message quality tests
//!
//! Tests that verify error messages are helpful and distinguishable.

use axum::http::StatusCode;
use iperf3_exporter::error::{
    DurationParseError, ExporterError, ProbeError, ProbeErrorKind, RequestError,
};
use std::io;
use std::time::Duration;

#[test]
fn test_request_errors_name_the_parameter() {
    let port = RequestError::InvalidPort("abc".parse::<u16>().unwrap_err());
    let thread = RequestError::InvalidThread("x".parse::<i64>().unwrap_err());
    let period = RequestError::InvalidPeriod(DurationParseError::MissingUnit("5".to_string()));

    assert!(port.to_string().starts_with("'port'"));
    assert!(thread.to_string().starts_with("'thread'"));
    assert!(period.to_string().starts_with("'period'"));
    assert!(period.to_string().contains("missing unit"));
}

#[test]
fn test_only_timeout_header_error_is_server_error() {
    let header = RequestError::InvalidTimeoutHeader("nan?".parse::<f64>().unwrap_err());
    assert_eq!(header.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(RequestError::MissingTarget.status_code(), StatusCode::BAD_REQUEST);
}

#[test]
fn test_probe_error_kinds() {
    let spawn = ProbeError::Spawn(io::Error::new(io::ErrorKind::NotFound, "No such file"));
    let timeout = ProbeError::Timeout(Duration::from_secs(30));
    let parse = ProbeError::Parse(serde_json::from_str::<serde_json::Value>("{").unwrap_err());

    assert_eq!(spawn.kind(), ProbeErrorKind::Execution);
    assert_eq!(timeout.kind(), ProbeErrorKind::Execution);
    assert_eq!(parse.kind(), ProbeErrorKind::Parse);

    assert!(spawn.to_string().contains("failed to start iperf3"));
    assert!(timeout.to_string().contains("30s"));
    assert!(parse.to_string().contains("failed to parse iperf3 result"));
}

#[test]
fn test_exporter_error_messages() {
    let config = ExporterError::Config("missing field".to_string());
    let io_err: ExporterError = io::Error::new(io::ErrorKind::AddrInUse, "address in use").into();

    assert!(config.to_string().contains("Configuration error"));
    assert!(io_err.to_string().contains("IO error"));
    assert!(io_err.to_string().contains("address in use"));
}
