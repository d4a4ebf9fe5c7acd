//! Probe runner tests
//!
//! Tests for the iperf3 argument list, report parsing and failure classification.

mod common;

use common::{iperf3_json, probe_request, SAMPLE_RESULT};
use iperf3_exporter::error::{ProbeError, ProbeErrorKind};
use iperf3_exporter::probe::{build_args, parse_report, Iperf3Runner, ProbeRunner};
use std::time::Duration;

#[test]
fn test_build_args_default_request() {
    let args = build_args(&probe_request("iperf.example.com"));
    assert_eq!(
        args,
        vec!["-J", "-t", "5", "-c", "iperf.example.com", "-p", "5201", "-P", "1"]
    );
}

#[test]
fn test_build_args_uses_request_settings() {
    let mut request = probe_request("10.0.0.7");
    request.port = 5300;
    request.thread = 8;
    request.period = Duration::from_millis(12_400);

    let args = build_args(&request);

    assert_eq!(
        args,
        vec!["-J", "-t", "12", "-c", "10.0.0.7", "-p", "5300", "-P", "8"]
    );
}

#[test]
fn test_parse_report_extracts_summary() {
    let json = iperf3_json(&SAMPLE_RESULT);
    let result = parse_report(json.as_bytes()).expect("valid report");
    assert_eq!(result, SAMPLE_RESULT);
}

#[test]
fn test_parse_report_rejects_unexpected_output() {
    let outputs: [&[u8]; 4] = [
        b"",
        b"Connecting to host iperf.example.com, port 5201",
        br#"{"start": {}}"#,
        br#"{"end": {"sum_sent": {"seconds": 1, "bytes": 2}}}"#,
    ];
    for output in outputs {
        let err = parse_report(output).unwrap_err();
        assert!(matches!(err, ProbeError::Parse(_)));
        assert_eq!(err.kind(), ProbeErrorKind::Parse);
    }
}

#[tokio::test]
async fn test_missing_binary_is_execution_error() {
    let runner = Iperf3Runner::new("/nonexistent/iperf3-binary");
    let err = runner
        .run(&probe_request("iperf.example.com"))
        .await
        .unwrap_err();

    assert!(matches!(err, ProbeError::Spawn(_)));
    assert_eq!(err.kind(), ProbeErrorKind::Execution);
}

#[cfg(unix)]
#[tokio::test]
async fn test_non_zero_exit_is_execution_error() {
    let runner = Iperf3Runner::new("false");
    let err = runner
        .run(&probe_request("iperf.example.com"))
        .await
        .unwrap_err();

    assert!(matches!(err, ProbeError::ExitStatus { .. }));
    assert_eq!(err.kind(), ProbeErrorKind::Execution);
}

#[cfg(unix)]
#[tokio::test]
async fn test_non_json_output_is_parse_error() {
    // echo succeeds and prints its arguments, which is not an iperf3 report
    let runner = Iperf3Runner::new("echo");
    let err = runner
        .run(&probe_request("iperf.example.com"))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ProbeErrorKind::Parse);
}

#[cfg(unix)]
#[tokio::test]
async fn test_deadline_kills_slow_command() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    let script = dir.path().join("slow-iperf3");
    std::fs::write(&script, "#!/bin/sh\nexec sleep 10\n").unwrap();
    std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

    let runner = Iperf3Runner::new(script.to_str().unwrap());
    let mut request = probe_request("iperf.example.com");
    request.timeout = Duration::from_millis(300);

    let started = std::time::Instant::now();
    let err = runner.run(&request).await.unwrap_err();
    let elapsed = started.elapsed();

    assert!(matches!(err, ProbeError::Timeout(d) if d == Duration::from_millis(300)));
    assert_eq!(err.kind(), ProbeErrorKind::Execution);
    assert!(elapsed >= Duration::from_millis(300), "returned early: {elapsed:?}");
    assert!(elapsed < Duration::from_secs(2), "deadline overrun: {elapsed:?}");
}

#[test]
fn test_default_runner_uses_iperf3() {
    assert_eq!(Iperf3Runner::default().command(), "iperf3");
}
