//! Probe Runner
//!
//! Executes one throughput measurement against a target and turns its output
//! into a [`ProbeResult`] or a classified [`ProbeError`].
//!
//! # Deadline
//!
//! The child process is spawned with `kill_on_drop`, and the wait for its
//! output is wrapped in [`tokio::time::timeout`]. When the deadline elapses the
//! output future (and the child handle it owns) is dropped, which kills the
//! process. Partial output is never parsed.

use crate::error::ProbeError;
use crate::probe::types::{Iperf3Failure, Iperf3Report};
use crate::request::ProbeRequest;
use async_trait::async_trait;
use std::process::Stdio;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;

/// Default name of the probe binary, looked up on `PATH`.
pub const DEFAULT_COMMAND: &str = "iperf3";

/// Throughput figures from one probe run.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ProbeResult {
    pub sent_seconds: f64,
    pub sent_bytes: f64,
    pub received_seconds: f64,
    pub received_bytes: f64,
}

/// Something that can measure throughput against a target.
///
/// Implementations must honour `request.timeout` themselves.
#[async_trait]
pub trait ProbeRunner: Send + Sync {
    async fn run(&self, request: &ProbeRequest) -> Result<ProbeResult, ProbeError>;
}

/// Runs the `iperf3` client in JSON mode.
#[derive(Debug, Clone)]
pub struct Iperf3Runner {
    command: String,
}

impl Iperf3Runner {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    pub fn command(&self) -> &str {
        &self.command
    }
}

impl Default for Iperf3Runner {
    fn default() -> Self {
        Self::new(DEFAULT_COMMAND)
    }
}

#[async_trait]
impl ProbeRunner for Iperf3Runner {
    async fn run(&self, request: &ProbeRequest) -> Result<ProbeResult, ProbeError> {
        let args = build_args(request);
        debug!("Running {} {}", self.command, args.join(" "));

        let mut command = Command::new(&self.command);
        command
            .args(&args)
            .stdin(Stdio::null())
            .kill_on_drop(true);

        let output = match timeout(request.timeout, command.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => return Err(ProbeError::Spawn(e)),
            Err(_) => return Err(ProbeError::Timeout(request.timeout)),
        };

        if !output.status.success() {
            let mut stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            if stderr.is_empty() {
                if let Ok(failure) = serde_json::from_slice::<Iperf3Failure>(&output.stdout) {
                    stderr = failure.error;
                }
            }
            return Err(ProbeError::ExitStatus {
                status: output.status,
                stderr,
            });
        }

        parse_report(&output.stdout)
    }
}

/// Argument list for one run: JSON output, period, target, port, parallel streams.
pub fn build_args(request: &ProbeRequest) -> Vec<String> {
    vec![
        "-J".to_string(),
        "-t".to_string(),
        request.period_seconds().to_string(),
        "-c".to_string(),
        request.target.clone(),
        "-p".to_string(),
        request.port.to_string(),
        "-P".to_string(),
        request.thread.to_string(),
    ]
}

/// Extract the sent/received summary from an `iperf3 -J` document.
pub fn parse_report(stdout: &[u8]) -> Result<ProbeResult, ProbeError> {
    let report: Iperf3Report = serde_json::from_slice(stdout)?;
    Ok(ProbeResult {
        sent_seconds: report.end.sum_sent.seconds,
        sent_bytes: report.end.sum_sent.bytes,
        received_seconds: report.end.sum_received.seconds,
        received_bytes: report.end.sum_received.bytes,
    })
}
