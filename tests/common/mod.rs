//! Shared helpers for integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use iperf3_exporter::error::ProbeError;
use iperf3_exporter::probe::{ProbeResult, ProbeRunner};
use iperf3_exporter::request::ProbeRequest;
use std::io;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

pub const SAMPLE_RESULT: ProbeResult = ProbeResult {
    sent_seconds: 5.0,
    sent_bytes: 1_250_000_000.0,
    received_seconds: 5.01,
    received_bytes: 1_248_000_000.0,
};

/// Probe runner that counts invocations and returns a canned outcome.
pub struct StubRunner {
    calls: AtomicUsize,
    fail: AtomicBool,
    delay: Duration,
    result: ProbeResult,
    last_request: Mutex<Option<ProbeRequest>>,
}

impl StubRunner {
    pub fn new() -> Self {
        Self::with_delay(Duration::ZERO)
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail: AtomicBool::new(false),
            delay,
            result: SAMPLE_RESULT,
            last_request: Mutex::new(None),
        }
    }

    pub fn failing() -> Self {
        let runner = Self::new();
        runner.set_failing(true);
        runner
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// The request passed to the most recent run.
    pub fn last_request(&self) -> Option<ProbeRequest> {
        self.last_request.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProbeRunner for StubRunner {
    async fn run(&self, request: &ProbeRequest) -> Result<ProbeResult, ProbeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(request.clone());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(ProbeError::Spawn(io::Error::new(
                io::ErrorKind::NotFound,
                "iperf3 not installed",
            )));
        }
        Ok(self.result)
    }
}

/// A resolved request for `target` with default settings.
pub fn probe_request(target: &str) -> ProbeRequest {
    ProbeRequest {
        target: target.to_string(),
        port: 5201,
        thread: 1,
        period: Duration::from_secs(5),
        timeout: Duration::from_secs(30),
    }
}

/// Minimal `iperf3 -J` document with the given summary figures.
pub fn iperf3_json(result: &ProbeResult) -> String {
    serde_json::json!({
        "start": { "version": "iperf 3.16" },
        "intervals": [],
        "end": {
            "sum_sent": {
                "start": 0,
                "end": result.sent_seconds,
                "seconds": result.sent_seconds,
                "bytes": result.sent_bytes,
                "bits_per_second": 2.0e9,
                "retransmits": 0
            },
            "sum_received": {
                "start": 0,
                "end": result.received_seconds,
                "seconds": result.received_seconds,
                "bytes": result.received_bytes,
                "bits_per_second": 1.99e9
            }
        }
    })
    .to_string()
}
