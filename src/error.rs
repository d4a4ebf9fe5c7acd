use axum::http::StatusCode;
use std::num::{ParseFloatError, ParseIntError};
use std::process::ExitStatus;
use std::time::Duration;
use thiserror::Error;

/// Process-level failures (startup, configuration, listener).
#[derive(Debug, Error)]
pub enum ExporterError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP server error: {0}")]
    Server(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ExporterError>;

/// A malformed or missing scrape parameter. Never reaches the cache or the probe.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("'target' parameter must be specified")]
    MissingTarget,

    #[error("'port' parameter must be an integer: {0}")]
    InvalidPort(#[source] ParseIntError),

    #[error("'thread' parameter must be an integer: {0}")]
    InvalidThread(#[source] ParseIntError),

    #[error("'period' parameter must be a duration: {0}")]
    InvalidPeriod(#[source] DurationParseError),

    #[error("Failed to parse timeout from Prometheus header: {0}")]
    InvalidTimeoutHeader(#[source] ParseFloatError),
}

impl RequestError {
    /// HTTP status reported to the caller.
    ///
    /// An unparsable scrape timeout header points at a broken scraper rather
    /// than a bad user request, so it is reported as a server error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            RequestError::InvalidTimeoutHeader(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

/// Error returned by [`crate::request::parse_duration`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DurationParseError {
    #[error("invalid duration {0:?}")]
    Invalid(String),

    #[error("missing unit in duration {0:?}")]
    MissingUnit(String),

    #[error("unknown unit {unit:?} in duration {input:?}")]
    UnknownUnit { unit: String, input: String },

    #[error("negative duration {0:?} is not allowed")]
    Negative(String),

    #[error("duration {0:?} is out of range")]
    Overflow(String),
}

/// Failure class of a probe run, as seen by a collection session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeErrorKind {
    /// The probe could not be started, was killed by its deadline or exited non-zero.
    Execution,
    /// The probe ran but its output was not the expected JSON document.
    Parse,
}

/// A failed probe run.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("failed to start iperf3: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("iperf3 did not finish within {0:?}")]
    Timeout(Duration),

    #[error("iperf3 exited with {status}: {stderr}")]
    ExitStatus { status: ExitStatus, stderr: String },

    #[error("failed to parse iperf3 result: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ProbeError {
    pub fn kind(&self) -> ProbeErrorKind {
        match self {
            ProbeError::Parse(_) => ProbeErrorKind::Parse,
            _ => ProbeErrorKind::Execution,
        }
    }
}
