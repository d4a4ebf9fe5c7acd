//! Scrape Parameter Resolution
//!
//! Turns the query string and headers of a `/probe` request into a validated
//! [`ProbeRequest`]. Every numeric field is defaulted and clamped here, so the
//! cache and the probe runner only ever see well-formed values.
//!
//! # Defaults
//!
//! | Parameter | Absent / zero | Invalid          |
//! |-----------|---------------|------------------|
//! | `target`  | error (400)   | -                |
//! | `port`    | 5201          | error (400)      |
//! | `thread`  | 1 (also < 0)  | error (400)      |
//! | `period`  | 5s            | error (400)      |
//! | timeout   | config, 30s   | error (500)      |
//!
//! The resolved timeout never exceeds [`MAX_TIMEOUT`].

use crate::error::{DurationParseError, RequestError};
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 5201;
pub const DEFAULT_THREAD: u32 = 1;
pub const DEFAULT_PERIOD: Duration = Duration::from_secs(5);
pub const MAX_TIMEOUT: Duration = Duration::from_secs(30);

/// Header Prometheus sets to the scrape timeout of the job, in seconds.
pub const SCRAPE_TIMEOUT_HEADER: &str = "X-Prometheus-Scrape-Timeout-Seconds";

/// Raw `/probe` query parameters, exactly as received.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ProbeParams {
    pub target: Option<String>,
    pub port: Option<String>,
    pub thread: Option<String>,
    pub period: Option<String>,
}

/// A validated probe configuration for a single scrape.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeRequest {
    pub target: String,
    pub port: u16,
    pub thread: u32,
    pub period: Duration,
    pub timeout: Duration,
}

impl ProbeRequest {
    /// Resolve a request from its query parameters, the optional scrape timeout
    /// header and the process-wide default timeout.
    pub fn resolve(
        params: &ProbeParams,
        timeout_header: Option<&str>,
        default_timeout: Duration,
    ) -> Result<Self, RequestError> {
        let target = match params.target.as_deref() {
            Some(t) if !t.is_empty() => t.to_string(),
            _ => return Err(RequestError::MissingTarget),
        };

        let port = match non_empty(&params.port) {
            Some(raw) => raw.parse::<u16>().map_err(RequestError::InvalidPort)?,
            None => 0,
        };
        let port = if port == 0 { DEFAULT_PORT } else { port };

        let thread = match non_empty(&params.thread) {
            Some(raw) => raw.parse::<i64>().map_err(RequestError::InvalidThread)?,
            None => 0,
        };
        let thread = if thread <= 0 {
            DEFAULT_THREAD
        } else {
            u32::try_from(thread).unwrap_or(u32::MAX)
        };

        let period = match non_empty(&params.period) {
            Some(raw) => parse_duration(raw).map_err(RequestError::InvalidPeriod)?,
            None => Duration::ZERO,
        };
        let period = if period.is_zero() {
            DEFAULT_PERIOD
        } else {
            period
        };

        let timeout = resolve_timeout(timeout_header, default_timeout)?;

        Ok(Self {
            target,
            port,
            thread,
            period,
            timeout,
        })
    }

    /// Measurement period in whole seconds, as passed to `iperf3 -t`.
    pub fn period_seconds(&self) -> u64 {
        (self.period.as_secs_f64().round() as u64).max(1)
    }
}

/// Header value first, then the configured default, then [`MAX_TIMEOUT`];
/// whatever wins is clamped to [`MAX_TIMEOUT`].
///
/// The header is parsed as-is: surrounding whitespace is an error, `+Inf`
/// clamps to the ceiling, and zero, negative or `NaN` values count as absent.
fn resolve_timeout(
    header: Option<&str>,
    default_timeout: Duration,
) -> Result<Duration, RequestError> {
    let from_header = match header.filter(|v| !v.is_empty()) {
        Some(raw) => {
            let secs = raw
                .parse::<f64>()
                .map_err(RequestError::InvalidTimeoutHeader)?;
            (secs > 0.0)
                .then(|| Duration::from_secs_f64(secs.min(MAX_TIMEOUT.as_secs_f64())))
                .filter(|d| !d.is_zero())
        }
        None => None,
    };

    let timeout = from_header
        .or_else(|| (!default_timeout.is_zero()).then_some(default_timeout))
        .unwrap_or(MAX_TIMEOUT);

    Ok(timeout.min(MAX_TIMEOUT))
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// Parse a Go-style duration string such as `5s`, `1m30s`, `1.5h` or `250ms`.
///
/// A bare `0` is accepted as zero. Negative values are rejected.
pub fn parse_duration(input: &str) -> Result<Duration, DurationParseError> {
    let s = input.trim();
    if s.is_empty() {
        return Err(DurationParseError::Invalid(input.to_string()));
    }
    if s.starts_with('-') {
        return Err(DurationParseError::Negative(input.to_string()));
    }
    let s = s.strip_prefix('+').unwrap_or(s);
    if s == "0" {
        return Ok(Duration::ZERO);
    }

    let mut total_nanos: f64 = 0.0;
    let mut rest = s;
    while !rest.is_empty() {
        let num_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        let number = &rest[..num_len];
        if number.is_empty() || number == "." {
            return Err(DurationParseError::Invalid(input.to_string()));
        }
        let value: f64 = number
            .parse()
            .map_err(|_| DurationParseError::Invalid(input.to_string()))?;
        rest = &rest[num_len..];

        let unit_len = rest
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(rest.len());
        let unit = &rest[..unit_len];
        rest = &rest[unit_len..];

        let scale = match unit {
            "" => return Err(DurationParseError::MissingUnit(input.to_string())),
            "ns" => 1.0,
            "us" | "µs" | "μs" => 1e3,
            "ms" => 1e6,
            "s" => 1e9,
            "m" => 60.0 * 1e9,
            "h" => 3600.0 * 1e9,
            other => {
                return Err(DurationParseError::UnknownUnit {
                    unit: other.to_string(),
                    input: input.to_string(),
                })
            }
        };
        total_nanos += value * scale;
    }

    if !total_nanos.is_finite() || total_nanos > u64::MAX as f64 {
        return Err(DurationParseError::Overflow(input.to_string()));
    }
    Ok(Duration::from_nanos(total_nanos.round() as u64))
}
