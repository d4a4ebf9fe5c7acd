//! iperf3 JSON Output Types
//!
//! Only the fields the exporter reads are modelled; serde ignores the rest of
//! the (large) document `iperf3 -J` prints.

use serde::Deserialize;

/// Top-level `iperf3 -J` document.
#[derive(Debug, Deserialize)]
pub struct Iperf3Report {
    pub end: Iperf3End,
}

/// The `end` section, summarising the whole run.
#[derive(Debug, Deserialize)]
pub struct Iperf3End {
    pub sum_sent: Iperf3Sum,
    pub sum_received: Iperf3Sum,
}

/// One direction of the summary.
#[derive(Debug, Deserialize)]
pub struct Iperf3Sum {
    #[serde(default)]
    pub seconds: f64,
    #[serde(default)]
    pub bytes: f64,
}

/// Document printed by `iperf3 -J` when the run fails.
#[derive(Debug, Deserialize)]
pub struct Iperf3Failure {
    pub error: String,
}
