//! Throughput Probe
//!
//! - [`ProbeRunner`] - seam between a collection session and whatever performs the measurement
//! - [`Iperf3Runner`] - production runner executing the `iperf3` client
//! - [`types`] - the subset of the iperf3 JSON report the exporter reads

pub mod runner;
pub mod types;

pub use runner::{build_args, parse_report, Iperf3Runner, ProbeResult, ProbeRunner};
