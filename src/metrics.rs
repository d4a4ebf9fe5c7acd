//! Prometheus Metrics Definitions
//!
//! Two kinds of metrics are exposed by the exporter.
//!
//! ## Probe metrics (`/probe`)
//!
//! Built from scratch for every scrape in a private [`Registry`], so nothing
//! leaks between targets:
//!
//! - `iperf3_nb_thread` - Number of parallel streams used by the client
//! - `iperf3_success` - Whether the last probe succeeded (1/0)
//! - `iperf3_sent_seconds` / `iperf3_sent_bytes`
//! - `iperf3_received_seconds` / `iperf3_received_bytes`
//!
//! On a failed probe only `iperf3_success` is present.
//!
//! ## Exporter metrics (metrics path, default `/metrics`)
//!
//! - `iperf3_exporter_duration_seconds` - Histogram of `/probe` handling time
//! - `iperf3_exporter_errors_total` - Errors of any kind raised by the exporter
//! - `iperf3_exporter_build_info` - Constant 1, labelled with the version
//! - `process_*` - Standard process metrics (Linux only)

use crate::collector::MetricSet;
use prometheus::{
    Counter, Encoder, Gauge, Histogram, HistogramOpts, IntGaugeVec, Opts, Registry, TextEncoder,
};
use std::sync::Arc;

const NAMESPACE: &str = "iperf3";
const EXPORTER_SUBSYSTEM: &str = "exporter";

/// Process-wide metrics about the exporter itself.
#[derive(Clone)]
pub struct ExporterMetrics {
    registry: Arc<Registry>,

    pub duration_seconds: Arc<Histogram>,
    pub errors_total: Arc<Counter>,
    pub build_info: Arc<IntGaugeVec>,
}

impl ExporterMetrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let duration_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "duration_seconds",
                "Duration of collections by the iperf3 exporter.",
            )
            .namespace(NAMESPACE)
            .subsystem(EXPORTER_SUBSYSTEM)
            .buckets(vec![0.1, 0.5, 1.0, 2.5, 5.0, 7.5, 10.0, 15.0, 20.0, 30.0]),
        )?;

        let errors_total = Counter::with_opts(
            Opts::new("errors_total", "Errors raised by the iperf3 exporter.")
                .namespace(NAMESPACE)
                .subsystem(EXPORTER_SUBSYSTEM),
        )?;

        let build_info = IntGaugeVec::new(
            Opts::new(
                "build_info",
                "A metric with a constant '1' value labeled by version of the iperf3 exporter.",
            )
            .namespace(NAMESPACE)
            .subsystem(EXPORTER_SUBSYSTEM),
            &["version"],
        )?;
        build_info
            .with_label_values(&[env!("CARGO_PKG_VERSION")])
            .set(1);

        registry.register(Box::new(duration_seconds.clone()))?;
        registry.register(Box::new(errors_total.clone()))?;
        registry.register(Box::new(build_info.clone()))?;

        #[cfg(target_os = "linux")]
        registry.register(Box::new(
            prometheus::process_collector::ProcessCollector::for_self(),
        ))?;

        Ok(Self {
            registry: Arc::new(registry),
            duration_seconds: Arc::new(duration_seconds),
            errors_total: Arc::new(errors_total),
            build_info: Arc::new(build_info),
        })
    }

    /// Render metrics in Prometheus text format
    pub fn render(&self) -> anyhow::Result<String> {
        encode(&self.registry)
    }
}

/// Gauges of a single scrape, registered in their own registry.
pub struct ProbeMetrics {
    registry: Registry,
}

impl ProbeMetrics {
    /// Build a fresh registry holding exactly the gauges of `set`.
    pub fn from_metric_set(set: &MetricSet) -> anyhow::Result<Self> {
        let registry = Registry::new();

        match set {
            MetricSet::Failed => {
                register_gauge(&registry, "success", "Was the last iperf3 probe successful.", 0.0)?;
            }
            MetricSet::Measured(entry) => {
                register_gauge(
                    &registry,
                    "nb_thread",
                    "Total number of thread used by the client.",
                    f64::from(entry.thread),
                )?;
                register_gauge(&registry, "success", "Was the last iperf3 probe successful.", 1.0)?;
                register_gauge(
                    &registry,
                    "sent_seconds",
                    "Total seconds spent sending packets.",
                    entry.sent_seconds,
                )?;
                register_gauge(&registry, "sent_bytes", "Total sent bytes.", entry.sent_bytes)?;
                register_gauge(
                    &registry,
                    "received_seconds",
                    "Total seconds spent receiving packets.",
                    entry.received_seconds,
                )?;
                register_gauge(
                    &registry,
                    "received_bytes",
                    "Total received bytes.",
                    entry.received_bytes,
                )?;
            }
        }

        Ok(Self { registry })
    }

    /// Render metrics in Prometheus text format
    pub fn render(&self) -> anyhow::Result<String> {
        encode(&self.registry)
    }
}

fn register_gauge(registry: &Registry, name: &str, help: &str, value: f64) -> anyhow::Result<()> {
    let gauge = Gauge::with_opts(Opts::new(name, help).namespace(NAMESPACE))?;
    gauge.set(value);
    registry.register(Box::new(gauge))?;
    Ok(())
}

fn encode(registry: &Registry) -> anyhow::Result<String> {
    let encoder = TextEncoder::new();
    let metric_families = registry.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}

/// Content type of the Prometheus text exposition format.
pub fn content_type() -> String {
    TextEncoder::new().format_type().to_string()
}
