//! Collection Session
//!
//! One session runs per `/probe` request. It decides whether the cached
//! measurement of the target can be reused, refreshes it through the
//! [`ProbeRunner`] when it is stale, and produces the [`MetricSet`] to render.
//!
//! # States
//!
//! ```text
//! NeedsRefresh ──probe ok──► RefreshedOrFresh   (full metric set)
//!      │
//!      └──probe failed──► RefreshFailed         (success=0 only, entry untouched)
//! ```
//!
//! A fresh entry skips straight to `RefreshedOrFresh`.
//!
//! # Error Handling
//!
//! Probe failures never fail the scrape. They are logged, counted in
//! `iperf3_exporter_errors_total` and reported through `iperf3_success`.

use crate::cache::{CacheEntry, ResultCache};
use crate::metrics::ExporterMetrics;
use crate::probe::ProbeRunner;
use crate::request::ProbeRequest;
use tokio::time::{timeout, Instant};
use tracing::{debug, error, info, warn};

/// The gauges emitted for one scrape.
#[derive(Debug, Clone, PartialEq)]
pub enum MetricSet {
    /// The probe failed; only `success=0` is emitted.
    Failed,
    /// A fresh or just-refreshed measurement.
    Measured(CacheEntry),
}

impl MetricSet {
    pub fn is_success(&self) -> bool {
        matches!(self, MetricSet::Measured(_))
    }
}

/// Shared state a session borrows for the duration of one request.
#[derive(Clone, Copy)]
pub struct CollectionSession<'a> {
    pub cache: &'a ResultCache,
    pub runner: &'a dyn ProbeRunner,
    pub metrics: &'a ExporterMetrics,
}

impl<'a> CollectionSession<'a> {
    pub fn new(
        cache: &'a ResultCache,
        runner: &'a dyn ProbeRunner,
        metrics: &'a ExporterMetrics,
    ) -> Self {
        Self {
            cache,
            runner,
            metrics,
        }
    }

    /// Collect the metric set for `request`.
    ///
    /// The target's entry stays locked until the metric set is built, so
    /// concurrent sessions for the same target wait for the running probe and
    /// then reuse its result instead of probing again. Waiting for the entry
    /// is bounded by the request's own timeout.
    pub async fn collect(&self, request: &ProbeRequest) -> MetricSet {
        let shared = self.cache.get_or_create(&request.target);
        let mut entry = match timeout(request.timeout, shared.lock()).await {
            Ok(entry) => entry,
            Err(_) => {
                self.metrics.errors_total.inc();
                warn!(
                    "Gave up waiting {:?} for the in-flight iperf3 run against {}",
                    request.timeout, request.target
                );
                return MetricSet::Failed;
            }
        };

        if entry.is_stale(Instant::now(), self.cache.ttl()) {
            debug!("Cache for {} is stale, running probe", request.target);

            match self.runner.run(request).await {
                Ok(result) => {
                    entry.record(request.thread, &result, Instant::now());
                    info!(
                        "Probed {}:{} with {} stream(s): sent {} bytes, received {} bytes",
                        request.target,
                        request.port,
                        request.thread,
                        result.sent_bytes,
                        result.received_bytes
                    );
                }
                Err(e) => {
                    self.metrics.errors_total.inc();
                    error!(
                        "Probe of {}:{} failed ({:?}): {}",
                        request.target,
                        request.port,
                        e.kind(),
                        e
                    );
                    return MetricSet::Failed;
                }
            }
        } else {
            debug!("Serving cached measurement for {}", request.target);
        }

        MetricSet::Measured(entry.clone())
    }
}
