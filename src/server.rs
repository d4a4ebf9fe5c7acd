//! HTTP Server and Scrape Handling
//!
//! This module implements the exporter's HTTP surface.
//!
//! # Endpoints
//!
//! - `GET /` - HTML landing page
//! - `GET /probe?target=<host>&port=<int>&thread=<int>&period=<duration>` - Run
//!   (or reuse) a probe against `target` and return its metrics
//! - `GET <metrics path>` - Exporter self-metrics (default `/metrics`)
//!
//! # Scrape Flow
//!
//! 1. Resolve the query string and scrape timeout header into a [`ProbeRequest`]
//! 2. Run a [`CollectionSession`] against the shared [`ResultCache`]
//! 3. Render the resulting metric set from a registry private to this request
//! 4. Observe the handling time in `iperf3_exporter_duration_seconds`
//!
//! # Error Handling
//!
//! Invalid parameters are answered with 400 (500 for a malformed timeout
//! header) and never reach the cache. Probe failures still answer 200, with
//! `iperf3_success 0` as the only metric.

use crate::cache::ResultCache;
use crate::collector::CollectionSession;
use crate::config::Config;
use crate::error::ExporterError;
use crate::metrics::{self, ExporterMetrics, ProbeMetrics};
use crate::probe::{Iperf3Runner, ProbeRunner};
use crate::request::{ProbeParams, ProbeRequest, SCRAPE_TIMEOUT_HEADER};
use axum::{
    extract::{Query, State},
    http::{header::CONTENT_TYPE, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tower_http::timeout::TimeoutLayer;
use tracing::{error, info, warn};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub metrics: ExporterMetrics,
    pub cache: Arc<ResultCache>,
    pub runner: Arc<dyn ProbeRunner>,
}

impl AppState {
    pub fn new(config: Config, runner: Arc<dyn ProbeRunner>) -> anyhow::Result<Self> {
        let cache = Arc::new(ResultCache::new(config.probe.cache_time));
        Ok(Self {
            metrics: ExporterMetrics::new()?,
            cache,
            runner,
            config,
        })
    }
}

/// Upper bound on handling one HTTP request, probe included.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

pub async fn start(config: Config) -> anyhow::Result<()> {
    config.server.validate()?;

    let runner = Arc::new(Iperf3Runner::new(config.probe.command.clone()));
    let state = AppState::new(config.clone(), runner)?;
    let app = router(state);

    // Start the server
    let addr = config.server.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(ExporterError::Io)?;

    info!("Listening on {}", addr);
    info!("Probe available at http://{}/probe?target=<host>", addr);

    axum::serve(listener, app)
        .await
        .map_err(|e| ExporterError::Server(e.to_string()))?;

    Ok(())
}

/// Build the router; exposed so tests can drive it without a socket.
///
/// The metrics path is expected to have passed [`crate::config::ServerConfig::validate`].
pub fn router(state: AppState) -> Router {
    let metrics_path = state.config.server.normalized_metrics_path();

    Router::new()
        .route("/", get(root_handler))
        .route("/probe", get(probe_handler))
        .route(&metrics_path, get(metrics_handler))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            REQUEST_TIMEOUT,
        ))
        .with_state(state)
}

async fn root_handler(State(state): State<AppState>) -> Html<String> {
    Html(format!(
        r#"<html>
<head><title>iPerf3 Exporter</title></head>
<body>
<h1>iPerf3 Exporter</h1>
<p><a href="/probe?target=prometheus.io">Probe prometheus.io</a></p>
<p><a href="{}">Metrics</a></p>
</body>
</html>"#,
        state.config.server.normalized_metrics_path()
    ))
}

async fn probe_handler(
    State(state): State<AppState>,
    Query(params): Query<ProbeParams>,
    headers: HeaderMap,
) -> Response {
    let start = Instant::now();

    let timeout_header = headers
        .get(SCRAPE_TIMEOUT_HEADER)
        .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned());

    let request = match ProbeRequest::resolve(
        &params,
        timeout_header.as_deref(),
        state.config.probe.timeout,
    ) {
        Ok(request) => request,
        Err(e) => {
            state.metrics.errors_total.inc();
            warn!("Rejected probe request: {}", e);
            return (e.status_code(), e.to_string()).into_response();
        }
    };

    let session = CollectionSession::new(&state.cache, state.runner.as_ref(), &state.metrics);
    let set = session.collect(&request).await;

    let response = match ProbeMetrics::from_metric_set(&set).and_then(|m| m.render()) {
        Ok(body) => ([(CONTENT_TYPE, metrics::content_type())], body).into_response(),
        Err(e) => {
            state.metrics.errors_total.inc();
            error!("Failed to render probe metrics: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Error rendering metrics: {}", e),
            )
                .into_response()
        }
    };

    state
        .metrics
        .duration_seconds
        .observe(start.elapsed().as_secs_f64());

    response
}

async fn metrics_handler(State(state): State<AppState>) -> Response {
    match state.metrics.render() {
        Ok(body) => ([(CONTENT_TYPE, metrics::content_type())], body).into_response(),
        Err(e) => {
            error!("Failed to render metrics: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Error rendering metrics: {}", e),
            )
                .into_response()
        }
    }
}
