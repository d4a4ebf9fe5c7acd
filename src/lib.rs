//! iperf3 Prometheus Exporter
//!
//! A Prometheus exporter that measures network throughput on demand by running
//! the `iperf3` client against a target named in the scrape request.
//!
//! # Overview
//!
//! Every scrape of `/probe?target=<host>` resolves its parameters, consults a
//! per-target cache and, when the cached measurement is older than the
//! configured TTL, runs `iperf3 -J` against the target. The result is exposed
//! as a small set of gauges in Prometheus text format.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────┐   GET /probe    ┌──────────────────────────────┐
//! │ Prometheus │ ──────────────► │           Exporter           │
//! └────────────┘                 │  ┌─────────┐   ┌──────────┐  │   iperf3 -J   ┌────────────┐
//!                                │  │ Session │──►│  Runner  │──┼─────────────► │   Target   │
//!                                │  └────┬────┘   └──────────┘  │               └────────────┘
//!                                │  ┌────▼────┐                 │
//!                                │  │  Cache  │                 │
//!                                │  └─────────┘                 │
//!                                └──────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`request`] - Scrape parameter resolution and duration parsing
//! - [`cache`] - Per-target result cache
//! - [`probe`] - iperf3 runner and JSON output types
//! - [`collector`] - Per-request collection session
//! - [`metrics`] - Prometheus metric definitions and rendering
//! - [`server`] - HTTP server and handlers
//! - [`config`] - Configuration management
//! - [`error`] - Error types
//!
//! # Quick Start
//!
//! ```no_run
//! use iperf3_exporter::{config::Config, server};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config/Default.toml")?;
//!     server::start(config).await?;
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod collector;
pub mod config;
pub mod error;
pub mod metrics;
pub mod probe;
pub mod request;
pub mod server;
