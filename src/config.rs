use crate::cache::DEFAULT_CACHE_TIME;
use crate::error::ExporterError;
use crate::probe::runner::DEFAULT_COMMAND;
use crate::request::{parse_duration, MAX_TIMEOUT};
use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer};
use std::time::Duration;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub probe: ProbeConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_listen_address")]
    pub listen_address: String,
    #[serde(default = "default_metrics_path")]
    pub metrics_path: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ProbeConfig {
    /// Probe timeout used when Prometheus sends no scrape timeout header.
    #[serde(default = "default_timeout", deserialize_with = "deserialize_duration")]
    pub timeout: Duration,
    /// Path or name of the iperf3 binary.
    #[serde(default = "default_command")]
    pub command: String,
    /// How long a measurement is reused before the target is probed again.
    #[serde(skip, default = "default_cache_time")]
    pub cache_time: Duration,
}

fn default_listen_address() -> String {
    ":9579".to_string()
}

fn default_metrics_path() -> String {
    "/metrics".to_string()
}

fn default_timeout() -> Duration {
    MAX_TIMEOUT
}

fn default_command() -> String {
    DEFAULT_COMMAND.to_string()
}

fn default_cache_time() -> Duration {
    DEFAULT_CACHE_TIME
}

fn deserialize_duration<'de, D>(deserializer: D) -> std::result::Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_duration(&raw).map_err(serde::de::Error::custom)
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_address: default_listen_address(),
            metrics_path: default_metrics_path(),
        }
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            command: default_command(),
            cache_time: default_cache_time(),
        }
    }
}

/// Paths served by the exporter itself, which the metrics path may not shadow.
const RESERVED_PATHS: [&str; 2] = ["/", "/probe"];

impl ServerConfig {
    /// Metrics path with a leading `/`, e.g. `metrics` becomes `/metrics`.
    pub fn normalized_metrics_path(&self) -> String {
        if self.metrics_path.starts_with('/') {
            self.metrics_path.clone()
        } else {
            format!("/{}", self.metrics_path)
        }
    }

    /// Reject metrics paths the router cannot serve.
    pub fn validate(&self) -> crate::error::Result<()> {
        let path = self.normalized_metrics_path();
        if RESERVED_PATHS.contains(&path.as_str()) {
            return Err(ExporterError::Config(format!(
                "metrics path {:?} collides with a built-in endpoint",
                self.metrics_path
            )));
        }
        let has_pattern = path.contains(['{', '}'])
            || path
                .split('/')
                .any(|segment| segment.starts_with(':') || segment.starts_with('*'));
        if has_pattern {
            return Err(ExporterError::Config(format!(
                "metrics path {:?} must be a literal path",
                self.metrics_path
            )));
        }
        Ok(())
    }

    /// Socket address to bind; a bare `:port` listens on all interfaces.
    pub fn bind_address(&self) -> String {
        if self.listen_address.starts_with(':') {
            format!("0.0.0.0{}", self.listen_address)
        } else {
            self.listen_address.clone()
        }
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        // Load environment variables from .env if present
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::Environment::with_prefix("IPERF3_EXPORTER").separator("__"))
            .build()
            .context("Failed to build configuration")?;

        let config: Self = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;
        config.server.validate()?;
        Ok(config)
    }
}
