use anyhow::Result;
use clap::Parser;
use iperf3_exporter::{
    cache::cache_time_from_minutes, config::Config, request::parse_duration, server,
};
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/Default.toml")]
    config: String,

    /// Address to listen on for web interface and telemetry (overrides config)
    #[arg(long = "web.listen-address", env = "IPERF3_EXPORTER_LISTEN_ADDRESS")]
    listen_address: Option<String>,

    /// Path under which to expose metrics (overrides config)
    #[arg(long = "web.telemetry-path", env = "IPERF3_EXPORTER_TELEMETRY_PATH")]
    telemetry_path: Option<String>,

    /// iperf3 run timeout, e.g. 30s (overrides config)
    #[arg(long = "iperf3.timeout", value_parser = parse_timeout)]
    timeout: Option<Duration>,

    /// iperf3 binary to execute (overrides config)
    #[arg(long = "iperf3.command", env = "IPERF3_EXPORTER_COMMAND")]
    command: Option<String>,

    /// Minutes a measurement is cached per target
    #[arg(long, env = "CACHE_TIME", hide = true)]
    cache_time: Option<String>,
}

fn parse_timeout(raw: &str) -> std::result::Result<Duration, String> {
    parse_duration(raw).map_err(|e| e.to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting iperf3 Prometheus Exporter v{}",
        env!("CARGO_PKG_VERSION")
    );

    // Parse CLI arguments
    let args = Args::parse();

    // Load configuration
    let mut config = Config::load(&args.config)?;

    // Override with CLI arguments if provided
    if let Some(addr) = args.listen_address {
        config.server.listen_address = addr;
    }
    if let Some(path) = args.telemetry_path {
        config.server.metrics_path = path;
    }
    if let Some(timeout) = args.timeout {
        config.probe.timeout = timeout;
    }
    if let Some(command) = args.command {
        config.probe.command = command;
    }
    config.probe.cache_time = cache_time_from_minutes(args.cache_time.as_deref());

    info!("Configuration loaded successfully");
    info!("Caching enabled, duration: {:?}", config.probe.cache_time);
    info!(
        "Probe command: {} (default timeout {:?})",
        config.probe.command, config.probe.timeout
    );
    info!(
        "Metrics endpoint: http://{}{}",
        config.server.bind_address(),
        config.server.metrics_path
    );

    // Start the server
    if let Err(e) = server::start(config).await {
        error!("Server error: {}", e);
        std::process::exit(1);
    }

    Ok(())
}
