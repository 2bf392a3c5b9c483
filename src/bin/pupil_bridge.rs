//! Bridge Application
//!
//! Subscribes to the eye tracker's telemetry, buffers samples while a
//! controller has recording switched on, and serves control requests.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pupil_bridge::{
    bridge::Bridge,
    codec::PayloadFormat,
    config::{BridgeConfig, UpstreamConfig},
};

#[derive(Parser, Debug)]
#[command(name = "pupil-bridge", version, about = "Eye tracker to recording controller bridge")]
struct Args {
    /// Configuration file (defaults to the per-user config file, if any)
    #[arg(short, long, env = "PUPIL_BRIDGE_CONFIG")]
    config: Option<PathBuf>,

    /// Sensor publisher endpoint
    #[arg(long)]
    ingest: Option<String>,

    /// Control replier bind endpoint
    #[arg(long)]
    control: Option<String>,

    /// Sensor remote-control endpoint; enables the start/stop handshake
    #[arg(long)]
    upstream: Option<String>,

    /// Payload format published by the sensor
    #[arg(long, value_enum)]
    decoder: Option<PayloadFormat>,

    /// Topic prefix to subscribe to (repeatable; "" subscribes to all)
    #[arg(long = "topic")]
    topics: Vec<String>,

    /// Log every ingest topic and payload at debug level
    #[arg(long)]
    dump_frames: bool,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    print_config: bool,
}

impl Args {
    fn apply(&self, config: &mut BridgeConfig) {
        if let Some(endpoint) = &self.ingest {
            config.ingest.endpoint = endpoint.clone();
        }
        if let Some(endpoint) = &self.control {
            config.control.endpoint = endpoint.clone();
        }
        if let Some(endpoint) = &self.upstream {
            let upstream = config.upstream.get_or_insert_with(UpstreamConfig::default);
            upstream.endpoint = endpoint.clone();
        }
        if let Some(decoder) = self.decoder {
            config.decoder = decoder;
        }
        if !self.topics.is_empty() {
            let topics = self.topics.iter().filter(|t| !t.is_empty()).cloned().collect();
            config.ingest.topics = Some(topics);
        }
        if self.dump_frames {
            config.logging.dump_frames = true;
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = BridgeConfig::load(args.config.as_deref()).context("Failed to load configuration")?;
    args.apply(&mut config);
    config.validate().context("Invalid configuration")?;

    if args.print_config {
        print!("{}", config.to_toml()?);
        return Ok(());
    }

    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| config.logging.level.clone()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting pupil bridge ({} payloads)", config.decoder);
    tracing::info!("Ingest: {} topics {:?}", config.ingest.endpoint, config.topics());
    tracing::info!("Control: {}", config.control.endpoint);
    match &config.upstream {
        Some(upstream) => tracing::info!("Remote control: {}", upstream.endpoint),
        None => tracing::info!("Remote control disabled"),
    }

    let mut bridge = Bridge::connect(&config)
        .await
        .context("Failed to open bridge sockets")?;

    if let Err(e) = bridge.run().await {
        tracing::error!("Bridge stopped: {}", e);
        bridge.log_stats();
        return Err(e.into());
    }

    Ok(())
}
