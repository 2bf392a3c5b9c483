//! Ingest Probe
//!
//! Subscribes to the sensor's telemetry publisher and prints every message
//! part, for checking what the sensor actually sends.

use anyhow::{Context, Result};
use clap::Parser;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pupil_bridge::constants::DEFAULT_INGEST_ENDPOINT;
use pupil_bridge::network::{FrameEndpoint, ZmqEndpoint};

#[derive(Parser, Debug)]
#[command(name = "ingest-probe", version, about = "Dump the eye tracker telemetry feed")]
struct Args {
    /// Sensor publisher endpoint
    #[arg(short, long, default_value = DEFAULT_INGEST_ENDPOINT)]
    endpoint: String,

    /// Topic prefix; empty subscribes to everything
    #[arg(short, long, default_value = "pupil_positions")]
    topic: String,

    /// Stop after this many messages
    #[arg(short, long)]
    count: Option<u64>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let mut feed = ZmqEndpoint::subscriber(&args.endpoint, &[args.topic.clone()])
        .await
        .with_context(|| format!("Failed to subscribe to {}", args.endpoint))?;

    tracing::info!("Listening on {} for topic {:?}", args.endpoint, args.topic);

    let mut messages = 0u64;
    let mut part = 0usize;
    loop {
        let Some(frame) = feed.recv_part(Duration::from_secs(1)).await? else {
            continue;
        };

        println!("[{}.{}] {}", messages, part, String::from_utf8_lossy(&frame.data));
        if frame.more {
            part += 1;
            continue;
        }

        part = 0;
        messages += 1;
        if args.count.is_some_and(|count| messages >= count) {
            return Ok(());
        }
    }
}
