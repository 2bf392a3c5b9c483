//! Controller Client
//!
//! Sends a sequence of control requests to a running bridge and prints
//! every reply.

use anyhow::{bail, Context, Result};
use bytes::Bytes;
use clap::Parser;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pupil_bridge::network::{request_reply, ZmqEndpoint};

#[derive(Parser, Debug)]
#[command(name = "bridge-ctl", version, about = "Send control requests to a pupil bridge")]
struct Args {
    /// Bridge control endpoint
    #[arg(short, long, default_value = "tcp://localhost:6000")]
    endpoint: String,

    /// Reply timeout in milliseconds
    #[arg(short, long, default_value_t = 5000)]
    timeout_ms: u64,

    /// Requests to send in order; `sleep:<secs>` pauses between them
    #[arg(default_values_t = ["start".to_string(), "sleep:10".to_string(), "stop".to_string()])]
    steps: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
enum Step {
    Request(String),
    Sleep(Duration),
}

impl Step {
    fn parse(step: &str) -> Result<Self> {
        match step.strip_prefix("sleep:") {
            Some(secs) => {
                let secs: f64 = secs
                    .parse()
                    .with_context(|| format!("Invalid sleep step '{}'", step))?;
                if !secs.is_finite() || secs < 0.0 {
                    bail!("Sleep must be a non-negative number of seconds: '{}'", step);
                }
                Ok(Step::Sleep(Duration::from_secs_f64(secs)))
            }
            None => Ok(Step::Request(step.to_string())),
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let steps = args
        .steps
        .iter()
        .map(|s| Step::parse(s))
        .collect::<Result<Vec<_>>>()?;

    let mut link = ZmqEndpoint::requester(&args.endpoint)
        .await
        .with_context(|| format!("Failed to connect to {}", args.endpoint))?;
    let timeout = Duration::from_millis(args.timeout_ms);

    for step in steps {
        match step {
            Step::Sleep(duration) => tokio::time::sleep(duration).await,
            Step::Request(request) => {
                let reply = request_reply(&mut link, Bytes::from(request.clone()), timeout)
                    .await
                    .with_context(|| format!("No reply to '{}'", request))?;
                println!("{} -> {}", request, String::from_utf8_lossy(&reply));
            }
        }
    }

    Ok(())
}
