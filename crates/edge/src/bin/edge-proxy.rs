// ABOUTME: HTTP server binary for the pricewatch edge extractor.
// ABOUTME: Reads listen address and upstream options from flags or environment, then serves until Ctrl-C.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use pricewatch_edge::Client;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "edge-proxy")]
#[command(about = "Fetch product pages and extract prices over HTTP")]
struct Args {
    /// Address to listen on
    #[arg(long, env = "EDGE_LISTEN", default_value = "0.0.0.0:8787")]
    listen: SocketAddr,

    /// Upstream request timeout in seconds (default: none)
    #[arg(long, env = "EDGE_TIMEOUT_SECS")]
    timeout_secs: Option<u64>,

    /// User-Agent sent upstream (default: none)
    #[arg(long, env = "EDGE_USER_AGENT")]
    user_agent: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .init();

    let args = Args::parse();

    let mut builder = Client::builder();
    if let Some(secs) = args.timeout_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    if let Some(ua) = args.user_agent {
        builder = builder.user_agent(ua);
    }
    let client = builder.build().context("failed to build HTTP client")?;

    let listener = tokio::net::TcpListener::bind(args.listen)
        .await
        .with_context(|| format!("failed to bind {}", args.listen))?;
    info!("edge proxy listening on http://{}", listener.local_addr()?);

    pricewatch_edge::serve(listener, client).await
}
