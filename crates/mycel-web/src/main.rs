//! Mycel Web - HTTP service over a resident network.

use anyhow::{Context, Result};
use clap::Parser;
use mycel::prelude::NetworkConfig;
use mycel_web::{routes, AppState};

#[derive(Parser, Debug)]
#[command(name = "mycel-web")]
#[command(about = "Mycel Web - HTTP service over a resident pattern network")]
struct Cli {
    /// Port to listen on
    #[arg(short, long, default_value = "3000")]
    port: u16,

    /// Host to bind to
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Nodes to create at startup
    #[arg(short, long, default_value = "0")]
    nodes: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let addr = format!("{}:{}", cli.host, cli.port);

    let state = AppState::seeded(NetworkConfig::default(), cli.nodes)
        .context("failed to build the initial network")?;
    tracing::info!(nodes = cli.nodes, %addr, "starting mycel-web");

    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    axum::serve(listener, app).await?;

    Ok(())
}
