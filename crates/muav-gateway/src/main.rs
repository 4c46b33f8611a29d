//! MUAV Gateway - MCP server for the multi-UAV fleet platform

use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use muav_gateway::transport::{self, Transport};
use muav_gateway::{Config, McpServer};

#[derive(Debug, Parser)]
#[command(name = "muav-gateway", version, about = "MCP gateway for the multi-UAV fleet platform")]
struct Args {
    /// Transport to serve on.
    #[arg(value_enum, default_value = "stdio")]
    transport: Transport,

    /// Listen port for the sse and http transports (overrides SERVER_PORT).
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = Config::from_env();

    // stdout carries JSON-RPC on the stdio transport, so logs go to stderr.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.default_log_filter()));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    tracing::info!(transport = ?args.transport, "starting MUAV gateway");
    config.log_summary();

    let server = Arc::new(McpServer::from_config(&config).context("invalid platform configuration")?);
    let port = args.port.unwrap_or(config.server_port);

    match args.transport {
        Transport::Stdio => transport::stdio::run(server).await,
        Transport::Sse => serve(transport::sse::router(server), port).await,
        Transport::Http => serve(transport::http::router(server), port).await,
    }
}

async fn serve(app: axum::Router, port: u16) -> Result<()> {
    let app = app
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    axum::serve(listener, app).await?;
    Ok(())
}
