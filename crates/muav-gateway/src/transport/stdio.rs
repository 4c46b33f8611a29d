//! Newline-delimited JSON-RPC over stdin/stdout.

use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, info};

use crate::server::McpServer;

pub async fn run(server: Arc<McpServer>) -> anyhow::Result<()> {
    info!("serving MCP on stdio");
    serve(server, BufReader::new(tokio::io::stdin()), tokio::io::stdout()).await
}

/// Serve until `reader` reaches EOF. One request per line, one response per line.
pub async fn serve<R, W>(server: Arc<McpServer>, mut reader: R, mut writer: W) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut line = String::new();
    loop {
        line.clear();
        if reader.read_line(&mut line).await? == 0 {
            info!("stdin closed, shutting down");
            break;
        }
        let message = line.trim();
        if message.is_empty() {
            continue;
        }

        debug!(bytes = message.len(), "received message");
        let Some(response) = server.handle_message(message).await else {
            continue;
        };
        let encoded = serde_json::to_string(&response)?;
        writer.write_all(encoded.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await?;
    }
    Ok(())
}
