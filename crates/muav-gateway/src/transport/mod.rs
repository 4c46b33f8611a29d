//! Transports selectable at startup.

pub mod http;
pub mod sse;
pub mod stdio;

use clap::ValueEnum;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Transport {
    /// Newline-delimited JSON-RPC on stdin/stdout.
    Stdio,
    /// Server-Sent-Events stream plus POST /messages.
    Sse,
    /// Streamable HTTP on POST /mcp.
    Http,
}
