//! MCP gateway for the multi-UAV fleet platform.

pub mod config;
pub mod encoding;
pub mod error;
pub mod prompts;
pub mod protocol;
pub mod resources;
pub mod server;
pub mod tools;
pub mod transport;

pub use config::Config;
pub use error::GatewayError;
pub use server::McpServer;
