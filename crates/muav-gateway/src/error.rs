//! Gateway error type.

use muav_client::ApiError;
use muav_core::ValidationError;
use thiserror::Error;

use crate::protocol::RpcError;

#[derive(Debug, Error)]
pub enum GatewayError {
    /// Schema or business-rule violation, caught before any platform call.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("invalid arguments for {tool}: {message}")]
    InvalidArguments { tool: String, message: String },

    #[error("unknown tool: {0}")]
    UnknownTool(String),

    #[error("unknown resource: {0}")]
    UnknownResource(String),

    #[error("unknown prompt: {0}")]
    UnknownPrompt(String),

    #[error("unexpected platform response: {0}")]
    UnexpectedResponse(String),

    #[error("failed to encode output: {0}")]
    Encoding(#[from] serde_json::Error),
}

impl GatewayError {
    pub fn invalid_arguments(tool: &str, message: impl Into<String>) -> Self {
        GatewayError::InvalidArguments {
            tool: tool.to_string(),
            message: message.into(),
        }
    }

    /// JSON-RPC error for failures that are not reported as tool results.
    pub fn to_rpc(&self) -> RpcError {
        match self {
            GatewayError::UnknownTool(_)
            | GatewayError::UnknownResource(_)
            | GatewayError::UnknownPrompt(_)
            | GatewayError::InvalidArguments { .. }
            | GatewayError::Validation(_) => RpcError::InvalidParams(self.to_string()),
            _ => RpcError::InternalError(self.to_string()),
        }
    }
}
