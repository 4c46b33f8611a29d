//! Fleet inventory and telemetry.

use serde_json::{json, Value};

use super::ToolContext;
use crate::error::GatewayError;
use crate::protocol::{ToolDefinition, ToolResult};

pub(super) fn definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition {
            name: "get_devices",
            description: "get list of robots registered in the platform",
            input_schema: json!({"type": "object", "properties": {}}),
        },
        ToolDefinition {
            name: "get_telemetry_data",
            description: "get list of current position and telemetry data from all robots in the platform",
            input_schema: json!({"type": "object", "properties": {}}),
        },
    ]
}

pub(super) async fn get_devices(ctx: &ToolContext) -> Result<ToolResult, GatewayError> {
    let devices = ctx.client.get("/devices", &[]).await?;
    let list = devices
        .as_array()
        .ok_or_else(|| GatewayError::UnexpectedResponse("/devices did not return a list".into()))?;

    let summary = list
        .iter()
        .map(device_summary)
        .collect::<Vec<_>>()
        .join("\n\n");

    Ok(ToolResult::text(format!(
        "Found {} device(s):\n\n{}",
        list.len(),
        summary
    )))
}

fn device_summary(device: &Value) -> String {
    let field = |key: &str| match device.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => "unknown".to_string(),
        Some(other) => other.to_string(),
    };
    let last_update = match device.get("lastUpdate") {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        _ => "Never".to_string(),
    };
    format!(
        "- {} (ID: {})\n  Category: {}\n  Status: {}\n  Protocol: {}\n  Last Update: {}",
        field("name"),
        field("id"),
        field("category"),
        field("status"),
        field("protocol"),
        last_update
    )
}

pub(super) async fn get_telemetry_data(ctx: &ToolContext) -> Result<ToolResult, GatewayError> {
    let positions = ctx.client.get("/positions", &[]).await?;
    let count = positions.as_array().map(Vec::len).unwrap_or(0);
    Ok(ToolResult::text(format!(
        "Found {} positions(s):\n\n{}",
        count,
        ctx.render(&positions)?
    )))
}
