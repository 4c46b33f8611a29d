//! Device commands and high-level tasks.

use muav_core::error::FieldIssue;
use muav_core::planning::GeoPoint;
use muav_core::{GlobalPosition, Route, Validate, ValidationError};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::missions::global_route_schema;
use super::{parse_args, ToolContext};
use crate::error::GatewayError;
use crate::protocol::{ToolDefinition, ToolResult};

/// Device id meaning "every device".
const ALL_DEVICES: i64 = -1;

pub(super) fn definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition {
            name: "send_command",
            description: "Send a command to a registered device/robot",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "deviceId": {"type": "integer", "description": "Device ID to send command to"},
                    "type": {"type": "string", "description": "Type of command to send"},
                    "attributes": {"description": "Attributes for the command"}
                },
                "required": ["deviceId", "type"]
            }),
        },
        ToolDefinition {
            name: "load_mission_to_uav",
            description: "Load a mission to UAV devices",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "deviceId": {"type": "integer", "minimum": -1, "description": "Device ID to load mission or -1 for all devices"},
                    "routes": {"type": "array", "items": global_route_schema(), "description": "Array of routes"}
                },
                "required": ["deviceId", "routes"]
            }),
        },
        ToolDefinition {
            name: "start_mission",
            description: "send command start mission to UAV devices",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "deviceId": {"type": "integer", "minimum": -1, "description": "Device ID or -1 for all devices"}
                },
                "required": ["deviceId"]
            }),
        },
        ToolDefinition {
            name: "get_available_commands",
            description: "Get the list of available commands for UAV devices",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "deviceId": {"type": "integer", "description": "Device ID to get commands for"}
                },
                "required": ["deviceId"]
            }),
        },
        ToolDefinition {
            name: "send_task",
            description: "Send a high level task to GCS for UAV inspection",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "mission_id": {"type": "integer", "description": "Mission ID"},
                    "objetivo": {"type": "integer", "minimum": 0, "maximum": 2, "description": "Objective: 0=Location, 1=Bird inspection, 2=Lidar survey"},
                    "loc": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "properties": {"lat": {"type": "number"}, "lng": {"type": "number"}, "alt": {"type": "number"}},
                            "required": ["lat", "lng", "alt"]
                        }
                    },
                    "meteo": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "properties": {
                                "temperature": {"type": "number", "description": "Celsius"},
                                "humidity": {"type": "number", "description": "Percent"},
                                "windSpeed": {"type": "number", "description": "m/s"},
                                "windDirection": {"type": "number", "description": "Degrees"}
                            },
                            "required": ["temperature", "humidity", "windSpeed", "windDirection"]
                        }
                    }
                },
                "required": ["mission_id", "objetivo", "loc", "meteo"]
            }),
        },
    ]
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
struct SendCommandArgs {
    device_id: i64,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    attributes: Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeviceArgs {
    device_id: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoadMissionArgs {
    device_id: i64,
    routes: Vec<Route<GlobalPosition>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MeteoSample {
    temperature: f64,
    humidity: f64,
    wind_speed: f64,
    wind_direction: f64,
}

#[derive(Debug, Serialize, Deserialize)]
struct SendTaskArgs {
    mission_id: i64,
    objetivo: i64,
    loc: Vec<GeoPoint>,
    meteo: Vec<MeteoSample>,
}

fn check_device_id(device_id: i64, issues: &mut Vec<FieldIssue>) {
    if device_id < ALL_DEVICES {
        issues.push(FieldIssue::new(
            "deviceId",
            "deviceId must be a device id or -1 for all devices",
        ));
    }
}

fn fail_on(issues: Vec<FieldIssue>) -> Result<(), GatewayError> {
    if issues.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::Invalid(issues).into())
    }
}

pub(super) async fn send_command(ctx: &ToolContext, args: Value) -> Result<ToolResult, GatewayError> {
    let command: SendCommandArgs = parse_args("send_command", args)?;
    tracing::info!(device_id = command.device_id, kind = %command.kind, "sending command");
    let result = ctx.client.post("/commands/send", &command).await?;
    ctx.render_result(&result)
}

pub(super) async fn load_mission_to_uav(ctx: &ToolContext, args: Value) -> Result<ToolResult, GatewayError> {
    let load: LoadMissionArgs = parse_args("load_mission_to_uav", args)?;

    let mut issues = Vec::new();
    check_device_id(load.device_id, &mut issues);
    load.routes.collect_issues("routes", &mut issues);
    fail_on(issues)?;

    tracing::info!(
        device_id = load.device_id,
        routes = load.routes.len(),
        "loading mission"
    );
    let body = json!({
        "deviceId": load.device_id,
        "type": "loadMission",
        "attributes": load.routes,
    });
    let result = ctx.client.post("/commands/send", &body).await?;
    ctx.render_result(&result)
}

pub(super) async fn start_mission(ctx: &ToolContext, args: Value) -> Result<ToolResult, GatewayError> {
    let device: DeviceArgs = parse_args("start_mission", args)?;
    let mut issues = Vec::new();
    check_device_id(device.device_id, &mut issues);
    fail_on(issues)?;

    let body = json!({"deviceId": device.device_id, "type": "commandMission"});
    let result = ctx.client.post("/commands/send", &body).await?;
    ctx.render_result(&result)
}

pub(super) async fn get_available_commands(ctx: &ToolContext, args: Value) -> Result<ToolResult, GatewayError> {
    // The platform lists commands globally; deviceId is accepted for future filtering.
    let _device: DeviceArgs = parse_args("get_available_commands", args)?;
    let commands = ctx.client.get("/commands/send", &[]).await?;
    ctx.render_result(&commands)
}

pub(super) async fn send_task(ctx: &ToolContext, args: Value) -> Result<ToolResult, GatewayError> {
    let task: SendTaskArgs = parse_args("send_task", args)?;

    let mut issues = Vec::new();
    if !(0..=2).contains(&task.objetivo) {
        issues.push(FieldIssue::new(
            "objetivo",
            "objetivo must be 0 (location), 1 (bird inspection) or 2 (lidar survey)",
        ));
    }
    task.loc.collect_issues("loc", &mut issues);
    fail_on(issues)?;

    let result = ctx.client.post("/missions/sendTask", &task).await?;
    ctx.render_result(&result)
}
