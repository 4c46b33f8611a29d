//! Tool registry and dispatch.
//!
//! Each submodule owns a group of tools: its definitions and the calls that
//! back them. Arguments are decoded and validated before any platform call.

mod agv;
mod commands;
mod devices;
mod missions;
mod planning;
mod ros;

use muav_client::PlatformClient;
use muav_core::TargetCoverage;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::encoding::OutputFormat;
use crate::error::GatewayError;
use crate::protocol::{ToolDefinition, ToolResult};

/// Everything a tool call needs; cheap to clone.
#[derive(Debug, Clone)]
pub struct ToolContext {
    pub client: PlatformClient,
    pub output: OutputFormat,
    pub coverage: TargetCoverage,
}

impl ToolContext {
    /// Encode a platform payload per the configured output format.
    pub fn render(&self, value: &Value) -> Result<String, GatewayError> {
        Ok(self.output.encode(value)?)
    }

    pub fn render_result(&self, value: &Value) -> Result<ToolResult, GatewayError> {
        Ok(ToolResult::text(self.render(value)?))
    }
}

pub fn definitions() -> Vec<ToolDefinition> {
    let mut tools = Vec::new();
    tools.extend(devices::definitions());
    tools.extend(missions::definitions());
    tools.extend(planning::definitions());
    tools.extend(commands::definitions());
    tools.extend(ros::definitions());
    tools.extend(agv::definitions());
    tools
}

pub fn is_known(name: &str) -> bool {
    definitions().iter().any(|tool| tool.name == name)
}

/// Run a tool. Errors are returned to the caller, which decides whether they
/// become an error result or a JSON-RPC error.
pub async fn call(ctx: &ToolContext, name: &str, args: Value) -> Result<ToolResult, GatewayError> {
    match name {
        "get_devices" => devices::get_devices(ctx).await,
        "get_telemetry_data" => devices::get_telemetry_data(ctx).await,

        "get_missions" => missions::get_missions(ctx).await,
        "create_mission" => missions::create_mission(ctx, args).await,
        "validate_mission_collisions" => missions::validate_mission_collisions(ctx, args).await,
        "resolve_mission_collisions" => missions::resolve_mission_collisions(ctx, args).await,

        "get_markers" => planning::get_markers(ctx).await,
        "request_mission_plan" => planning::request_mission_plan(ctx, args).await,

        "send_command" => commands::send_command(ctx, args).await,
        "load_mission_to_uav" => commands::load_mission_to_uav(ctx, args).await,
        "start_mission" => commands::start_mission(ctx, args).await,
        "get_available_commands" => commands::get_available_commands(ctx, args).await,
        "send_task" => commands::send_task(ctx, args).await,

        "get_ros_topics" => ros::get_ros_topics(ctx).await,
        "get_ros_topics_type" => ros::get_ros_topics_type(ctx, args).await,
        "get_ros_message_type_details" => ros::get_ros_message_type_details(ctx, args).await,
        "subscribe_topic_once" => ros::subscribe_topic_once(ctx, args).await,
        "get_ros_services" => ros::get_ros_services(ctx).await,
        "pub_ros_topic" => ros::pub_ros_topic(ctx, args).await,
        "ros_service_call" => ros::ros_service_call(ctx, args).await,

        "send_pose_goal_agv" => agv::send_pose_goal_agv(ctx, args).await,
        "send_stop_agv" => agv::send_stop_agv(ctx, args).await,
        "get_agv_state" => agv::get_agv_state(ctx, args).await,

        other => Err(GatewayError::UnknownTool(other.to_string())),
    }
}

pub(crate) fn parse_args<T: DeserializeOwned>(tool: &str, args: Value) -> Result<T, GatewayError> {
    let args = if args.is_null() {
        Value::Object(Default::default())
    } else {
        args
    };
    serde_json::from_value(args).map_err(|err| GatewayError::invalid_arguments(tool, err.to_string()))
}

pub(crate) fn check_len(
    tool: &str,
    field: &str,
    value: &str,
    min: usize,
    max: usize,
) -> Result<(), GatewayError> {
    let len = value.chars().count();
    if len < min || len > max {
        return Err(GatewayError::invalid_arguments(
            tool,
            format!("{} must be between {} and {} characters", field, min, max),
        ));
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use axum::Router;
    use muav_client::ClientSettings;
    use std::time::Duration;

    /// Start `app` as a platform stub and return a context pointing at it.
    pub async fn context_for(app: Router) -> ToolContext {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        ToolContext {
            client: PlatformClient::new(ClientSettings {
                base_url: format!("http://{}/api", addr),
                token: None,
                timeout: Duration::from_secs(2),
                verify_tls: true,
            })
            .unwrap(),
            output: OutputFormat::Json,
            coverage: TargetCoverage::Advisory,
        }
    }

    /// Context whose platform is unreachable; any network call fails.
    pub fn offline_context() -> ToolContext {
        ToolContext {
            client: PlatformClient::new(ClientSettings {
                base_url: "http://127.0.0.1:9/api".into(),
                token: None,
                timeout: Duration::from_millis(200),
                verify_tls: true,
            })
            .unwrap(),
            output: OutputFormat::Json,
            coverage: TargetCoverage::Advisory,
        }
    }
}
