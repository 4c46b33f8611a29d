//! Ground-robot (AGV) navigation through the ROS bridge.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::ros::PublishArgs;
use super::{parse_args, ToolContext};
use crate::error::GatewayError;
use crate::protocol::{ToolDefinition, ToolResult};

const ODOM_TOPIC: &str = "/bcr_bot/odom";
const CANCEL_TOPIC: &str = "/bcr_bot/goal_pose_cancel";
const NAV_ACTION: &str = "navigate_to_pose";
const NAV_ACTION_TYPE: &str = "nav2_msgs/action/NavigateToPose";

fn device_schema(description: &str) -> Value {
    json!({
        "type": "object",
        "properties": {"deviceName": {"type": "string", "description": description}},
        "required": ["deviceName"]
    })
}

pub(super) fn definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition {
            name: "send_pose_goal_agv",
            description: "Send an agv, mobile robot, to a specific pose goal",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "deviceName": {"type": "string", "description": "Device name to send command to"},
                    "x": {"type": "number", "description": "X coordinate of the pose goal"},
                    "y": {"type": "number", "description": "Y coordinate of the pose goal"},
                    "yaw": {"type": "number", "description": "Rotation angle around Z axis in degrees"}
                },
                "required": ["deviceName", "x", "y", "yaw"]
            }),
        },
        ToolDefinition {
            name: "send_stop_agv",
            description: "Send a stop command to an agv, cancel moving mobile robot",
            input_schema: device_schema("Device name to send command to"),
        },
        ToolDefinition {
            name: "get_agv_state",
            description: "Get the current position of an agv, mobile robot, and its current goal",
            input_schema: device_schema("Device name to get position from"),
        },
    ]
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PoseGoalArgs {
    device_name: String,
    x: f64,
    y: f64,
    /// Degrees.
    yaw: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeviceNameArgs {
    device_name: String,
}

/// Planar pose with heading in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub(crate) struct PlanarPose {
    pub x: f64,
    pub y: f64,
    pub yaw: f64,
}

/// Quaternion `[x, y, z, w]` for a rotation of `yaw_deg` about Z.
pub(crate) fn yaw_to_quaternion(yaw_deg: f64) -> [f64; 4] {
    let half = yaw_deg.to_radians() / 2.0;
    [0.0, 0.0, half.sin(), half.cos()]
}

/// Planar pose from a `nav_msgs/Odometry` payload; zero pose if it has none.
pub(crate) fn pose_from_odometry(odom: &Value) -> PlanarPose {
    let pose = &odom["pose"]["pose"];
    if pose.is_null() {
        return PlanarPose { x: 0.0, y: 0.0, yaw: 0.0 };
    }
    let num = |v: &Value| v.as_f64().unwrap_or(0.0);
    let q = &pose["orientation"];
    let (z, w) = (num(&q["z"]), num(&q["w"]));
    let yaw = (2.0 * w * z).atan2(1.0 - 2.0 * z * z);
    PlanarPose {
        x: num(&pose["position"]["x"]),
        y: num(&pose["position"]["y"]),
        yaw: yaw.to_degrees(),
    }
}

pub(super) async fn send_pose_goal_agv(ctx: &ToolContext, args: Value) -> Result<ToolResult, GatewayError> {
    let goal: PoseGoalArgs = parse_args("send_pose_goal_agv", args)?;
    let [qx, qy, qz, qw] = yaw_to_quaternion(goal.yaw);
    tracing::info!(device = %goal.device_name, x = goal.x, y = goal.y, yaw = goal.yaw, "sending pose goal");

    let body = json!({
        "action": NAV_ACTION,
        "actionType": NAV_ACTION_TYPE,
        "message": {
            "pose": {
                "header": {"frame_id": "map"},
                "pose": {
                    "position": {"x": goal.x, "y": goal.y, "z": 0.0},
                    "orientation": {"x": qx, "y": qy, "z": qz, "w": qw}
                }
            },
            "behavior_tree": ""
        }
    });
    let result = ctx.client.post("/ros/action_send_goal", &body).await?;
    ctx.render_result(&result)
}

pub(super) async fn send_stop_agv(ctx: &ToolContext, args: Value) -> Result<ToolResult, GatewayError> {
    let DeviceNameArgs { device_name } = parse_args("send_stop_agv", args)?;
    tracing::info!(device = %device_name, "cancelling goal");
    let cancel = PublishArgs {
        topic: CANCEL_TOPIC.to_string(),
        message_type: "std_msgs/msg/Empty".to_string(),
        message: Default::default(),
    };
    let result = ctx.client.post("/ros/publish", &cancel).await?;
    ctx.render_result(&result)
}

pub(super) async fn get_agv_state(ctx: &ToolContext, args: Value) -> Result<ToolResult, GatewayError> {
    let DeviceNameArgs { device_name } = parse_args("get_agv_state", args)?;
    let odom = ctx
        .client
        .get("/ros/subscribe_once", &[("topic", ODOM_TOPIC)])
        .await?;
    let position = pose_from_odometry(&odom);
    tracing::debug!(device = %device_name, ?position, "agv odometry");

    let state = json!({
        "currentPosition": position,
        "currentGoal": {"x": null, "y": null, "yaw": null},
        "msg": "no goal yet",
    });
    ctx.render_result(&state)
}
