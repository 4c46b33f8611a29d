//! ROS bridge tools.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use super::{check_len, parse_args, ToolContext};
use crate::error::GatewayError;
use crate::protocol::{ToolDefinition, ToolResult};

const NAME_MAX: usize = 100;
const TYPE_MAX: usize = 1000;

fn topic_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "topic": {"type": "string", "minLength": 1, "maxLength": NAME_MAX, "description": "Topic name"}
        },
        "required": ["topic"]
    })
}

pub(super) fn definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition {
            name: "get_ros_topics",
            description: "Get the current ROS topics of devices connected to the server",
            input_schema: json!({"type": "object", "properties": {}}),
        },
        ToolDefinition {
            name: "get_ros_topics_type",
            description: "Get the current ROS topic message type",
            input_schema: topic_schema(),
        },
        ToolDefinition {
            name: "get_ros_message_type_details",
            description: "Get the ros message structure",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "type": {"type": "string", "minLength": 1, "maxLength": NAME_MAX, "description": "message type"}
                },
                "required": ["type"]
            }),
        },
        ToolDefinition {
            name: "subscribe_topic_once",
            description: "Subscribe to a ROS topic once",
            input_schema: topic_schema(),
        },
        ToolDefinition {
            name: "get_ros_services",
            description: "Get the current ROS services of devices connected to the server",
            input_schema: json!({"type": "object", "properties": {}}),
        },
        ToolDefinition {
            name: "pub_ros_topic",
            description: "Publish a message to a ROS topic",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "topic": {"type": "string", "minLength": 1, "maxLength": NAME_MAX},
                    "messageType": {"type": "string", "minLength": 1, "maxLength": TYPE_MAX},
                    "message": {"type": "object"}
                },
                "required": ["topic", "messageType", "message"]
            }),
        },
        ToolDefinition {
            name: "ros_service_call",
            description: "Call a ROS service with a request message",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "service": {"type": "string", "minLength": 1, "maxLength": NAME_MAX},
                    "serviceType": {"type": "string", "minLength": 1, "maxLength": TYPE_MAX},
                    "request": {"type": "object"}
                },
                "required": ["service", "serviceType", "request"]
            }),
        },
    ]
}

#[derive(Debug, Deserialize)]
struct TopicArgs {
    topic: String,
}

#[derive(Debug, Deserialize)]
struct MessageTypeArgs {
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PublishArgs {
    pub topic: String,
    pub message_type: String,
    pub message: Map<String, Value>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ServiceCallArgs {
    service: String,
    service_type: String,
    request: Map<String, Value>,
}

/// Pick `field` out of a platform payload, or pass the payload through if absent.
fn field_or_whole(value: Value, field: &str) -> Value {
    match value {
        Value::Object(mut map) if map.contains_key(field) => map.remove(field).unwrap_or(Value::Null),
        other => other,
    }
}

pub(super) async fn get_ros_topics(ctx: &ToolContext) -> Result<ToolResult, GatewayError> {
    let result = ctx.client.get("/ros/topics", &[]).await?;
    ctx.render_result(&field_or_whole(result, "topics"))
}

pub(super) async fn get_ros_services(ctx: &ToolContext) -> Result<ToolResult, GatewayError> {
    let result = ctx.client.get("/ros/services", &[]).await?;
    ctx.render_result(&field_or_whole(result, "services"))
}

pub(super) async fn get_ros_topics_type(ctx: &ToolContext, args: Value) -> Result<ToolResult, GatewayError> {
    let TopicArgs { topic } = parse_args("get_ros_topics_type", args)?;
    check_len("get_ros_topics_type", "topic", &topic, 1, NAME_MAX)?;
    let result = ctx.client.get("/ros/topics_type", &[("topic", topic.as_str())]).await?;
    ctx.render_result(&result)
}

pub(super) async fn get_ros_message_type_details(
    ctx: &ToolContext,
    args: Value,
) -> Result<ToolResult, GatewayError> {
    let MessageTypeArgs { kind } = parse_args("get_ros_message_type_details", args)?;
    check_len("get_ros_message_type_details", "type", &kind, 1, NAME_MAX)?;
    let result = ctx.client.get("/ros/message_details", &[("type", kind.as_str())]).await?;
    ctx.render_result(&result)
}

pub(super) async fn subscribe_topic_once(ctx: &ToolContext, args: Value) -> Result<ToolResult, GatewayError> {
    let TopicArgs { topic } = parse_args("subscribe_topic_once", args)?;
    check_len("subscribe_topic_once", "topic", &topic, 1, NAME_MAX)?;
    let result = ctx.client.get("/ros/subscribe_once", &[("topic", topic.as_str())]).await?;
    ctx.render_result(&result)
}

pub(super) async fn pub_ros_topic(ctx: &ToolContext, args: Value) -> Result<ToolResult, GatewayError> {
    let publish: PublishArgs = parse_args("pub_ros_topic", args)?;
    check_len("pub_ros_topic", "topic", &publish.topic, 1, NAME_MAX)?;
    check_len("pub_ros_topic", "messageType", &publish.message_type, 1, TYPE_MAX)?;
    tracing::debug!(topic = %publish.topic, message_type = %publish.message_type, "publishing");
    let result = ctx.client.post("/ros/publish", &publish).await?;
    ctx.render_result(&result)
}

pub(super) async fn ros_service_call(ctx: &ToolContext, args: Value) -> Result<ToolResult, GatewayError> {
    let call: ServiceCallArgs = parse_args("ros_service_call", args)?;
    check_len("ros_service_call", "service", &call.service, 1, NAME_MAX)?;
    check_len("ros_service_call", "serviceType", &call.service_type, 1, TYPE_MAX)?;
    let result = ctx.client.post("/ros/service_call", &call).await?;
    ctx.render_result(&result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::{context_for, offline_context};
    use axum::extract::Query;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use std::collections::HashMap;

    #[tokio::test]
    async fn topics_field_is_unwrapped() {
        let app = Router::new().route(
            "/api/ros/topics",
            get(|| async { Json(json!({"topics": ["/bcr_bot/odom", "/px4_1/status"]})) }),
        );
        let ctx = context_for(app).await;
        let result = get_ros_topics(&ctx).await.unwrap();
        let topics: Value = serde_json::from_str(result.first_text()).unwrap();
        assert_eq!(topics, json!(["/bcr_bot/odom", "/px4_1/status"]));
    }

    #[tokio::test]
    async fn topic_is_sent_as_query() {
        let app = Router::new().route(
            "/api/ros/topics_type",
            get(|Query(q): Query<HashMap<String, String>>| async move {
                Json(json!({"topic": q.get("topic"), "type": "nav_msgs/msg/Odometry"}))
            }),
        );
        let ctx = context_for(app).await;
        let result = get_ros_topics_type(&ctx, json!({"topic": "/bcr_bot/odom"}))
            .await
            .unwrap();
        assert!(result.first_text().contains("/bcr_bot/odom"));
    }

    #[tokio::test]
    async fn empty_topic_is_rejected() {
        let err = subscribe_topic_once(&offline_context(), json!({"topic": ""}))
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::InvalidArguments { .. }));
    }

    #[tokio::test]
    async fn publish_requires_object_message() {
        let args = json!({"topic": "/t", "messageType": "std_msgs/msg/String", "message": "hello"});
        let err = pub_ros_topic(&offline_context(), args).await.unwrap_err();
        assert!(matches!(err, GatewayError::InvalidArguments { .. }));
    }

    #[tokio::test]
    async fn service_call_forwards_request() {
        let app = Router::new().route(
            "/api/ros/service_call",
            post(|Json(body): Json<Value>| async move { Json(json!({"called": body["service"], "req": body["request"]})) }),
        );
        let ctx = context_for(app).await;
        let args = json!({"service": "/px4_1/arm", "serviceType": "std_srvs/srv/SetBool", "request": {"data": true}});
        let result = ros_service_call(&ctx, args).await.unwrap();
        let echoed: Value = serde_json::from_str(result.first_text()).unwrap();
        assert_eq!(echoed["called"], "/px4_1/arm");
        assert_eq!(echoed["req"]["data"], true);
    }
}
