//! Planner access: environment markers and mission-plan requests.

use muav_core::{parse_validated, MissionPlanningRequest};
use serde_json::{json, Value};

use super::ToolContext;
use crate::error::GatewayError;
use crate::protocol::{ToolDefinition, ToolResult};

fn geo_point_schema(what: &str) -> Value {
    json!({
        "type": "object",
        "description": format!("Position of the {}", what),
        "properties": {
            "lat": {"type": "number", "minimum": -90, "maximum": 90},
            "lng": {"type": "number", "minimum": -180, "maximum": 180},
            "alt": {"type": "number", "description": "Meters, 0 if not specified"}
        },
        "required": ["lat", "lng"]
    })
}

pub(super) fn definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition {
            name: "get_markers",
            description: "get list of object markers in the environment from all robots inspection",
            input_schema: json!({"type": "object", "properties": {}}),
        },
        ToolDefinition {
            name: "request_mission_plan",
            description: "Send a structured inspection brief to the platform planner, which returns a mission plan",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "chat_id": {"type": "string"},
                    "target_elements": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "properties": {
                                "name": {"type": "string"},
                                "type": {"type": "string", "description": "e.g. wind turbine, solar panel"},
                                "group_name": {"type": "string"},
                                "position": geo_point_schema("element"),
                                "characteristics": {"type": "string"},
                                "metadata": {"type": "string"}
                            },
                            "required": ["name", "type", "group_name", "position"]
                        }
                    },
                    "group_information": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "properties": {
                                "elements_name": {"type": "string"},
                                "group_name": {"type": "string"},
                                "shared_characteristics": {"type": "string"}
                            },
                            "required": ["elements_name", "group_name", "shared_characteristics"]
                        }
                    },
                    "points_of_interest": {"type": "array", "items": {"type": "object"}},
                    "drone_information": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "properties": {
                                "name": {"type": "string", "description": "Device identifier, e.g. px4_3"},
                                "type": {"type": "string", "description": "Device category, e.g. px4_sitl"},
                                "location": geo_point_schema("device"),
                                "capabilities": {"type": "object", "description": "Free-form capabilities"}
                            },
                            "required": ["name", "type", "location"]
                        }
                    },
                    "mission_requirements": {
                        "type": "object",
                        "properties": {
                            "mission_type": {"type": "string"},
                            "mission_details": {"type": "string"}
                        },
                        "required": ["mission_type", "mission_details"]
                    },
                    "user_context": {
                        "type": "object",
                        "properties": {
                            "user_request": {"type": "string"},
                            "additional_info": {"type": "string"}
                        },
                        "required": ["user_request", "additional_info"]
                    }
                },
                "required": [
                    "chat_id", "target_elements", "group_information", "points_of_interest",
                    "drone_information", "mission_requirements", "user_context"
                ]
            }),
        },
    ]
}

pub(super) async fn get_markers(ctx: &ToolContext) -> Result<ToolResult, GatewayError> {
    let markers = ctx.client.get("/planning/getMarkers", &[]).await?;
    let count = markers.as_array().map(Vec::len).unwrap_or(0);
    Ok(ToolResult::text(format!(
        "Found {} data(s):\n\n{}",
        count,
        ctx.render(&markers)?
    )))
}

pub(super) async fn request_mission_plan(
    ctx: &ToolContext,
    args: Value,
) -> Result<ToolResult, GatewayError> {
    let request: MissionPlanningRequest = parse_validated(args)?;
    tracing::info!(
        chat_id = %request.chat_id,
        targets = request.target_elements.len(),
        drones = request.drone_information.len(),
        "requesting mission plan"
    );
    let plan = ctx.client.post("/planning/missionRequest", &request).await?;
    ctx.render_result(&plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::{context_for, offline_context};
    use axum::routing::{get, post};
    use axum::{Json, Router};

    fn brief() -> Value {
        json!({
            "chat_id": "chat-1",
            "target_elements": [{"name": "turbine_1", "type": "wind turbine", "group_name": "row A", "position": {"lat": 47.39, "lng": 8.54, "alt": 0}}],
            "group_information": [],
            "points_of_interest": [],
            "drone_information": [{"name": "px4_1", "type": "px4_sitl", "location": {"lat": 47.38, "lng": 8.53}, "capabilities": {"lidar": true}}],
            "mission_requirements": {"mission_type": "fast", "mission_details": "one pass"},
            "user_context": {"user_request": "inspect row A", "additional_info": ""}
        })
    }

    #[tokio::test]
    async fn forwards_brief_with_capabilities() {
        let app = Router::new().route(
            "/api/planning/missionRequest",
            post(|Json(body): Json<Value>| async move {
                Json(json!({"accepted": body["drone_information"][0]["capabilities"]["lidar"]}))
            }),
        );
        let ctx = context_for(app).await;
        let result = request_mission_plan(&ctx, brief()).await.unwrap();
        assert!(result.first_text().contains("\"accepted\": true"));
    }

    #[tokio::test]
    async fn out_of_range_target_is_rejected_locally() {
        let mut doc = brief();
        doc["target_elements"][0]["position"]["lat"] = json!(95.0);
        let err = request_mission_plan(&offline_context(), doc).await.unwrap_err();
        assert!(err.to_string().contains("target_elements[0].position.lat"));
    }

    #[tokio::test]
    async fn markers_are_counted() {
        let app = Router::new().route(
            "/api/planning/getMarkers",
            get(|| async { Json(json!([{"id": "m1"}, {"id": "m2"}])) }),
        );
        let ctx = context_for(app).await;
        let result = get_markers(&ctx).await.unwrap();
        assert!(result.first_text().starts_with("Found 2 data(s):"));
    }
}
