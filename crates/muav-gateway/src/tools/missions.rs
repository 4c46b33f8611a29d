//! Mission storage and collision validation.

use muav_core::{
    parse_validated, CollisionRequest, CollisionResolutionResult, LocalMission,
    MissionValidationResult, Obstacle, UncoveredTarget,
};
use serde::Deserialize;
use serde_json::{json, Value};

use super::{parse_args, ToolContext};
use crate::error::GatewayError;
use crate::protocol::{ToolDefinition, ToolResult};

pub(super) fn definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition {
            name: "get_missions",
            description: "get list of missions registered in the platform",
            input_schema: json!({"type": "object", "properties": {}}),
        },
        ToolDefinition {
            name: "create_mission",
            description: "Create a mission in the platform. Waypoints use local XYZ meters relative to origin_global; every route and waypoint is validated before submission",
            input_schema: local_mission_schema(),
        },
        ToolDefinition {
            name: "validate_mission_collisions",
            description: "Validate a local-coordinate mission against obstacles. collision_objects must contain both the obstacles to avoid and every inspection target referenced by a waypoint target_id",
            input_schema: collision_request_schema(),
        },
        ToolDefinition {
            name: "resolve_mission_collisions",
            description: "Ask the platform to add detours around collisions in a local-coordinate mission and return the modified mission with its new validation",
            input_schema: collision_request_schema(),
        },
    ]
}

pub(crate) fn position_xyz_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "x": {"type": "number", "description": "East offset in meters"},
            "y": {"type": "number", "description": "North offset in meters"},
            "z": {"type": "number", "minimum": 0, "description": "Height above origin in meters"}
        },
        "required": ["x", "y", "z"]
    })
}

fn route_schema(pos_description: &str, require_type: bool) -> Value {
    let mut wp_required = vec!["pos"];
    if require_type {
        wp_required.push("type");
    }
    json!({
        "type": "object",
        "properties": {
            "name": {"type": "string"},
            "uav": {"type": "string", "description": "Device identifier, e.g. px4_1"},
            "id": {"type": "integer", "minimum": 0, "description": "Route id, starting from 0"},
            "uav_type": {"type": "string", "description": "Device category, e.g. px4_sitl"},
            "attributes": {
                "type": "object",
                "properties": {
                    "max_vel": {"type": "number"},
                    "idle_vel": {"type": "number"},
                    "mode_yaw": {"type": "integer", "minimum": 0, "maximum": 3},
                    "mode_gimbal": {"type": "integer", "minimum": 0, "maximum": 2},
                    "mode_trace": {"type": "integer", "minimum": 0, "maximum": 2},
                    "mode_landing": {"type": "integer", "minimum": 0, "maximum": 2}
                },
                "required": ["max_vel", "idle_vel", "mode_yaw", "mode_gimbal", "mode_trace", "mode_landing"]
            },
            "wp": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "type": {"type": "string", "enum": ["inspection", "transit", "takeoff", "landing"]},
                        "target_id": {"type": "string", "description": "Required for inspection waypoints"},
                        "notes": {"type": "string"},
                        "pos": {"type": "array", "items": {"type": "number"}, "minItems": 3, "maxItems": 3, "description": pos_description},
                        "yaw": {"type": "number", "minimum": -180, "maximum": 180},
                        "speed": {"type": "number"},
                        "gimbal": {"type": "number"},
                        "action": {"type": "object", "description": "Action name to parameters, passed through unchanged"}
                    },
                    "required": wp_required
                }
            }
        },
        "required": ["name", "uav", "id", "attributes", "uav_type", "wp"]
    })
}

pub(crate) fn local_route_schema() -> Value {
    route_schema("[x, y, z] in meters relative to origin_global", true)
}

pub(crate) fn global_route_schema() -> Value {
    route_schema("[lat, lng, alt] in degrees and meters above ground", false)
}

fn local_mission_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "version": {"type": "string", "default": "3"},
            "name": {"type": "string"},
            "description": {"type": "string"},
            "chat_id": {"type": "string"},
            "origin_global": {
                "type": "object",
                "properties": {
                    "lat": {"type": "number", "minimum": -90, "maximum": 90},
                    "lng": {"type": "number", "minimum": -180, "maximum": 180},
                    "alt": {"type": "number"}
                },
                "required": ["lat", "lng", "alt"]
            },
            "route": {"type": "array", "items": local_route_schema()}
        },
        "required": ["origin_global", "route"]
    })
}

fn collision_request_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "mission": local_mission_schema(),
            "collision_objects": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "name": {"type": "string"},
                        "type": {"type": "string", "description": "e.g. windTurbine, building, powerLine"},
                        "position": position_xyz_schema(),
                        "zones": {
                            "type": "object",
                            "properties": {
                                "exclusion_zone": {"type": "string"},
                                "caution_zone": {"type": "string"},
                                "safe_zone": {"type": "string"}
                            },
                            "required": ["exclusion_zone", "caution_zone", "safe_zone"]
                        },
                        "safe_passages": {"type": "array", "items": {"type": "string"}},
                        "aabb": {
                            "type": "object",
                            "properties": {
                                "min_point": position_xyz_schema(),
                                "max_point": position_xyz_schema()
                            },
                            "required": ["min_point", "max_point"]
                        },
                        "metadata": {"type": "string"}
                    },
                    "required": ["name", "type", "position", "zones", "safe_passages", "aabb"]
                }
            }
        },
        "required": ["mission", "collision_objects"]
    })
}

pub(super) async fn get_missions(ctx: &ToolContext) -> Result<ToolResult, GatewayError> {
    let missions = ctx.client.get("/missions", &[]).await?;
    ctx.render_result(&missions)
}

pub(super) async fn create_mission(ctx: &ToolContext, args: Value) -> Result<ToolResult, GatewayError> {
    let mission: LocalMission = parse_validated(args)?;
    tracing::info!(
        name = %mission.name,
        routes = mission.route.len(),
        "submitting mission"
    );
    let result = ctx.client.post("/missions/create", &mission).await?;
    ctx.render_result(&result)
}

#[derive(Debug, Deserialize)]
struct CollisionArgs {
    mission: Value,
    collision_objects: Vec<Value>,
}

/// Decode and validate `{mission, collision_objects}`, reporting every issue at once.
fn assemble_request(ctx: &ToolContext, tool: &str, args: Value) -> Result<(CollisionRequest, Vec<UncoveredTarget>), GatewayError> {
    let raw: CollisionArgs = parse_args(tool, args)?;
    let mission: LocalMission = serde_json::from_value(raw.mission)
        .map_err(|err| GatewayError::invalid_arguments(tool, format!("mission: {}", err)))?;
    let objects = raw
        .collision_objects
        .into_iter()
        .enumerate()
        .map(|(idx, obj)| {
            serde_json::from_value::<Obstacle>(obj).map_err(|err| {
                GatewayError::invalid_arguments(tool, format!("collision_objects[{}]: {}", idx, err))
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let assembled = CollisionRequest::assemble(mission, objects, ctx.coverage)?;
    if !assembled.uncovered_targets.is_empty() {
        let ids: Vec<&str> = assembled
            .uncovered_targets
            .iter()
            .map(|t| t.target_id.as_str())
            .collect();
        tracing::warn!(
            tool,
            targets = ?ids,
            "inspection targets missing from collision_objects"
        );
    }
    Ok((assembled.request, assembled.uncovered_targets))
}

fn coverage_note(uncovered: &[UncoveredTarget]) -> String {
    if uncovered.is_empty() {
        return String::new();
    }
    let listed = uncovered
        .iter()
        .map(|t| format!("{} ({})", t.target_id, t.path))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "\n\nNote: inspection targets without a matching collision object were not checked: {}",
        listed
    )
}

pub(super) async fn validate_mission_collisions(
    ctx: &ToolContext,
    args: Value,
) -> Result<ToolResult, GatewayError> {
    let (request, uncovered) = assemble_request(ctx, "validate_mission_collisions", args)?;
    let response = ctx.client.post("/missions/validate", &request).await?;

    let text = match MissionValidationResult::from_response(&response) {
        Ok(result) => format!(
            "{}{}\n\nDetails:\n{}",
            result.render(),
            coverage_note(&uncovered),
            ctx.render(&serde_json::to_value(&result)?)?
        ),
        Err(err) => {
            tracing::warn!(error = %err, "validation result not in the expected shape");
            format!("{}{}", ctx.render(&response)?, coverage_note(&uncovered))
        }
    };
    Ok(ToolResult::text(text))
}

pub(super) async fn resolve_mission_collisions(
    ctx: &ToolContext,
    args: Value,
) -> Result<ToolResult, GatewayError> {
    let (request, uncovered) = assemble_request(ctx, "resolve_mission_collisions", args)?;
    let response = ctx.client.post("/missions/resolve", &request).await?;

    let text = match serde_json::from_value::<CollisionResolutionResult>(response.clone()) {
        Ok(result) => format!(
            "{}{}\n\nResolved mission:\n{}",
            result.render(),
            coverage_note(&uncovered),
            ctx.render(&result.mission)?
        ),
        Err(err) => {
            tracing::warn!(error = %err, "resolution result not in the expected shape");
            format!("{}{}", ctx.render(&response)?, coverage_note(&uncovered))
        }
    };
    Ok(ToolResult::text(text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::{context_for, offline_context};
    use axum::routing::post;
    use axum::{Json, Router};
    use muav_core::TargetCoverage;

    fn mission(target: &str) -> Value {
        json!({
            "name": "turbine sweep",
            "origin_global": {"lat": 47.3978, "lng": 8.5461, "alt": 0},
            "route": [{
                "name": "r0", "uav": "px4_1", "id": 0, "uav_type": "px4_sitl",
                "attributes": {"max_vel": 12, "idle_vel": 3, "mode_yaw": 2, "mode_gimbal": 0, "mode_trace": 0, "mode_landing": 2},
                "wp": [
                    {"type": "takeoff", "pos": [0, 0, 5]},
                    {"type": "inspection", "target_id": target, "pos": [200, 100, 5]}
                ]
            }]
        })
    }

    fn turbine() -> Value {
        json!({
            "name": "turbine_1", "type": "windTurbine",
            "position": {"x": 100, "y": 50, "z": 0},
            "zones": {"exclusion_zone": "cylinder: radius=15m", "caution_zone": "cylinder: radius=25m", "safe_zone": "beyond 30m"},
            "safe_passages": [],
            "aabb": {"min_point": {"x": 85, "y": 35, "z": 0}, "max_point": {"x": 115, "y": 65, "z": 120}}
        })
    }

    fn platform_result() -> Value {
        json!({
            "valid": false, "totalCollisions": 1, "totalWarnings": 0,
            "routes": [{
                "routeId": 0, "routeName": "r0", "uav": "px4_1", "valid": false,
                "collisions": [{
                    "hasCollision": true, "obstacleName": "turbine_1", "obstacleType": "windTurbine",
                    "zoneType": "exclusion", "segmentIndex": 0,
                    "collisionPoint": {"x": 100, "y": 50, "z": 5}, "penetrationDepth": 15
                }],
                "warnings": [],
                "summary": {"totalWaypoints": 2, "totalSegments": 1, "collisionCount": 1, "warningCount": 0}
            }],
            "report": "segment 0 crosses turbine_1"
        })
    }

    #[tokio::test]
    async fn invalid_mission_never_reaches_the_platform() {
        let mut doc = mission("turbine_1");
        doc["route"][0]["wp"][1]["pos"] = json!([200, 100, -2]);
        let err = create_mission(&offline_context(), doc).await.unwrap_err();
        match err {
            GatewayError::Validation(v) => assert!(v.has_issue_at("route[0].wp[1].pos.z")),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn create_mission_posts_validated_document() {
        let app = Router::new().route(
            "/api/missions/create",
            post(|Json(body): Json<Value>| async move { Json(json!({"id": 12, "name": body["name"]})) }),
        );
        let ctx = context_for(app).await;
        let result = create_mission(&ctx, mission("turbine_1")).await.unwrap();
        assert!(result.first_text().contains("\"id\": 12"));
        assert!(result.first_text().contains("turbine sweep"));
    }

    #[tokio::test]
    async fn collision_validation_renders_platform_result() {
        let app = Router::new().route(
            "/api/missions/validate",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body["collision_objects"][0]["name"], "turbine_1");
                assert_eq!(body["mission"]["route"][0]["wp"][0]["pos"], json!([0.0, 0.0, 5.0]));
                Json(platform_result())
            }),
        );
        let ctx = context_for(app).await;
        let args = json!({"mission": mission("turbine_1"), "collision_objects": [turbine()]});
        let result = validate_mission_collisions(&ctx, args).await.unwrap();
        let text = result.first_text();
        assert!(text.starts_with("Mission validation: FAILED"));
        assert!(text.contains("[collision] exclusion zone of turbine_1"));
        assert!(text.contains("2 waypoints, 1 segments"));
        assert!(!text.contains("Note:"));
    }

    #[tokio::test]
    async fn wrapped_result_is_accepted() {
        let app = Router::new().route(
            "/api/missions/validate",
            post(|| async { Json(json!({"validation": platform_result()})) }),
        );
        let ctx = context_for(app).await;
        let args = json!({"mission": mission("turbine_1"), "collision_objects": [turbine()]});
        let result = validate_mission_collisions(&ctx, args).await.unwrap();
        assert!(result.first_text().contains("Collisions: 1, Warnings: 0"));
    }

    #[tokio::test]
    async fn uncovered_target_is_noted_in_advisory_mode() {
        let app = Router::new().route(
            "/api/missions/validate",
            post(|| async {
                Json(json!({"valid": true, "totalCollisions": 0, "totalWarnings": 0, "routes": []}))
            }),
        );
        let ctx = context_for(app).await;
        let args = json!({"mission": mission("turbine_9"), "collision_objects": [turbine()]});
        let result = validate_mission_collisions(&ctx, args).await.unwrap();
        assert!(result
            .first_text()
            .contains("turbine_9 (route[0].wp[1].target_id)"));
    }

    #[tokio::test]
    async fn strict_mode_rejects_uncovered_target() {
        let mut ctx = offline_context();
        ctx.coverage = TargetCoverage::Strict;
        let args = json!({"mission": mission("turbine_9"), "collision_objects": [turbine()]});
        let err = validate_mission_collisions(&ctx, args).await.unwrap_err();
        match err {
            GatewayError::Validation(v) => {
                assert!(v.has_issue_at("mission.route[0].wp[1].target_id"))
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_collision_objects_is_rejected() {
        let args = json!({"mission": mission("turbine_1")});
        let err = validate_mission_collisions(&offline_context(), args)
            .await
            .unwrap_err();
        match err {
            GatewayError::InvalidArguments { message, .. } => {
                assert!(message.contains("collision_objects"), "{message}")
            }
            other => panic!("expected invalid arguments, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn malformed_object_names_its_index() {
        let mut bad = turbine();
        bad.as_object_mut().unwrap().remove("aabb");
        let args = json!({"mission": mission("turbine_1"), "collision_objects": [turbine(), bad]});
        let err = validate_mission_collisions(&offline_context(), args)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("collision_objects[1]"));
    }

    #[tokio::test]
    async fn resolution_renders_detours_and_mission() {
        let app = Router::new().route(
            "/api/missions/resolve",
            post(|Json(body): Json<Value>| async move {
                let mut validation = platform_result();
                validation["valid"] = json!(true);
                validation["totalCollisions"] = json!(0);
                validation["routes"] = json!([]);
                Json(json!({
                    "modified": true,
                    "detoursApplied": 1,
                    "mission": body["mission"],
                    "validation": validation
                }))
            }),
        );
        let ctx = context_for(app).await;
        let args = json!({"mission": mission("turbine_1"), "collision_objects": [turbine()]});
        let result = resolve_mission_collisions(&ctx, args).await.unwrap();
        let text = result.first_text();
        assert!(text.starts_with("Mission modified: 1 detour(s) applied"));
        assert!(text.contains("Mission validation: PASSED"));
        assert!(text.contains("Resolved mission:"));
    }
}
