//! Collision-validation contract.
//!
//! The geometric check runs on the platform behind `/missions/validate`.
//! This module shapes the request body, checks it fail-closed, and decodes
//! and renders the result the platform sends back.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::fmt::Write as _;

use crate::error::{field_path, FieldIssue, Validate, ValidationError};
use crate::geometry::LocalPosition;
use crate::mission::LocalMission;
use crate::obstacle::Obstacle;

/// Request body for `/missions/validate` and `/missions/resolve`.
///
/// `collision_objects` must hold both the obstacles to avoid and the
/// inspection targets; the platform cannot validate against what it is not sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollisionRequest {
    pub mission: LocalMission,
    pub collision_objects: Vec<Obstacle>,
}

impl Validate for CollisionRequest {
    fn collect_issues(&self, path: &str, issues: &mut Vec<FieldIssue>) {
        self.mission.collect_issues(&field_path(path, "mission"), issues);
        self.collision_objects
            .collect_issues(&field_path(path, "collision_objects"), issues);
    }
}

/// How strictly inspection targets must appear among the collision objects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TargetCoverage {
    /// Report uncovered targets to the caller but send the request anyway.
    #[default]
    Advisory,
    /// Reject the request if any inspection target is not a collision object.
    Strict,
}

/// An inspection `target_id` with no collision object of the same name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UncoveredTarget {
    pub path: String,
    pub target_id: String,
}

#[derive(Debug, Clone)]
pub struct AssembledRequest {
    pub request: CollisionRequest,
    /// Empty unless targets were missing under [`TargetCoverage::Advisory`].
    pub uncovered_targets: Vec<UncoveredTarget>,
}

impl CollisionRequest {
    /// Validate the mission and every object, then check target coverage.
    pub fn assemble(
        mission: LocalMission,
        collision_objects: Vec<Obstacle>,
        coverage: TargetCoverage,
    ) -> Result<AssembledRequest, ValidationError> {
        let request = CollisionRequest { mission, collision_objects };

        let mut issues = Vec::new();
        request.collect_issues("", &mut issues);

        let uncovered = request.uncovered_targets();
        if coverage == TargetCoverage::Strict {
            for target in &uncovered {
                issues.push(FieldIssue::new(
                    format!("mission.{}", target.path),
                    format!(
                        "inspection target '{}' has no matching entry in collision_objects",
                        target.target_id
                    ),
                ));
            }
        }

        if !issues.is_empty() {
            return Err(ValidationError::Invalid(issues));
        }

        Ok(AssembledRequest {
            request,
            uncovered_targets: uncovered,
        })
    }

    pub fn uncovered_targets(&self) -> Vec<UncoveredTarget> {
        let known: HashSet<&str> = self
            .collision_objects
            .iter()
            .map(|obj| obj.name.as_str())
            .collect();
        self.mission
            .inspection_targets()
            .into_iter()
            .filter(|(_, target)| !known.contains(target))
            .map(|(path, target)| UncoveredTarget {
                path,
                target_id: target.to_string(),
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZoneType {
    /// Intrusion is a hard violation.
    Exclusion,
    /// Intrusion is flagged but does not invalidate the route.
    Caution,
}

impl ZoneType {
    pub fn severity(&self) -> &'static str {
        match self {
            ZoneType::Exclusion => "collision",
            ZoneType::Caution => "warning",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollisionResult {
    pub has_collision: bool,
    pub obstacle_name: String,
    pub obstacle_type: String,
    pub zone_type: ZoneType,
    pub segment_index: usize,
    pub collision_point: LocalPosition,
    pub penetration_depth: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteSummary {
    pub total_waypoints: usize,
    pub total_segments: usize,
    pub collision_count: usize,
    pub warning_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteValidationResult {
    pub route_id: i64,
    pub route_name: String,
    pub uav: String,
    pub valid: bool,
    #[serde(default)]
    pub collisions: Vec<CollisionResult>,
    #[serde(default)]
    pub warnings: Vec<CollisionResult>,
    pub summary: RouteSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissionValidationResult {
    pub valid: bool,
    pub total_collisions: usize,
    pub total_warnings: usize,
    pub routes: Vec<RouteValidationResult>,
    #[serde(default)]
    pub report: String,
}

impl MissionValidationResult {
    /// Decode a platform response, accepting the result either at the top
    /// level or wrapped in a `validation` field.
    pub fn from_response(value: &Value) -> Result<Self, serde_json::Error> {
        match serde_json::from_value(value.clone()) {
            Ok(result) => Ok(result),
            Err(err) => match value.get("validation") {
                Some(inner) => serde_json::from_value(inner.clone()),
                None => Err(err),
            },
        }
    }

    /// Human-readable summary for display to an operator or agent.
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "Mission validation: {}",
            if self.valid { "PASSED" } else { "FAILED" }
        );
        let _ = writeln!(
            out,
            "Collisions: {}, Warnings: {}",
            self.total_collisions, self.total_warnings
        );
        for route in &self.routes {
            let _ = writeln!(
                out,
                "\nRoute {} \"{}\" ({}): {}",
                route.route_id,
                route.route_name,
                route.uav,
                if route.valid { "valid" } else { "INVALID" }
            );
            let _ = writeln!(
                out,
                "  {} waypoints, {} segments, {} collisions, {} warnings",
                route.summary.total_waypoints,
                route.summary.total_segments,
                route.summary.collision_count,
                route.summary.warning_count
            );
            for hit in route.collisions.iter().chain(route.warnings.iter()) {
                let _ = writeln!(out, "  {}", render_hit(hit));
            }
        }
        if !self.report.trim().is_empty() {
            let _ = write!(out, "\nReport:\n{}", self.report.trim_end());
        }
        out.trim_end().to_string()
    }
}

fn render_hit(hit: &CollisionResult) -> String {
    let p = &hit.collision_point;
    format!(
        "[{}] {} zone of {} ({}) on segment {} at ({:.1}, {:.1}, {:.1}), depth {:.2}m",
        hit.zone_type.severity(),
        match hit.zone_type {
            ZoneType::Exclusion => "exclusion",
            ZoneType::Caution => "caution",
        },
        hit.obstacle_name,
        hit.obstacle_type,
        hit.segment_index,
        p.x,
        p.y,
        p.z,
        hit.penetration_depth
    )
}

/// Result of `/missions/resolve`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollisionResolutionResult {
    pub modified: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detours_applied: Option<u32>,
    /// The (possibly rewritten) mission, passed through as sent by the platform.
    pub mission: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report: Option<String>,
    pub validation: MissionValidationResult,
}

impl CollisionResolutionResult {
    pub fn render(&self) -> String {
        let mut out = String::new();
        if self.modified {
            let _ = writeln!(
                out,
                "Mission modified: {} detour(s) applied",
                self.detours_applied.unwrap_or(0)
            );
        } else {
            let _ = writeln!(out, "Mission unchanged");
        }
        if let Some(message) = &self.message {
            let _ = writeln!(out, "{}", message);
        }
        if let Some(report) = &self.report {
            let _ = writeln!(out, "{}", report.trim_end());
        }
        out.push('\n');
        out.push_str(&self.validation.render());
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::OriginGlobal;
    use crate::obstacle::{Aabb, ObstacleZones};
    use crate::route::{Route, RouteAttributes};
    use crate::waypoint::{Waypoint, WaypointKind};
    use serde_json::json;

    fn obstacle(name: &str) -> Obstacle {
        Obstacle {
            name: name.to_string(),
            kind: "windTurbine".to_string(),
            position: LocalPosition::new(100.0, 50.0, 0.0),
            zones: ObstacleZones {
                exclusion_zone: "cylinder: radius=15m, height=120m".into(),
                caution_zone: "cylinder: radius=25m, height=130m".into(),
                safe_zone: "beyond 30m radius".into(),
            },
            safe_passages: Vec::new(),
            aabb: Aabb {
                min_point: LocalPosition::new(85.0, 35.0, 0.0),
                max_point: LocalPosition::new(115.0, 65.0, 120.0),
            },
            metadata: None,
        }
    }

    fn mission_inspecting(target: &str) -> LocalMission {
        LocalMission {
            version: "3".into(),
            name: "inspection".into(),
            description: None,
            chat_id: None,
            origin_global: OriginGlobal { lat: 47.3978, lng: 8.5461, alt: 0.0 },
            route: vec![Route {
                name: "r0".into(),
                uav: "px4_1".into(),
                id: 0,
                attributes: RouteAttributes::default(),
                uav_type: "px4_sitl".into(),
                wp: vec![
                    Waypoint::at(LocalPosition::new(0.0, 0.0, 5.0)).with_kind(WaypointKind::Takeoff),
                    Waypoint::at(LocalPosition::new(100.0, 80.0, 60.0))
                        .with_kind(WaypointKind::Inspection)
                        .with_target(target),
                ],
            }],
        }
    }

    #[test]
    fn advisory_coverage_reports_missing_targets() {
        let assembled = CollisionRequest::assemble(
            mission_inspecting("turbine_2"),
            vec![obstacle("turbine_1")],
            TargetCoverage::Advisory,
        )
        .unwrap();
        assert_eq!(
            assembled.uncovered_targets,
            vec![UncoveredTarget {
                path: "route[0].wp[1].target_id".into(),
                target_id: "turbine_2".into(),
            }]
        );
    }

    #[test]
    fn strict_coverage_rejects_missing_targets() {
        let err = CollisionRequest::assemble(
            mission_inspecting("turbine_2"),
            vec![obstacle("turbine_1")],
            TargetCoverage::Strict,
        )
        .unwrap_err();
        assert!(err.has_issue_at("mission.route[0].wp[1].target_id"));
    }

    #[test]
    fn covered_targets_pass_strict_mode() {
        let assembled = CollisionRequest::assemble(
            mission_inspecting("turbine_1"),
            vec![obstacle("turbine_1")],
            TargetCoverage::Strict,
        )
        .unwrap();
        assert!(assembled.uncovered_targets.is_empty());
        let body = serde_json::to_value(&assembled.request).unwrap();
        assert_eq!(body["collision_objects"][0]["name"], "turbine_1");
        assert!(body["mission"]["route"].is_array());
    }

    #[test]
    fn invalid_object_fails_the_whole_request() {
        let mut bad = obstacle("turbine_1");
        bad.position.z = -3.0;
        let err = CollisionRequest::assemble(
            mission_inspecting("turbine_1"),
            vec![obstacle("turbine_0"), bad],
            TargetCoverage::Advisory,
        )
        .unwrap_err();
        assert!(err.has_issue_at("collision_objects[1].position.z"));
    }

    #[test]
    fn decodes_platform_result_and_renders_it() {
        let value = json!({
            "valid": false,
            "totalCollisions": 1,
            "totalWarnings": 0,
            "routes": [{
                "routeId": 0,
                "routeName": "r0",
                "uav": "px4_1",
                "valid": false,
                "collisions": [{
                    "hasCollision": true,
                    "obstacleName": "turbine_1",
                    "obstacleType": "windTurbine",
                    "zoneType": "exclusion",
                    "segmentIndex": 0,
                    "collisionPoint": {"x": 100, "y": 50, "z": 5},
                    "penetrationDepth": 15.0
                }],
                "warnings": [],
                "summary": {"totalWaypoints": 2, "totalSegments": 1, "collisionCount": 1, "warningCount": 0}
            }],
            "report": "1 collision found"
        });
        let result = MissionValidationResult::from_response(&value).unwrap();
        let hit = &result.routes[0].collisions[0];
        assert_eq!(hit.zone_type, ZoneType::Exclusion);
        assert_eq!(hit.zone_type.severity(), "collision");
        assert_eq!(hit.segment_index, 0);

        let text = result.render();
        assert!(text.contains("Mission validation: FAILED"));
        assert!(text.contains("[collision] exclusion zone of turbine_1"));
        assert!(text.contains("on segment 0"));
        assert!(text.contains("Report:\n1 collision found"));
    }

    #[test]
    fn decodes_wrapped_result() {
        let value = json!({
            "validation": {"valid": true, "totalCollisions": 0, "totalWarnings": 0, "routes": []}
        });
        let result = MissionValidationResult::from_response(&value).unwrap();
        assert!(result.valid);
        assert!(result.render().starts_with("Mission validation: PASSED"));
    }

    #[test]
    fn caution_zone_is_a_warning() {
        assert_eq!(ZoneType::Caution.severity(), "warning");
        let zone: ZoneType = serde_json::from_value(json!("caution")).unwrap();
        assert_eq!(zone, ZoneType::Caution);
    }
}
