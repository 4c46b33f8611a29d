//! Waypoints: a position plus the flight directives applied when reaching it.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::{field_path, FieldIssue, Validate};
use crate::geometry::{CoordinateFrame, FramePosition};

/// Open extension point: action name to opaque parameters.
///
/// The vocabulary belongs to the receiving flight controller, so only the
/// shape "string key to any JSON value" is enforced here.
pub type ActionMap = Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WaypointKind {
    Inspection,
    Transit,
    Takeoff,
    Landing,
}

impl WaypointKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            WaypointKind::Inspection => "inspection",
            WaypointKind::Transit => "transit",
            WaypointKind::Takeoff => "takeoff",
            WaypointKind::Landing => "landing",
        }
    }
}

/// One point of a route. Owned by its route; identified by route + index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(serialize = "P: FramePosition", deserialize = "P: FramePosition"))]
pub struct Waypoint<P> {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<WaypointKind>,
    /// Identifier of the inspected element. Required for inspection waypoints.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(serialize_with = "serialize_pos", deserialize_with = "deserialize_pos")]
    pub pos: P,
    /// Degrees, 0 = North, 90 = East.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub yaw: Option<f64>,
    /// m/s
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,
    /// Gimbal pitch in degrees.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gimbal: Option<f64>,
    #[serde(default)]
    pub action: ActionMap,
}

fn serialize_pos<P: FramePosition, S: Serializer>(pos: &P, serializer: S) -> Result<S::Ok, S::Error> {
    pos.to_array().serialize(serializer)
}

fn deserialize_pos<'de, P: FramePosition, D: Deserializer<'de>>(deserializer: D) -> Result<P, D::Error> {
    P::deserialize(deserializer)
}

impl<P: FramePosition> Waypoint<P> {
    /// Plain waypoint at `pos` with no directives.
    pub fn at(pos: P) -> Self {
        Self {
            kind: None,
            target_id: None,
            notes: None,
            pos,
            yaw: None,
            speed: None,
            gimbal: None,
            action: ActionMap::new(),
        }
    }

    pub fn with_kind(mut self, kind: WaypointKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn with_target(mut self, target_id: impl Into<String>) -> Self {
        self.target_id = Some(target_id.into());
        self
    }

    pub fn with_yaw(mut self, yaw: f64) -> Self {
        self.yaw = Some(yaw);
        self
    }

    /// Target this waypoint inspects, if it is an inspection waypoint.
    pub fn inspection_target(&self) -> Option<&str> {
        match self.kind {
            Some(WaypointKind::Inspection) => self.target_id.as_deref().filter(|id| !id.trim().is_empty()),
            _ => None,
        }
    }

    /// Re-express the waypoint with a different position type, keeping every directive.
    pub fn map_pos<Q: FramePosition>(&self, f: impl FnOnce(&P) -> Q) -> Waypoint<Q> {
        Waypoint {
            kind: self.kind,
            target_id: self.target_id.clone(),
            notes: self.notes.clone(),
            pos: f(&self.pos),
            yaw: self.yaw,
            speed: self.speed,
            gimbal: self.gimbal,
            action: self.action.clone(),
        }
    }
}

impl<P: FramePosition> Validate for Waypoint<P> {
    fn collect_issues(&self, path: &str, issues: &mut Vec<FieldIssue>) {
        self.pos.collect_issues(&field_path(path, "pos"), issues);

        if let Some(yaw) = self.yaw {
            if !(-180.0..=180.0).contains(&yaw) {
                issues.push(FieldIssue::new(
                    field_path(path, "yaw"),
                    "Yaw must be between -180 and 180 degrees",
                ));
            }
        }

        match self.kind {
            Some(WaypointKind::Inspection) => {
                let has_target = self
                    .target_id
                    .as_deref()
                    .map(|id| !id.trim().is_empty())
                    .unwrap_or(false);
                if !has_target {
                    issues.push(FieldIssue::new(
                        field_path(path, "target_id"),
                        "target_id is required for inspection waypoints",
                    ));
                }
            }
            Some(_) => {}
            // Typed waypoints are mandatory in the local (canonical) schema only.
            None if P::FRAME == CoordinateFrame::Local => {
                issues.push(FieldIssue::new(
                    field_path(path, "type"),
                    "Waypoint type is required (inspection, transit, takeoff or landing)",
                ));
            }
            None => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{GlobalPosition, LocalPosition};
    use serde_json::json;

    #[test]
    fn blank_target_is_not_an_inspection_target() {
        let wp = Waypoint::at(LocalPosition::new(0.0, 0.0, 10.0))
            .with_kind(WaypointKind::Inspection)
            .with_target("  ");
        assert_eq!(wp.inspection_target(), None);
        assert!(wp.validate().unwrap_err().has_issue_at("target_id"));
    }

    #[test]
    fn inspection_without_target_is_rejected() {
        let wp = Waypoint::at(LocalPosition::new(0.0, 0.0, 10.0)).with_kind(WaypointKind::Inspection);
        let err = wp.validate().unwrap_err();
        assert!(err.has_issue_at("target_id"));
    }

    #[test]
    fn inspection_with_blank_target_is_rejected() {
        let wp = Waypoint::at(LocalPosition::new(0.0, 0.0, 10.0))
            .with_kind(WaypointKind::Inspection)
            .with_target("  ");
        assert!(wp.validate().unwrap_err().has_issue_at("target_id"));
    }

    #[test]
    fn transit_without_target_is_accepted() {
        let wp = Waypoint::at(LocalPosition::new(0.0, 0.0, 10.0)).with_kind(WaypointKind::Transit);
        assert!(wp.validate().is_ok());
    }

    #[test]
    fn local_waypoint_requires_kind_but_global_does_not() {
        let local = Waypoint::at(LocalPosition::new(0.0, 0.0, 10.0));
        assert!(local.validate().unwrap_err().has_issue_at("type"));

        let global = Waypoint::at(GlobalPosition::new(47.0, 8.0, 10.0));
        assert!(global.validate().is_ok());
    }

    #[test]
    fn yaw_outside_range_is_rejected() {
        let wp = Waypoint::at(GlobalPosition::new(47.0, 8.0, 10.0)).with_yaw(181.0);
        assert!(wp.validate().unwrap_err().has_issue_at("yaw"));
        let edge = Waypoint::at(GlobalPosition::new(47.0, 8.0, 10.0)).with_yaw(-180.0);
        assert!(edge.validate().is_ok());
    }

    #[test]
    fn missing_action_defaults_to_empty_map() {
        let wp: Waypoint<LocalPosition> =
            serde_json::from_value(json!({"type": "transit", "pos": [1.0, 2.0, 3.0]})).unwrap();
        assert!(wp.action.is_empty());
        assert_eq!(serde_json::to_value(&wp).unwrap()["action"], json!({}));
    }

    #[test]
    fn action_passes_through_unchanged() {
        let action = json!({"take_photo": {"count": 3}, "hover": 2.5, "custom": [1, "a", null]});
        let wp: Waypoint<LocalPosition> = serde_json::from_value(json!({
            "type": "inspection",
            "target_id": "turbine_1",
            "pos": {"x": 1.0, "y": 2.0, "z": 3.0},
            "action": action.clone()
        }))
        .unwrap();
        assert_eq!(Value::Object(wp.action.clone()), action);
        assert_eq!(serde_json::to_value(&wp).unwrap()["action"], action);
    }

    #[test]
    fn unknown_kind_fails_to_decode() {
        let result = serde_json::from_value::<Waypoint<LocalPosition>>(
            json!({"type": "hover", "pos": [0.0, 0.0, 1.0]}),
        );
        assert!(result.is_err());
    }

    #[test]
    fn position_is_written_as_array() {
        let wp = Waypoint::at(LocalPosition::new(10.0, 5.5, 15.0)).with_kind(WaypointKind::Transit);
        let value = serde_json::to_value(&wp).unwrap();
        assert_eq!(value["pos"], json!([10.0, 5.5, 15.0]));
        assert_eq!(value["type"], "transit");
    }
}
