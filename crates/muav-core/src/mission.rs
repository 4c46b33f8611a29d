//! Missions: the top-level unit submitted to the platform.
//!
//! Two shapes exist and are kept distinct because their consumers differ:
//! local-coordinate missions (meters, anchored by `origin_global`) go to the
//! collision validator and mission storage; geographic missions (lat/lng
//! degrees) go to the legacy load-mission command. [`MissionDocument`] is the
//! tagged union over both, discriminated by the presence of `origin_global`.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::{field_path, FieldIssue, Validate};
use crate::geometry::{CoordinateFrame, FramePosition, GlobalPosition, LocalPosition, OriginGlobal};
use crate::route::Route;

pub const DEFAULT_MISSION_VERSION: &str = "3";

fn default_version() -> String {
    DEFAULT_MISSION_VERSION.to_string()
}

/// Canonical mission: typed waypoints in local meters plus a global origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalMission {
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Conversation correlation id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chat_id: Option<String>,
    pub origin_global: OriginGlobal,
    pub route: Vec<Route<LocalPosition>>,
}

/// Legacy mission shape with waypoints in lat/lng degrees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalMission {
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chat_id: Option<String>,
    pub route: Vec<Route<GlobalPosition>>,
}

impl LocalMission {
    /// Convert every waypoint to global coordinates using `origin_global`.
    ///
    /// Route and waypoint order, ids and directives are preserved.
    pub fn to_global(&self) -> GlobalMission {
        let origin = self.origin_global;
        GlobalMission {
            version: self.version.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            chat_id: self.chat_id.clone(),
            route: self
                .route
                .iter()
                .map(|route| route.map_pos(|pos| origin.to_global(pos)))
                .collect(),
        }
    }

    /// Inspection targets referenced by any waypoint, with the path of the reference.
    pub fn inspection_targets(&self) -> Vec<(String, &str)> {
        let mut targets = Vec::new();
        for (r_idx, route) in self.route.iter().enumerate() {
            for (w_idx, wp) in route.wp.iter().enumerate() {
                if let Some(target) = wp.inspection_target() {
                    targets.push((format!("route[{}].wp[{}].target_id", r_idx, w_idx), target));
                }
            }
        }
        targets
    }
}

impl Validate for LocalMission {
    fn collect_issues(&self, path: &str, issues: &mut Vec<FieldIssue>) {
        self.origin_global
            .collect_issues(&field_path(path, "origin_global"), issues);
        self.route.collect_issues(&field_path(path, "route"), issues);
    }
}

impl Validate for GlobalMission {
    fn collect_issues(&self, path: &str, issues: &mut Vec<FieldIssue>) {
        self.route.collect_issues(&field_path(path, "route"), issues);
    }
}

/// Per-route waypoint and segment counts, computed locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteShape {
    pub route_id: i64,
    pub route_name: String,
    pub uav: String,
    pub total_waypoints: usize,
    pub total_segments: usize,
}

impl RouteShape {
    pub fn of<P: FramePosition>(route: &Route<P>) -> Self {
        Self {
            route_id: route.id,
            route_name: route.name.clone(),
            uav: route.uav.clone(),
            total_waypoints: route.waypoint_count(),
            total_segments: route.segment_count(),
        }
    }
}

/// Either mission shape, tagged by coordinate frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MissionDocument {
    Local(LocalMission),
    Global(GlobalMission),
}

impl MissionDocument {
    pub fn frame(&self) -> CoordinateFrame {
        match self {
            MissionDocument::Local(_) => CoordinateFrame::Local,
            MissionDocument::Global(_) => CoordinateFrame::Global,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            MissionDocument::Local(m) => &m.name,
            MissionDocument::Global(m) => &m.name,
        }
    }

    pub fn route_shapes(&self) -> Vec<RouteShape> {
        match self {
            MissionDocument::Local(m) => m.route.iter().map(RouteShape::of).collect(),
            MissionDocument::Global(m) => m.route.iter().map(RouteShape::of).collect(),
        }
    }

    /// Decide the frame from the document itself: an `origin_global` key
    /// marks a local-coordinate mission.
    pub fn frame_of(value: &Value) -> CoordinateFrame {
        match value.get("origin_global") {
            Some(origin) if !origin.is_null() => CoordinateFrame::Local,
            _ => CoordinateFrame::Global,
        }
    }
}

impl<'de> Deserialize<'de> for MissionDocument {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        let doc = match MissionDocument::frame_of(&value) {
            CoordinateFrame::Local => serde_json::from_value(value).map(MissionDocument::Local),
            CoordinateFrame::Global => serde_json::from_value(value).map(MissionDocument::Global),
        };
        doc.map_err(serde::de::Error::custom)
    }
}

impl Validate for MissionDocument {
    fn collect_issues(&self, path: &str, issues: &mut Vec<FieldIssue>) {
        match self {
            MissionDocument::Local(m) => m.collect_issues(path, issues),
            MissionDocument::Global(m) => m.collect_issues(path, issues),
        }
    }
}

impl From<LocalMission> for MissionDocument {
    fn from(mission: LocalMission) -> Self {
        MissionDocument::Local(mission)
    }
}

impl From<GlobalMission> for MissionDocument {
    fn from(mission: GlobalMission) -> Self {
        MissionDocument::Global(mission)
    }
}
