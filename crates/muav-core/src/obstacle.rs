//! Physical objects supplied with a collision-validation request.

use serde::{Deserialize, Serialize};

use crate::error::{field_path, FieldIssue, Validate};
use crate::geometry::LocalPosition;

/// Free-text zone descriptors, e.g. `"cylinder: radius=15m, height=120m"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObstacleZones {
    pub exclusion_zone: String,
    pub caution_zone: String,
    pub safe_zone: String,
}

/// Axis-aligned bounding box used for cheap rejection before exact checks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min_point: LocalPosition,
    pub max_point: LocalPosition,
}

impl Aabb {
    pub fn contains(&self, p: &LocalPosition) -> bool {
        (self.min_point.x..=self.max_point.x).contains(&p.x)
            && (self.min_point.y..=self.max_point.y).contains(&p.y)
            && (self.min_point.z..=self.max_point.z).contains(&p.z)
    }
}

impl Validate for Aabb {
    fn collect_issues(&self, path: &str, issues: &mut Vec<FieldIssue>) {
        self.min_point
            .collect_issues(&field_path(path, "min_point"), issues);
        self.max_point
            .collect_issues(&field_path(path, "max_point"), issues);

        let axes = [
            ("x", self.min_point.x, self.max_point.x),
            ("y", self.min_point.y, self.max_point.y),
            ("z", self.min_point.z, self.max_point.z),
        ];
        for (axis, min, max) in axes {
            if min > max {
                issues.push(FieldIssue::new(
                    field_path(path, "max_point"),
                    format!("max_point.{axis} ({max}) is below min_point.{axis} ({min})"),
                ));
            }
        }
    }
}

/// A named obstacle or inspection target in the mission's local frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    /// Identifier, e.g. `turbine_1`. Inspection waypoints reference this.
    pub name: String,
    /// Category, e.g. `windTurbine`, `building`, `powerLine`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Center position.
    pub position: LocalPosition,
    pub zones: ObstacleZones,
    pub safe_passages: Vec<String>,
    pub aabb: Aabb,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<String>,
}

impl Validate for Obstacle {
    fn collect_issues(&self, path: &str, issues: &mut Vec<FieldIssue>) {
        if self.name.trim().is_empty() {
            issues.push(FieldIssue::new(field_path(path, "name"), "Obstacle name is required"));
        }
        self.position
            .collect_issues(&field_path(path, "position"), issues);
        self.aabb.collect_issues(&field_path(path, "aabb"), issues);
    }
}
