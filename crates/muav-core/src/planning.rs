//! Mission-planning request: the structured brief handed to the platform planner.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{field_path, FieldIssue, Validate};
use crate::geometry::check_lat_lng;

/// Geographic point used by planning requests. Altitude defaults to 0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
    #[serde(default)]
    pub alt: f64,
}

impl Validate for GeoPoint {
    fn collect_issues(&self, path: &str, issues: &mut Vec<FieldIssue>) {
        check_lat_lng(path, self.lat, self.lng, issues);
    }
}

/// An element to inspect, e.g. one turbine of a wind farm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetElement {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub group_name: String,
    pub position: GeoPoint,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub characteristics: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupInformation {
    pub elements_name: String,
    pub group_name: String,
    pub shared_characteristics: String,
}

/// A craft available to the planner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DroneInformation {
    /// Device identifier, e.g. `px4_3`.
    pub name: String,
    /// Device category, e.g. `px4_sitl`.
    #[serde(rename = "type")]
    pub kind: String,
    pub location: GeoPoint,
    /// Open extension point; shape owned by the planner.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capabilities: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissionRequirements {
    pub mission_type: String,
    pub mission_details: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserContext {
    pub user_request: String,
    pub additional_info: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissionPlanningRequest {
    pub chat_id: String,
    pub target_elements: Vec<TargetElement>,
    pub group_information: Vec<GroupInformation>,
    /// Opaque POI objects supplied by the user.
    pub points_of_interest: Vec<Map<String, Value>>,
    pub drone_information: Vec<DroneInformation>,
    pub mission_requirements: MissionRequirements,
    pub user_context: UserContext,
}

impl Validate for MissionPlanningRequest {
    fn collect_issues(&self, path: &str, issues: &mut Vec<FieldIssue>) {
        for (idx, element) in self.target_elements.iter().enumerate() {
            let base = format!("{}[{}]", field_path(path, "target_elements"), idx);
            element
                .position
                .collect_issues(&field_path(&base, "position"), issues);
        }
        for (idx, drone) in self.drone_information.iter().enumerate() {
            let base = format!("{}[{}]", field_path(path, "drone_information"), idx);
            if drone.name.trim().is_empty() {
                issues.push(FieldIssue::new(field_path(&base, "name"), "Device name is required"));
            }
            drone
                .location
                .collect_issues(&field_path(&base, "location"), issues);
        }
    }
}
