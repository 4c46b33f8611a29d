//! Routes: the ordered flight path of a single craft.

use serde::{Deserialize, Serialize};

use crate::error::{field_path, FieldIssue, Validate};
use crate::geometry::FramePosition;
use crate::waypoint::Waypoint;

/// Flight attributes and modes for a route.
///
/// Mode values are small enumerations owned by the receiving platform; only
/// their numeric range is checked here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteAttributes {
    /// Maximum velocity in m/s.
    pub max_vel: f64,
    /// Idle velocity in m/s.
    pub idle_vel: f64,
    /// 0 auto, 1 lock, 2 RC control, 3 waypoint yaw heading.
    pub mode_yaw: i64,
    pub mode_gimbal: i64,
    pub mode_trace: i64,
    pub mode_landing: i64,
}

impl Default for RouteAttributes {
    fn default() -> Self {
        Self {
            max_vel: 12.0,
            idle_vel: 3.0,
            mode_yaw: 2,
            mode_gimbal: 0,
            mode_trace: 0,
            mode_landing: 2,
        }
    }
}

impl Validate for RouteAttributes {
    fn collect_issues(&self, path: &str, issues: &mut Vec<FieldIssue>) {
        let modes = [
            ("mode_yaw", self.mode_yaw, 3),
            ("mode_gimbal", self.mode_gimbal, 2),
            ("mode_trace", self.mode_trace, 2),
            ("mode_landing", self.mode_landing, 2),
        ];
        for (name, value, max) in modes {
            if !(0..=max).contains(&value) {
                issues.push(FieldIssue::new(
                    field_path(path, name),
                    format!("{} must be between 0 and {}", name, max),
                ));
            }
        }
    }
}

/// An ordered sequence of waypoints flown by one craft.
///
/// Waypoint order is flight order and is never changed by this crate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(serialize = "P: FramePosition", deserialize = "P: FramePosition"))]
pub struct Route<P> {
    pub name: String,
    /// Craft identifier, e.g. `px4_3`.
    pub uav: String,
    /// Route-local id; callers number routes from 0.
    pub id: i64,
    pub attributes: RouteAttributes,
    /// Craft type, e.g. `px4_ros2`.
    pub uav_type: String,
    pub wp: Vec<Waypoint<P>>,
}

impl<P: FramePosition> Route<P> {
    pub fn waypoint_count(&self) -> usize {
        self.wp.len()
    }

    /// Number of straight segments between consecutive waypoints.
    pub fn segment_count(&self) -> usize {
        self.wp.len().saturating_sub(1)
    }

    /// Consecutive waypoint pairs, indexed by segment.
    pub fn segments(&self) -> impl Iterator<Item = (usize, &Waypoint<P>, &Waypoint<P>)> {
        self.wp
            .windows(2)
            .enumerate()
            .map(|(idx, pair)| (idx, &pair[0], &pair[1]))
    }

    pub fn map_pos<Q: FramePosition>(&self, f: impl Fn(&P) -> Q) -> Route<Q> {
        Route {
            name: self.name.clone(),
            uav: self.uav.clone(),
            id: self.id,
            attributes: self.attributes.clone(),
            uav_type: self.uav_type.clone(),
            wp: self.wp.iter().map(|wp| wp.map_pos(&f)).collect(),
        }
    }
}

impl<P: FramePosition> Validate for Route<P> {
    fn collect_issues(&self, path: &str, issues: &mut Vec<FieldIssue>) {
        // Duplicate or out-of-order ids are left to the platform.
        if self.id < 0 {
            issues.push(FieldIssue::new(
                field_path(path, "id"),
                "Route id must be a non-negative integer",
            ));
        }
        if self.uav.trim().is_empty() {
            issues.push(FieldIssue::new(field_path(path, "uav"), "UAV identifier is required"));
        }
        self.attributes
            .collect_issues(&field_path(path, "attributes"), issues);
        self.wp.collect_issues(&field_path(path, "wp"), issues);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::LocalPosition;
    use crate::waypoint::WaypointKind;

    fn route(wp: Vec<Waypoint<LocalPosition>>) -> Route<LocalPosition> {
        Route {
            name: "survey".into(),
            uav: "px4_1".into(),
            id: 0,
            attributes: RouteAttributes::default(),
            uav_type: "px4_sitl".into(),
            wp,
        }
    }

    fn transit(x: f64, y: f64, z: f64) -> Waypoint<LocalPosition> {
        Waypoint::at(LocalPosition::new(x, y, z)).with_kind(WaypointKind::Transit)
    }

    #[test]
    fn segments_follow_waypoint_order() {
        let r = route(vec![transit(0.0, 0.0, 5.0), transit(10.0, 0.0, 5.0), transit(10.0, 10.0, 5.0)]);
        assert_eq!(r.segment_count(), 2);
        let starts: Vec<f64> = r.segments().map(|(_, a, _)| a.pos.x).collect();
        assert_eq!(starts, vec![0.0, 10.0]);
    }

    #[test]
    fn empty_route_has_no_segments() {
        let r = route(Vec::new());
        assert_eq!(r.segment_count(), 0);
        assert!(r.validate().is_ok());
    }

    #[test]
    fn negative_id_is_rejected() {
        let mut r = route(vec![transit(0.0, 0.0, 5.0)]);
        r.id = -1;
        assert!(r.validate().unwrap_err().has_issue_at("id"));
    }

    #[test]
    fn duplicate_ids_are_not_enforced_per_route() {
        let r = route(vec![transit(0.0, 0.0, 5.0)]);
        assert!(r.validate().is_ok());
    }

    #[test]
    fn mode_out_of_range_is_reported_with_path() {
        let mut r = route(vec![transit(0.0, 0.0, 5.0)]);
        r.attributes.mode_yaw = 4;
        r.attributes.mode_landing = -1;
        let err = r.validate().unwrap_err();
        assert!(err.has_issue_at("attributes.mode_yaw"));
        assert!(err.has_issue_at("attributes.mode_landing"));
    }

    #[test]
    fn waypoint_issues_are_indexed() {
        let r = route(vec![transit(0.0, 0.0, 5.0), transit(0.0, 0.0, -1.0)]);
        assert!(r.validate().unwrap_err().has_issue_at("wp[1].pos.z"));
    }

    #[test]
    fn blank_uav_is_rejected() {
        let mut r = route(vec![transit(0.0, 0.0, 5.0)]);
        r.uav = " ".into();
        assert!(r.validate().unwrap_err().has_issue_at("uav"));
    }
}
