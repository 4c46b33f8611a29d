//! Core model for the multi-UAV mission gateway.
//!
//! Missions, routes, waypoints and obstacles, the validation rules applied
//! to them before anything leaves the process, and the collision-validation
//! contract shared with the platform.

pub mod collision;
pub mod error;
pub mod geometry;
pub mod mission;
pub mod obstacle;
pub mod planning;
pub mod route;
pub mod waypoint;

pub use collision::{
    AssembledRequest, CollisionRequest, CollisionResolutionResult, CollisionResult,
    MissionValidationResult, RouteSummary, RouteValidationResult, TargetCoverage,
    UncoveredTarget, ZoneType,
};
pub use error::{parse_validated, FieldIssue, Validate, ValidationError};
pub use geometry::{CoordinateFrame, FramePosition, GlobalPosition, LocalPosition, OriginGlobal};
pub use mission::{GlobalMission, LocalMission, MissionDocument, RouteShape, DEFAULT_MISSION_VERSION};
pub use obstacle::{Aabb, Obstacle, ObstacleZones};
pub use planning::MissionPlanningRequest;
pub use route::{Route, RouteAttributes};
pub use waypoint::{ActionMap, Waypoint, WaypointKind};
