//! MUAV CLI - offline tooling for the multi-UAV fleet platform.
//!
//! Binaries:
//! - mission_check: validate a mission file, convert it to global
//!   coordinates, or submit it for collision validation

pub mod check;
pub mod summary;

pub use check::{load_collision_objects, load_mission, FrameArg, MissionCheck};
pub use summary::summarize;
