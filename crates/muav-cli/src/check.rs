//! Loading and checking mission files.

use anyhow::{bail, Context, Result};
use clap::ValueEnum;
use muav_core::{
    AssembledRequest, CollisionRequest, GlobalMission, LocalMission, MissionDocument, Obstacle,
    TargetCoverage, Validate, ValidationError,
};
use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Coordinate frame a mission file is expected to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum FrameArg {
    /// Meters relative to `origin_global`; `origin_global` is required.
    #[default]
    Local,
    /// Latitude/longitude degrees; `origin_global` must be absent.
    Global,
    /// Local if the file carries `origin_global`, global otherwise.
    Auto,
}

/// A mission file that parsed and passed every structural check.
#[derive(Debug, Clone)]
pub struct MissionCheck {
    pub document: MissionDocument,
}

impl MissionCheck {
    /// Convert to the geographic frame. Global missions are returned unchanged.
    pub fn to_global(&self) -> MissionDocument {
        match &self.document {
            MissionDocument::Local(mission) => MissionDocument::Global(mission.to_global()),
            MissionDocument::Global(_) => self.document.clone(),
        }
    }

    /// Build a collision-validation request from this mission.
    ///
    /// Only local-coordinate missions can be checked for collisions.
    pub fn collision_request(
        &self,
        objects: Vec<Obstacle>,
        coverage: TargetCoverage,
    ) -> Result<AssembledRequest> {
        let MissionDocument::Local(mission) = &self.document else {
            bail!("collision validation needs a local-coordinate mission (with origin_global)");
        };
        CollisionRequest::assemble(mission.clone(), objects, coverage)
            .map_err(|err| anyhow::anyhow!(describe(&err)))
    }
}

fn read_json(path: &Path) -> Result<Value> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("{} is not valid JSON", path.display()))
}

/// Read and validate a mission file in the given frame.
pub fn load_mission(path: &Path, frame: FrameArg) -> Result<MissionCheck> {
    let value = read_json(path)?;
    check_mission(value, frame)
}

pub fn check_mission(value: Value, frame: FrameArg) -> Result<MissionCheck> {
    let has_origin = value
        .get("origin_global")
        .map(|origin| !origin.is_null())
        .unwrap_or(false);
    let document = match frame {
        FrameArg::Local => MissionDocument::Local(
            serde_json::from_value::<LocalMission>(value)
                .context("mission does not match the local mission schema")?,
        ),
        FrameArg::Global => {
            if has_origin {
                bail!("origin_global is only allowed on local-coordinate missions (use --frame local)");
            }
            MissionDocument::Global(
                serde_json::from_value::<GlobalMission>(value)
                    .context("mission does not match the global mission schema")?,
            )
        }
        FrameArg::Auto => serde_json::from_value(value)
            .context("mission does not match the mission schema")?,
    };
    debug!(frame = ?document.frame(), routes = document.route_shapes().len(), "mission decoded");
    document
        .validate()
        .map_err(|err| anyhow::anyhow!(describe(&err)))?;
    Ok(MissionCheck { document })
}

/// Read a JSON array of collision objects.
pub fn load_collision_objects(path: &Path) -> Result<Vec<Obstacle>> {
    let value = read_json(path)?;
    serde_json::from_value(value)
        .with_context(|| format!("{} is not a list of collision objects", path.display()))
}

/// One line per offending field.
pub fn describe(err: &ValidationError) -> String {
    match err {
        ValidationError::Invalid(issues) => {
            let mut out = format!("{} validation issue(s):", issues.len());
            for issue in issues {
                out.push_str("\n  ");
                out.push_str(&issue.to_string());
            }
            out
        }
        other => other.to_string(),
    }
}
