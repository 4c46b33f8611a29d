//! Position primitives for the two coordinate frames a mission can use.
//!
//! Local positions are ENU meters relative to a mission origin
//! (x = East, y = North, z = Up). Global positions are WGS84 degrees with
//! altitude in meters above ground. Both accept either the positional array
//! encoding (`[x, y, z]` / `[lat, lng, alt]`) or the keyed object encoding.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{field_path, FieldIssue, Validate};

/// Coordinate frame a mission's waypoints are expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoordinateFrame {
    /// Meters relative to `origin_global`.
    Local,
    /// Latitude/longitude degrees.
    Global,
}

/// A position type usable as a waypoint location.
pub trait FramePosition: Validate + Serialize + DeserializeOwned + Clone + PartialEq {
    const FRAME: CoordinateFrame;

    /// Positional array encoding used on the wire for waypoints.
    fn to_array(&self) -> [f64; 3];
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LocalRepr {
    Array([f64; 3]),
    Object { x: f64, y: f64, z: f64 },
}

impl From<LocalRepr> for LocalPosition {
    fn from(repr: LocalRepr) -> Self {
        match repr {
            LocalRepr::Array([x, y, z]) => LocalPosition { x, y, z },
            LocalRepr::Object { x, y, z } => LocalPosition { x, y, z },
        }
    }
}

/// Local position in meters (x = East, y = North, z = Up).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "LocalRepr")]
pub struct LocalPosition {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl LocalPosition {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

impl Validate for LocalPosition {
    fn collect_issues(&self, path: &str, issues: &mut Vec<FieldIssue>) {
        if !(self.z >= 0.0) {
            issues.push(FieldIssue::new(
                field_path(path, "z"),
                "Altitude must be non-negative",
            ));
        }
    }
}

impl FramePosition for LocalPosition {
    const FRAME: CoordinateFrame = CoordinateFrame::Local;

    fn to_array(&self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum GlobalRepr {
    Array([f64; 3]),
    Object { lat: f64, lng: f64, alt: f64 },
}

impl From<GlobalRepr> for GlobalPosition {
    fn from(repr: GlobalRepr) -> Self {
        match repr {
            GlobalRepr::Array([lat, lng, alt]) => GlobalPosition { lat, lng, alt },
            GlobalRepr::Object { lat, lng, alt } => GlobalPosition { lat, lng, alt },
        }
    }
}

/// Geographic position: degrees plus altitude in meters above ground.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "GlobalRepr")]
pub struct GlobalPosition {
    pub lat: f64,
    pub lng: f64,
    pub alt: f64,
}

impl GlobalPosition {
    pub fn new(lat: f64, lng: f64, alt: f64) -> Self {
        Self { lat, lng, alt }
    }
}

impl Validate for GlobalPosition {
    fn collect_issues(&self, path: &str, issues: &mut Vec<FieldIssue>) {
        check_lat_lng(path, self.lat, self.lng, issues);
        if !(self.alt >= 0.0) {
            issues.push(FieldIssue::new(
                field_path(path, "alt"),
                "Altitude must be non-negative",
            ));
        }
    }
}

impl FramePosition for GlobalPosition {
    const FRAME: CoordinateFrame = CoordinateFrame::Global;

    fn to_array(&self) -> [f64; 3] {
        [self.lat, self.lng, self.alt]
    }
}

/// Geographic anchor of a local-coordinate mission.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OriginGlobal {
    pub lat: f64,
    pub lng: f64,
    pub alt: f64,
}

impl OriginGlobal {
    /// Convert a local ENU offset into a global position.
    ///
    /// Uses latitude-aware meters-per-degree scaling at the origin, which is
    /// accurate to well under a meter over the few-kilometer extent of a
    /// mission. Altitude stays height above ground.
    pub fn to_global(&self, local: &LocalPosition) -> GlobalPosition {
        GlobalPosition {
            lat: self.lat + meters_to_lat(local.y, self.lat),
            lng: self.lng + meters_to_lon(local.x, self.lat),
            alt: local.z,
        }
    }

    /// Inverse of [`OriginGlobal::to_global`].
    pub fn to_local(&self, global: &GlobalPosition) -> LocalPosition {
        LocalPosition {
            x: (global.lng - self.lng) * meters_per_deg_lon(self.lat),
            y: (global.lat - self.lat) * meters_per_deg_lat(self.lat),
            z: global.alt,
        }
    }
}

impl Validate for OriginGlobal {
    fn collect_issues(&self, path: &str, issues: &mut Vec<FieldIssue>) {
        check_lat_lng(path, self.lat, self.lng, issues);
    }
}

pub(crate) fn check_lat_lng(path: &str, lat: f64, lng: f64, issues: &mut Vec<FieldIssue>) {
    if !(-90.0..=90.0).contains(&lat) {
        issues.push(FieldIssue::new(
            field_path(path, "lat"),
            "Latitude must be between -90 and 90",
        ));
    }
    if !(-180.0..=180.0).contains(&lng) {
        issues.push(FieldIssue::new(
            field_path(path, "lng"),
            "Longitude must be between -180 and 180",
        ));
    }
}

/// Meters per degree of latitude at a given latitude (WGS84 approximation).
pub fn meters_per_deg_lat(lat_deg: f64) -> f64 {
    let lat_rad = lat_deg.to_radians();
    111_132.954 - 559.822 * (2.0 * lat_rad).cos() + 1.175 * (4.0 * lat_rad).cos()
        - 0.0023 * (6.0 * lat_rad).cos()
}

/// Meters per degree of longitude at a given latitude (WGS84 approximation).
pub fn meters_per_deg_lon(lat_deg: f64) -> f64 {
    let lat_rad = lat_deg.to_radians();
    111_412.84 * lat_rad.cos() - 93.5 * (3.0 * lat_rad).cos() + 0.118 * (5.0 * lat_rad).cos()
}

fn meters_to_lat(meters: f64, ref_lat_deg: f64) -> f64 {
    meters / meters_per_deg_lat(ref_lat_deg).max(1e-9)
}

fn meters_to_lon(meters: f64, ref_lat_deg: f64) -> f64 {
    meters / meters_per_deg_lon(ref_lat_deg).max(1e-9)
}
