//! Human-readable mission listing.

use muav_core::{FramePosition, MissionDocument, Route};
use std::fmt::Write as _;

pub fn summarize(document: &MissionDocument) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Mission \"{}\" ({:?} frame)",
        document.name(),
        document.frame()
    );
    match document {
        MissionDocument::Local(mission) => {
            let o = mission.origin_global;
            let _ = writeln!(out, "Origin: {:.6}, {:.6}, {:.1}m", o.lat, o.lng, o.alt);
            for route in &mission.route {
                write_route(&mut out, route);
            }
        }
        MissionDocument::Global(mission) => {
            for route in &mission.route {
                write_route(&mut out, route);
            }
        }
    }
    out
}

fn write_route<P: FramePosition>(out: &mut String, route: &Route<P>) {
    let _ = writeln!(
        out,
        "Route {} \"{}\" ({}, {}): {} waypoints, {} segments",
        route.id,
        route.name,
        route.uav,
        route.uav_type,
        route.waypoint_count(),
        route.segment_count()
    );
    for (idx, wp) in route.wp.iter().enumerate() {
        let [a, b, c] = wp.pos.to_array();
        let kind = wp.kind.map(|k| k.as_str()).unwrap_or("-");
        let _ = write!(out, "  [{}] {:<10} ({}, {}, {})", idx, kind, a, b, c);
        if let Some(target) = wp.inspection_target() {
            let _ = write!(out, " target={}", target);
        }
        out.push('\n');
    }
}
