// Collision resolution while dragging.
//
// The dragged marker is authoritative. Every other marker closer than
// `min_distance` is pushed straight away from it by the overlap amount, then
// clamped back into the container. Coincident markers have no direction to be
// pushed in and are left alone. Pushed markers are not re-checked against
// each other.

use serde::Serialize;

use super::{Bounds, MarkerId, Placement, PointF};

/// One displacement applied by collision resolution.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct Push {
    pub marker: MarkerId,
    pub from: PointF,
    pub to: PointF,
}

/// Push every marker overlapping `active` out of its way.
/// Returns the pushes in marker order. `active` itself never moves.
pub fn resolve_collisions(
    active: MarkerId,
    placement: &mut Placement,
    bounds: &Bounds,
    min_distance: f64,
) -> Vec<Push> {
    let Some(anchor) = placement.get(active) else {
        return Vec::new();
    };

    let mut pushes = Vec::new();
    for id in placement.ids() {
        if id == active {
            continue;
        }
        let Some(from) = placement.get(id) else { continue };

        let distance = anchor.distance(&from);
        if distance > 0.0 && distance < min_distance {
            let overlap = min_distance - distance;
            let angle = anchor.angle_to(&from);
            let to = bounds.clamp(from.offset_polar(angle, overlap));
            placement.set(id, to);
            pushes.push(Push { marker: id, from, to });
        }
    }
    pushes
}
