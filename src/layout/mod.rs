// Sphere layout geometry.
//
// All positions are container-local pixel coordinates of a marker's top-left
// origin. Every marker shares one radius, so the distance between two origins
// equals the distance between their centers.
//
// Submodules:
// - spatial_grid: cell hash for "is anything closer than d" queries
// - algorithms: scatter (random initial placement) and orbit (circular layout)
// - collision: asymmetric push resolution while dragging

use std::collections::HashMap;
use std::f64::consts::PI;
use std::ops::{Add, Sub};

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, LayoutError};

pub mod algorithms;
pub mod collision;
pub mod spatial_grid;

pub use algorithms::{orbit, orbit_position, scatter, Orbit, PlacementStrategy, Scatter};
pub use collision::{resolve_collisions, Push};

/// Index of a marker in render order.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MarkerId(pub usize);

#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PointF {
    pub x: f64,
    pub y: f64,
}

impl PointF {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &PointF) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// Angle of the vector from `self` to `other`, in radians.
    pub fn angle_to(&self, other: &PointF) -> f64 {
        (other.y - self.y).atan2(other.x - self.x)
    }

    pub fn offset_polar(&self, angle: f64, length: f64) -> PointF {
        PointF {
            x: self.x + angle.cos() * length,
            y: self.y + angle.sin() * length,
        }
    }

    /// Linear interpolation; `t = 1.0` returns `target`.
    pub fn lerp(&self, target: &PointF, t: f64) -> PointF {
        PointF {
            x: self.x + (target.x - self.x) * t,
            y: self.y + (target.y - self.y) * t,
        }
    }
}

impl Add for PointF {
    type Output = PointF;
    fn add(self, rhs: PointF) -> PointF {
        PointF::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for PointF {
    type Output = PointF;
    fn sub(self, rhs: PointF) -> PointF {
        PointF::new(self.x - rhs.x, self.y - rhs.y)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SizeF {
    pub w: f64,
    pub h: f64,
}

impl SizeF {
    pub const fn new(w: f64, h: f64) -> Self {
        Self { w, h }
    }

    /// True until the container has been laid out by the browser. NaN and
    /// infinite sizes never count as laid out.
    pub fn is_empty(&self) -> bool {
        !(self.w.is_finite() && self.h.is_finite() && self.w > 0.0 && self.h > 0.0)
    }

    pub fn center(&self) -> PointF {
        PointF::new(self.w / 2.0, self.h / 2.0)
    }

    pub(crate) fn require_laid_out(&self) -> Result<(), LayoutError> {
        if self.is_empty() {
            return Err(LayoutError::ContainerNotReady { width: self.w, height: self.h });
        }
        Ok(())
    }
}

/// The range a marker origin may occupy inside a container.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl Bounds {
    /// `[pad, w - 2r - pad] x [0, h - 2r]`. A container too small for one
    /// marker collapses the range onto its lower edge.
    pub fn for_container(container: SizeF, cfg: &LayoutConfig) -> Self {
        let diameter = cfg.radius * 2.0;
        let min_x = cfg.horizontal_padding;
        let max_x = (container.w - diameter - cfg.horizontal_padding).max(min_x);
        let min_y = 0.0;
        let max_y = (container.h - diameter).max(min_y);
        Self { min_x, max_x, min_y, max_y }
    }

    pub fn clamp(&self, p: PointF) -> PointF {
        PointF {
            x: p.x.clamp(self.min_x, self.max_x),
            y: p.y.clamp(self.min_y, self.max_y),
        }
    }

    pub fn contains(&self, p: &PointF) -> bool {
        p.x >= self.min_x && p.x <= self.max_x && p.y >= self.min_y && p.y <= self.max_y
    }

    /// Uniform sample over the whole range.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> PointF {
        PointF {
            x: rng.gen_range(self.min_x..=self.max_x),
            y: rng.gen_range(self.min_y..=self.max_y),
        }
    }
}

/// Current position of every marker.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Placement {
    positions: HashMap<MarkerId, PointF>,
    /// Markers accepted after exhausting their attempts; they may overlap.
    pub fallbacks: Vec<MarkerId>,
}

impl Placement {
    pub fn with_capacity(n: usize) -> Self {
        Self {
            positions: HashMap::with_capacity(n),
            fallbacks: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn get(&self, id: MarkerId) -> Option<PointF> {
        self.positions.get(&id).copied()
    }

    pub fn set(&mut self, id: MarkerId, p: PointF) {
        self.positions.insert(id, p);
    }

    /// Marker ids in ascending order.
    pub fn ids(&self) -> Vec<MarkerId> {
        let mut ids: Vec<MarkerId> = self.positions.keys().copied().collect();
        ids.sort();
        ids
    }

    pub fn iter(&self) -> impl Iterator<Item = (MarkerId, PointF)> + '_ {
        self.positions.iter().map(|(&id, &p)| (id, p))
    }

    /// Move every marker back inside `bounds`.
    pub fn clamp_all(&mut self, bounds: &Bounds) {
        for p in self.positions.values_mut() {
            *p = bounds.clamp(*p);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Marker radius in px.
    pub radius: f64,
    /// Extra gap added to the diameter when testing overlap.
    pub margin: f64,
    /// Keeps markers off the left and right container edges.
    pub horizontal_padding: f64,
    /// Samples tried per marker before accepting an overlapping one.
    pub max_placement_attempts: u32,
    /// Pointer travel (px) after which a press becomes a drag.
    pub drag_threshold: f64,
    /// Fraction of the remaining distance covered per pointer move. 1.0 follows the pointer exactly.
    pub drag_follow: f64,
    /// Clicks arriving this soon after a drag ends are ignored.
    pub click_suppression_ms: f64,
    pub base_z_index: i32,
    pub drag_z_index: i32,
    /// Orbit radius as a fraction of the container's shorter side.
    pub orbit_ratio: f64,
    /// Auto-rotate angular speed in radians per millisecond.
    pub rotate_speed: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            radius: 30.0,
            margin: 10.0,
            horizontal_padding: 10.0,
            max_placement_attempts: 100,
            drag_threshold: 5.0,
            drag_follow: 1.0,
            click_suppression_ms: 150.0,
            base_z_index: 1,
            drag_z_index: 20,
            orbit_ratio: 0.25,
            rotate_speed: 0.001,
        }
    }
}

impl LayoutConfig {
    /// `2 * radius + margin`.
    pub fn min_distance(&self) -> f64 {
        self.radius * 2.0 + self.margin
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.radius > 0.0) {
            return Err(ConfigError::Invalid(format!("radius must be positive, got {}", self.radius)));
        }
        if self.margin < 0.0 || self.horizontal_padding < 0.0 || self.drag_threshold < 0.0 {
            return Err(ConfigError::Invalid("margin, horizontal_padding and drag_threshold must not be negative".into()));
        }
        if !(self.drag_follow > 0.0 && self.drag_follow <= 1.0) {
            return Err(ConfigError::Invalid(format!("drag_follow must be in (0, 1], got {}", self.drag_follow)));
        }
        if !(0.0..=0.5).contains(&self.orbit_ratio) {
            return Err(ConfigError::Invalid(format!("orbit_ratio must be in [0, 0.5], got {}", self.orbit_ratio)));
        }
        Ok(())
    }
}

/// Angle of slot `index` out of `count` evenly spaced slots.
pub(crate) fn slot_angle(index: usize, count: usize) -> f64 {
    if count == 0 {
        return 0.0;
    }
    (index as f64 / count as f64) * PI * 2.0
}
