//! Placement algorithms for review spheres.
//!
//! - `scatter`: randomized rejection sampling, used for the initial layout
//! - `orbit`: deterministic circular layout, used by reset and auto-rotate

use crate::error::LayoutError;
use super::{LayoutConfig, Placement, SizeF};

pub mod orbit;
pub mod scatter;

pub use orbit::{orbit, orbit_position, Orbit};
pub use scatter::{scatter, Scatter};

/// A way of assigning a position to each of `count` markers.
pub trait PlacementStrategy {
    fn place(&mut self, count: usize, container: SizeF, cfg: &LayoutConfig) -> Result<Placement, LayoutError>;
}
