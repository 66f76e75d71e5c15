//! Random scatter placement.
//!
//! Each marker, in order, gets up to `max_placement_attempts` uniform samples
//! inside the padded bounds. The first sample at least `min_distance` away from
//! every marker placed so far wins. If none qualifies, the last sample is kept
//! and the marker is recorded in `Placement::fallbacks`.

use rand::Rng;

use crate::error::LayoutError;
use crate::layout::spatial_grid::SpatialGrid;
use crate::layout::{Bounds, LayoutConfig, MarkerId, Placement, SizeF};
use super::PlacementStrategy;

/// Scatter placement driven by an owned RNG.
pub struct Scatter<R: Rng> {
    pub rng: R,
}

impl<R: Rng> Scatter<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> PlacementStrategy for Scatter<R> {
    fn place(&mut self, count: usize, container: SizeF, cfg: &LayoutConfig) -> Result<Placement, LayoutError> {
        scatter(&mut self.rng, count, container, cfg)
    }
}

pub fn scatter<R: Rng + ?Sized>(
    rng: &mut R,
    count: usize,
    container: SizeF,
    cfg: &LayoutConfig,
) -> Result<Placement, LayoutError> {
    container.require_laid_out()?;

    let bounds = Bounds::for_container(container, cfg);
    let min_distance = cfg.min_distance();
    let attempts = cfg.max_placement_attempts.max(1);

    let mut grid = SpatialGrid::new(min_distance);
    let mut placement = Placement::with_capacity(count);

    for i in 0..count {
        let id = MarkerId(i);
        let mut candidate = bounds.sample(rng);
        let mut accepted = !grid.any_within(&candidate, min_distance);

        for _ in 1..attempts {
            if accepted {
                break;
            }
            candidate = bounds.sample(rng);
            accepted = !grid.any_within(&candidate, min_distance);
        }

        if !accepted {
            placement.fallbacks.push(id);
        }
        grid.insert(id, candidate);
        placement.set(id, candidate);
    }

    if !placement.fallbacks.is_empty() {
        log::debug!(
            "scatter: {} of {} markers placed with overlap after {} attempts",
            placement.fallbacks.len(),
            count,
            attempts
        );
    }

    Ok(placement)
}
