//! Circular ("orbit") layout.
//!
//! Marker `i` of `n` sits on a circle centred in the container, at angle
//! `2*pi*i/n + phase`. The circle's radius is `orbit_ratio * min(w, h)`.
//! With `phase = 0` this is the reset layout; auto-rotate advances the phase
//! with wall-clock time. Positions depend only on index, count, container and
//! phase, never on previous state.

use crate::error::LayoutError;
use crate::layout::{slot_angle, Bounds, LayoutConfig, MarkerId, Placement, PointF, SizeF};
use super::PlacementStrategy;

/// Orbit placement at a fixed phase.
#[derive(Debug, Clone, Copy, Default)]
pub struct Orbit {
    pub phase: f64,
}

impl PlacementStrategy for Orbit {
    fn place(&mut self, count: usize, container: SizeF, cfg: &LayoutConfig) -> Result<Placement, LayoutError> {
        orbit(count, container, cfg, self.phase)
    }
}

/// Origin of marker `index` of `count`, clamped to the container bounds.
pub fn orbit_position(index: usize, count: usize, container: SizeF, cfg: &LayoutConfig, phase: f64) -> PointF {
    let bounds = Bounds::for_container(container, cfg);
    let orbit_radius = container.w.min(container.h) * cfg.orbit_ratio;
    let center = container
        .center()
        .offset_polar(slot_angle(index, count) + phase, orbit_radius);
    bounds.clamp(PointF::new(center.x - cfg.radius, center.y - cfg.radius))
}

pub fn orbit(count: usize, container: SizeF, cfg: &LayoutConfig, phase: f64) -> Result<Placement, LayoutError> {
    container.require_laid_out()?;

    let mut placement = Placement::with_capacity(count);
    for i in 0..count {
        placement.set(MarkerId(i), orbit_position(i, count, container, cfg, phase));
    }
    Ok(placement)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> LayoutConfig {
        LayoutConfig { radius: 20.0, margin: 5.0, horizontal_padding: 0.0, ..LayoutConfig::default() }
    }

    fn approx(a: PointF, b: PointF) -> bool {
        (a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9
    }

    #[test]
    fn test_four_markers_on_axes() {
        // 400x300 container, orbit radius 75, center (200, 150)
        let p = orbit(4, SizeF::new(400.0, 300.0), &cfg(), 0.0).unwrap();
        assert!(approx(p.get(MarkerId(0)).unwrap(), PointF::new(255.0, 130.0)));
        assert!(approx(p.get(MarkerId(1)).unwrap(), PointF::new(180.0, 205.0)));
        assert!(approx(p.get(MarkerId(2)).unwrap(), PointF::new(105.0, 130.0)));
        assert!(approx(p.get(MarkerId(3)).unwrap(), PointF::new(180.0, 55.0)));
    }

    #[test]
    fn test_phase_rotates_slots() {
        let container = SizeF::new(400.0, 300.0);
        let quarter = std::f64::consts::FRAC_PI_2;
        // Slot 0 advanced by a quarter turn lands on slot 1
        let rotated = orbit_position(0, 4, container, &cfg(), quarter);
        assert!(approx(rotated, orbit_position(1, 4, container, &cfg(), 0.0)));
    }

    #[test]
    fn test_clamped_into_small_container() {
        let cfg = LayoutConfig { orbit_ratio: 0.5, ..cfg() };
        let container = SizeF::new(100.0, 60.0);
        let bounds = Bounds::for_container(container, &cfg);
        let p = orbit(6, container, &cfg, 0.3).unwrap();
        for (_, q) in p.iter() {
            assert!(bounds.contains(&q));
        }
    }

    #[test]
    fn test_not_ready() {
        assert!(Orbit::default().place(3, SizeF::new(0.0, 0.0), &cfg()).is_err());
    }
}
