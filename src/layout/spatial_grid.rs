// Spatial hash grid for proximity queries during placement.
//
// With the cell size set to the query distance, every point closer than that
// distance lives in the 3x3 block of cells around the query point, so a check
// touches a handful of markers instead of all of them.

use super::{MarkerId, PointF};
use std::collections::HashMap;

/// A spatial hash grid of marker origins.
#[derive(Debug, Clone)]
pub struct SpatialGrid {
    /// Size of each cell in the grid.
    cell_size: f64,
    /// Map from cell coordinates to the markers whose origin falls in that cell.
    cells: HashMap<(i64, i64), Vec<(MarkerId, PointF)>>,
}

impl SpatialGrid {
    /// Create a new spatial grid with the given cell size.
    /// Cell size should be the largest distance that will be queried.
    pub fn new(cell_size: f64) -> Self {
        Self {
            cell_size: if cell_size > 0.0 { cell_size } else { 1.0 },
            cells: HashMap::new(),
        }
    }

    fn cell_of(&self, p: &PointF) -> (i64, i64) {
        (
            (p.x / self.cell_size).floor() as i64,
            (p.y / self.cell_size).floor() as i64,
        )
    }

    pub fn insert(&mut self, id: MarkerId, p: PointF) {
        let cell = self.cell_of(&p);
        self.cells.entry(cell).or_default().push((id, p));
    }

    /// Markers in the 3x3 block of cells around `p`.
    /// May include markers farther than one cell; callers do the exact check.
    pub fn query(&self, p: &PointF) -> Vec<(MarkerId, PointF)> {
        let (cx, cy) = self.cell_of(p);
        let mut result = Vec::new();
        for dx in -1..=1 {
            for dy in -1..=1 {
                if let Some(items) = self.cells.get(&(cx + dx, cy + dy)) {
                    result.extend_from_slice(items);
                }
            }
        }
        result
    }

    /// True if any inserted marker is strictly closer than `distance` to `p`.
    /// `distance` must not exceed the cell size.
    pub fn any_within(&self, p: &PointF, distance: f64) -> bool {
        self.query(p).iter().any(|(_, q)| p.distance(q) < distance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_query() {
        let mut grid = SpatialGrid::new(45.0);
        grid.insert(MarkerId(0), PointF::new(10.0, 10.0));
        grid.insert(MarkerId(1), PointF::new(300.0, 300.0));

        let nearby = grid.query(&PointF::new(30.0, 30.0));
        assert_eq!(nearby.len(), 1);
        assert_eq!(nearby[0].0, MarkerId(0));
    }

    #[test]
    fn test_any_within_across_cell_edge() {
        let mut grid = SpatialGrid::new(45.0);
        // Neighbouring cells, 10px apart
        grid.insert(MarkerId(0), PointF::new(44.0, 44.0));
        assert!(grid.any_within(&PointF::new(50.0, 50.0), 45.0));
        assert!(!grid.any_within(&PointF::new(100.0, 100.0), 45.0));
    }

    #[test]
    fn test_exact_distance_is_not_within() {
        let mut grid = SpatialGrid::new(45.0);
        grid.insert(MarkerId(0), PointF::new(0.0, 0.0));
        assert!(!grid.any_within(&PointF::new(45.0, 0.0), 45.0));
    }
}
