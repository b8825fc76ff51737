//! Room extents and the world↔grid mapping derived from them.

use crate::error::NavigationError;

use super::GridPoint;

/// Positions this far past the far edge (as a fraction of one cell) still snap
/// to the last cell instead of being rejected.
const FAR_EDGE_TOLERANCE: f32 = 1e-3;

/// Bounding rectangle of a room scan in the world x–z plane.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoomExtents {
    /// Minimum world x (meters).
    pub min_x: f32,
    /// Maximum world x (meters).
    pub max_x: f32,
    /// Minimum world z (meters).
    pub min_z: f32,
    /// Maximum world z (meters).
    pub max_z: f32,
}

impl RoomExtents {
    /// Creates extents from the four bounds.
    pub const fn new(min_x: f32, max_x: f32, min_z: f32, max_z: f32) -> Self {
        Self {
            min_x,
            max_x,
            min_z,
            max_z,
        }
    }

    /// Room size along x.
    pub fn width(&self) -> f32 {
        self.max_x - self.min_x
    }

    /// Room size along z.
    pub fn depth(&self) -> f32 {
        self.max_z - self.min_z
    }

    /// Grows the extents to cover the given x–z rectangle.
    pub fn include(&mut self, min_x: f32, max_x: f32, min_z: f32, max_z: f32) {
        self.min_x = self.min_x.min(min_x);
        self.max_x = self.max_x.max(max_x);
        self.min_z = self.min_z.min(min_z);
        self.max_z = self.max_z.max(max_z);
    }

    /// True when the room has no area (nothing observed, or a flat strip).
    pub fn is_degenerate(&self) -> bool {
        let (w, d) = (self.width(), self.depth());
        !(w.is_finite() && d.is_finite() && w > 0.0 && d > 0.0)
    }
}

/// World placement of a grid: the world position of the grid's minimum corner
/// and the size of one cell along each axis.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridGeometry {
    /// World x of the minimum corner of cell (0, 0).
    pub origin_x: f32,
    /// World z of the minimum corner of cell (0, 0).
    pub origin_z: f32,
    /// Cell size along world x (meters).
    pub cell_size_x: f32,
    /// Cell size along world z (meters).
    pub cell_size_z: f32,
}

impl Default for GridGeometry {
    fn default() -> Self {
        Self::uniform(0.0, 0.0, 1.0)
    }
}

impl GridGeometry {
    /// Geometry with square cells.
    pub const fn uniform(origin_x: f32, origin_z: f32, cell_size: f32) -> Self {
        Self {
            origin_x,
            origin_z,
            cell_size_x: cell_size,
            cell_size_z: cell_size,
        }
    }

    /// Divides the room into `width × height` cells.
    ///
    /// Cell size follows from the measured room, not the other way round. A
    /// degenerate room yields zero-sized cells instead of dividing by zero.
    pub fn from_extents(extents: &RoomExtents, width: usize, height: usize) -> Self {
        if extents.is_degenerate() || width == 0 || height == 0 {
            return Self {
                origin_x: finite_or_zero(extents.min_x),
                origin_z: finite_or_zero(extents.min_z),
                cell_size_x: 0.0,
                cell_size_z: 0.0,
            };
        }
        Self {
            origin_x: extents.min_x,
            origin_z: extents.min_z,
            cell_size_x: extents.width() / width as f32,
            cell_size_z: extents.depth() / height as f32,
        }
    }

    /// True if either cell dimension is zero.
    pub fn is_degenerate(&self) -> bool {
        !(self.cell_size_x > 0.0 && self.cell_size_z > 0.0)
    }

    /// Maps a world x–z position to the cell containing it in a grid of
    /// `width × height` cells.
    pub fn world_to_cell(
        &self,
        x: f32,
        z: f32,
        width: usize,
        height: usize,
    ) -> Result<GridPoint, NavigationError> {
        let gx = axis_index(x - self.origin_x, self.cell_size_x, width)?;
        let gy = axis_index(z - self.origin_z, self.cell_size_z, height)?;
        Ok(GridPoint::new(gx, gy))
    }

    /// World x–z position of the center of `cell`.
    pub fn cell_center(&self, cell: GridPoint) -> (f32, f32) {
        (
            self.origin_x + (cell.x as f32 + 0.5) * self.cell_size_x,
            self.origin_z + (cell.y as f32 + 0.5) * self.cell_size_z,
        )
    }
}

/// Index of the cell covering `rel` (distance from the origin) along one axis.
///
/// Cell `i` covers `(i * cell, (i + 1) * cell]`; anything at or before the
/// origin snaps to 0.
fn axis_index(rel: f32, cell: f32, cells: usize) -> Result<usize, NavigationError> {
    if !rel.is_finite() {
        return Err(NavigationError::InvalidWorldCoordinates(
            "World coordinate is not finite",
        ));
    }
    if cell <= 0.0 || rel <= 0.0 {
        return Ok(0);
    }
    let span = cells as f32 * cell;
    if rel > span + FAR_EDGE_TOLERANCE * cell {
        return Err(NavigationError::InvalidWorldCoordinates(
            "World coordinates outside room extents",
        ));
    }
    let index = ((rel / cell).ceil() as usize).saturating_sub(1);
    Ok(index.min(cells.saturating_sub(1)))
}

fn finite_or_zero(v: f32) -> f32 {
    if v.is_finite() { v } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_extents_cell_size() {
        let extents = RoomExtents::new(-1.0, 4.0, 0.0, 2.0);
        let geometry = GridGeometry::from_extents(&extents, 50, 40);
        assert!((geometry.cell_size_x - 0.1).abs() < 1e-6);
        assert!((geometry.cell_size_z - 0.05).abs() < 1e-6);
        assert_eq!(geometry.origin_x, -1.0);
        assert_eq!(geometry.origin_z, 0.0);
    }

    #[test]
    fn test_degenerate_extents_have_zero_cells() {
        let geometry = GridGeometry::from_extents(&RoomExtents::default(), 50, 50);
        assert!(geometry.is_degenerate());
        assert_eq!(geometry.cell_size_x, 0.0);
        assert_eq!(geometry.world_to_cell(3.0, -2.0, 50, 50), Ok(GridPoint::new(0, 0)));
    }

    #[test]
    fn test_boundary_snap_to_zero() {
        let geometry = GridGeometry::uniform(0.0, 0.0, 0.5);
        assert_eq!(geometry.world_to_cell(0.0, 0.0, 4, 4), Ok(GridPoint::new(0, 0)));
        assert_eq!(geometry.world_to_cell(-0.3, -9.0, 4, 4), Ok(GridPoint::new(0, 0)));
    }

    #[test]
    fn test_upper_cell_boundary_belongs_to_lower_cell() {
        let geometry = GridGeometry::uniform(0.0, 0.0, 0.5);
        assert_eq!(geometry.world_to_cell(0.5, 1.0, 4, 4), Ok(GridPoint::new(0, 1)));
        assert_eq!(geometry.world_to_cell(0.51, 1.01, 4, 4), Ok(GridPoint::new(1, 2)));
    }

    #[test]
    fn test_far_edge() {
        let geometry = GridGeometry::uniform(0.0, 0.0, 0.5);
        assert_eq!(geometry.world_to_cell(2.0, 2.0, 4, 4), Ok(GridPoint::new(3, 3)));
        assert!(matches!(
            geometry.world_to_cell(2.6, 1.0, 4, 4),
            Err(NavigationError::InvalidWorldCoordinates(_))
        ));
    }

    #[test]
    fn test_center_round_trip() {
        let geometry = GridGeometry::from_extents(&RoomExtents::new(-2.3, 3.1, 0.7, 5.9), 50, 50);
        for x in 0..50 {
            for y in 0..50 {
                let cell = GridPoint::new(x, y);
                let (wx, wz) = geometry.cell_center(cell);
                assert_eq!(geometry.world_to_cell(wx, wz, 50, 50), Ok(cell));
            }
        }
    }
}
