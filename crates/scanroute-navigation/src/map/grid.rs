#![warn(missing_docs)]

use std::fmt;

use crate::error::NavigationError;

use super::{GridGeometry, GridPoint, OccupancyCell};

/// Neighbor offsets in enumeration order: the four axis-aligned steps
/// (left, right, up, down) followed by the four diagonals.
const NEIGHBOR_OFFSETS: [(isize, isize); 8] = [
    (-1, 0),
    (1, 0),
    (0, -1),
    (0, 1),
    (1, -1),
    (-1, -1),
    (-1, 1),
    (1, 1),
];

/// A dense, rectangular 2D occupancy grid.
///
/// Every coordinate in `[0, width) × [0, height)` maps to exactly one cell.
/// The grid carries the [`GridGeometry`] that places it in the world.
#[derive(Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OccupancyGrid {
    /// Width of the grid in cells
    width: usize,
    /// Height of the grid in cells
    height: usize,
    /// World placement and cell size
    geometry: GridGeometry,
    /// Row-major cell storage
    cells: Vec<OccupancyCell>,
}

impl OccupancyGrid {
    /// Creates an all-free grid with unit cells at the world origin.
    ///
    /// # Arguments
    /// * `width` - Width of the grid in cells
    /// * `height` - Height of the grid in cells
    ///
    /// # Returns
    /// * `Result<Self, NavigationError>` - The grid or an error if the dimensions are invalid
    pub fn new(width: usize, height: usize) -> Result<Self, NavigationError> {
        Self::with_geometry(width, height, GridGeometry::default())
    }

    /// Creates an all-free grid placed in the world by `geometry`.
    pub fn with_geometry(
        width: usize,
        height: usize,
        geometry: GridGeometry,
    ) -> Result<Self, NavigationError> {
        if width == 0 || height == 0 {
            return Err(NavigationError::InvalidDimensions(
                "Width and height must be non-zero",
            ));
        }
        let total = width
            .checked_mul(height)
            .ok_or(NavigationError::InvalidDimensions(
                "Map dimensions too large, would cause overflow",
            ))?;

        let mut cells = Vec::with_capacity(total);
        for y in 0..height {
            for x in 0..width {
                cells.push(OccupancyCell::new(GridPoint::new(x, y)));
            }
        }

        Ok(Self {
            width,
            height,
            geometry,
            cells,
        })
    }

    /// Width of the grid in cells.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height of the grid in cells.
    pub fn height(&self) -> usize {
        self.height
    }

    /// World placement of the grid.
    pub fn geometry(&self) -> &GridGeometry {
        &self.geometry
    }

    /// Returns true if `p` lies inside the grid.
    pub fn contains(&self, p: GridPoint) -> bool {
        p.x < self.width && p.y < self.height
    }

    fn index(&self, p: GridPoint) -> Result<usize, NavigationError> {
        if self.contains(p) {
            Ok(p.y * self.width + p.x)
        } else {
            Err(NavigationError::OutOfBounds {
                x: p.x,
                y: p.y,
                width: self.width,
                height: self.height,
            })
        }
    }

    /// Gets the cell at a grid coordinate.
    ///
    /// # Returns
    /// * `Result<&OccupancyCell, NavigationError>` - The cell, or `OutOfBounds`
    pub fn cell_at(&self, p: GridPoint) -> Result<&OccupancyCell, NavigationError> {
        let index = self.index(p)?;
        Ok(&self.cells[index])
    }

    /// Returns true if the cell at `p` is occupied.
    pub fn is_occupied(&self, p: GridPoint) -> Result<bool, NavigationError> {
        Ok(self.cell_at(p)?.occupied)
    }

    /// Marks the cell at `p` as occupied or free.
    pub fn set_occupied(&mut self, p: GridPoint, occupied: bool) -> Result<(), NavigationError> {
        let index = self.index(p)?;
        self.cells[index].occupied = occupied;
        Ok(())
    }

    /// Returns the traversable neighbors of `p`.
    ///
    /// Up to eight cells (axis-aligned first, then diagonals) that are inside
    /// the grid and not occupied. Cells on the last column or row have no
    /// neighbor past it.
    pub fn neighbors_of(&self, p: GridPoint) -> Result<Vec<&OccupancyCell>, NavigationError> {
        self.index(p)?;
        let neighbors = NEIGHBOR_OFFSETS
            .iter()
            .filter_map(|&(dx, dy)| p.offset(dx, dy))
            .filter(|n| self.contains(*n))
            .map(|n| &self.cells[n.y * self.width + n.x])
            .filter(|cell| cell.is_free())
            .collect();
        Ok(neighbors)
    }

    /// Iterates over all cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = &OccupancyCell> {
        self.cells.iter()
    }

    /// Number of occupied cells.
    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|c| c.occupied).count()
    }

    /// Copies the occupancy flags in row-major order.
    pub fn occupancy_snapshot(&self) -> Vec<bool> {
        self.cells.iter().map(|c| c.occupied).collect()
    }

    /// Marks every cell as free.
    pub fn clear(&mut self) {
        self.cells.iter_mut().for_each(|c| c.occupied = false);
    }
}

impl PartialEq for OccupancyGrid {
    fn eq(&self, other: &Self) -> bool {
        self.width == other.width
            && self.height == other.height
            && self.geometry == other.geometry
            && self
                .cells
                .iter()
                .zip(&other.cells)
                .all(|(a, b)| a.occupied == b.occupied)
    }
}

impl fmt::Debug for OccupancyGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OccupancyGrid")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("geometry", &self.geometry)
            .field("occupied", &self.occupied_count())
            .finish()
    }
}

impl fmt::Display for OccupancyGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "OccupancyGrid ({}x{}, cell: {:.3}x{:.3}m)",
            self.width, self.height, self.geometry.cell_size_x, self.geometry.cell_size_z
        )?;
        writeln!(
            f,
            "Origin: ({:.3}, {:.3})",
            self.geometry.origin_x, self.geometry.origin_z
        )?;
        for row in self.cells.chunks(self.width) {
            for cell in row {
                write!(f, "{}", u8::from(cell.occupied))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn positions(cells: Vec<&OccupancyCell>) -> Vec<GridPoint> {
        cells.into_iter().map(|c| c.position()).collect()
    }

    #[test]
    fn test_grid_creation() {
        let grid = OccupancyGrid::new(10, 7).unwrap();
        assert_eq!(grid.width(), 10);
        assert_eq!(grid.height(), 7);
        assert_eq!(grid.cells().count(), 70);
        assert_eq!(grid.occupied_count(), 0);
        assert_eq!(grid.cell_at(GridPoint::new(9, 6)).unwrap().position(), GridPoint::new(9, 6));
    }

    #[test]
    fn test_invalid_creation() {
        assert!(matches!(
            OccupancyGrid::new(0, 10),
            Err(NavigationError::InvalidDimensions(_))
        ));
        assert!(matches!(
            OccupancyGrid::new(10, 0),
            Err(NavigationError::InvalidDimensions(_))
        ));
        assert!(matches!(
            OccupancyGrid::new(usize::MAX, 2),
            Err(NavigationError::InvalidDimensions(_))
        ));
    }

    #[test]
    fn test_occupancy_operations() {
        let mut grid = OccupancyGrid::new(5, 5).unwrap();
        let p = GridPoint::new(2, 3);
        grid.set_occupied(p, true).unwrap();
        assert!(grid.is_occupied(p).unwrap());
        assert_eq!(grid.occupied_count(), 1);

        assert_eq!(
            grid.set_occupied(GridPoint::new(5, 2), true),
            Err(NavigationError::OutOfBounds {
                x: 5,
                y: 2,
                width: 5,
                height: 5
            })
        );
        assert!(matches!(
            grid.cell_at(GridPoint::new(2, 5)),
            Err(NavigationError::OutOfBounds { .. })
        ));

        grid.clear();
        assert_eq!(grid.occupied_count(), 0);
    }

    #[test]
    fn test_neighbors_interior() {
        let grid = OccupancyGrid::new(5, 5).unwrap();
        let n = positions(grid.neighbors_of(GridPoint::new(2, 2)).unwrap());
        assert_eq!(
            n,
            vec![
                GridPoint::new(1, 2),
                GridPoint::new(3, 2),
                GridPoint::new(2, 1),
                GridPoint::new(2, 3),
                GridPoint::new(3, 1),
                GridPoint::new(1, 1),
                GridPoint::new(1, 3),
                GridPoint::new(3, 3),
            ]
        );
    }

    #[test]
    fn test_neighbors_corners() {
        let grid = OccupancyGrid::new(4, 3).unwrap();
        let origin = positions(grid.neighbors_of(GridPoint::new(0, 0)).unwrap());
        assert_eq!(
            origin,
            vec![GridPoint::new(1, 0), GridPoint::new(0, 1), GridPoint::new(1, 1)]
        );

        let far = positions(grid.neighbors_of(GridPoint::new(3, 2)).unwrap());
        assert_eq!(
            far,
            vec![GridPoint::new(2, 2), GridPoint::new(3, 1), GridPoint::new(2, 1)]
        );
    }

    #[test]
    fn test_neighbors_stay_in_bounds_and_free() {
        let mut grid = OccupancyGrid::new(6, 5).unwrap();
        for p in [(1, 1), (4, 0), (5, 4), (0, 3), (3, 2)] {
            grid.set_occupied(GridPoint::from(p), true).unwrap();
        }
        for y in 0..grid.height() {
            for x in 0..grid.width() {
                for cell in grid.neighbors_of(GridPoint::new(x, y)).unwrap() {
                    let n = cell.position();
                    assert!(n.x < grid.width() && n.y < grid.height());
                    assert!(!cell.occupied);
                    assert!(n.x.abs_diff(x) <= 1 && n.y.abs_diff(y) <= 1);
                    assert_ne!(n, GridPoint::new(x, y));
                }
            }
        }
    }

    #[test]
    fn test_neighbors_skip_occupied() {
        let mut grid = OccupancyGrid::new(3, 3).unwrap();
        grid.set_occupied(GridPoint::new(1, 0), true).unwrap();
        grid.set_occupied(GridPoint::new(2, 2), true).unwrap();
        let n = positions(grid.neighbors_of(GridPoint::new(1, 1)).unwrap());
        assert_eq!(n.len(), 6);
        assert!(!n.contains(&GridPoint::new(1, 0)));
        assert!(!n.contains(&GridPoint::new(2, 2)));
    }

    #[test]
    fn test_neighbors_out_of_bounds_query() {
        let grid = OccupancyGrid::new(3, 3).unwrap();
        assert!(matches!(
            grid.neighbors_of(GridPoint::new(3, 0)),
            Err(NavigationError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn test_display() {
        let mut grid = OccupancyGrid::new(3, 2).unwrap();
        grid.set_occupied(GridPoint::new(1, 1), true).unwrap();
        let display_str = format!("{}", grid);
        assert!(display_str.contains("OccupancyGrid (3x2"));
        assert!(display_str.ends_with("000\n010\n"));
    }
}
