//! Scan-to-grid pipeline: bounds discovery, cell sizing, rasterization,
//! block cleanup and obstacle inflation.

use std::collections::HashMap;

use tracing::{debug, info, warn};

use crate::error::NavigationError;
use crate::map::{GridGeometry, GridPoint, OccupancyGrid, RoomExtents, WorldPoint};

use super::bounds::{ScanBounds, discover_bounds};
use super::config::MapBuilderConfig;
use super::denoise::{DenoiseStats, denoise_blocks};
use super::inflate::inflate_obstacles;
use super::mesh::{FragmentId, MeshFragment};

/// Height above the floor reported for free cells.
pub const FREE_CELL_HEIGHT: f32 = 0.1;
/// Height above the floor reported for occupied cells.
pub const OCCUPIED_CELL_HEIGHT: f32 = 0.8;

/// Counters collected while building a map.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BuildStats {
    /// Fragments that contributed to the room bounds.
    pub fragments: usize,
    /// Vertices examined during rasterization.
    pub vertices: usize,
    /// Vertices between the floor and ceiling bands.
    pub obstacle_vertices: usize,
    /// Cells occupied straight after rasterization.
    pub rasterized_cells: usize,
    /// Changes made by the block cleanup.
    pub denoise: DenoiseStats,
    /// Cells added by obstacle inflation.
    pub inflated_cells: usize,
}

/// Builds occupancy grids from room scans.
///
/// The builder holds configuration only. Every call to [`MapBuilder::build`]
/// starts from an empty grid and re-derives the room extents.
#[derive(Debug, Clone, Default)]
pub struct MapBuilder {
    config: MapBuilderConfig,
}

impl MapBuilder {
    /// Creates a builder after validating `config`.
    pub fn new(config: MapBuilderConfig) -> Result<Self, NavigationError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The configuration in use.
    pub fn config(&self) -> &MapBuilderConfig {
        &self.config
    }

    /// Builds a map from the fragments of a scan.
    ///
    /// An empty or flat scan yields an all-free grid with zero-sized cells.
    pub fn build(
        &self,
        fragments: &HashMap<FragmentId, MeshFragment>,
    ) -> Result<RoomMap, NavigationError> {
        let (width, height) = (self.config.grid_width, self.config.grid_height);
        let bounds = discover_bounds(fragments.values());
        let geometry = GridGeometry::from_extents(&bounds.extents, width, height);
        let mut grid = OccupancyGrid::with_geometry(width, height, geometry)?;
        let mut stats = BuildStats {
            fragments: bounds.fragments,
            ..Default::default()
        };

        if geometry.is_degenerate() {
            warn!(
                fragments = bounds.fragments,
                room_width = bounds.extents.width(),
                room_depth = bounds.extents.depth(),
                "Scan covers no area, returning an empty map"
            );
            return Ok(RoomMap::new(grid, bounds, self.config.floor_threshold, stats));
        }

        self.rasterize(&mut grid, fragments, &bounds, &mut stats)?;
        stats.rasterized_cells = grid.occupied_count();

        if self.config.denoise.enabled {
            stats.denoise = denoise_blocks(&mut grid, &self.config.denoise)?;
        }
        if self.config.inflation.enabled {
            stats.inflated_cells =
                inflate_obstacles(&mut grid, self.config.inflation.safety_distance)?;
        }

        info!(
            width,
            height,
            cell_x = geometry.cell_size_x,
            cell_z = geometry.cell_size_z,
            fragments = stats.fragments,
            obstacle_vertices = stats.obstacle_vertices,
            occupied = grid.occupied_count(),
            "Built room map"
        );
        Ok(RoomMap::new(grid, bounds, self.config.floor_threshold, stats))
    }

    /// Marks every cell holding at least one vertex strictly between the
    /// floor band and the ceiling band.
    fn rasterize(
        &self,
        grid: &mut OccupancyGrid,
        fragments: &HashMap<FragmentId, MeshFragment>,
        bounds: &ScanBounds,
        stats: &mut BuildStats,
    ) -> Result<(), NavigationError> {
        let low = bounds.floor_level + self.config.floor_threshold;
        let high = bounds.ceiling_level - self.config.floor_threshold;
        let geometry = *grid.geometry();
        let (width, height) = (grid.width(), grid.height());

        for fragment in fragments.values() {
            for vertex in fragment.world_vertices() {
                stats.vertices += 1;
                if vertex.y > low && vertex.y < high {
                    stats.obstacle_vertices += 1;
                    let cell = geometry.world_to_cell(vertex.x, vertex.z, width, height)?;
                    grid.set_occupied(cell, true)?;
                }
            }
        }
        debug!(
            vertices = stats.vertices,
            obstacle_vertices = stats.obstacle_vertices,
            low,
            high,
            "Rasterized scan"
        );
        Ok(())
    }
}

/// A built occupancy grid together with the floor and ceiling heights it was
/// derived from.
#[derive(Debug, Clone, PartialEq)]
pub struct RoomMap {
    grid: OccupancyGrid,
    bounds: ScanBounds,
    floor_threshold: f32,
    stats: BuildStats,
}

impl RoomMap {
    fn new(grid: OccupancyGrid, bounds: ScanBounds, floor_threshold: f32, stats: BuildStats) -> Self {
        Self {
            grid,
            bounds,
            floor_threshold,
            stats,
        }
    }

    /// The occupancy grid.
    pub fn grid(&self) -> &OccupancyGrid {
        &self.grid
    }

    /// Consumes the map, returning the grid.
    pub fn into_grid(self) -> OccupancyGrid {
        self.grid
    }

    /// Room rectangle in the x–z plane.
    pub fn extents(&self) -> &RoomExtents {
        &self.bounds.extents
    }

    /// Floor height (meters).
    pub fn floor_level(&self) -> f32 {
        self.bounds.floor_level
    }

    /// Ceiling height (meters).
    pub fn ceiling_level(&self) -> f32 {
        self.bounds.ceiling_level
    }

    /// Counters from the build.
    pub fn stats(&self) -> &BuildStats {
        &self.stats
    }

    /// Cell under a world position (height is ignored).
    pub fn world_to_cell(&self, p: &WorldPoint) -> Result<GridPoint, NavigationError> {
        self.grid
            .geometry()
            .world_to_cell(p.x, p.z, self.grid.width(), self.grid.height())
    }

    /// World position of the center of `cell`, raised slightly above the
    /// floor for free cells and to obstacle height for occupied ones.
    pub fn cell_to_world(&self, cell: GridPoint) -> Result<WorldPoint, NavigationError> {
        let lift = if self.grid.is_occupied(cell)? {
            OCCUPIED_CELL_HEIGHT
        } else {
            FREE_CELL_HEIGHT
        };
        let (x, z) = self.grid.geometry().cell_center(cell);
        Ok(WorldPoint::new(x, self.bounds.floor_level + lift, z))
    }

    /// True if `p` is at floor height, within twice the floor threshold.
    pub fn is_on_floor(&self, p: &WorldPoint) -> bool {
        p.y <= self.bounds.floor_level + self.floor_threshold * 2.0
    }

    /// Converts a grid path into the world positions of its cell centers.
    pub fn path_to_world(&self, path: &[GridPoint]) -> Result<Vec<WorldPoint>, NavigationError> {
        path.iter().map(|&cell| self.cell_to_world(cell)).collect()
    }
}
