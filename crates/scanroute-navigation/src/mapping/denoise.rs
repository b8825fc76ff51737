//! Block-majority cleanup of a freshly rasterized grid.
//!
//! Overlapping windows slide over the grid every `block_size / 2` cells. Each
//! window counts occupied cells on its frame (the window minus its core) and,
//! when the frame is nearly all occupied or nearly all free, overwrites the
//! core to match. The core never votes on itself.
//!
//! A window anchored at `(ix, iz)` spans `ix..=ix + block` on each axis, and
//! its core spans `ix + m..=ix + block - m` with `m = (block - core) / 2`,
//! both clipped to the grid. Every window votes on the grid as it was before
//! the pass; decisions are then applied in scan order.

use tracing::debug;

use crate::error::NavigationError;
use crate::map::{GridPoint, OccupancyGrid};

use super::config::DenoiseConfig;

/// What a cleanup pass changed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DenoiseStats {
    /// Windows whose core was forced to occupied.
    pub filled_windows: usize,
    /// Windows whose core was forced to free.
    pub cleared_windows: usize,
    /// Cells that went from free to occupied.
    pub cells_filled: usize,
    /// Cells that went from occupied to free.
    pub cells_cleared: usize,
}

#[derive(Debug, Clone, Copy)]
struct Window {
    x: (usize, usize),
    z: (usize, usize),
    core_x: (usize, usize),
    core_z: (usize, usize),
}

impl Window {
    fn new(ix: usize, iz: usize, block: usize, core: usize, width: usize, height: usize) -> Self {
        let margin = (block - core) / 2;
        let (end_x, end_z) = (ix.saturating_add(block), iz.saturating_add(block));
        Self {
            x: (ix, end_x.min(width - 1)),
            z: (iz, end_z.min(height - 1)),
            core_x: (ix.saturating_add(margin), end_x - margin),
            core_z: (iz.saturating_add(margin), end_z - margin),
        }
    }

    fn in_core(&self, x: usize, z: usize) -> bool {
        (self.core_x.0..=self.core_x.1).contains(&x) && (self.core_z.0..=self.core_z.1).contains(&z)
    }

    /// Occupied cells on the frame around the core.
    fn edge_sum(&self, snapshot: &[bool], width: usize) -> usize {
        let mut sum = 0;
        for z in self.z.0..=self.z.1 {
            for x in self.x.0..=self.x.1 {
                if !self.in_core(x, z) && snapshot[z * width + x] {
                    sum += 1;
                }
            }
        }
        sum
    }

    fn core_cells(&self, width: usize, height: usize) -> impl Iterator<Item = GridPoint> {
        let xs = self.core_x.0..=self.core_x.1.min(width - 1);
        let zs = self.core_z.0..=self.core_z.1.min(height - 1);
        zs.flat_map(move |z| xs.clone().map(move |x| GridPoint::new(x, z)))
    }
}

/// Runs one block-majority cleanup pass over `grid`.
pub fn denoise_blocks(
    grid: &mut OccupancyGrid,
    config: &DenoiseConfig,
) -> Result<DenoiseStats, NavigationError> {
    config.validate()?;

    let (width, height) = (grid.width(), grid.height());
    let block = config.block_size;
    let step = block / 2;
    let area = block.saturating_mul(block) as f32;
    let fill_above = config.majority * area;
    let clear_below = (1.0 - config.majority) * area;

    let snapshot = grid.occupancy_snapshot();
    let mut decisions: Vec<(Window, bool)> = Vec::new();

    for ix in (0..width).step_by(step) {
        for iz in (0..height).step_by(step) {
            let window = Window::new(ix, iz, block, config.core_size, width, height);
            let edge = window.edge_sum(&snapshot, width) as f32;
            if edge > fill_above {
                decisions.push((window, true));
            } else if edge < clear_below {
                decisions.push((window, false));
            }
        }
    }

    let mut stats = DenoiseStats::default();
    for (window, occupied) in decisions {
        if occupied {
            stats.filled_windows += 1;
        } else {
            stats.cleared_windows += 1;
        }
        for p in window.core_cells(width, height) {
            grid.set_occupied(p, occupied)?;
        }
    }

    let after = grid.occupancy_snapshot();
    for (before, now) in snapshot.iter().zip(&after) {
        match (before, now) {
            (false, true) => stats.cells_filled += 1,
            (true, false) => stats.cells_cleared += 1,
            _ => {}
        }
    }

    debug!(
        filled_windows = stats.filled_windows,
        cleared_windows = stats.cleared_windows,
        cells_filled = stats.cells_filled,
        cells_cleared = stats.cells_cleared,
        "Block cleanup finished"
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(width: usize, height: usize) -> OccupancyGrid {
        let mut grid = OccupancyGrid::new(width, height).unwrap();
        for y in 0..height {
            for x in 0..width {
                grid.set_occupied(GridPoint::new(x, y), true).unwrap();
            }
        }
        grid
    }

    #[test]
    fn test_isolated_fleck_removed() {
        let mut grid = OccupancyGrid::new(10, 10).unwrap();
        grid.set_occupied(GridPoint::new(4, 4), true).unwrap();

        let stats = denoise_blocks(&mut grid, &DenoiseConfig::default()).unwrap();
        assert_eq!(grid.occupied_count(), 0);
        assert_eq!(stats.cells_cleared, 1);
        assert_eq!(stats.cells_filled, 0);
    }

    #[test]
    fn test_isolated_hole_filled() {
        let mut grid = filled(10, 10);
        grid.set_occupied(GridPoint::new(4, 4), false).unwrap();

        denoise_blocks(&mut grid, &DenoiseConfig::default()).unwrap();
        assert!(grid.is_occupied(GridPoint::new(4, 4)).unwrap());
    }

    #[test]
    fn test_far_corner_window_clears_its_core() {
        // The clipped window at the far corner has only three frame cells,
        // below the clear threshold of 0.2 * 16.
        let mut grid = filled(10, 10);
        denoise_blocks(&mut grid, &DenoiseConfig::default()).unwrap();
        assert_eq!(grid.occupied_count(), 99);
        assert!(!grid.is_occupied(GridPoint::new(9, 9)).unwrap());
    }

    #[test]
    fn test_idempotent_on_free_grid() {
        let mut grid = OccupancyGrid::new(12, 9).unwrap();
        let before = grid.clone();
        denoise_blocks(&mut grid, &DenoiseConfig::default()).unwrap();
        assert_eq!(grid, before);
    }

    #[test]
    fn test_idempotent_on_solid_grid() {
        let mut once = filled(10, 10);
        denoise_blocks(&mut once, &DenoiseConfig::default()).unwrap();
        let mut twice = once.clone();
        let stats = denoise_blocks(&mut twice, &DenoiseConfig::default()).unwrap();
        assert_eq!(twice, once);
        assert_eq!(stats.cells_filled + stats.cells_cleared, 0);
    }

    /// Applies each window's decision before the next window votes.
    fn denoise_in_scan(grid: &mut OccupancyGrid, config: &DenoiseConfig) {
        let (width, height) = (grid.width(), grid.height());
        let block = config.block_size;
        let area = (block * block) as f32;
        for ix in (0..width).step_by(block / 2) {
            for iz in (0..height).step_by(block / 2) {
                let window = Window::new(ix, iz, block, config.core_size, width, height);
                let edge = window.edge_sum(&grid.occupancy_snapshot(), width) as f32;
                let decision = if edge > config.majority * area {
                    Some(true)
                } else if edge < (1.0 - config.majority) * area {
                    Some(false)
                } else {
                    None
                };
                if let Some(occupied) = decision {
                    for p in window.core_cells(width, height) {
                        grid.set_occupied(p, occupied).unwrap();
                    }
                }
            }
        }
    }

    /// A solid frame around window (0, 0) plus short stubs below it on
    /// columns 0 and 4.
    fn ring_with_stubs() -> OccupancyGrid {
        let mut grid = OccupancyGrid::new(10, 10).unwrap();
        for z in 0..=4 {
            for x in 0..=4 {
                let core = (1..=3).contains(&x) && (1..=3).contains(&z);
                if !core {
                    grid.set_occupied(GridPoint::new(x, z), true).unwrap();
                }
            }
        }
        for p in [(0, 5), (0, 6), (4, 5), (4, 6)] {
            grid.set_occupied(GridPoint::from(p), true).unwrap();
        }
        grid
    }

    #[test]
    fn test_votes_come_from_the_pre_pass_grid() {
        let config = DenoiseConfig::default();
        let grid = ring_with_stubs();
        let first = Window::new(0, 0, 4, 2, 10, 10);
        let second = Window::new(0, 2, 4, 2, 10, 10);

        // Filling the first core adds three cells to the second window's
        // frame, pushing it from 10 to 13, past the fill threshold of 12.8.
        let snapshot = grid.occupancy_snapshot();
        assert_eq!(first.edge_sum(&snapshot, 10), 16);
        assert_eq!(second.edge_sum(&snapshot, 10), 10);
        let mut after_first = grid.clone();
        for p in first.core_cells(10, 10) {
            after_first.set_occupied(p, true).unwrap();
        }
        assert_eq!(second.edge_sum(&after_first.occupancy_snapshot(), 10), 13);

        // (2, 5) lies only in the cores of windows (0, 2) and (0, 4).
        let mut voted_on_snapshot = grid.clone();
        denoise_blocks(&mut voted_on_snapshot, &config).unwrap();
        assert!(!voted_on_snapshot.is_occupied(GridPoint::new(2, 5)).unwrap());
        assert!(voted_on_snapshot.is_occupied(GridPoint::new(2, 2)).unwrap());

        let mut voted_in_scan = grid.clone();
        denoise_in_scan(&mut voted_in_scan, &config);
        assert!(voted_in_scan.is_occupied(GridPoint::new(2, 5)).unwrap());
        assert_ne!(voted_in_scan, voted_on_snapshot);
    }

    #[test]
    fn test_oversized_block_does_not_overflow() {
        let config = DenoiseConfig {
            block_size: usize::MAX / 2 + 10,
            ..Default::default()
        };
        assert!(config.validate().is_ok());

        let mut grid = OccupancyGrid::new(6, 6).unwrap();
        grid.set_occupied(GridPoint::new(2, 3), true).unwrap();
        let before = grid.clone();
        let stats = denoise_blocks(&mut grid, &config).unwrap();
        // The only window's core lies entirely past the grid.
        assert_eq!(grid, before);
        assert_eq!(stats.cells_cleared + stats.cells_filled, 0);
    }

    #[test]
    fn test_rejects_bad_config() {
        let mut grid = OccupancyGrid::new(4, 4).unwrap();
        let config = DenoiseConfig {
            block_size: 1,
            ..Default::default()
        };
        assert!(matches!(
            denoise_blocks(&mut grid, &config),
            Err(NavigationError::InvalidParameter(_))
        ));
    }
}
