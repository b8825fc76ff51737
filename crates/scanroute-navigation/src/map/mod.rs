//! Map-related functionality for navigation.
//!
//! This module provides the occupancy grid, its cells, and the geometry that
//! places a grid in the world.

pub mod cell;
pub mod geometry;
pub mod grid;
pub mod point_types;

pub use cell::OccupancyCell;
pub use geometry::{GridGeometry, RoomExtents};
pub use grid::OccupancyGrid;
pub use point_types::{GridPoint, WorldPoint};
