//! Occupancy mapping and route planning for scanned rooms.
//!
//! [`mapping::MapBuilder`] turns mesh fragments from a room scan into an
//! [`map::OccupancyGrid`]; [`astar::PathFinder`] plans routes over it.

#![warn(missing_docs)]

pub mod astar;
pub mod error;
pub mod map;
pub mod mapping;

pub use astar::{PathFinder, PathResult, SearchContext, astar_search, octile_distance};
pub use error::NavigationError;
pub use map::{GridPoint, OccupancyCell, OccupancyGrid, WorldPoint};
pub use mapping::{MapBuilder, MapBuilderConfig, MeshFragment, RoomMap};
