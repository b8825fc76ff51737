//! Turning room scans into occupancy grids.

pub mod bounds;
pub mod builder;
pub mod config;
pub mod denoise;
pub mod inflate;
pub mod mesh;
pub mod synthetic;

pub use bounds::{ScanBounds, discover_bounds};
pub use builder::{BuildStats, FREE_CELL_HEIGHT, MapBuilder, OCCUPIED_CELL_HEIGHT, RoomMap};
pub use config::{DenoiseConfig, InflationConfig, MapBuilderConfig};
pub use denoise::{DenoiseStats, denoise_blocks};
pub use inflate::inflate_obstacles;
pub use mesh::{Aabb, FragmentId, MeshFragment};
pub use synthetic::SyntheticRoom;
