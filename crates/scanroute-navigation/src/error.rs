//! This module defines the error types used by the `scanroute-navigation` crate.

#![warn(missing_docs)]

/// Error type for map building and route planning.
///
/// Failing to find a route is not represented here: an exhausted search is an
/// expected outcome and is reported through [`crate::astar::PathResult`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum NavigationError {
    /// Error for invalid grid dimensions.
    /// This variant is returned when grid width or height is zero or too large.
    #[error("Invalid map dimensions: {0}")]
    InvalidDimensions(&'static str),
    /// Error for out-of-bounds access.
    /// This variant is returned when a cell coordinate lies outside the grid.
    #[error("Map access out of bounds: ({x}, {y}) is outside a {width}x{height} grid")]
    OutOfBounds {
        /// Requested column.
        x: usize,
        /// Requested row.
        y: usize,
        /// Grid width in cells.
        width: usize,
        /// Grid height in cells.
        height: usize,
    },
    /// Error for invalid world coordinates.
    /// This variant is returned when a world position lies past the far edge of the room.
    #[error("Invalid world coordinates: {0}")]
    InvalidWorldCoordinates(&'static str),
    /// Error for an invalid builder or inflation parameter.
    #[error("Invalid map builder parameter: {0}")]
    InvalidParameter(&'static str),
}
