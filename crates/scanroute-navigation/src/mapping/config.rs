//! Map builder configuration.

use crate::error::NavigationError;

/// Settings for turning a scan into an occupancy grid.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct MapBuilderConfig {
    /// Grid resolution along world x, in cells.
    pub grid_width: usize,
    /// Grid resolution along world z, in cells.
    pub grid_height: usize,
    /// Margin (meters) above the floor and below the ceiling inside which
    /// vertices are ignored.
    pub floor_threshold: f32,
    /// Block cleanup settings.
    pub denoise: DenoiseConfig,
    /// Safety margin settings.
    pub inflation: InflationConfig,
}

impl Default for MapBuilderConfig {
    fn default() -> Self {
        Self {
            grid_width: 50,
            grid_height: 50,
            floor_threshold: 0.2,
            denoise: DenoiseConfig::default(),
            inflation: InflationConfig::default(),
        }
    }
}

impl MapBuilderConfig {
    /// Checks every parameter, returning the first problem found.
    pub fn validate(&self) -> Result<(), NavigationError> {
        if self.grid_width == 0 || self.grid_height == 0 {
            return Err(NavigationError::InvalidDimensions(
                "Grid width and height must be non-zero",
            ));
        }
        if !(self.floor_threshold.is_finite() && self.floor_threshold >= 0.0) {
            return Err(NavigationError::InvalidParameter(
                "floor threshold must be a non-negative number",
            ));
        }
        self.denoise.validate()?;
        self.inflation.validate()
    }
}

/// Block-majority cleanup settings.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct DenoiseConfig {
    /// Run the cleanup pass.
    pub enabled: bool,
    /// Side of a vote window, in cells. Windows start every `block_size / 2` cells.
    pub block_size: usize,
    /// Side of the central region the vote overwrites.
    pub core_size: usize,
    /// Fraction of the window that must agree before the core is overwritten.
    pub majority: f32,
}

impl Default for DenoiseConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            block_size: 4,
            core_size: 2,
            majority: 0.8,
        }
    }
}

impl DenoiseConfig {
    /// Checks the window geometry and vote fraction.
    pub fn validate(&self) -> Result<(), NavigationError> {
        if self.block_size < 2 {
            return Err(NavigationError::InvalidParameter(
                "block size must be at least 2",
            ));
        }
        if self.core_size > self.block_size {
            return Err(NavigationError::InvalidParameter(
                "core size must not exceed block size",
            ));
        }
        if !(0.5..=1.0).contains(&self.majority) {
            return Err(NavigationError::InvalidParameter(
                "majority must lie in [0.5, 1.0]",
            ));
        }
        Ok(())
    }
}

/// Obstacle inflation settings.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct InflationConfig {
    /// Run the inflation pass.
    pub enabled: bool,
    /// Clearance (meters) kept free around every obstacle.
    pub safety_distance: f32,
}

impl Default for InflationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            safety_distance: 0.1,
        }
    }
}

impl InflationConfig {
    /// Checks the safety distance.
    pub fn validate(&self) -> Result<(), NavigationError> {
        if !(self.safety_distance.is_finite() && self.safety_distance >= 0.0) {
            return Err(NavigationError::InvalidParameter(
                "safety distance must be a non-negative number",
            ));
        }
        Ok(())
    }
}
