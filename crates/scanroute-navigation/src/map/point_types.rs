use std::fmt;

/// Represents a point in grid coordinates (cell indices).
///
/// `x` indexes the world x axis and `y` indexes the world z axis; index 0 is the
/// minimum world coordinate on both.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridPoint {
    /// The x-coordinate (column index) in the grid.
    pub x: usize,
    /// The y-coordinate (row index) in the grid.
    pub y: usize,
}

impl GridPoint {
    /// Creates a new `GridPoint`.
    #[must_use]
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// Offsets the point by a signed step, returning `None` on underflow.
    #[must_use]
    pub fn offset(self, dx: isize, dy: isize) -> Option<Self> {
        Some(Self {
            x: self.x.checked_add_signed(dx)?,
            y: self.y.checked_add_signed(dy)?,
        })
    }

    /// Returns true if both points differ on both axes (a diagonal step).
    #[must_use]
    pub fn is_diagonal_to(&self, other: &GridPoint) -> bool {
        self.x != other.x && self.y != other.y
    }
}

impl From<(usize, usize)> for GridPoint {
    fn from((x, y): (usize, usize)) -> Self {
        Self::new(x, y)
    }
}

impl fmt::Display for GridPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A position in world coordinates (meters). `y` is the vertical axis; the
/// floor plan lies in the x–z plane.
pub type WorldPoint = nalgebra::Point3<f32>;
