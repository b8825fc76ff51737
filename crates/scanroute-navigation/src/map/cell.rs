use std::hash::{Hash, Hasher};

use super::GridPoint;

/// The smallest unit of the occupancy map: a grid coordinate and whether
/// something stands on it.
///
/// Identity is the coordinate alone. Two cells compare equal (and hash equal)
/// whenever they sit at the same position, whatever their occupancy.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OccupancyCell {
    position: GridPoint,
    /// True if the cell is blocked and must never be traversed.
    pub occupied: bool,
}

impl OccupancyCell {
    /// Creates a free cell at `position`.
    pub const fn new(position: GridPoint) -> Self {
        Self {
            position,
            occupied: false,
        }
    }

    /// Grid coordinate of the cell.
    pub const fn position(&self) -> GridPoint {
        self.position
    }

    /// Returns true if the cell can be traversed.
    pub const fn is_free(&self) -> bool {
        !self.occupied
    }
}

impl PartialEq for OccupancyCell {
    fn eq(&self, other: &Self) -> bool {
        self.position == other.position
    }
}

impl Eq for OccupancyCell {}

impl Hash for OccupancyCell {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.position.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_equality_ignores_occupancy() {
        let free = OccupancyCell::new(GridPoint::new(3, 4));
        let mut blocked = OccupancyCell::new(GridPoint::new(3, 4));
        blocked.occupied = true;
        assert_eq!(free, blocked);
        assert_ne!(free, OccupancyCell::new(GridPoint::new(4, 3)));
    }

    #[test]
    fn test_hash_by_coordinate() {
        let mut set = HashSet::new();
        set.insert(OccupancyCell::new(GridPoint::new(1, 1)));
        let mut same = OccupancyCell::new(GridPoint::new(1, 1));
        same.occupied = true;
        assert!(!set.insert(same));
        assert_eq!(set.len(), 1);
    }
}
