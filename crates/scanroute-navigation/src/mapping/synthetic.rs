//! Generates room scans made of a floor, a ceiling, perimeter walls and
//! randomly placed box obstacles.
//!
//! Used in place of a live scanner when exercising the pipeline.

use std::collections::HashMap;
use std::f32::consts::PI;

use nalgebra::{Isometry3, Point3, Vector3};
use rand::Rng;
use tracing::debug;

use crate::error::NavigationError;

use super::mesh::{FragmentId, MeshFragment};

/// Shape of a generated room. Lengths are meters.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct SyntheticRoom {
    /// Room size along x.
    pub width: f32,
    /// Room size along z.
    pub depth: f32,
    /// Floor to ceiling.
    pub height: f32,
    /// World height of the floor.
    pub floor_level: f32,
    /// Add wall fragments around the perimeter.
    pub walls: bool,
    /// Number of box obstacles.
    pub obstacles: usize,
    /// Smallest box footprint side.
    pub min_obstacle_size: f32,
    /// Largest box footprint side.
    pub max_obstacle_size: f32,
    /// Tallest box.
    pub max_obstacle_height: f32,
    /// Distance between neighboring sampled vertices.
    pub vertex_spacing: f32,
}

impl Default for SyntheticRoom {
    fn default() -> Self {
        Self {
            width: 5.0,
            depth: 5.0,
            height: 2.5,
            floor_level: 0.0,
            walls: true,
            obstacles: 6,
            min_obstacle_size: 0.3,
            max_obstacle_size: 0.8,
            max_obstacle_height: 1.2,
            vertex_spacing: 0.05,
        }
    }
}

impl SyntheticRoom {
    /// Checks that the room can be generated.
    pub fn validate(&self) -> Result<(), NavigationError> {
        let lengths = [
            self.width,
            self.depth,
            self.height,
            self.min_obstacle_size,
            self.max_obstacle_size,
            self.max_obstacle_height,
            self.vertex_spacing,
        ];
        if lengths.iter().any(|v| !(v.is_finite() && *v > 0.0)) {
            return Err(NavigationError::InvalidParameter(
                "synthetic room lengths must be positive",
            ));
        }
        if self.min_obstacle_size > self.max_obstacle_size {
            return Err(NavigationError::InvalidParameter(
                "minimum obstacle size exceeds maximum",
            ));
        }
        if !self.floor_level.is_finite() {
            return Err(NavigationError::InvalidParameter(
                "floor level must be finite",
            ));
        }
        Ok(())
    }

    /// Generates a scan. The same room and RNG state give the same scan.
    ///
    /// # Arguments
    /// * `rng` - Source of obstacle placement, size and yaw
    ///
    /// # Returns
    /// * `Result<HashMap<FragmentId, MeshFragment>, NavigationError>` - Fragments keyed by id
    pub fn generate<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
    ) -> Result<HashMap<FragmentId, MeshFragment>, NavigationError> {
        self.validate()?;

        let mut fragments = HashMap::new();
        let mut next_id: FragmentId = 0;
        let mut push = |fragment: MeshFragment| {
            fragments.insert(next_id, fragment);
            next_id += 1;
        };

        push(self.horizontal_plane(self.floor_level));
        push(self.horizontal_plane(self.floor_level + self.height));
        if self.walls {
            for wall in self.wall_fragments() {
                push(wall);
            }
        }
        for _ in 0..self.obstacles {
            push(self.random_box(rng));
        }

        debug!(
            fragments = fragments.len(),
            obstacles = self.obstacles,
            "Generated synthetic room scan"
        );
        Ok(fragments)
    }

    fn horizontal_plane(&self, y: f32) -> MeshFragment {
        MeshFragment::translated(
            Vector3::new(0.0, y, 0.0),
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(self.width, 0.0, 0.0),
                Point3::new(0.0, 0.0, self.depth),
                Point3::new(self.width, 0.0, self.depth),
            ],
        )
    }

    /// Four walls sampled at mid height along the room edges.
    fn wall_fragments(&self) -> [MeshFragment; 4] {
        let y = self.floor_level + self.height / 2.0;
        let along_x: Vec<f32> = samples(self.width, self.vertex_spacing);
        let along_z: Vec<f32> = samples(self.depth, self.vertex_spacing);

        let wall_x = |z: f32| {
            MeshFragment::in_world(along_x.iter().map(|&x| Point3::new(x, y, z)).collect())
        };
        let wall_z = |x: f32| {
            MeshFragment::in_world(along_z.iter().map(|&z| Point3::new(x, y, z)).collect())
        };
        [wall_x(0.0), wall_x(self.depth), wall_z(0.0), wall_z(self.width)]
    }

    /// A box resting on the floor with a random footprint, height and yaw,
    /// kept clear of the room edges.
    fn random_box<R: Rng + ?Sized>(&self, rng: &mut R) -> MeshFragment {
        let sx = rng.random_range(self.min_obstacle_size..=self.max_obstacle_size);
        let sz = rng.random_range(self.min_obstacle_size..=self.max_obstacle_size);
        let h = rng.random_range(self.max_obstacle_height / 2.0..=self.max_obstacle_height);
        let yaw = rng.random_range(0.0..=PI);

        let reach = (sx * sx + sz * sz).sqrt() / 2.0;
        let cx = random_within(rng, reach, self.width - reach);
        let cz = random_within(rng, reach, self.depth - reach);

        // Vertex lattice over the footprint at the base, middle and top.
        let xs = samples(sx, self.vertex_spacing);
        let zs = samples(sz, self.vertex_spacing);
        let mut vertices = Vec::with_capacity(xs.len() * zs.len() * 3);
        for y in [0.0, h / 2.0, h] {
            for &x in &xs {
                for &z in &zs {
                    vertices.push(Point3::new(x - sx / 2.0, y, z - sz / 2.0));
                }
            }
        }

        let pose = Isometry3::new(
            Vector3::new(cx, self.floor_level, cz),
            Vector3::y() * yaw,
        );
        MeshFragment::placed(pose, vertices)
    }
}

/// Evenly spaced positions covering `0..=length`, both ends included.
fn samples(length: f32, spacing: f32) -> Vec<f32> {
    let steps = (length / spacing).ceil().max(1.0) as usize;
    (0..=steps)
        .map(|i| length * i as f32 / steps as f32)
        .collect()
}

fn random_within<R: Rng + ?Sized>(rng: &mut R, low: f32, high: f32) -> f32 {
    if low < high {
        rng.random_range(low..=high)
    } else {
        (low + high) / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::bounds::discover_bounds;
    use crate::mapping::builder::MapBuilder;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_same_seed_same_scan() {
        let room = SyntheticRoom::default();
        let a = room.generate(&mut StdRng::seed_from_u64(7)).unwrap();
        let b = room.generate(&mut StdRng::seed_from_u64(7)).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 2 + 4 + room.obstacles);
    }

    #[test]
    fn test_scan_stays_inside_the_room() {
        let room = SyntheticRoom::default();
        let scan = room.generate(&mut StdRng::seed_from_u64(42)).unwrap();
        let bounds = discover_bounds(scan.values());

        assert!((bounds.floor_level - room.floor_level).abs() < 1e-5);
        assert!((bounds.ceiling_level - room.height).abs() < 1e-5);
        let e = bounds.extents;
        assert!(e.min_x.abs() < 1e-4 && e.min_z.abs() < 1e-4);
        assert!((e.max_x - room.width).abs() < 1e-4);
        assert!((e.max_z - room.depth).abs() < 1e-4);
    }

    #[test]
    fn test_builds_walls_and_obstacles() {
        let room = SyntheticRoom::default();
        let scan = room.generate(&mut StdRng::seed_from_u64(3)).unwrap();
        let map = MapBuilder::default().build(&scan).unwrap();
        let stats = map.stats();

        assert_eq!(stats.fragments, scan.len());
        assert!(stats.obstacle_vertices > 0);
        assert!(map.grid().occupied_count() > 0);
        assert!(map.grid().occupied_count() < 50 * 50);
    }

    #[test]
    fn test_rejects_bad_parameters() {
        let room = SyntheticRoom {
            min_obstacle_size: 1.0,
            max_obstacle_size: 0.5,
            ..Default::default()
        };
        assert!(room.generate(&mut StdRng::seed_from_u64(0)).is_err());

        let room = SyntheticRoom {
            vertex_spacing: 0.0,
            ..Default::default()
        };
        assert!(room.validate().is_err());
    }
}
