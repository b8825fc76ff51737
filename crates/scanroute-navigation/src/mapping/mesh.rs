//! Raw surface geometry as delivered by the scanner.

use nalgebra::{Affine3, Isometry3, Matrix4, Point3, Vector3};

use crate::map::WorldPoint;

/// Identifier the scanner assigns to a mesh fragment.
pub type FragmentId = u32;

/// A piece of the scanned surface: vertices in local space plus the transform
/// that places them in the world.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshFragment {
    transform: Affine3<f32>,
    vertices: Vec<Point3<f32>>,
}

impl MeshFragment {
    /// Creates a fragment from its world transform and local vertices.
    pub fn new(transform: Affine3<f32>, vertices: Vec<Point3<f32>>) -> Self {
        Self {
            transform,
            vertices,
        }
    }

    /// Creates a fragment whose vertices are already in world space.
    pub fn in_world(vertices: Vec<Point3<f32>>) -> Self {
        Self::new(Affine3::identity(), vertices)
    }

    /// Creates a fragment placed by a translation only.
    pub fn translated(translation: Vector3<f32>, vertices: Vec<Point3<f32>>) -> Self {
        Self::new(
            Affine3::from_matrix_unchecked(Matrix4::new_translation(&translation)),
            vertices,
        )
    }

    /// Creates a fragment placed by a rigid motion.
    pub fn placed(pose: Isometry3<f32>, vertices: Vec<Point3<f32>>) -> Self {
        Self::new(Affine3::from_matrix_unchecked(pose.to_homogeneous()), vertices)
    }

    /// World transform of the fragment.
    pub fn transform(&self) -> &Affine3<f32> {
        &self.transform
    }

    /// Vertices in local space.
    pub fn vertices(&self) -> &[Point3<f32>] {
        &self.vertices
    }

    /// Vertices transformed into world space.
    pub fn world_vertices(&self) -> impl Iterator<Item = WorldPoint> + '_ {
        self.vertices.iter().map(|v| self.transform.transform_point(v))
    }

    /// Local-space bounding box, or `None` for an empty fragment.
    pub fn local_bounds(&self) -> Option<Aabb> {
        Aabb::from_points(self.vertices.iter().copied())
    }

    /// World-space box enclosing the transformed local bounding box.
    pub fn world_bounds(&self) -> Option<Aabb> {
        self.local_bounds().map(|b| b.transformed(&self.transform))
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner.
    pub min: Point3<f32>,
    /// Maximum corner.
    pub max: Point3<f32>,
}

impl Aabb {
    /// Smallest box containing all `points`, or `None` if there are none.
    pub fn from_points(points: impl IntoIterator<Item = Point3<f32>>) -> Option<Self> {
        let mut points = points.into_iter();
        let first = points.next()?;
        Some(points.fold(Self { min: first, max: first }, |b, p| Self {
            min: b.min.inf(&p),
            max: b.max.sup(&p),
        }))
    }

    /// Center of the box.
    pub fn center(&self) -> Point3<f32> {
        nalgebra::center(&self.min, &self.max)
    }

    /// The eight corners.
    pub fn corners(&self) -> [Point3<f32>; 8] {
        let (lo, hi) = (self.min, self.max);
        [
            Point3::new(lo.x, lo.y, lo.z),
            Point3::new(hi.x, lo.y, lo.z),
            Point3::new(lo.x, hi.y, lo.z),
            Point3::new(hi.x, hi.y, lo.z),
            Point3::new(lo.x, lo.y, hi.z),
            Point3::new(hi.x, lo.y, hi.z),
            Point3::new(lo.x, hi.y, hi.z),
            Point3::new(hi.x, hi.y, hi.z),
        ]
    }

    /// Axis-aligned box enclosing this box after `transform`.
    pub fn transformed(&self, transform: &Affine3<f32>) -> Self {
        let corners = self.corners().map(|c| transform.transform_point(&c));
        let mut out = Self {
            min: corners[0],
            max: corners[0],
        };
        for c in &corners[1..] {
            out.min = out.min.inf(c);
            out.max = out.max.sup(c);
        }
        out
    }
}
