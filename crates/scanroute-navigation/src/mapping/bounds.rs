//! Room bounds discovery over a set of mesh fragments.

use tracing::debug;

use crate::map::RoomExtents;

use super::mesh::MeshFragment;

/// What a scan tells us about the room before rasterization.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScanBounds {
    /// Rectangle covered by the scan in the x–z plane.
    pub extents: RoomExtents,
    /// Height of the lowest fragment center, taken as the floor.
    pub floor_level: f32,
    /// Height of the highest fragment center, taken as the ceiling.
    pub ceiling_level: f32,
    /// Number of fragments that contributed (fragments without vertices do not).
    pub fragments: usize,
}

/// Scans all fragments for the room rectangle and the floor/ceiling heights.
///
/// Each fragment contributes its local bounding box after the world transform.
/// With no usable fragment every value stays zero.
pub fn discover_bounds<'a, I>(fragments: I) -> ScanBounds
where
    I: IntoIterator<Item = &'a MeshFragment>,
{
    let mut bounds: Option<ScanBounds> = None;

    for fragment in fragments {
        let Some(world) = fragment.world_bounds() else {
            continue;
        };
        let center_y = world.center().y;
        match bounds.as_mut() {
            None => {
                bounds = Some(ScanBounds {
                    extents: RoomExtents::new(world.min.x, world.max.x, world.min.z, world.max.z),
                    floor_level: center_y,
                    ceiling_level: center_y,
                    fragments: 1,
                });
            }
            Some(b) => {
                b.extents
                    .include(world.min.x, world.max.x, world.min.z, world.max.z);
                b.floor_level = b.floor_level.min(center_y);
                b.ceiling_level = b.ceiling_level.max(center_y);
                b.fragments += 1;
            }
        }
    }

    let bounds = bounds.unwrap_or_default();
    debug!(
        fragments = bounds.fragments,
        min_x = bounds.extents.min_x,
        max_x = bounds.extents.max_x,
        min_z = bounds.extents.min_z,
        max_z = bounds.extents.max_z,
        floor = bounds.floor_level,
        ceiling = bounds.ceiling_level,
        "Discovered room bounds"
    );
    bounds
}
