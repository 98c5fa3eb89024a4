//! Bounding volume types for 3D Tiles

use glam::DVec3;
use serde::{Deserialize, Serialize};

/// Half extent of the placeholder box, in local units
pub const PLACEHOLDER_HALF_EXTENT: f64 = 50.0;

/// Oriented bounding box defined by center and half-axes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingVolume {
    /// 12 numbers: [cx, cy, cz, xx, xy, xz, yx, yy, yz, zx, zy, zz]
    /// center (3) + x-axis half-length (3) + y-axis (3) + z-axis (3)
    #[serde(rename = "box")]
    pub data: [f64; 12],
}

impl BoundingVolume {
    /// Box from a center and three half-axis vectors
    pub fn from_axes(center: DVec3, x: DVec3, y: DVec3, z: DVec3) -> Self {
        Self {
            data: [
                center.x, center.y, center.z,
                x.x, x.y, x.z,
                y.x, y.y, y.z,
                z.x, z.y, z.z,
            ],
        }
    }

    /// Axis-aligned box centered on `center` with equal half extents
    pub fn cube(center: DVec3, half_extent: f64) -> Self {
        Self::from_axes(
            center,
            DVec3::X * half_extent,
            DVec3::Y * half_extent,
            DVec3::Z * half_extent,
        )
    }

    pub fn center(&self) -> DVec3 {
        DVec3::new(self.data[0], self.data[1], self.data[2])
    }

    pub fn half_axes(&self) -> [DVec3; 3] {
        [
            DVec3::new(self.data[3], self.data[4], self.data[5]),
            DVec3::new(self.data[6], self.data[7], self.data[8]),
            DVec3::new(self.data[9], self.data[10], self.data[11]),
        ]
    }
}

/// Produces the bounding volume shared by every tile of a conversion.
pub trait BoundingVolumeSource {
    fn bounding_volume(&self) -> BoundingVolume;
}

/// Geometry-independent placeholder: a cube at the local origin.
///
/// Every tile gets the same box regardless of the mesh it holds.
#[derive(Debug, Clone, Copy)]
pub struct FixedBox {
    pub half_extent: f64,
}

impl Default for FixedBox {
    fn default() -> Self {
        Self {
            half_extent: PLACEHOLDER_HALF_EXTENT,
        }
    }
}

impl BoundingVolumeSource for FixedBox {
    fn bounding_volume(&self) -> BoundingVolume {
        BoundingVolume::cube(DVec3::ZERO, self.half_extent)
    }
}
