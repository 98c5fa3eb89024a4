// src/geo/ecef.rs
// WGS84 geodetic -> ECEF conversion and the local East-North-Up frame
// RELEVANT FILES: src/geo/mod.rs, src/tiles3d/tileset.rs

use glam::{DMat4, DVec3, DVec4};
use serde::{Deserialize, Serialize};

/// WGS84 semi-major axis in meters
pub const WGS84_A: f64 = 6378137.0;
/// WGS84 flattening
pub const WGS84_F: f64 = 1.0 / 298.257223563;
/// WGS84 first eccentricity squared
pub const WGS84_E2: f64 = 2.0 * WGS84_F - WGS84_F * WGS84_F;
/// WGS84 semi-minor axis in meters
pub const WGS84_B: f64 = WGS84_A * (1.0 - WGS84_F);

/// Column-major 4x4 transform from tile-local coordinates to ECEF.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GeoTransform(pub [f64; 16]);

impl GeoTransform {
    /// East-North-Up frame anchored at a WGS84 point (degrees, meters).
    ///
    /// Columns are East, North, Up and the ECEF position of the anchor. Poles
    /// need no special-casing: the only division is by a term close to one.
    pub fn compute(longitude_deg: f64, latitude_deg: f64, height_m: f64) -> Self {
        let lon = longitude_deg.to_radians();
        let lat = latitude_deg.to_radians();
        let (sin_lon, cos_lon) = lon.sin_cos();
        let (sin_lat, cos_lat) = lat.sin_cos();

        let east = DVec3::new(-sin_lon, cos_lon, 0.0);
        let north = DVec3::new(-sin_lat * cos_lon, -sin_lat * sin_lon, cos_lat);
        let up = DVec3::new(cos_lat * cos_lon, cos_lat * sin_lon, sin_lat);
        let position = wgs84_to_ecef(longitude_deg, latitude_deg, height_m);

        let matrix = DMat4::from_cols(
            east.extend(0.0),
            north.extend(0.0),
            up.extend(0.0),
            DVec4::new(position.x, position.y, position.z, 1.0),
        );
        Self(matrix.to_cols_array())
    }

    pub fn to_mat4(&self) -> DMat4 {
        DMat4::from_cols_array(&self.0)
    }

    /// ECEF position of the anchor (translation column)
    pub fn origin(&self) -> DVec3 {
        DVec3::new(self.0[12], self.0[13], self.0[14])
    }

    /// Map a tile-local point into ECEF
    pub fn transform_point(&self, local: DVec3) -> DVec3 {
        self.to_mat4().transform_point3(local)
    }

    pub fn as_array(&self) -> &[f64; 16] {
        &self.0
    }
}

/// Convert WGS84 geodetic coordinates (degrees, meters) to ECEF meters
pub fn wgs84_to_ecef(longitude_deg: f64, latitude_deg: f64, height_m: f64) -> DVec3 {
    let lon = longitude_deg.to_radians();
    let lat = latitude_deg.to_radians();
    let sin_lat = lat.sin();
    let cos_lat = lat.cos();
    let n = WGS84_A / (1.0 - WGS84_E2 * sin_lat * sin_lat).sqrt();
    DVec3::new(
        (n + height_m) * cos_lat * lon.cos(),
        (n + height_m) * cos_lat * lon.sin(),
        (n * (1.0 - WGS84_E2) + height_m) * sin_lat,
    )
}
