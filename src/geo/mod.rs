// src/geo/mod.rs
// Geodetic placement of tiles on the WGS84 ellipsoid
// RELEVANT FILES: src/geo/ecef.rs, src/config.rs

pub mod ecef;

pub use ecef::{wgs84_to_ecef, GeoTransform, WGS84_A, WGS84_B, WGS84_E2, WGS84_F};
