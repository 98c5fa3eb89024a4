//! Conversion configuration schema and I/O.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{TilesError, TilesResult};
use crate::geo::GeoTransform;
use crate::tiles3d::{GlbJsonPadding, PackOptions};

/// Default number of LOD levels
pub const DEFAULT_LOD_LEVELS: u32 = 3;

/// Default external converter executable
pub const DEFAULT_CONVERTER: &str = "FBX2glTF";

/// WGS84 point the model's local origin is placed at
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoAnchor {
    /// Longitude in degrees
    pub longitude: f64,
    /// Latitude in degrees
    pub latitude: f64,
    /// Height above the ellipsoid in meters
    #[serde(default)]
    pub height: f64,
}

impl Default for GeoAnchor {
    /// Central Beijing at ellipsoid height
    fn default() -> Self {
        Self {
            longitude: 116.3912757,
            latitude: 39.906217,
            height: 0.0,
        }
    }
}

impl GeoAnchor {
    pub fn transform(&self) -> GeoTransform {
        GeoTransform::compute(self.longitude, self.latitude, self.height)
    }
}

/// Settings for one conversion run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionConfig {
    /// Number of LOD levels to generate
    pub lod_levels: u32,

    /// Geographic placement of the model
    pub anchor: GeoAnchor,

    /// Padding of the GLB JSON chunk
    pub glb_json_padding: GlbJsonPadding,

    /// Executable used to turn FBX into glTF
    pub converter: String,

    /// Leave the temp/ staging directory in place after a run
    pub keep_temp: bool,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            lod_levels: DEFAULT_LOD_LEVELS,
            anchor: GeoAnchor::default(),
            glb_json_padding: GlbJsonPadding::None,
            converter: DEFAULT_CONVERTER.to_string(),
            keep_temp: false,
        }
    }
}

impl ConversionConfig {
    /// Load configuration from a JSON file; missing keys take defaults
    pub fn load(path: &Path) -> TilesResult<Self> {
        let data = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&data)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file
    pub fn save(&self, path: &Path) -> TilesResult<()> {
        let data = serde_json::to_string_pretty(self)?;
        std::fs::write(path, data)?;
        Ok(())
    }

    pub fn validate(&self) -> TilesResult<()> {
        if self.lod_levels == 0 {
            return Err(TilesError::precondition("lod_levels must be at least 1"));
        }
        let a = &self.anchor;
        if !(a.longitude.is_finite() && a.latitude.is_finite() && a.height.is_finite()) {
            return Err(TilesError::precondition(format!(
                "anchor must be finite, got ({}, {}, {})",
                a.longitude, a.latitude, a.height
            )));
        }
        Ok(())
    }

    pub fn pack_options(&self) -> PackOptions {
        PackOptions {
            glb_json_padding: self.glb_json_padding,
        }
    }
}
