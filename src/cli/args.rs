// src/cli/args.rs
// Command line arguments for the model2tiles binary
// Flags override values loaded from --config; unset flags leave them alone

use std::path::PathBuf;

use clap::Parser;

use crate::config::ConversionConfig;
use crate::tiles3d::GlbJsonPadding;

/// Convert FBX or glTF models to 3D Tiles format
#[derive(Debug, Clone, Parser)]
#[command(name = "model2tiles", version, about)]
pub struct CliArgs {
    /// Path to the input model (.fbx or .gltf)
    pub input_file: PathBuf,

    /// Directory to write tileset.json and tiles/ into
    pub output_dir: PathBuf,

    /// JSON configuration file; flags below override its values
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Number of LOD levels to generate (default: 3)
    #[arg(long)]
    pub lod_levels: Option<u32>,

    /// Longitude in degrees (WGS84)
    #[arg(long, allow_negative_numbers = true)]
    pub longitude: Option<f64>,

    /// Latitude in degrees (WGS84)
    #[arg(long, allow_negative_numbers = true)]
    pub latitude: Option<f64>,

    /// Height in meters above the ellipsoid
    #[arg(long, allow_negative_numbers = true)]
    pub height: Option<f64>,

    /// FBX to glTF converter executable
    #[arg(long)]
    pub converter: Option<String>,

    /// Pad the GLB JSON chunk to a 4-byte boundary
    #[arg(long)]
    pub pad_glb_json: bool,

    /// Keep the temp/ staging directory
    #[arg(long)]
    pub keep_temp: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl CliArgs {
    /// Apply the flags that were given on top of `config`
    pub fn apply_to(&self, config: &mut ConversionConfig) {
        if let Some(levels) = self.lod_levels {
            config.lod_levels = levels;
        }
        if let Some(lon) = self.longitude {
            config.anchor.longitude = lon;
        }
        if let Some(lat) = self.latitude {
            config.anchor.latitude = lat;
        }
        if let Some(h) = self.height {
            config.anchor.height = h;
        }
        if let Some(converter) = &self.converter {
            config.converter = converter.clone();
        }
        if self.pad_glb_json {
            config.glb_json_padding = GlbJsonPadding::Spaces;
        }
        if self.keep_temp {
            config.keep_temp = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GeoAnchor;

    #[test]
    fn positional_only_keeps_defaults() {
        let args = CliArgs::try_parse_from(["model2tiles", "model.fbx", "out"]).unwrap();
        let mut cfg = ConversionConfig::default();
        args.apply_to(&mut cfg);
        assert_eq!(cfg, ConversionConfig::default());
        assert_eq!(args.input_file, PathBuf::from("model.fbx"));
        assert!(!args.verbose);
    }

    #[test]
    fn flags_override_config() {
        let args = CliArgs::try_parse_from([
            "model2tiles",
            "model.gltf",
            "out",
            "--lod-levels",
            "5",
            "--longitude",
            "-122.4194",
            "--latitude",
            "37.7749",
            "--height",
            "50",
            "--pad-glb-json",
            "-v",
        ])
        .unwrap();
        let mut cfg = ConversionConfig::default();
        args.apply_to(&mut cfg);
        assert_eq!(cfg.lod_levels, 5);
        assert_eq!(
            cfg.anchor,
            GeoAnchor {
                longitude: -122.4194,
                latitude: 37.7749,
                height: 50.0
            }
        );
        assert_eq!(cfg.glb_json_padding, GlbJsonPadding::Spaces);
        assert!(args.verbose);
    }

    #[test]
    fn reject_missing_output_dir() {
        assert!(CliArgs::try_parse_from(["model2tiles", "model.fbx"]).is_err());
    }
}
