// src/pipeline.rs
// End-to-end conversion: source model -> glTF -> b3dm tiles + tileset.json
// RELEVANT FILES: src/convert/mod.rs, src/tiles3d/mod.rs, src/config.rs

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::config::ConversionConfig;
use crate::convert::converter_for;
use crate::error::{TilesError, TilesResult};
use crate::io::Asset;
use crate::tiles3d::{
    buffer_file_name, build, encode_levels, tile_file_name, BoundingVolumeSource, EncodedTile,
    FixedBox, LevelOfDetailGenerator, ReplicateSource, Tileset, TILES_DIR,
};

/// Staging directory created inside the output directory
pub const TEMP_DIR: &str = "temp";

/// Name of the tileset document in the output directory
pub const TILESET_FILE: &str = "tileset.json";

/// Files written by a conversion run
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionReport {
    pub tileset_path: PathBuf,
    pub tile_paths: Vec<PathBuf>,
    pub buffer_paths: Vec<PathBuf>,
    pub tileset: Tileset,
}

/// Conversion driver with pluggable bounds and LOD sources
pub struct Pipeline {
    config: ConversionConfig,
    bounds: Box<dyn BoundingVolumeSource>,
    lod: Box<dyn LevelOfDetailGenerator>,
}

impl Pipeline {
    pub fn new(config: ConversionConfig) -> Self {
        Self {
            config,
            bounds: Box::new(FixedBox::default()),
            lod: Box::new(ReplicateSource),
        }
    }

    pub fn with_bounding_volume_source(mut self, bounds: Box<dyn BoundingVolumeSource>) -> Self {
        self.bounds = bounds;
        self
    }

    pub fn with_lod_generator(mut self, lod: Box<dyn LevelOfDetailGenerator>) -> Self {
        self.lod = lod;
        self
    }

    /// Convert `input` (FBX or glTF) into a tileset under `output_dir`.
    ///
    /// The temp/ staging directory is removed after a successful run unless
    /// `keep_temp` is set; after a failure it is left for inspection.
    pub fn run(&self, input: &Path, output_dir: &Path) -> TilesResult<ConversionReport> {
        self.config.validate()?;
        if !input.exists() {
            return Err(TilesError::AssetNotFound(input.to_path_buf()));
        }
        let converter = converter_for(input, &self.config.converter)?;

        let anchor = &self.config.anchor;
        info!("Starting conversion of {} to 3D Tiles", input.display());
        info!("Output directory: {}", output_dir.display());
        info!(
            "Geographic coordinates: Lon={}, Lat={}, Height={}",
            anchor.longitude, anchor.latitude, anchor.height
        );

        let staging_dir = output_dir.join(TEMP_DIR);
        fs::create_dir_all(&staging_dir)?;

        let gltf_path = converter.convert(input, &staging_dir)?;
        let report = self.tile_gltf(&gltf_path, output_dir)?;

        if self.config.keep_temp {
            debug!("keeping staging directory {}", staging_dir.display());
        } else if let Err(e) = fs::remove_dir_all(&staging_dir) {
            warn!("could not remove {}: {}", staging_dir.display(), e);
        }

        info!("Conversion completed: {}", report.tileset_path.display());
        Ok(report)
    }

    /// Tile an existing glTF document into `output_dir`.
    ///
    /// All tiles are encoded and the tileset assembled before any file is
    /// written, so a failing level leaves the output directory untouched.
    pub fn tile_gltf(&self, gltf_path: &Path, output_dir: &Path) -> TilesResult<ConversionReport> {
        self.config.validate()?;
        let asset = Asset::load(gltf_path)?;

        let transform = self.config.anchor.transform();
        let bounding_volume = self.bounds.bounding_volume();
        let tiles = encode_levels(
            &asset,
            self.config.lod_levels,
            self.lod.as_ref(),
            &self.config.pack_options(),
        )?;
        let tileset = build(&tiles, &transform, &bounding_volume)?;

        let (tile_paths, buffer_paths) = write_tiles(&tiles, &output_dir.join(TILES_DIR))?;
        let tileset_path = output_dir.join(TILESET_FILE);
        tileset.save(&tileset_path)?;

        Ok(ConversionReport {
            tileset_path,
            tile_paths,
            buffer_paths,
            tileset,
        })
    }
}

/// Write each tile's b3dm, plus its external buffer when present
pub fn write_tiles(
    tiles: &[EncodedTile],
    tiles_dir: &Path,
) -> TilesResult<(Vec<PathBuf>, Vec<PathBuf>)> {
    fs::create_dir_all(tiles_dir)?;
    let mut tile_paths = Vec::with_capacity(tiles.len());
    let mut buffer_paths = Vec::new();

    for tile in tiles {
        let b3dm_path = tiles_dir.join(tile_file_name(tile.level));
        fs::write(&b3dm_path, &tile.b3dm)?;
        debug!("wrote {} ({} bytes)", b3dm_path.display(), tile.b3dm.len());
        tile_paths.push(b3dm_path);

        if let Some(buffer) = &tile.external_buffer {
            let bin_path = tiles_dir.join(buffer_file_name(tile.level));
            fs::write(&bin_path, buffer)?;
            buffer_paths.push(bin_path);
        }
    }
    Ok((tile_paths, buffer_paths))
}
