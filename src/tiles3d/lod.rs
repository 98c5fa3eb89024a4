//! Level-of-detail generation and per-level tile encoding

use std::borrow::Cow;

use log::{debug, info};

use crate::error::TilesResult;
use crate::io::Asset;

use super::b3dm::{pack_with, PackOptions};

/// Directory, relative to tileset.json, holding tile content
pub const TILES_DIR: &str = "tiles";

/// File name of the b3dm for a LOD level
pub fn tile_file_name(level: u32) -> String {
    format!("model_lod{}.b3dm", level)
}

/// File name of the external buffer for a LOD level
pub fn buffer_file_name(level: u32) -> String {
    format!("buffer_lod{}.bin", level)
}

/// Produces the asset to encode at each level of detail.
pub trait LevelOfDetailGenerator {
    fn generate<'a>(&self, source: &'a Asset, level: u32) -> TilesResult<Cow<'a, Asset>>;
}

/// Uses the source asset unchanged at every level.
///
/// No simplification happens: all levels hold the same mesh and differ only
/// in the geometric error the tileset assigns them.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReplicateSource;

impl LevelOfDetailGenerator for ReplicateSource {
    fn generate<'a>(&self, source: &'a Asset, _level: u32) -> TilesResult<Cow<'a, Asset>> {
        Ok(Cow::Borrowed(source))
    }
}

/// One packaged LOD level
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedTile {
    pub level: u32,
    pub b3dm: Vec<u8>,
    /// Raw external buffer to write as `tiles/buffer_lod{level}.bin`
    pub external_buffer: Option<Vec<u8>>,
}

impl EncodedTile {
    /// Content URI relative to tileset.json
    pub fn content_uri(&self) -> String {
        format!("{}/{}", TILES_DIR, tile_file_name(self.level))
    }
}

/// Generate and package levels `0..levels`, in that order.
///
/// Stops at the first failing level; the error names the level.
pub fn encode_levels(
    asset: &Asset,
    levels: u32,
    generator: &dyn LevelOfDetailGenerator,
    options: &PackOptions,
) -> TilesResult<Vec<EncodedTile>> {
    info!("Creating {} LOD levels", levels);
    (0..levels)
        .map(|level| -> TilesResult<EncodedTile> {
            let lod_asset = generator
                .generate(asset, level)
                .map_err(|e| e.at_level(level))?;
            let (b3dm, external_buffer) =
                pack_with(&lod_asset, level, options).map_err(|e| e.at_level(level))?;
            debug!("LOD {} packaged", level);
            Ok(EncodedTile {
                level,
                b3dm,
                external_buffer,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TilesError;
    use crate::io::BufferSource;
    use serde_json::json;

    #[test]
    fn replicated_levels_share_payload() {
        let document = json!({ "asset": { "version": "2.0" } });
        let asset = Asset::new(document, BufferSource::Absent);
        let options = PackOptions::default();
        let tiles = encode_levels(&asset, 3, &ReplicateSource, &options).unwrap();
        let levels: Vec<u32> = tiles.iter().map(|t| t.level).collect();
        assert_eq!(levels, vec![0, 1, 2]);
        assert!(tiles.iter().all(|t| t.b3dm == tiles[0].b3dm));
        assert!(tiles.iter().all(|t| t.external_buffer.is_none()));
        assert_eq!(tiles[2].content_uri(), "tiles/model_lod2.b3dm");
    }

    #[test]
    fn failures_carry_the_level() {
        struct FailAt(u32);
        impl LevelOfDetailGenerator for FailAt {
            fn generate<'a>(&self, source: &'a Asset, level: u32) -> TilesResult<Cow<'a, Asset>> {
                if level == self.0 {
                    Err(TilesError::precondition("simplification failed"))
                } else {
                    Ok(Cow::Borrowed(source))
                }
            }
        }

        let asset = Asset::new(json!({}), BufferSource::Absent);
        let options = PackOptions::default();
        let err = encode_levels(&asset, 4, &FailAt(2), &options).unwrap_err();
        assert!(matches!(err, TilesError::LodLevel { level: 2, .. }));
    }
}
