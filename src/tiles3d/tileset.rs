//! Tileset assembly and I/O for 3D Tiles

use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};

use super::bounds::BoundingVolume;
use super::lod::EncodedTile;
use super::tile::Tile;

use crate::error::{TilesError, TilesResult};
use crate::geo::GeoTransform;

/// Geometric error of the root tile
pub const ROOT_GEOMETRIC_ERROR: f64 = 100.0;
/// Geometric error of the tileset document; must exceed the root's
pub const TILESET_GEOMETRIC_ERROR: f64 = 200.0;

/// Asset metadata for the tileset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TilesetAsset {
    /// 3D Tiles version
    pub version: String,
    /// Application-specific version
    #[serde(rename = "tilesetVersion")]
    pub tileset_version: String,
    /// Up axis of the embedded glTF content
    #[serde(rename = "gltfUpAxis")]
    pub gltf_up_axis: String,
}

impl Default for TilesetAsset {
    fn default() -> Self {
        Self {
            version: "1.0".into(),
            tileset_version: "1.0".into(),
            gltf_up_axis: "Y".into(),
        }
    }
}

/// Root tileset.json structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tileset {
    /// Asset metadata
    pub asset: TilesetAsset,
    /// Geometric error of the tileset
    #[serde(rename = "geometricError")]
    pub geometric_error: f64,
    /// Root tile
    pub root: Tile,
}

/// Geometric error of the content node `depth` levels below the root (depth >= 1)
pub fn lod_geometric_error(depth: usize) -> f64 {
    ROOT_GEOMETRIC_ERROR / 2f64.powi(depth as i32)
}

/// Assemble the LOD chain for `tiles`.
///
/// Tiles are visited from the last to the first: the last tile sits directly
/// under the root with error 50, and each earlier tile nests one level deeper
/// with half the error of its parent. The root carries the geodetic
/// transform and no content. Every node shares `bounding_volume`.
pub fn build(
    tiles: &[EncodedTile],
    transform: &GeoTransform,
    bounding_volume: &BoundingVolume,
) -> TilesResult<Tileset> {
    if tiles.is_empty() {
        return Err(TilesError::EmptyTileSet);
    }

    let count = tiles.len();
    let mut chain: Option<Tile> = None;
    for (index, encoded) in tiles.iter().enumerate() {
        let depth = count - index;
        let mut node = Tile::with_content(
            *bounding_volume,
            lod_geometric_error(depth),
            encoded.content_uri(),
        );
        node.children.extend(chain.take());
        chain = Some(node);
    }

    let mut root = Tile::empty(*bounding_volume, ROOT_GEOMETRIC_ERROR);
    root.transform = Some(*transform.as_array());
    root.children.extend(chain);

    info!("Built tileset with {} LOD tiles", count);
    Ok(Tileset {
        asset: TilesetAsset::default(),
        geometric_error: TILESET_GEOMETRIC_ERROR,
        root,
    })
}

impl Tileset {
    /// Load a tileset from a file path
    pub fn load<P: AsRef<Path>>(path: P) -> TilesResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parse a tileset from a JSON string
    pub fn from_json(json_str: &str) -> TilesResult<Self> {
        Ok(serde_json::from_str(json_str)?)
    }

    /// Pretty-printed JSON (two-space indentation)
    pub fn to_json_pretty(&self) -> TilesResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write tileset.json
    pub fn save<P: AsRef<Path>>(&self, path: P) -> TilesResult<()> {
        std::fs::write(path, self.to_json_pretty()?)?;
        Ok(())
    }

    /// Get the root tile
    pub fn root(&self) -> &Tile {
        &self.root
    }

    /// Get total tile count
    pub fn tile_count(&self) -> usize {
        self.root.count_tiles()
    }

    /// Get maximum depth of the tile hierarchy
    pub fn max_depth(&self) -> usize {
        self.root.max_depth()
    }

    /// Content URIs from the coarsest tile to the finest
    pub fn content_uris(&self) -> Vec<&str> {
        self.root.chain().into_iter().filter_map(Tile::content_uri).collect()
    }
}
