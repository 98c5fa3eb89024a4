//! Tile structure for 3D Tiles

use serde::{Deserialize, Serialize};

use super::bounds::BoundingVolume;

/// Refinement strategy for child tiles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TileRefine {
    /// Replace parent tile with children
    Replace,
}

impl Default for TileRefine {
    fn default() -> Self {
        Self::Replace
    }
}

/// Content description for a tile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileContent {
    /// URI to the tile content, relative to tileset.json
    pub uri: String,
}

/// A single tile in the 3D Tiles hierarchy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    /// Optional 4x4 transform matrix (column-major)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transform: Option<[f64; 16]>,
    /// Bounding volume enclosing the tile
    #[serde(rename = "boundingVolume")]
    pub bounding_volume: BoundingVolume,
    /// Geometric error in meters (controls LOD selection)
    #[serde(rename = "geometricError")]
    pub geometric_error: f64,
    /// Refinement strategy
    #[serde(default)]
    pub refine: TileRefine,
    /// Optional content (tile may be empty, containing only children)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<TileContent>,
    /// Child tiles
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Tile>,
}

impl Tile {
    /// Content-less node, used for the root and pass-through ancestors
    pub fn empty(bounding_volume: BoundingVolume, geometric_error: f64) -> Self {
        Self {
            transform: None,
            bounding_volume,
            geometric_error,
            refine: TileRefine::Replace,
            content: None,
            children: Vec::new(),
        }
    }

    /// Node whose content lives at `uri`
    pub fn with_content(
        bounding_volume: BoundingVolume,
        geometric_error: f64,
        uri: impl Into<String>,
    ) -> Self {
        Self {
            content: Some(TileContent { uri: uri.into() }),
            ..Self::empty(bounding_volume, geometric_error)
        }
    }

    /// Check if this tile has renderable content
    pub fn has_content(&self) -> bool {
        self.content.is_some()
    }

    /// Get the content URI if present
    pub fn content_uri(&self) -> Option<&str> {
        self.content.as_ref().map(|c| c.uri.as_str())
    }

    /// Count total tiles in this subtree
    pub fn count_tiles(&self) -> usize {
        1 + self.children.iter().map(|c| c.count_tiles()).sum::<usize>()
    }

    /// Get maximum depth of this subtree
    pub fn max_depth(&self) -> usize {
        if self.children.is_empty() {
            1
        } else {
            1 + self.children.iter().map(|c| c.max_depth()).max().unwrap_or(0)
        }
    }

    /// Follow first children from this tile down to a leaf.
    ///
    /// For a LOD chain this visits every level, coarsest first.
    pub fn chain(&self) -> Vec<&Tile> {
        let mut out = vec![self];
        let mut current = self;
        while let Some(child) = current.children.first() {
            out.push(child);
            current = child;
        }
        out
    }
}
