//! 3D Tiles output for model2tiles
//!
//! Packages glTF assets as b3dm tiles and assembles them into a LOD chain
//! described by tileset.json.

mod b3dm;
mod bounds;
mod lod;
mod tile;
mod tileset;

pub use b3dm::{
    assemble_b3dm, build_glb, pack, pack_with, padded_json, split_glb, B3dmHeader, B3dmView,
    GlbChunks, GlbJsonPadding, PackOptions, B3DM_HEADER_LEN, B3DM_MAGIC, B3DM_VERSION,
    GLB_CHUNK_BIN, GLB_CHUNK_JSON, GLB_HEADER_LEN, GLB_MAGIC, GLB_VERSION,
};
pub use bounds::{BoundingVolume, BoundingVolumeSource, FixedBox, PLACEHOLDER_HALF_EXTENT};
pub use lod::{
    buffer_file_name, encode_levels, tile_file_name, EncodedTile, LevelOfDetailGenerator,
    ReplicateSource, TILES_DIR,
};
pub use tile::{Tile, TileContent, TileRefine};
pub use tileset::{
    build, lod_geometric_error, Tileset, TilesetAsset, ROOT_GEOMETRIC_ERROR,
    TILESET_GEOMETRIC_ERROR,
};
