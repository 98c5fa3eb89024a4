//! IO module: glTF asset loading and buffer resolution.

pub mod gltf_asset;

pub use gltf_asset::{
    resolve_buffer, Asset, BufferSource, BufferStrategy, BIN_EXTENSION, DEFAULT_STRATEGIES,
};
