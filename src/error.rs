//! Central error handling for model2tiles
//!
//! One `TilesError` enum covers every stage of a conversion run. All variants
//! are terminal for the run; nothing in the crate retries.

use std::path::PathBuf;

/// Centralized error type for loading, packaging and tileset assembly
#[derive(thiserror::Error, Debug)]
pub enum TilesError {
    #[error("Asset not found: {}", .0.display())]
    AssetNotFound(PathBuf),

    #[error("Asset serialization error: {0}")]
    AssetSerialization(#[source] serde_json::Error),

    #[error("Cannot build a tileset from an empty tile list")]
    EmptyTileSet,

    #[error("Precondition failed: {0}")]
    Precondition(String),

    #[error("Invalid b3dm: {0}")]
    InvalidB3dm(String),

    #[error("Invalid glTF: {0}")]
    InvalidGltf(String),

    #[error("LOD level {level}: {source}")]
    LodLevel {
        level: u32,
        #[source]
        source: Box<TilesError>,
    },

    #[error("Converter error: {0}")]
    Converter(String),

    #[error("Unsupported input file: {}", .0.display())]
    UnsupportedInput(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl TilesError {
    /// Convenience constructors for common error types
    pub fn precondition<T: ToString>(msg: T) -> Self {
        TilesError::Precondition(msg.to_string())
    }

    pub fn invalid_b3dm<T: ToString>(msg: T) -> Self {
        TilesError::InvalidB3dm(msg.to_string())
    }

    pub fn invalid_gltf<T: ToString>(msg: T) -> Self {
        TilesError::InvalidGltf(msg.to_string())
    }

    pub fn converter<T: ToString>(msg: T) -> Self {
        TilesError::Converter(msg.to_string())
    }

    /// Attach the LOD level a failure came from
    pub fn at_level(self, level: u32) -> Self {
        TilesError::LodLevel {
            level,
            source: Box::new(self),
        }
    }

    /// Innermost error, looking through any `LodLevel` wrappers
    pub fn root_cause(&self) -> &TilesError {
        match self {
            TilesError::LodLevel { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

/// Result type alias for conversion operations
pub type TilesResult<T> = Result<T, TilesError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_context_is_reported_and_unwrapped() {
        let err = TilesError::precondition("buffer too short").at_level(2);
        let msg = err.to_string();
        assert!(msg.contains("LOD level 2"));
        assert!(msg.contains("buffer too short"));
        assert!(matches!(err.root_cause(), TilesError::Precondition(_)));
    }
}
