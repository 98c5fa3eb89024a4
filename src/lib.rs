//! model2tiles: package a static 3D model as a geolocated 3D Tiles tileset.
//!
//! The model (FBX through an external converter, or glTF directly) is encoded
//! once per level of detail as a b3dm tile, and the tiles are chained under a
//! root placed on the WGS84 ellipsoid by an East-North-Up transform.
//!
//! ```no_run
//! use model2tiles::{ConversionConfig, Pipeline};
//! use std::path::Path;
//!
//! let report = Pipeline::new(ConversionConfig::default())
//!     .run(Path::new("model.fbx"), Path::new("out"))?;
//! println!("{}", report.tileset_path.display());
//! # Ok::<(), model2tiles::TilesError>(())
//! ```

pub mod cli;
pub mod config;
pub mod convert;
pub mod error;
pub mod geo;
pub mod io;
pub mod pipeline;
pub mod tiles3d;

pub use config::{ConversionConfig, GeoAnchor};
pub use error::{TilesError, TilesResult};
pub use geo::GeoTransform;
pub use io::{Asset, BufferSource};
pub use pipeline::{ConversionReport, Pipeline};
pub use tiles3d::{BoundingVolume, EncodedTile, Tileset};
