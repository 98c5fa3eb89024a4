// src/io/gltf_asset.rs
// glTF asset loading: parse the JSON document and resolve its binary buffer.
// Buffer lookup runs an ordered list of strategies; the first definite match wins.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use serde_json::Value;

use crate::error::{TilesError, TilesResult};

/// File extension of external glTF binary buffers
pub const BIN_EXTENSION: &str = "bin";

/// Where an asset's binary buffer lives
#[derive(Debug, Clone, PartialEq)]
pub enum BufferSource {
    /// Raw bytes read from a file next to the document
    External { path: PathBuf, bytes: Vec<u8> },
    /// The document carries its buffer inline as a data URI
    Embedded,
    /// No buffer was found or declared
    Absent,
}

/// One way of locating a document's binary buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferStrategy {
    /// `<stem>.bin` beside the document
    SiblingFile,
    /// First `*.bin` (by file name) in the document's directory
    DirectoryScan,
    /// `data:` URI on the document's first buffer
    EmbeddedUri,
}

/// Strategies tried by [`Asset::load`], in order
pub const DEFAULT_STRATEGIES: [BufferStrategy; 3] = [
    BufferStrategy::SiblingFile,
    BufferStrategy::DirectoryScan,
    BufferStrategy::EmbeddedUri,
];

impl BufferStrategy {
    /// Try this strategy. `None` means "no match", never a failure.
    pub fn probe(self, document_path: &Path, document: &Value) -> Option<BufferSource> {
        match self {
            Self::SiblingFile => {
                let candidate = document_path.with_extension(BIN_EXTENSION);
                if candidate.is_file() {
                    read_external(candidate)
                } else {
                    debug!("no sibling buffer at {}", candidate.display());
                    None
                }
            }
            Self::DirectoryScan => {
                let dir = parent_dir(document_path);
                let mut found: Vec<PathBuf> = fs::read_dir(dir)
                    .ok()?
                    .filter_map(|entry| entry.ok().map(|e| e.path()))
                    .filter(|p| p.is_file() && has_bin_extension(p))
                    .collect();
                found.sort();
                match found.into_iter().next() {
                    Some(path) => {
                        debug!("using buffer found by directory scan: {}", path.display());
                        read_external(path)
                    }
                    None => {
                        debug!("no .{} files in {}", BIN_EXTENSION, dir.display());
                        None
                    }
                }
            }
            Self::EmbeddedUri => {
                if first_buffer(document).map_or(false, has_data_uri) {
                    debug!("binary data is embedded in the document");
                    Some(BufferSource::Embedded)
                } else {
                    None
                }
            }
        }
    }
}

/// Run `strategies` in order and return the first match, or `Absent`.
pub fn resolve_buffer(
    document_path: &Path,
    document: &Value,
    strategies: &[BufferStrategy],
) -> BufferSource {
    strategies
        .iter()
        .find_map(|s| s.probe(document_path, document))
        .unwrap_or_else(|| {
            debug!("no binary buffer for {}", document_path.display());
            BufferSource::Absent
        })
}

/// A parsed glTF document plus its resolved binary buffer
#[derive(Debug, Clone, PartialEq)]
pub struct Asset {
    pub document: Value,
    pub buffer: BufferSource,
}

impl Asset {
    pub fn new(document: Value, buffer: BufferSource) -> Self {
        Self { document, buffer }
    }

    /// Load a glTF document and resolve its buffer with [`DEFAULT_STRATEGIES`]
    pub fn load<P: AsRef<Path>>(path: P) -> TilesResult<Self> {
        Self::load_with(path, &DEFAULT_STRATEGIES)
    }

    pub fn load_with<P: AsRef<Path>>(path: P, strategies: &[BufferStrategy]) -> TilesResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(TilesError::AssetNotFound(path.to_path_buf()));
        }
        let text = fs::read_to_string(path)?;
        let document: Value = serde_json::from_str(&text)?;
        let buffer = resolve_buffer(path, &document, strategies);
        Ok(Self { document, buffer })
    }

    /// External buffer bytes, if any. An empty file counts as no buffer.
    pub fn external_buffer(&self) -> Option<&[u8]> {
        match &self.buffer {
            BufferSource::External { bytes, .. } if !bytes.is_empty() => Some(bytes),
            _ => None,
        }
    }

    pub fn is_embedded(&self) -> bool {
        matches!(self.buffer, BufferSource::Embedded)
    }

    /// `byteLength` declared by the first buffer, if any
    ///
    /// Integral floats such as `1024.0` are accepted; anything else that is
    /// not a non-negative integer is a precondition failure.
    pub fn declared_buffer_length(&self) -> TilesResult<Option<u64>> {
        let buffer = first_buffer(&self.document);
        let Some(value) = buffer.and_then(|b| b.get("byteLength")) else {
            return Ok(None);
        };
        if let Some(n) = value.as_u64() {
            return Ok(Some(n));
        }
        match value.as_f64() {
            Some(f) if f >= 0.0 && f.fract() == 0.0 && f <= u64::MAX as f64 => Ok(Some(f as u64)),
            _ => Err(TilesError::precondition(format!(
                "buffer 0 has invalid byteLength {}",
                value
            ))),
        }
    }

    /// Check that a declared, non-inline buffer has matching external bytes.
    pub fn validate(&self) -> TilesResult<()> {
        let Some(buffer) = first_buffer(&self.document) else {
            return Ok(());
        };
        if has_data_uri(buffer) {
            return Ok(());
        }
        let declared = self.declared_buffer_length()?.unwrap_or(0);
        if declared == 0 {
            return Ok(());
        }
        match self.external_buffer() {
            Some(bytes) if bytes.len() as u64 == declared => Ok(()),
            Some(bytes) => Err(TilesError::precondition(format!(
                "buffer 0 declares byteLength {} but the external buffer holds {} bytes",
                declared,
                bytes.len()
            ))),
            None => Err(TilesError::precondition(format!(
                "buffer 0 declares byteLength {} but no external buffer was supplied",
                declared
            ))),
        }
    }
}

fn read_external(path: PathBuf) -> Option<BufferSource> {
    match fs::read(&path) {
        Ok(bytes) => {
            if bytes.is_empty() {
                warn!("buffer file {} is empty", path.display());
            }
            Some(BufferSource::External { path, bytes })
        }
        Err(e) => {
            debug!("could not read buffer {}: {}", path.display(), e);
            None
        }
    }
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    }
}

fn has_bin_extension(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some(BIN_EXTENSION)
}

pub(crate) fn first_buffer(document: &Value) -> Option<&Value> {
    document.get("buffers")?.as_array()?.first()
}

fn has_data_uri(buffer: &Value) -> bool {
    buffer
        .get("uri")
        .and_then(Value::as_str)
        .map_or(false, |uri| uri.starts_with("data:"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn external(bytes: Vec<u8>) -> BufferSource {
        BufferSource::External {
            path: PathBuf::from("model.bin"),
            bytes,
        }
    }

    #[test]
    fn declared_length_must_match_external_bytes() {
        let doc = json!({ "buffers": [{ "byteLength": 1024, "uri": "model.bin" }] });
        let asset = Asset::new(doc.clone(), external(vec![0; 512]));
        assert!(matches!(asset.validate(), Err(TilesError::Precondition(_))));

        let asset = Asset::new(doc, external(vec![0; 1024]));
        assert!(asset.validate().is_ok());
    }

    #[test]
    fn float_byte_length_is_still_checked() {
        let doc = json!({ "buffers": [{ "byteLength": 1024.0, "uri": "model.bin" }] });
        let asset = Asset::new(doc.clone(), external(vec![0; 512]));
        assert_eq!(asset.declared_buffer_length().unwrap(), Some(1024));
        let err = asset.validate().unwrap_err();
        assert!(err.to_string().contains("1024"));

        let asset = Asset::new(doc, external(vec![0; 1024]));
        assert!(asset.validate().is_ok());
    }

    #[test]
    fn fractional_or_negative_byte_length_is_rejected() {
        for bad in [json!(10.5), json!(-4), json!("16")] {
            let doc = json!({ "buffers": [{ "byteLength": bad, "uri": "model.bin" }] });
            let asset = Asset::new(doc, external(vec![0; 16]));
            assert!(matches!(asset.validate(), Err(TilesError::Precondition(_))));
        }
    }

    #[test]
    fn declared_buffer_without_bytes_is_rejected() {
        let doc = json!({ "buffers": [{ "byteLength": 16, "uri": "missing.bin" }] });
        let asset = Asset::new(doc, BufferSource::Absent);
        let err = asset.validate().unwrap_err();
        assert!(err.to_string().contains("no external buffer"));
    }

    #[test]
    fn inline_and_undeclared_buffers_pass() {
        let inline = json!({ "buffers": [{
            "byteLength": 4,
            "uri": "data:application/octet-stream;base64,AAAAAA=="
        }] });
        assert!(Asset::new(inline, BufferSource::Embedded).validate().is_ok());

        let none = json!({ "asset": { "version": "2.0" } });
        assert!(Asset::new(none, BufferSource::Absent).validate().is_ok());
    }

    #[test]
    fn empty_external_file_counts_as_no_buffer() {
        let asset = Asset::new(json!({}), external(Vec::new()));
        assert!(asset.external_buffer().is_none());
    }

    #[test]
    fn embedded_strategy_only_matches_data_uris() {
        let path = Path::new("does/not/exist/model.gltf");
        let embedded = json!({
            "buffers": [{ "uri": "data:application/octet-stream;base64,AA==" }]
        });
        let external = json!({ "buffers": [{ "uri": "model.bin" }] });
        assert_eq!(
            BufferStrategy::EmbeddedUri.probe(path, &embedded),
            Some(BufferSource::Embedded)
        );
        assert_eq!(BufferStrategy::EmbeddedUri.probe(path, &external), None);
    }
}
