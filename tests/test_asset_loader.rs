// tests/test_asset_loader.rs
// Buffer resolution order: sibling file, directory scan, embedded URI, absent

use std::fs;
use std::path::Path;

use model2tiles::io::{resolve_buffer, Asset, BufferSource, BufferStrategy};
use model2tiles::TilesError;
use serde_json::json;

fn write_gltf(dir: &Path, name: &str, buffer_uri: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    let doc = json!({
        "asset": { "version": "2.0" },
        "buffers": [{ "byteLength": 4, "uri": buffer_uri }]
    });
    fs::write(&path, serde_json::to_string(&doc).unwrap()).unwrap();
    path
}

#[test]
fn test_missing_document_is_asset_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let err = Asset::load(dir.path().join("nope.gltf")).unwrap_err();
    assert!(matches!(err, TilesError::AssetNotFound(_)));
}

#[test]
fn test_invalid_json_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.gltf");
    fs::write(&path, "{ not json").unwrap();
    assert!(matches!(Asset::load(&path), Err(TilesError::Json(_))));
}

#[test]
fn test_sibling_file_wins() {
    let dir = tempfile::tempdir().unwrap();
    let gltf = write_gltf(dir.path(), "model.gltf", "model.bin");
    fs::write(dir.path().join("aaa.bin"), [9u8; 4]).unwrap();
    fs::write(dir.path().join("model.bin"), [1u8, 2, 3, 4]).unwrap();

    let asset = Asset::load(&gltf).unwrap();
    assert_eq!(asset.external_buffer(), Some(&[1u8, 2, 3, 4][..]));
    match &asset.buffer {
        BufferSource::External { path, .. } => assert!(path.ends_with("model.bin")),
        other => panic!("expected external buffer, got {other:?}"),
    }
}

#[test]
fn test_directory_scan_picks_first_by_name() {
    let dir = tempfile::tempdir().unwrap();
    let gltf = write_gltf(dir.path(), "scene.gltf", "buffer0.bin");
    fs::write(dir.path().join("b.bin"), [2u8; 4]).unwrap();
    fs::write(dir.path().join("a.bin"), [1u8; 4]).unwrap();

    let asset = Asset::load(&gltf).unwrap();
    assert_eq!(asset.external_buffer(), Some(&[1u8; 4][..]));
}

#[test]
fn test_embedded_uri_without_bin_files() {
    let dir = tempfile::tempdir().unwrap();
    let gltf = write_gltf(
        dir.path(),
        "model.gltf",
        "data:application/octet-stream;base64,AAAAAA==",
    );
    let asset = Asset::load(&gltf).unwrap();
    assert!(asset.is_embedded());
    assert!(asset.external_buffer().is_none());
}

#[test]
fn test_no_buffers_is_absent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.gltf");
    fs::write(&path, r#"{"asset":{"version":"2.0"}}"#).unwrap();

    let asset = Asset::load(&path).unwrap();
    assert_eq!(asset.buffer, BufferSource::Absent);
    assert!(asset.validate().is_ok());
}

#[test]
fn test_custom_strategy_order() {
    let dir = tempfile::tempdir().unwrap();
    let gltf = write_gltf(
        dir.path(),
        "model.gltf",
        "data:application/octet-stream;base64,AAAAAA==",
    );
    fs::write(dir.path().join("model.bin"), [7u8; 4]).unwrap();
    let text = fs::read_to_string(&gltf).unwrap();
    let doc: serde_json::Value = serde_json::from_str(&text).unwrap();

    let embedded_first = resolve_buffer(
        &gltf,
        &doc,
        &[BufferStrategy::EmbeddedUri, BufferStrategy::SiblingFile],
    );
    assert_eq!(embedded_first, BufferSource::Embedded);

    let default_order = Asset::load(&gltf).unwrap();
    assert_eq!(default_order.external_buffer(), Some(&[7u8; 4][..]));
}
