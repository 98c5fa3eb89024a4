// src/convert/mod.rs
// Turning source models into glTF before tiling
// RELEVANT FILES: src/pipeline.rs, src/io/gltf_asset.rs

use std::path::{Path, PathBuf};
use std::process::Command;

use log::{debug, info, warn};
use walkdir::WalkDir;

use crate::error::{TilesError, TilesResult};

const FBX2GLTF_URL: &str = "https://github.com/facebookincubator/FBX2glTF";

/// Produces a glTF document from a source model.
pub trait Converter {
    /// Convert `input`, staging any outputs under `staging_dir`, and return
    /// the path of the glTF document to tile.
    fn convert(&self, input: &Path, staging_dir: &Path) -> TilesResult<PathBuf>;
}

/// Runs the external FBX2glTF tool: `<exe> --input <file> --output <staging>/model`
#[derive(Debug, Clone)]
pub struct Fbx2Gltf {
    pub executable: String,
}

impl Fbx2Gltf {
    pub fn new(executable: impl Into<String>) -> Self {
        Self {
            executable: executable.into(),
        }
    }
}

impl Converter for Fbx2Gltf {
    fn convert(&self, input: &Path, staging_dir: &Path) -> TilesResult<PathBuf> {
        let output_prefix = staging_dir.join("model");
        info!("Converting FBX to glTF: {}", input.display());
        debug!(
            "Running command: {} --input {} --output {}",
            self.executable,
            input.display(),
            output_prefix.display()
        );

        let output = Command::new(&self.executable)
            .arg("--input")
            .arg(input)
            .arg("--output")
            .arg(&output_prefix)
            .output()
            .map_err(|e| {
                TilesError::converter(format!(
                    "failed to run {}: {} (install it from {})",
                    self.executable, e, FBX2GLTF_URL
                ))
            })?;

        if !output.status.success() {
            return Err(TilesError::converter(format!(
                "{} exited with {}: {}",
                self.executable,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let expected = staging_dir.join("model_out").join("model.gltf");
        if expected.is_file() {
            return Ok(expected);
        }
        warn!(
            "Expected glTF file not found at {}, searching {}",
            expected.display(),
            staging_dir.display()
        );
        find_gltf(staging_dir).ok_or_else(|| {
            TilesError::converter(format!(
                "no glTF file produced under {}",
                staging_dir.display()
            ))
        })
    }
}

/// Input is already glTF; used in place.
#[derive(Debug, Clone, Copy, Default)]
pub struct Passthrough;

impl Converter for Passthrough {
    fn convert(&self, input: &Path, _staging_dir: &Path) -> TilesResult<PathBuf> {
        if !input.is_file() {
            return Err(TilesError::AssetNotFound(input.to_path_buf()));
        }
        Ok(input.to_path_buf())
    }
}

/// Pick a converter by the input's extension (`.fbx` or `.gltf`, any case)
pub fn converter_for(input: &Path, executable: &str) -> TilesResult<Box<dyn Converter>> {
    let ext = input
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("fbx") => Ok(Box::new(Fbx2Gltf::new(executable))),
        Some("gltf") => Ok(Box::new(Passthrough)),
        _ => Err(TilesError::UnsupportedInput(input.to_path_buf())),
    }
}

/// First `.gltf` file under `dir`, walking in file-name order
pub fn find_gltf(dir: &Path) -> Option<PathBuf> {
    WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .find(|entry| {
            entry.file_type().is_file()
                && entry.path().extension().and_then(|e| e.to_str()) == Some("gltf")
        })
        .map(|entry| entry.into_path())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn dispatch_by_extension() {
        assert!(converter_for(Path::new("a/model.FBX"), "FBX2glTF").is_ok());
        assert!(converter_for(Path::new("model.gltf"), "FBX2glTF").is_ok());
        assert!(matches!(
            converter_for(Path::new("model.obj"), "FBX2glTF"),
            Err(TilesError::UnsupportedInput(_))
        ));
    }

    #[test]
    fn find_gltf_walks_subdirectories() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("out").join("deeper");
        fs::create_dir_all(&nested).unwrap();
        fs::write(nested.join("scene.gltf"), "{}").unwrap();
        fs::write(dir.path().join("notes.txt"), "x").unwrap();

        assert_eq!(find_gltf(dir.path()), Some(nested.join("scene.gltf")));
    }

    #[cfg(unix)]
    fn fake_converter(dir: &Path, body: &str) -> String {
        use std::os::unix::fs::PermissionsExt;

        let script = dir.join("fake-fbx2gltf");
        fs::write(&script, format!("#!/bin/sh\n{}\n", body)).unwrap();
        let mode = fs::Permissions::from_mode(0o755);
        fs::set_permissions(&script, mode).unwrap();
        script.to_string_lossy().into_owned()
    }

    #[cfg(unix)]
    fn staged_input(dir: &Path) -> (PathBuf, PathBuf) {
        let input = dir.join("model.fbx");
        fs::write(&input, b"fbx").unwrap();
        let staging = dir.join("temp");
        fs::create_dir_all(&staging).unwrap();
        (input, staging)
    }

    #[cfg(unix)]
    #[test]
    fn converter_output_at_expected_path() {
        let dir = tempfile::tempdir().unwrap();
        let (input, staging) = staged_input(dir.path());
        let exe = fake_converter(
            dir.path(),
            r#"mkdir -p "${4}_out" && printf '{}' > "${4}_out/model.gltf""#,
        );

        let gltf = Fbx2Gltf::new(exe).convert(&input, &staging).unwrap();
        assert_eq!(gltf, staging.join("model_out").join("model.gltf"));
    }

    #[cfg(unix)]
    #[test]
    fn converter_output_elsewhere_is_found_by_walking() {
        let dir = tempfile::tempdir().unwrap();
        let (input, staging) = staged_input(dir.path());
        let exe = fake_converter(
            dir.path(),
            r#"mkdir -p "${4}_other" && printf '{}' > "${4}_other/scene.gltf""#,
        );

        let gltf = Fbx2Gltf::new(exe).convert(&input, &staging).unwrap();
        assert_eq!(gltf, staging.join("model_other").join("scene.gltf"));
    }

    #[cfg(unix)]
    #[test]
    fn converter_without_gltf_output_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let (input, staging) = staged_input(dir.path());
        let exe = fake_converter(dir.path(), "exit 0");

        let err = Fbx2Gltf::new(exe).convert(&input, &staging).unwrap_err();
        assert!(matches!(err, TilesError::Converter(_)));
    }

    #[cfg(unix)]
    #[test]
    fn failing_converter_reports_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let (input, staging) = staged_input(dir.path());
        let exe = fake_converter(
            dir.path(),
            "echo 'unsupported FBX version 6100' >&2\nexit 3",
        );

        match Fbx2Gltf::new(exe).convert(&input, &staging) {
            Err(TilesError::Converter(msg)) => {
                assert!(msg.contains("unsupported FBX version 6100"), "{msg}");
            }
            other => panic!("expected converter error, got {other:?}"),
        }
    }

    #[test]
    fn missing_executable_is_a_converter_error() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("model.fbx");
        fs::write(&input, b"not really fbx").unwrap();

        let converter = Fbx2Gltf::new("model2tiles-no-such-converter");
        let err = converter.convert(&input, dir.path()).unwrap_err();
        assert!(matches!(err, TilesError::Converter(_)));
    }
}
