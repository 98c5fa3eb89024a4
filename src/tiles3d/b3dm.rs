//! B3DM (Batched 3D Model) writer and read-back view
//!
//! Layout: `[header, 28 bytes][feature table JSON][feature table binary]
//! [batch table JSON][batch table binary][glTF payload]`, little-endian.
//! The payload is either the glTF JSON as-is or a GLB built around an
//! external buffer.

use bytemuck::{Pod, Zeroable};
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::{TilesError, TilesResult};
use crate::io::Asset;

use super::lod::buffer_file_name;

pub const B3DM_MAGIC: [u8; 4] = *b"b3dm";
pub const B3DM_VERSION: u32 = 1;
pub const B3DM_HEADER_LEN: usize = 28;

pub const GLB_MAGIC: [u8; 4] = *b"glTF";
pub const GLB_VERSION: u32 = 2;
pub const GLB_HEADER_LEN: usize = 12;
/// "JSON" chunk type
pub const GLB_CHUNK_JSON: u32 = 0x4E4F534A;
/// "BIN\0" chunk type
pub const GLB_CHUNK_BIN: u32 = 0x004E4942;

/// B3DM file header (28 bytes)
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct B3dmHeader {
    /// Magic bytes "b3dm"
    pub magic: [u8; 4],
    /// Version (always 1)
    pub version: u32,
    /// Total byte length of the file
    pub byte_length: u32,
    /// Feature table JSON byte length
    pub feature_table_json_byte_length: u32,
    /// Feature table binary byte length
    pub feature_table_binary_byte_length: u32,
    /// Batch table JSON byte length
    pub batch_table_json_byte_length: u32,
    /// Batch table binary byte length
    pub batch_table_binary_byte_length: u32,
}

impl B3dmHeader {
    /// Header for a tile with JSON-only tables and the given payload size
    pub fn new(
        feature_table_json: usize,
        batch_table_json: usize,
        payload: usize,
    ) -> TilesResult<Self> {
        let total = B3DM_HEADER_LEN + feature_table_json + batch_table_json + payload;
        Ok(Self {
            magic: B3DM_MAGIC,
            version: B3DM_VERSION,
            byte_length: to_u32(total, "b3dm")?,
            feature_table_json_byte_length: to_u32(feature_table_json, "feature table")?,
            feature_table_binary_byte_length: 0,
            batch_table_json_byte_length: to_u32(batch_table_json, "batch table")?,
            batch_table_binary_byte_length: 0,
        })
    }

    /// Little-endian wire representation
    pub fn to_bytes(&self) -> [u8; B3DM_HEADER_LEN] {
        let le = Self {
            magic: self.magic,
            version: self.version.to_le(),
            byte_length: self.byte_length.to_le(),
            feature_table_json_byte_length: self.feature_table_json_byte_length.to_le(),
            feature_table_binary_byte_length: self.feature_table_binary_byte_length.to_le(),
            batch_table_json_byte_length: self.batch_table_json_byte_length.to_le(),
            batch_table_binary_byte_length: self.batch_table_binary_byte_length.to_le(),
        };
        bytemuck::cast(le)
    }

    /// Read a header from the start of `data`
    pub fn read(data: &[u8]) -> TilesResult<Self> {
        if data.len() < B3DM_HEADER_LEN {
            return Err(TilesError::invalid_b3dm("File too small for header"));
        }
        let raw: Self = bytemuck::pod_read_unaligned(&data[..B3DM_HEADER_LEN]);
        let header = Self {
            magic: raw.magic,
            version: u32::from_le(raw.version),
            byte_length: u32::from_le(raw.byte_length),
            feature_table_json_byte_length: u32::from_le(raw.feature_table_json_byte_length),
            feature_table_binary_byte_length: u32::from_le(raw.feature_table_binary_byte_length),
            batch_table_json_byte_length: u32::from_le(raw.batch_table_json_byte_length),
            batch_table_binary_byte_length: u32::from_le(raw.batch_table_binary_byte_length),
        };

        if header.magic != B3DM_MAGIC {
            return Err(TilesError::invalid_b3dm(format!("Invalid magic: {:?}", header.magic)));
        }
        if header.version != B3DM_VERSION {
            return Err(TilesError::invalid_b3dm(format!(
                "Unsupported version: {}",
                header.version
            )));
        }
        Ok(header)
    }
}

/// Padding applied to the GLB JSON chunk.
///
/// `None` reproduces the historical output, which is not 4-byte aligned and
/// so does not meet the GLB alignment rule. `Spaces` pads with 0x20.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GlbJsonPadding {
    #[default]
    None,
    Spaces,
}

/// Knobs for [`pack_with`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PackOptions {
    pub glb_json_padding: GlbJsonPadding,
}

/// Package `asset` as a B3DM tile for `lod_level` with default options.
///
/// Returns the B3DM bytes and, when the asset has an external buffer, the raw
/// buffer bytes to be written next to the tile as `buffer_lod{level}.bin`.
pub fn pack(asset: &Asset, lod_level: u32) -> TilesResult<(Vec<u8>, Option<Vec<u8>>)> {
    pack_with(asset, lod_level, &PackOptions::default())
}

pub fn pack_with(
    asset: &Asset,
    lod_level: u32,
    options: &PackOptions,
) -> TilesResult<(Vec<u8>, Option<Vec<u8>>)> {
    asset.validate()?;

    let external = asset.external_buffer();
    let gltf_bytes = match external {
        Some(_) => {
            let mut document = asset.document.clone();
            rewrite_buffer_uri(&mut document, &buffer_file_name(lod_level));
            serde_json::to_vec(&document)
        }
        None => serde_json::to_vec(&asset.document),
    }
    .map_err(TilesError::AssetSerialization)?;

    let payload = match external {
        Some(bin) => build_glb(&gltf_bytes, bin, options.glb_json_padding)?,
        None => gltf_bytes,
    };

    let feature_table = padded_json(&json!({ "BATCH_LENGTH": 0 }))?;
    let batch_table = padded_json(&json!({}))?;
    let b3dm = assemble_b3dm(&feature_table, &batch_table, &payload)?;

    debug!(
        "LOD {}: b3dm {} bytes (payload {} bytes, external buffer: {})",
        lod_level,
        b3dm.len(),
        payload.len(),
        external.map_or(0, <[u8]>::len)
    );
    Ok((b3dm, external.map(<[u8]>::to_vec)))
}

/// Concatenate header, tables and payload into a B3DM buffer
pub fn assemble_b3dm(
    feature_table_json: &[u8],
    batch_table_json: &[u8],
    payload: &[u8],
) -> TilesResult<Vec<u8>> {
    let header = B3dmHeader::new(
        feature_table_json.len(),
        batch_table_json.len(),
        payload.len(),
    )?;
    let mut out = Vec::with_capacity(header.byte_length as usize);
    out.extend_from_slice(&header.to_bytes());
    out.extend_from_slice(feature_table_json);
    out.extend_from_slice(batch_table_json);
    out.extend_from_slice(payload);
    Ok(out)
}

/// Build a GLB from a JSON chunk and a BIN chunk.
///
/// The BIN chunk is never padded; the JSON chunk only with `GlbJsonPadding::Spaces`.
pub fn build_glb(json: &[u8], bin: &[u8], padding: GlbJsonPadding) -> TilesResult<Vec<u8>> {
    let json_padding = match padding {
        GlbJsonPadding::None => 0,
        GlbJsonPadding::Spaces => pad_len(json.len()),
    };
    let json_chunk_length = json.len() + json_padding;
    let total_length = GLB_HEADER_LEN + 8 + json_chunk_length + 8 + bin.len();

    let mut glb = Vec::with_capacity(total_length);
    glb.extend_from_slice(&GLB_MAGIC);
    glb.extend_from_slice(&GLB_VERSION.to_le_bytes());
    glb.extend_from_slice(&to_u32(total_length, "glb")?.to_le_bytes());

    glb.extend_from_slice(&to_u32(json_chunk_length, "glb json chunk")?.to_le_bytes());
    glb.extend_from_slice(&GLB_CHUNK_JSON.to_le_bytes());
    glb.extend_from_slice(json);
    glb.extend(std::iter::repeat(b' ').take(json_padding));

    glb.extend_from_slice(&to_u32(bin.len(), "glb bin chunk")?.to_le_bytes());
    glb.extend_from_slice(&GLB_CHUNK_BIN.to_le_bytes());
    glb.extend_from_slice(bin);
    Ok(glb)
}

/// Serialize `value` compactly and right-pad with spaces to a 4-byte boundary
pub fn padded_json(value: &Value) -> TilesResult<Vec<u8>> {
    let mut bytes = serde_json::to_vec(value)?;
    let padding = pad_len(bytes.len());
    bytes.extend(std::iter::repeat(b' ').take(padding));
    Ok(bytes)
}

fn pad_len(len: usize) -> usize {
    (4 - len % 4) % 4
}

fn to_u32(len: usize, what: &str) -> TilesResult<u32> {
    u32::try_from(len).map_err(|_| {
        TilesError::precondition(format!("{} length {} does not fit in 32 bits", what, len))
    })
}

fn rewrite_buffer_uri(document: &mut Value, uri: &str) {
    let first = document
        .get_mut("buffers")
        .and_then(Value::as_array_mut)
        .and_then(|buffers| buffers.first_mut())
        .and_then(Value::as_object_mut);
    if let Some(buffer) = first {
        buffer.insert("uri".to_string(), Value::String(uri.to_string()));
    }
}

/// Borrowed view over the sections of a B3DM buffer
#[derive(Debug, Clone, Copy)]
pub struct B3dmView<'a> {
    pub header: B3dmHeader,
    pub feature_table_json: &'a [u8],
    pub feature_table_binary: &'a [u8],
    pub batch_table_json: &'a [u8],
    pub batch_table_binary: &'a [u8],
    pub payload: &'a [u8],
}

impl<'a> B3dmView<'a> {
    /// Split `data` into its sections, checking the declared lengths
    pub fn parse(data: &'a [u8]) -> TilesResult<Self> {
        let header = B3dmHeader::read(data)?;
        if header.byte_length as usize != data.len() {
            return Err(TilesError::invalid_b3dm(format!(
                "Header declares {} bytes, buffer has {}",
                header.byte_length,
                data.len()
            )));
        }

        let mut offset = B3DM_HEADER_LEN;
        let feature_table_json = take(
            data,
            &mut offset,
            header.feature_table_json_byte_length,
            "feature table JSON",
        )?;
        let feature_table_binary = take(
            data,
            &mut offset,
            header.feature_table_binary_byte_length,
            "feature table binary",
        )?;
        let batch_table_json = take(
            data,
            &mut offset,
            header.batch_table_json_byte_length,
            "batch table JSON",
        )?;
        let batch_table_binary = take(
            data,
            &mut offset,
            header.batch_table_binary_byte_length,
            "batch table binary",
        )?;
        let payload = &data[offset..];

        Ok(Self {
            header,
            feature_table_json,
            feature_table_binary,
            batch_table_json,
            batch_table_binary,
            payload,
        })
    }

    pub fn feature_table(&self) -> TilesResult<Value> {
        Ok(serde_json::from_slice(self.feature_table_json)?)
    }

    pub fn batch_table(&self) -> TilesResult<Value> {
        Ok(serde_json::from_slice(self.batch_table_json)?)
    }

    pub fn payload_is_glb(&self) -> bool {
        self.payload.len() >= 4 && self.payload[..4] == GLB_MAGIC
    }
}

fn take<'a>(data: &'a [u8], offset: &mut usize, len: u32, name: &str) -> TilesResult<&'a [u8]> {
    let end = *offset + len as usize;
    if end > data.len() {
        return Err(TilesError::invalid_b3dm(format!("{} overruns buffer", name)));
    }
    let slice = &data[*offset..end];
    *offset = end;
    Ok(slice)
}

/// JSON and BIN chunks of a GLB payload
#[derive(Debug, Clone, Copy)]
pub struct GlbChunks<'a> {
    pub total_length: u32,
    pub json: &'a [u8],
    pub bin: Option<&'a [u8]>,
}

/// Split a GLB buffer into its JSON and BIN chunks
pub fn split_glb(data: &[u8]) -> TilesResult<GlbChunks<'_>> {
    if data.len() < GLB_HEADER_LEN {
        return Err(TilesError::invalid_gltf("GLB header too small"));
    }
    if data[0..4] != GLB_MAGIC {
        return Err(TilesError::invalid_gltf("Missing glTF magic"));
    }

    let version = u32::from_le_bytes([data[4], data[5], data[6], data[7]]);
    if version != GLB_VERSION {
        return Err(TilesError::invalid_gltf(format!("Unsupported glTF version: {}", version)));
    }
    let total_length = u32::from_le_bytes([data[8], data[9], data[10], data[11]]);

    let mut offset = GLB_HEADER_LEN;
    let mut json_chunk: Option<&[u8]> = None;
    let mut bin_chunk: Option<&[u8]> = None;

    while offset + 8 <= data.len() {
        let chunk_length = u32::from_le_bytes([
            data[offset],
            data[offset + 1],
            data[offset + 2],
            data[offset + 3],
        ]) as usize;
        let chunk_type = u32::from_le_bytes([
            data[offset + 4],
            data[offset + 5],
            data[offset + 6],
            data[offset + 7],
        ]);
        offset += 8;

        if offset + chunk_length > data.len() {
            return Err(TilesError::invalid_gltf("Chunk overruns buffer"));
        }

        match chunk_type {
            GLB_CHUNK_JSON => json_chunk = Some(&data[offset..offset + chunk_length]),
            GLB_CHUNK_BIN => bin_chunk = Some(&data[offset..offset + chunk_length]),
            _ => {}
        }
        offset += chunk_length;
    }

    let json = json_chunk.ok_or_else(|| TilesError::invalid_gltf("No JSON chunk"))?;
    Ok(GlbChunks {
        total_length,
        json,
        bin: bin_chunk,
    })
}
