//! Reading and writing mapping results.
//!
//! Four encodings are supported, selected by the file extension:
//!
//! | Extension  | Encoding                         |
//! |------------|----------------------------------|
//! | `.json`    | pretty-printed JSON              |
//! | `.bin`     | header + `bincode` payload       |
//! | `.json.gz` | gzip-compressed JSON             |
//! | `.bin.gz`  | gzip-compressed binary           |
//!
//! Binary files start with a 4-byte little-endian header length, followed by
//! a `bincode`-encoded [`ResultHeader`] (magic bytes, format version, tool
//! version, checksum of the payload) and the payload itself. Loading checks
//! all of them before decoding the payload.

use crate::error::ResultsError;
use crate::result::MappingResult;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use neuromap_common::ContentHash;
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use std::path::Path;
use tracing::{debug, info};

/// Magic bytes identifying a binary mapping result.
const RESULT_MAGIC: [u8; 4] = *b"NMAP";

/// Binary format version. Increment on breaking changes to the header or payload.
const RESULT_FORMAT_VERSION: u32 = 1;

/// Header prepended to binary result files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultHeader {
    /// Must be `b"NMAP"`.
    pub magic: [u8; 4],
    /// Binary format version.
    pub format_version: u32,
    /// Version of the tool that wrote the file.
    pub tool_version: String,
    /// Checksum of the payload.
    pub checksum: ContentHash,
}

/// Physical encoding of a result file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// Plain JSON.
    Json,
    /// Header plus `bincode` payload.
    Binary,
    /// Gzip-compressed JSON.
    JsonGz,
    /// Gzip-compressed binary.
    BinaryGz,
}

impl Encoding {
    /// Selects the encoding from the file name.
    pub fn from_path(path: &Path) -> Result<Self, ResultsError> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        if name.ends_with(".json.gz") {
            Ok(Encoding::JsonGz)
        } else if name.ends_with(".bin.gz") {
            Ok(Encoding::BinaryGz)
        } else if name.ends_with(".json") {
            Ok(Encoding::Json)
        } else if name.ends_with(".bin") {
            Ok(Encoding::Binary)
        } else {
            Err(ResultsError::UnknownFormat(path.to_path_buf()))
        }
    }

    fn is_compressed(self) -> bool {
        matches!(self, Encoding::JsonGz | Encoding::BinaryGz)
    }

    fn is_json(self) -> bool {
        matches!(self, Encoding::Json | Encoding::JsonGz)
    }
}

/// Writes `result` to `path`, creating or overwriting the file.
pub fn save(result: &MappingResult, path: &Path) -> Result<(), ResultsError> {
    let encoding = Encoding::from_path(path)?;
    let mut bytes = if encoding.is_json() {
        serde_json::to_vec_pretty(result).map_err(|e| ResultsError::Serialization {
            reason: e.to_string(),
        })?
    } else {
        encode_binary(result)?
    };
    if encoding.is_compressed() {
        bytes = compress(&bytes).map_err(|e| ResultsError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
    }
    std::fs::write(path, &bytes).map_err(|e| ResultsError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    info!(
        target: "neuromap::results",
        "wrote mapping result to {} ({} bytes, {encoding:?})",
        path.display(),
        bytes.len()
    );
    Ok(())
}

/// Reads a result from `path` and rebuilds its lookup structures.
pub fn load(path: &Path) -> Result<MappingResult, ResultsError> {
    let encoding = Encoding::from_path(path)?;
    let raw = std::fs::read(path).map_err(|e| ResultsError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let bytes = if encoding.is_compressed() {
        decompress(&raw).map_err(|e| ResultsError::Parse {
            path: path.to_path_buf(),
            reason: format!("gzip: {e}"),
        })?
    } else {
        raw
    };
    let mut result: MappingResult = if encoding.is_json() {
        serde_json::from_slice(&bytes).map_err(|e| ResultsError::Parse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?
    } else {
        decode_binary(&bytes, path)?
    };
    result.rebuild_indices();
    debug!(
        target: "neuromap::results",
        "loaded mapping result from {} ({} placement items, {} drivers)",
        path.display(),
        result.placement.len(),
        result.driver_assignments.active_drivers()
    );
    Ok(result)
}

fn encode_binary(result: &MappingResult) -> Result<Vec<u8>, ResultsError> {
    let ser_err = |e: bincode::error::EncodeError| ResultsError::Serialization {
        reason: e.to_string(),
    };
    let payload =
        bincode::serde::encode_to_vec(result, bincode::config::standard()).map_err(ser_err)?;
    let header = ResultHeader {
        magic: RESULT_MAGIC,
        format_version: RESULT_FORMAT_VERSION,
        tool_version: env!("CARGO_PKG_VERSION").to_string(),
        checksum: ContentHash::from_bytes(&payload),
    };
    let header_bytes =
        bincode::serde::encode_to_vec(&header, bincode::config::standard()).map_err(ser_err)?;

    let header_len = header_bytes.len() as u32;
    let mut output = Vec::with_capacity(4 + header_bytes.len() + payload.len());
    output.extend_from_slice(&header_len.to_le_bytes());
    output.extend_from_slice(&header_bytes);
    output.extend_from_slice(&payload);
    Ok(output)
}

fn decode_binary(raw: &[u8], path: &Path) -> Result<MappingResult, ResultsError> {
    let invalid = |reason: &str| ResultsError::InvalidHeader {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    };

    let len_bytes: [u8; 4] = raw
        .get(..4)
        .and_then(|b| b.try_into().ok())
        .ok_or_else(|| invalid("file too short"))?;
    let header_len = u32::from_le_bytes(len_bytes) as usize;
    let header_end = 4usize
        .checked_add(header_len)
        .filter(|&end| end <= raw.len())
        .ok_or_else(|| invalid("truncated header"))?;

    let (header, _): (ResultHeader, usize) =
        bincode::serde::decode_from_slice(&raw[4..header_end], bincode::config::standard())
            .map_err(|e| invalid(&e.to_string()))?;

    if header.magic != RESULT_MAGIC {
        return Err(invalid("bad magic bytes"));
    }
    if header.format_version != RESULT_FORMAT_VERSION {
        return Err(ResultsError::VersionMismatch {
            path: path.to_path_buf(),
            expected: RESULT_FORMAT_VERSION,
            actual: header.format_version,
        });
    }

    let payload = &raw[header_end..];
    if !header.checksum.verify(payload) {
        return Err(ResultsError::ChecksumMismatch {
            path: path.to_path_buf(),
            expected: header.checksum.to_string(),
            actual: ContentHash::from_bytes(payload).to_string(),
        });
    }

    let (result, _): (MappingResult, usize) =
        bincode::serde::decode_from_slice(payload, bincode::config::standard()).map_err(|e| {
            ResultsError::Parse {
                path: path.to_path_buf(),
                reason: e.to_string(),
            }
        })?;
    Ok(result)
}

fn compress(data: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    encoder.finish()
}

fn decompress(data: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut decoder = GzDecoder::new(data);
    let mut out = Vec::new();
    decoder.read_to_end(&mut out)?;
    Ok(out)
}
