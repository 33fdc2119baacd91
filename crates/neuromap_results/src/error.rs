//! Error types for result persistence and analog output binding.

use neuromap_common::ChipCoord;
use std::path::PathBuf;

/// Errors raised while saving or loading a mapping result.
#[derive(Debug, thiserror::Error)]
pub enum ResultsError {
    /// The file could not be read or written.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// The file path.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The path's extension names no supported encoding.
    #[error("unknown result file format {0} (expected .json, .bin, .json.gz or .bin.gz)")]
    UnknownFormat(PathBuf),

    /// The payload could not be decoded into a mapping result.
    #[error("failed to parse {path}: {reason}")]
    Parse {
        /// The file path.
        path: PathBuf,
        /// Description of the parse failure.
        reason: String,
    },

    /// A binary file has an invalid or missing header.
    #[error("invalid result file header in {path}: {reason}")]
    InvalidHeader {
        /// The file path.
        path: PathBuf,
        /// Description of the header problem.
        reason: String,
    },

    /// The stored checksum does not match the payload.
    #[error("checksum mismatch in {path}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        /// The file path.
        path: PathBuf,
        /// Checksum recorded in the header.
        expected: String,
        /// Checksum of the payload as read.
        actual: String,
    },

    /// The binary format version is not supported.
    #[error("version mismatch in {path}: expected {expected}, got {actual}")]
    VersionMismatch {
        /// The file path.
        path: PathBuf,
        /// The supported format version.
        expected: u32,
        /// The version found in the file.
        actual: u32,
    },

    /// The result could not be encoded.
    #[error("serialization error: {reason}")]
    Serialization {
        /// Description of the failure.
        reason: String,
    },
}

/// Errors raised when binding a logical neuron to an analog output channel.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AnalogError {
    /// External inputs have no membrane to record.
    #[error("cannot record external input {0}")]
    ExternalNeuron(String),

    /// The neuron's chip has no channel inventory.
    #[error("no analog outputs known for {0}")]
    UnknownChip(ChipCoord),

    /// All channels of the chip are taken.
    #[error("all {available} analog outputs of {chip} are in use")]
    CapacityExceeded {
        /// The chip.
        chip: ChipCoord,
        /// Number of channels on the chip.
        available: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_unknown_format() {
        let err = ResultsError::UnknownFormat(PathBuf::from("out.xml"));
        assert!(err.to_string().starts_with("unknown result file format out.xml"));
    }

    #[test]
    fn display_version_mismatch() {
        let err = ResultsError::VersionMismatch {
            path: PathBuf::from("r.bin"),
            expected: 1,
            actual: 7,
        };
        assert_eq!(err.to_string(), "version mismatch in r.bin: expected 1, got 7");
    }

    #[test]
    fn display_capacity_exceeded() {
        let err = AnalogError::CapacityExceeded {
            chip: ChipCoord::new(1, 1),
            available: 2,
        };
        assert_eq!(err.to_string(), "all 2 analog outputs of chip(1,1) are in use");
    }
}
