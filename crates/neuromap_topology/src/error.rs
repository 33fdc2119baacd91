//! Error types for fabric description loading and validation.

use neuromap_common::{AnalogChannelId, ChipCoord, DenmemId, DriverId};
use std::path::PathBuf;

/// Errors raised while building a [`Topology`](crate::Topology).
///
/// All of these are detected at construction time; a successfully built
/// topology is never mutated afterwards.
#[derive(Debug, thiserror::Error)]
pub enum TopologyError {
    /// The fabric description could not be read from disk.
    #[error("failed to read fabric description {path}: {source}")]
    Io {
        /// The description file path.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The fabric description is not valid TOML for the expected schema.
    #[error("failed to parse fabric description: {0}")]
    Parse(String),

    /// The description lists no chips.
    #[error("fabric description contains no chips")]
    Empty,

    /// Two chips share the same coordinate.
    #[error("duplicate chip coordinate {0}")]
    DuplicateChip(ChipCoord),

    /// A link or override refers to a chip that is not part of the fabric.
    #[error("unknown chip {coord} referenced by {context}")]
    UnknownChip {
        /// The unknown coordinate.
        coord: ChipCoord,
        /// Where the reference appeared.
        context: String,
    },

    /// A chip lists the same synapse driver id twice.
    #[error("duplicate synapse driver {driver} on {chip}")]
    DuplicateDriver {
        /// The chip.
        chip: ChipCoord,
        /// The repeated driver id.
        driver: DriverId,
    },

    /// A chip lists the same analog output channel twice.
    #[error("duplicate analog output channel {channel} on {chip}")]
    DuplicateAnalogChannel {
        /// The chip.
        chip: ChipCoord,
        /// The repeated channel id.
        channel: AnalogChannelId,
    },

    /// A blocked denmem lies outside the chip's denmem range.
    #[error("blocked denmem {denmem} on {chip} is out of range (chip has {count} denmems)")]
    DenmemOutOfRange {
        /// The chip.
        chip: ChipCoord,
        /// The offending denmem.
        denmem: DenmemId,
        /// Number of denmems on the chip.
        count: u32,
    },

    /// The denmem/neuron block/output buffer layout of a chip is inconsistent.
    #[error("invalid chip layout on {chip}: {reason}")]
    InvalidLayout {
        /// The chip.
        chip: ChipCoord,
        /// Description of the inconsistency.
        reason: String,
    },

    /// The preset name is not known.
    #[error("unknown topology preset {0:?}. Supported: single_chip, quad, wafer")]
    UnknownPreset(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_chip_display() {
        let err = TopologyError::DuplicateChip(ChipCoord::new(1, 2));
        assert_eq!(err.to_string(), "duplicate chip coordinate chip(1,2)");
    }

    #[test]
    fn unknown_chip_display() {
        let err = TopologyError::UnknownChip {
            coord: ChipCoord::new(9, 9),
            context: "link #0".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("chip(9,9)"));
        assert!(msg.contains("link #0"));
    }

    #[test]
    fn duplicate_driver_display() {
        let err = TopologyError::DuplicateDriver {
            chip: ChipCoord::new(0, 0),
            driver: DriverId::from_raw(3),
        };
        assert!(err.to_string().contains("duplicate synapse driver 3"));
    }

    #[test]
    fn unknown_preset_display() {
        let err = TopologyError::UnknownPreset("huge".to_string());
        assert!(err.to_string().contains("\"huge\""));
    }
}
