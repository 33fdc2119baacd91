//! Shared foundational types used across the neuromap place-and-route crates.
//!
//! This crate provides the coordinate newtypes that name physical resources
//! on the neuromorphic fabric (chips, denmems, synapse drivers, output
//! buffers, analog channels), the identifiers of network entities, the
//! short-term-plasticity mode enum, and content hashing for persisted files.

#![warn(missing_docs)]

pub mod address;
pub mod coord;
pub mod hash;
pub mod ids;
pub mod stp;

pub use address::{BioNeuronId, HardwareAddress, ParseBioNeuronIdError};
pub use coord::{ChipCoord, DenmemCoord, L1Address, ParseChipCoordError};
pub use hash::ContentHash;
pub use ids::{
    AnalogChannelId, DenmemId, DriverId, NeuronBlockId, OutputBufferId, PopulationId,
    ProjectionId,
};
pub use stp::StpMode;
