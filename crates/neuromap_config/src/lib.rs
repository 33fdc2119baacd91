//! Parsing and validation of `neuromap.toml` run configuration files.
//!
//! This crate reads the per-run configuration and produces a strongly-typed
//! [`MappingConfig`]: neuron size and strictness for placement, the spill
//! policy for synapse routing, analog recording, backend selection, the
//! persistence path, and the fabric to map onto.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_from_str};
pub use types::*;
