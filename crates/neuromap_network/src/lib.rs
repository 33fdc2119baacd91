//! Biological network description consumed by the place-and-route engine.
//!
//! A [`Network`] holds populations (computed neurons or external spike
//! sources), projections with their connectivity pattern and optional
//! short-term plasticity, and [`ManualPlacement`] directives. Networks are
//! built programmatically or loaded from a TOML [`NetworkDescription`].

#![warn(missing_docs)]

pub mod connector;
pub mod description;
pub mod dynamics;
pub mod error;
pub mod manual;
pub mod network;
pub mod population;
pub mod projection;

pub use connector::Connector;
pub use description::{load_network, NetworkDescription};
pub use dynamics::StpDescriptor;
pub use error::NetworkError;
pub use manual::ManualPlacement;
pub use network::Network;
pub use population::{CellType, Population};
pub use projection::Projection;
