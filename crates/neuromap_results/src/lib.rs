//! Result store of the neuromap place-and-route engine.
//!
//! A [`MappingResult`] aggregates the placement of every biological neuron,
//! the synapse driver table, the analog output bindings, and run
//! statistics. It answers bidirectional queries (biological neuron to
//! hardware address and denmems, and back) and is persisted in plain or
//! compressed JSON or binary form.

#![warn(missing_docs)]

pub mod analog;
pub mod error;
pub mod model;
pub mod persist;
pub mod placement;
pub mod result;
pub mod routing;
pub mod stats;

pub use analog::{AnalogOutputItem, AnalogOutputs, ChannelInventory};
pub use error::{AnalogError, ResultsError};
pub use model::{LogicalNeuron, PlacementItem};
pub use persist::Encoding;
pub use placement::Placement;
pub use result::MappingResult;
pub use routing::{LossReason, LostSynapse, SynapseBinding, SynapseDriverAssignment, SynapseRouting};
pub use stats::{LookupTable, MappingStats, StageTiming};
