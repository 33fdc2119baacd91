//! Opaque ID newtypes for network entities and on-chip resource slots.
//!
//! Each ID is a thin `u32` wrapper that is `Copy`, `Hash`, `Ord`, and
//! `Serialize`/`Deserialize`. Slot IDs (denmems, drivers, buffers, channels)
//! are local to one chip; combine them with a [`ChipCoord`](crate::ChipCoord)
//! to name a resource on the whole fabric.

use serde::{Deserialize, Serialize};

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
        pub struct $name(u32);

        impl $name {
            /// Creates an ID from a raw `u32` index.
            pub const fn from_raw(index: u32) -> Self {
                Self(index)
            }

            /// Returns the raw `u32` index.
            pub const fn as_raw(self) -> u32 {
                self.0
            }

            /// Returns the raw index widened to `usize`, for slot table lookups.
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_id!(
    /// Identifier of a population in the biological network.
    PopulationId
);

define_id!(
    /// Identifier of a projection (population-to-population connection).
    ProjectionId
);

define_id!(
    /// A single neuron circuit slot ("denmem") on one chip.
    DenmemId
);

define_id!(
    /// A synapse driver slot on one chip.
    DriverId
);

define_id!(
    /// A neuron block (a fixed group of adjacent denmems) on one chip.
    NeuronBlockId
);

define_id!(
    /// An output buffer (merger) on one chip that emits spikes of one neuron block.
    OutputBufferId
);

define_id!(
    /// An analog readout channel on one chip.
    AnalogChannelId
);
