//! Core records of a mapping: logical neurons and placement items.

use neuromap_common::{
    BioNeuronId, ChipCoord, DenmemCoord, DenmemId, HardwareAddress, NeuronBlockId,
    OutputBufferId,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The hardware realization of one biological neuron.
///
/// A computed neuron occupies an ordered run of denmems on one chip. An
/// external input occupies no neuron circuits; it is identified by the
/// biological neuron it stands for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogicalNeuron {
    /// A spike source without neuron circuits.
    External(BioNeuronId),
    /// Denmems on one chip, in slot order.
    Denmems {
        /// The host chip.
        chip: ChipCoord,
        /// The occupied denmems.
        denmems: Vec<DenmemId>,
    },
}

impl LogicalNeuron {
    /// Returns `true` for external inputs.
    pub fn is_external(&self) -> bool {
        matches!(self, LogicalNeuron::External(_))
    }

    /// Number of denmems (zero for external inputs).
    pub fn size(&self) -> usize {
        self.denmems().len()
    }

    /// The host chip of a computed neuron.
    pub fn chip(&self) -> Option<ChipCoord> {
        match self {
            LogicalNeuron::External(_) => None,
            LogicalNeuron::Denmems { chip, .. } => Some(*chip),
        }
    }

    /// The chip-local denmem ids.
    pub fn denmems(&self) -> &[DenmemId] {
        match self {
            LogicalNeuron::External(_) => &[],
            LogicalNeuron::Denmems { denmems, .. } => denmems,
        }
    }

    /// The fabric-wide denmem coordinates.
    pub fn denmem_coords(&self) -> Vec<DenmemCoord> {
        match self {
            LogicalNeuron::External(_) => Vec::new(),
            LogicalNeuron::Denmems { chip, denmems } => denmems
                .iter()
                .map(|&d| DenmemCoord::new(*chip, d))
                .collect(),
        }
    }
}

impl fmt::Display for LogicalNeuron {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogicalNeuron::External(bio) => write!(f, "external({bio})"),
            LogicalNeuron::Denmems { chip, denmems } => match (denmems.first(), denmems.last()) {
                (Some(first), Some(last)) => write!(f, "{chip}/denmems({first}..={last})"),
                _ => write!(f, "{chip}/denmems()"),
            },
        }
    }
}

/// The placement of one biological neuron.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementItem {
    /// The biological neuron.
    pub bio_neuron: BioNeuronId,
    /// Its hardware realization.
    pub logical_neuron: LogicalNeuron,
    /// The neuron block hosting the denmems (`None` for external inputs).
    pub neuron_block: Option<NeuronBlockId>,
    /// The spike routing endpoint.
    pub address: HardwareAddress,
}

impl PlacementItem {
    /// Returns `true` for external inputs.
    pub fn is_external(&self) -> bool {
        self.logical_neuron.is_external()
    }

    /// The chip emitting this neuron's spikes.
    pub fn chip(&self) -> ChipCoord {
        self.address.chip
    }

    /// The output buffer (merger) the neuron is routed through.
    pub fn output_buffer(&self) -> OutputBufferId {
        self.address.output_buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use neuromap_common::PopulationId;

    #[test]
    fn computed_neuron_accessors() {
        let ln = LogicalNeuron::Denmems {
            chip: ChipCoord::new(0, 1),
            denmems: (8..12).map(DenmemId::from_raw).collect(),
        };
        assert!(!ln.is_external());
        assert_eq!(ln.size(), 4);
        assert_eq!(ln.chip(), Some(ChipCoord::new(0, 1)));
        assert_eq!(ln.denmem_coords()[0].denmem, DenmemId::from_raw(8));
        assert_eq!(ln.to_string(), "chip(0,1)/denmems(8..=11)");
    }

    #[test]
    fn external_neuron_accessors() {
        let ln = LogicalNeuron::External(BioNeuronId::new(PopulationId::from_raw(2), 0));
        assert!(ln.is_external());
        assert_eq!(ln.size(), 0);
        assert!(ln.chip().is_none());
        assert!(ln.denmem_coords().is_empty());
        assert_eq!(ln.to_string(), "external(pop2[0])");
    }
}
