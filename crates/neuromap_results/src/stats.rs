//! Mapping statistics and the bidirectional lookup table.

use crate::placement::Placement;
use neuromap_common::{BioNeuronId, DenmemCoord, HardwareAddress};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Bio-to-hardware and bio-to-denmem maps, with their inverses.
///
/// Both directions of each map are filled together from the same list of
/// placement items.
#[derive(Debug, Clone, Default)]
pub struct LookupTable {
    bio_to_hw: HashMap<BioNeuronId, Vec<HardwareAddress>>,
    hw_to_bio: HashMap<HardwareAddress, BioNeuronId>,
    bio_to_denmems: HashMap<BioNeuronId, Vec<DenmemCoord>>,
    denmem_to_bio: HashMap<DenmemCoord, BioNeuronId>,
}

impl LookupTable {
    /// Builds the table from a placement.
    pub fn build(placement: &Placement) -> Self {
        let mut table = Self::default();
        for item in placement {
            table
                .bio_to_hw
                .entry(item.bio_neuron)
                .or_default()
                .push(item.address);
            table.hw_to_bio.insert(item.address, item.bio_neuron);

            let denmems = item.logical_neuron.denmem_coords();
            for &d in &denmems {
                table.denmem_to_bio.insert(d, item.bio_neuron);
            }
            table.bio_to_denmems.insert(item.bio_neuron, denmems);
        }
        table
    }
}

/// Wall time spent in each stage of a mapping run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageTiming {
    /// Neuron placement.
    pub placement: Duration,
    /// Synapse routing.
    pub routing: Duration,
    /// Analog output assignment.
    pub analog: Duration,
}

impl StageTiming {
    /// Total time over all stages, in milliseconds.
    pub fn total_ms(&self) -> f64 {
        (self.placement + self.routing + self.analog).as_secs_f64() * 1e3
    }
}

/// Counters of a mapping run plus the lookup table over its placement.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MappingStats {
    /// Synapses that could not be routed.
    pub synapse_loss: u64,
    /// Biological neurons in the network.
    pub neuron_count: u64,
    /// Neurons left out of the placement in non-strict mode.
    pub unplaced_neurons: u64,
    /// Synapses realized from all projections, routed or lost.
    pub synapse_count: u64,
    /// Per-stage wall time.
    pub timing: StageTiming,
    #[serde(skip)]
    lookup: LookupTable,
}

impl MappingStats {
    /// Creates counters without a lookup table.
    pub fn new(neuron_count: u64, unplaced_neurons: u64, synapse_count: u64, synapse_loss: u64) -> Self {
        Self {
            synapse_loss,
            neuron_count,
            unplaced_neurons,
            synapse_count,
            timing: StageTiming::default(),
            lookup: LookupTable::default(),
        }
    }

    /// Replaces the lookup table with one built from `placement`.
    pub fn rebuild_lookup(&mut self, placement: &Placement) {
        self.lookup = LookupTable::build(placement);
    }

    /// Hardware addresses of a biological neuron; empty if unplaced.
    pub fn hw_ids(&self, bio: BioNeuronId) -> &[HardwareAddress] {
        self.lookup.bio_to_hw.get(&bio).map(Vec::as_slice).unwrap_or_default()
    }

    /// The biological neuron behind a hardware address.
    pub fn bio_id(&self, hw: HardwareAddress) -> Option<BioNeuronId> {
        self.lookup.hw_to_bio.get(&hw).copied()
    }

    /// Denmems realizing a biological neuron; empty for external inputs and unplaced neurons.
    pub fn denmems(&self, bio: BioNeuronId) -> &[DenmemCoord] {
        self.lookup.bio_to_denmems.get(&bio).map(Vec::as_slice).unwrap_or_default()
    }

    /// The biological neuron occupying a denmem.
    pub fn bio_id_of_denmem(&self, denmem: DenmemCoord) -> Option<BioNeuronId> {
        self.lookup.denmem_to_bio.get(&denmem).copied()
    }

    /// Number of synapses that could not be routed.
    pub fn synapse_loss(&self) -> u64 {
        self.synapse_loss
    }

    /// Number of biological neurons.
    pub fn num_neurons(&self) -> u64 {
        self.neuron_count
    }

    /// Number of neurons left unplaced.
    pub fn unplaced_neurons(&self) -> u64 {
        self.unplaced_neurons
    }

    /// Number of synapses realized from all projections.
    pub fn num_synapses(&self) -> u64 {
        self.synapse_count
    }
}

impl PartialEq for MappingStats {
    fn eq(&self, other: &Self) -> bool {
        self.synapse_loss == other.synapse_loss
            && self.neuron_count == other.neuron_count
            && self.unplaced_neurons == other.unplaced_neurons
            && self.synapse_count == other.synapse_count
            && self.timing == other.timing
    }
}

impl Eq for MappingStats {}
