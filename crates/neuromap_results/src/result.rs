//! The aggregate result of one mapping run.

use crate::analog::AnalogOutputs;
use crate::error::ResultsError;
use crate::persist;
use crate::placement::Placement;
use crate::routing::{LostSynapse, SynapseRouting};
use crate::stats::MappingStats;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Placement, driver table, analog bindings and statistics of a mapping run.
///
/// A result is produced once by the mapping pipeline and not changed
/// afterwards, except for [`AnalogOutputs::record`] lookups.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingResult {
    /// Every placed neuron.
    pub placement: Placement,
    /// Every active synapse driver.
    pub driver_assignments: SynapseRouting,
    /// Analog output bindings.
    pub analog_outputs: AnalogOutputs,
    /// Counters and lookup table.
    pub stats: MappingStats,
    /// Synapses that were not routed.
    #[serde(default)]
    pub lost_synapses: Vec<LostSynapse>,
}

impl MappingResult {
    /// Assembles a result and builds all lookup structures.
    pub fn new(
        placement: Placement,
        driver_assignments: SynapseRouting,
        analog_outputs: AnalogOutputs,
        stats: MappingStats,
        lost_synapses: Vec<LostSynapse>,
    ) -> Self {
        let mut result = Self {
            placement,
            driver_assignments,
            analog_outputs,
            stats,
            lost_synapses,
        };
        result.rebuild_indices();
        result
    }

    /// Rebuilds every lookup structure from the serialized lists.
    pub fn rebuild_indices(&mut self) {
        self.placement.rebuild_indices();
        self.driver_assignments.rebuild_indices();
        self.analog_outputs.rebuild_indices();
        self.stats.rebuild_lookup(&self.placement);
    }

    /// Returns `true` if every synapse was routed.
    pub fn is_lossless(&self) -> bool {
        self.stats.synapse_loss() == 0
    }

    /// Writes the result to `path`; the extension selects the encoding.
    pub fn to_file(&self, path: &Path) -> Result<(), ResultsError> {
        persist::save(self, path)
    }

    /// Reads a result written by [`to_file`](Self::to_file).
    pub fn from_file(path: &Path) -> Result<Self, ResultsError> {
        persist::load(path)
    }
}
