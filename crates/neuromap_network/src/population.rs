//! Populations of biological neurons.

use neuromap_common::{BioNeuronId, PopulationId};
use serde::{Deserialize, Serialize};

/// Whether a population is emulated on neuron circuits or only injects spikes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellType {
    /// A neuron model realized on denmems.
    #[default]
    Computed,
    /// A spike source that only needs a routing address.
    ExternalInput,
}

impl CellType {
    /// Returns `true` for spike-source populations.
    pub fn is_external(self) -> bool {
        matches!(self, CellType::ExternalInput)
    }
}

/// A population of identical biological neurons.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Population {
    /// The population id.
    pub id: PopulationId,
    /// Unique human-readable label.
    pub label: String,
    /// Number of neurons.
    pub size: u32,
    /// The cell type.
    pub cell_type: CellType,
    /// Whether the membrane voltage of every neuron is recorded on an analog output.
    pub record_voltage: bool,
}

impl Population {
    /// Returns `true` if this is an external input population.
    pub fn is_external(&self) -> bool {
        self.cell_type.is_external()
    }

    /// Iterates over the ids of all neurons in the population.
    pub fn neurons(&self) -> impl Iterator<Item = BioNeuronId> + '_ {
        (0..self.size).map(move |i| BioNeuronId::new(self.id, i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neuron_ids_cover_population() {
        let pop = Population {
            id: PopulationId::from_raw(4),
            label: "exc".into(),
            size: 3,
            cell_type: CellType::Computed,
            record_voltage: false,
        };
        let ids: Vec<_> = pop.neurons().collect();
        assert_eq!(ids.len(), 3);
        assert_eq!(ids[2], BioNeuronId::new(PopulationId::from_raw(4), 2));
        assert!(!pop.is_external());
    }

    #[test]
    fn cell_type_serde() {
        let json = serde_json::to_string(&CellType::ExternalInput).unwrap();
        assert_eq!(json, "\"external_input\"");
    }
}
