//! Serializable network description, as read from a `network.toml` file.
//!
//! Populations are referenced by label. [`NetworkDescription::build`]
//! resolves labels, applies placement directives, and produces a validated
//! [`Network`].

use crate::connector::Connector;
use crate::dynamics::StpDescriptor;
use crate::error::NetworkError;
use crate::network::Network;
use crate::population::CellType;
use neuromap_common::{BioNeuronId, ChipCoord, DenmemId, PopulationId};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// A population entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopulationSpec {
    /// Unique label.
    pub label: String,
    /// Number of neurons.
    pub size: u32,
    /// Cell type (default `computed`).
    #[serde(default)]
    pub cell_type: CellType,
    /// Record the membrane voltage of every neuron.
    #[serde(default)]
    pub record_voltage: bool,
}

/// A projection entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionSpec {
    /// Source population label.
    pub source: String,
    /// Target population label.
    pub target: String,
    /// Connectivity pattern.
    pub connector: Connector,
    /// Synaptic weight.
    #[serde(default = "default_weight")]
    pub weight: f64,
    /// Optional short-term plasticity.
    #[serde(default)]
    pub stp: Option<StpDescriptor>,
}

fn default_weight() -> f64 {
    1.0
}

/// A denmem pin: chip and first denmem slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DenmemPin {
    /// Chip as `[x, y]`.
    pub chip: [u16; 2],
    /// First denmem of the consecutive run.
    pub first: u32,
}

/// Placement directives for one population.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementSpec {
    /// Population label.
    pub population: String,
    /// Chips the population is restricted to, as `[x, y]`.
    #[serde(default)]
    pub chips: Vec<[u16; 2]>,
    /// Pin to consecutive denmems.
    #[serde(default)]
    pub denmems: Option<DenmemPin>,
    /// Denmems per neuron override.
    #[serde(default)]
    pub neuron_size: Option<u32>,
}

/// A single-neuron pin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NeuronPinSpec {
    /// Population label.
    pub population: String,
    /// Neuron index.
    pub index: u32,
    /// Chip as `[x, y]`.
    pub chip: [u16; 2],
}

/// The complete network description.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkDescription {
    /// Populations in id order.
    #[serde(default)]
    pub populations: Vec<PopulationSpec>,
    /// Projections in id order.
    #[serde(default)]
    pub projections: Vec<ProjectionSpec>,
    /// Population placement directives.
    #[serde(default)]
    pub placement: Vec<PlacementSpec>,
    /// Single-neuron placement directives.
    #[serde(default)]
    pub neuron_placement: Vec<NeuronPinSpec>,
}

fn chip([x, y]: [u16; 2]) -> ChipCoord {
    ChipCoord::new(x, y)
}

impl NetworkDescription {
    /// Parses a TOML network description.
    pub fn from_toml_str(content: &str) -> Result<Self, NetworkError> {
        toml::from_str(content).map_err(|e| NetworkError::Parse(e.to_string()))
    }

    /// Reads a TOML network description from disk.
    pub fn from_file(path: &Path) -> Result<Self, NetworkError> {
        let content = std::fs::read_to_string(path).map_err(|e| NetworkError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_toml_str(&content)
    }

    /// Resolves labels and builds the network.
    pub fn build(&self) -> Result<Network, NetworkError> {
        let mut net = Network::new();
        for spec in &self.populations {
            let id = net.add_population(spec.label.clone(), spec.size, spec.cell_type)?;
            if spec.record_voltage {
                net.record_voltage(id)?;
            }
        }

        let resolve = |net: &Network, label: &str| -> Result<PopulationId, NetworkError> {
            net.population_by_label(label)
                .map(|p| p.id)
                .ok_or_else(|| NetworkError::UnknownPopulation(label.to_string()))
        };

        for spec in &self.projections {
            let source = resolve(&net, &spec.source)?;
            let target = resolve(&net, &spec.target)?;
            net.add_projection(source, target, spec.connector.clone(), spec.weight, spec.stp)?;
        }

        for spec in &self.placement {
            let pop = resolve(&net, &spec.population)?;
            if !spec.chips.is_empty() {
                net.placement
                    .on_chips(pop, spec.chips.iter().copied().map(chip));
            }
            if let Some(pin) = &spec.denmems {
                net.placement
                    .on_denmems(pop, chip(pin.chip), DenmemId::from_raw(pin.first));
            }
            if let Some(size) = spec.neuron_size {
                net.placement.with_neuron_size(pop, size);
            }
        }

        for spec in &self.neuron_placement {
            let pop = resolve(&net, &spec.population)?;
            net.placement
                .on_neuron(BioNeuronId::new(pop, spec.index), chip(spec.chip));
        }

        net.validate_placement()?;
        debug!(
            target: "neuromap::network",
            "built network with {} populations, {} projections",
            net.populations().len(),
            net.projections().len()
        );
        Ok(net)
    }
}

/// Reads, parses and builds a network from a TOML file.
pub fn load_network(path: &Path) -> Result<Network, NetworkError> {
    NetworkDescription::from_file(path)?.build()
}
