//! Configuration types deserialized from `neuromap.toml`.

use serde::Deserialize;
use std::path::PathBuf;

/// The top-level run configuration parsed from `neuromap.toml`.
///
/// Every section is optional; a missing section takes its defaults.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MappingConfig {
    /// Neuron placement settings.
    #[serde(default)]
    pub placement: PlacementConfig,
    /// Synapse routing settings.
    #[serde(default)]
    pub routing: RoutingConfig,
    /// Analog output settings.
    #[serde(default)]
    pub analog: AnalogConfig,
    /// Which backend consumes the mapping.
    #[serde(default)]
    pub backend: BackendConfig,
    /// Where the mapping result is written.
    #[serde(default)]
    pub persistence: PersistenceConfig,
    /// The fabric to map onto.
    #[serde(default)]
    pub topology: Option<TopologyConfig>,
}

/// Settings of the placement engine.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PlacementConfig {
    /// Denmems per logical neuron unless a population overrides it.
    pub default_neuron_size: u32,
    /// Fail the run when a neuron cannot be placed. When `false`, such
    /// neurons are counted as unplaced and left out of the result.
    pub strict: bool,
    /// Order in which routing addresses are drawn from a buffer.
    pub address_strategy: AddressStrategy,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            default_neuron_size: 4,
            strict: true,
            address_strategy: AddressStrategy::default(),
        }
    }
}

/// Order in which free routing addresses are handed out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AddressStrategy {
    /// Lowest free address first (default).
    #[default]
    Low,
    /// Highest free address first.
    High,
    /// Alternate between the low and the high end.
    Alternate,
}

/// Settings of the synapse routing engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    /// What happens to synapses that do not fit on the target chip's drivers.
    pub spill: SpillPolicy,
}

/// Handling of synapses that overflow the drivers of their target chip.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpillPolicy {
    /// Record overflow as synapse loss (default).
    #[default]
    None,
    /// Try free drivers on adjacent chips before recording loss.
    Neighbors,
}

/// Analog output settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AnalogConfig {
    /// Bind recorded neurons to analog output channels.
    pub enabled: bool,
}

impl Default for AnalogConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Backend selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// The backend kind.
    pub kind: BackendKind,
}

/// The consumer of a mapping result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Mapping only (default).
    #[default]
    None,
    /// An executable model of the configured hardware.
    Simulator,
    /// The physical system.
    Hardware,
}

/// Persistence settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PersistenceConfig {
    /// Result file; the extension selects the encoding.
    pub path: Option<PathBuf>,
}

/// The fabric to map onto: a built-in preset or a description file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TopologyConfig {
    /// Name of a built-in fabric.
    pub preset: Option<String>,
    /// Path of a TOML fabric description.
    pub file: Option<PathBuf>,
}

/// A validated topology selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TopologySource {
    /// A built-in fabric.
    Preset(String),
    /// A fabric description file.
    File(PathBuf),
}

impl MappingConfig {
    /// The configured topology, if the `[topology]` section is present.
    ///
    /// Only meaningful on a validated configuration, where exactly one of
    /// `preset` and `file` is set.
    pub fn topology_source(&self) -> Option<TopologySource> {
        let topo = self.topology.as_ref()?;
        match (&topo.preset, &topo.file) {
            (Some(name), None) => Some(TopologySource::Preset(name.clone())),
            (None, Some(path)) => Some(TopologySource::File(path.clone())),
            _ => None,
        }
    }
}
