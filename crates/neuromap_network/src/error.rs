//! Error types for network construction and loading.

use neuromap_common::{BioNeuronId, PopulationId, ProjectionId};
use std::path::PathBuf;

/// Errors raised while building or loading a biological network.
#[derive(Debug, thiserror::Error)]
pub enum NetworkError {
    /// The network description could not be read from disk.
    #[error("failed to read network description {path}: {source}")]
    Io {
        /// The description file path.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The network description is not valid TOML for the expected schema.
    #[error("failed to parse network description: {0}")]
    Parse(String),

    /// A population has zero neurons.
    #[error("population {label:?} has no neurons")]
    EmptyPopulation {
        /// The population label.
        label: String,
    },

    /// Two populations share the same label.
    #[error("duplicate population label {0:?}")]
    DuplicateLabel(String),

    /// A reference names a population that does not exist.
    #[error("unknown population {0:?}")]
    UnknownPopulation(String),

    /// A neuron index is outside its population.
    #[error("neuron {neuron} is out of range (population size {size})")]
    NeuronOutOfRange {
        /// The offending neuron.
        neuron: BioNeuronId,
        /// The population size.
        size: u32,
    },

    /// A projection is inconsistent with its endpoints or has invalid dynamics.
    #[error("invalid projection {projection} from {source_label:?} to {target_label:?}: {reason}")]
    InvalidProjection {
        /// The projection id it would have received.
        projection: ProjectionId,
        /// Label of the source population.
        source_label: String,
        /// Label of the target population.
        target_label: String,
        /// Why the projection was rejected.
        reason: String,
    },

    /// A manual placement directive is invalid.
    #[error("invalid placement directive for population {population}: {reason}")]
    InvalidDirective {
        /// The population the directive applies to.
        population: PopulationId,
        /// Why the directive was rejected.
        reason: String,
    },
}
