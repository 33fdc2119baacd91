//! Fatal errors of a mapping run.

use neuromap_common::{ChipCoord, ProjectionId};
use neuromap_network::NetworkError;
use neuromap_results::AnalogError;

/// Conditions that abort a mapping run.
///
/// Synapse loss is not an error: it is reported in the result statistics.
#[derive(Debug, thiserror::Error)]
pub enum MappingError {
    /// No chip has room for a neuron of the population.
    #[error("out of {resource} while placing population {population:?}")]
    ResourceExhaustion {
        /// Label of the population being placed.
        population: String,
        /// The exhausted resource.
        resource: String,
    },

    /// Two manual directives claim the same denmems.
    #[error("placement of population {population:?} overlaps population {other:?} on {chip}")]
    PlacementConflict {
        /// Label of the population being placed.
        population: String,
        /// Label of the population already holding the denmems.
        other: String,
        /// The chip.
        chip: ChipCoord,
    },

    /// A chip receiving synapses has no synapse driver capacity at all.
    #[error("projection {projection} targets {chip}, which has no synapse driver capacity")]
    RoutingUnreachable {
        /// The first projection with synapses onto the chip.
        projection: ProjectionId,
        /// The chip.
        chip: ChipCoord,
    },

    /// More neurons are recorded on a chip than it has analog outputs.
    #[error("{requested} recorded neurons on {chip}, but only {available} analog outputs")]
    CapacityExceeded {
        /// The chip.
        chip: ChipCoord,
        /// Number of recorded neurons placed on the chip.
        requested: usize,
        /// Number of analog output channels of the chip.
        available: usize,
    },

    /// A neuron size cannot be realized on the fabric.
    #[error("invalid neuron size {size} for population {population:?}: {reason}")]
    InvalidNeuronSize {
        /// Label of the population.
        population: String,
        /// The requested denmems per neuron.
        size: u32,
        /// Why the size is invalid.
        reason: String,
    },

    /// A directive names a chip that is not part of the fabric.
    #[error("{chip} is not part of the fabric ({context})")]
    UnknownChip {
        /// The chip.
        chip: ChipCoord,
        /// Where the chip was named.
        context: String,
    },

    /// A manual directive cannot be realized on the named chip.
    #[error("invalid placement of population {population:?}: {reason}")]
    InvalidDirective {
        /// Label of the population.
        population: String,
        /// Why the directive is invalid.
        reason: String,
    },

    /// A projection cannot be routed as described.
    #[error("invalid projection {projection}: {reason}")]
    InvalidProjection {
        /// The projection.
        projection: ProjectionId,
        /// Why it is invalid.
        reason: String,
    },

    /// The network failed validation.
    #[error(transparent)]
    Network(#[from] NetworkError),

    /// An analog output could not be bound.
    #[error(transparent)]
    Analog(#[from] AnalogError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_resource_exhaustion() {
        let err = MappingError::ResourceExhaustion {
            population: "exc".into(),
            resource: "denmems".into(),
        };
        assert_eq!(
            err.to_string(),
            "out of denmems while placing population \"exc\""
        );
    }

    #[test]
    fn display_capacity_exceeded() {
        let err = MappingError::CapacityExceeded {
            chip: ChipCoord::new(0, 0),
            requested: 3,
            available: 2,
        };
        assert_eq!(
            err.to_string(),
            "3 recorded neurons on chip(0,0), but only 2 analog outputs"
        );
    }

    #[test]
    fn network_error_converts() {
        let err: MappingError = NetworkError::DuplicateLabel("a".into()).into();
        assert!(matches!(err, MappingError::Network(_)));
        assert_eq!(err.to_string(), "duplicate population label \"a\"");
    }
}
