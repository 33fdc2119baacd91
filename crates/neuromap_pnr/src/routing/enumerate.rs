//! Realization of projections into single synapses.

use crate::error::MappingError;
use neuromap_common::{BioNeuronId, ProjectionId, StpMode};
use neuromap_network::{Network, Projection};
use rayon::prelude::*;

/// One realized synapse, before routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Synapse {
    pub projection: ProjectionId,
    pub source: BioNeuronId,
    pub target: BioNeuronId,
    pub mode: StpMode,
}

/// Realizes every projection of the network.
///
/// Projections are expanded in parallel; the result is in projection order,
/// then in connector order within a projection.
pub(crate) fn enumerate(network: &Network) -> Result<Vec<Synapse>, MappingError> {
    let per_projection: Vec<Vec<Synapse>> = network
        .projections()
        .par_iter()
        .map(|projection| realize(network, projection))
        .collect::<Result<_, _>>()?;
    Ok(per_projection.into_iter().flatten().collect())
}

fn realize(network: &Network, projection: &Projection) -> Result<Vec<Synapse>, MappingError> {
    let invalid = |reason: &str| MappingError::InvalidProjection {
        projection: projection.id,
        reason: reason.to_string(),
    };
    let mode = projection
        .stp_mode()
        .ok_or_else(|| invalid("short-term plasticity descriptor has no routable mode"))?;
    let source = network
        .population(projection.source)
        .ok_or_else(|| invalid("unknown source population"))?;
    let target = network
        .population(projection.target)
        .ok_or_else(|| invalid("unknown target population"))?;

    Ok(projection
        .connector
        .realize(source.size, target.size, projection.is_recurrent())
        .into_iter()
        .map(|(s, t)| Synapse {
            projection: projection.id,
            source: BioNeuronId::new(source.id, s),
            target: BioNeuronId::new(target.id, t),
            mode,
        })
        .collect())
}
