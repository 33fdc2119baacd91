//! Projections between populations.

use crate::connector::Connector;
use crate::dynamics::{self, StpDescriptor};
use neuromap_common::{PopulationId, ProjectionId, StpMode};
use serde::{Deserialize, Serialize};

/// A directed bundle of synapses from one population to another.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projection {
    /// The projection id.
    pub id: ProjectionId,
    /// Presynaptic population.
    pub source: PopulationId,
    /// Postsynaptic population.
    pub target: PopulationId,
    /// Connectivity pattern.
    pub connector: Connector,
    /// Synaptic weight applied to every synapse.
    pub weight: f64,
    /// Optional short-term plasticity.
    pub dynamics: Option<StpDescriptor>,
}

impl Projection {
    /// The synapse driver mode every synapse of this projection requires.
    pub fn stp_mode(&self) -> Option<StpMode> {
        dynamics::classify(self.dynamics.as_ref())
    }

    /// Returns `true` for recurrent projections.
    pub fn is_recurrent(&self) -> bool {
        self.source == self.target
    }
}
