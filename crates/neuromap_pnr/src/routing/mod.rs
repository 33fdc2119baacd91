//! Synapse routing engine.
//!
//! Every projection is realized into single synapses, which are grouped by
//! the chip of their target neuron and the STP mode they require. Each group
//! is packed greedily onto synapse drivers of its own chip. Overflow may
//! then spill onto drivers of neighboring chips that are still free.
//! Synapses that do not fit are returned as data, never raised.

mod drivers;
mod enumerate;

use crate::error::MappingError;
use drivers::DriverPool;
use enumerate::{enumerate, Synapse};
use neuromap_common::{ChipCoord, HardwareAddress, StpMode};
use neuromap_config::SpillPolicy;
use neuromap_network::Network;
use neuromap_results::{LossReason, LostSynapse, Placement, SynapseRouting};
use neuromap_topology::Topology;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Output of the routing engine.
#[derive(Debug, Clone, Default)]
pub struct RoutingOutcome {
    /// The driver table.
    pub routing: SynapseRouting,
    /// Synapses that could not be routed.
    pub lost: Vec<LostSynapse>,
    /// Number of realized synapses, routed or lost.
    pub synapse_count: u64,
}

impl RoutingOutcome {
    /// The synapse loss counter.
    pub fn synapse_loss(&self) -> u64 {
        self.lost.len() as u64
    }
}

/// Routes every synapse of `network` onto the drivers of `topology`.
///
/// # Errors
///
/// Fails with [`MappingError::RoutingUnreachable`] if synapses target a chip
/// without any driver capacity.
pub fn route(
    network: &Network,
    topology: &Topology,
    placement: &Placement,
    spill: SpillPolicy,
) -> Result<RoutingOutcome, MappingError> {
    let synapses = enumerate(network)?;
    let synapse_count = synapses.len() as u64;

    let mut lost = Vec::new();
    let mut groups: BTreeMap<(ChipCoord, StpMode), Vec<(Synapse, HardwareAddress)>> =
        BTreeMap::new();
    for synapse in synapses {
        match (placement.find(synapse.source), placement.find(synapse.target)) {
            (Some(source), Some(target)) => groups
                .entry((target.chip(), synapse.mode))
                .or_default()
                .push((synapse, source.address)),
            _ => lost.push(LostSynapse {
                projection: synapse.projection,
                source: synapse.source,
                target: synapse.target,
                reason: LossReason::Unplaced,
            }),
        }
    }

    check_reachable(topology, &groups)?;

    let mut pool = DriverPool::new(topology, spill);
    let mut overflow = Vec::new();
    for (&(chip, mode), members) in &groups {
        let rest = pool.route_group(chip, mode, members);
        debug!(
            target: "neuromap::routing",
            "{chip} {mode}: {} synapses, {} over capacity",
            members.len(),
            rest.len()
        );
        if !rest.is_empty() {
            overflow.push((chip, mode, rest));
        }
    }
    // Spill only into drivers no group needed on its own chip.
    for (chip, mode, rest) in overflow {
        let dropped = pool.spill_group(chip, mode, &rest);
        lost.extend(dropped.into_iter().map(|(synapse, _)| LostSynapse {
            projection: synapse.projection,
            source: synapse.source,
            target: synapse.target,
            reason: LossReason::DriverCapacity,
        }));
    }

    let outcome = RoutingOutcome {
        routing: SynapseRouting::new(pool.into_assignments()),
        lost,
        synapse_count,
    };
    if outcome.synapse_loss() > 0 {
        warn!(
            target: "neuromap::routing",
            "{} of {} synapses could not be routed",
            outcome.synapse_loss(),
            synapse_count
        );
    }
    Ok(outcome)
}

fn check_reachable(
    topology: &Topology,
    groups: &BTreeMap<(ChipCoord, StpMode), Vec<(Synapse, HardwareAddress)>>,
) -> Result<(), MappingError> {
    let mut first_projection = BTreeMap::new();
    for (&(chip, _), members) in groups {
        if let Some(p) = members.iter().map(|(s, _)| s.projection).min() {
            first_projection
                .entry(chip)
                .and_modify(|q| *q = p.min(*q))
                .or_insert(p);
        }
    }
    for (chip, projection) in first_projection {
        let capacity = topology
            .chip(chip)
            .map_or(0, |resources| resources.total_driver_capacity());
        if capacity == 0 {
            return Err(MappingError::RoutingUnreachable { projection, chip });
        }
    }
    Ok(())
}
