//! Place-and-route engine for neuromorphic fabrics.
//!
//! This crate maps a biological [`Network`] onto the neuron circuits,
//! synapse drivers and analog outputs of a [`Topology`]. The output is a
//! [`MappingResult`] that answers lookups in both directions and can be
//! persisted.
//!
//! # Pipeline
//!
//! 1. **Place**: manual directives first, then greedy placement of the
//!    remaining neurons and external inputs
//! 2. **Route**: realize every projection and pack the synapses onto
//!    STP-mode-exclusive drivers, counting what does not fit
//! 3. **Analog**: bind recorded neurons to the analog outputs of their chip
//!
//! Each stage only reads the output of the previous one. A fatal error in
//! any stage ends the run without a result.
//!
//! # Usage
//!
//! ```ignore
//! use neuromap_pnr::map_network;
//!
//! let result = map_network(&network, &topology, &config)?;
//! assert!(result.is_lossless());
//! ```

#![warn(missing_docs)]

pub mod analog;
pub mod error;
pub mod placement;
pub mod routing;

pub use analog::{assign_analog, channel_inventory};
pub use error::MappingError;
pub use placement::{place, PlacementOutcome};
pub use routing::{route, RoutingOutcome};

use neuromap_config::MappingConfig;
use neuromap_network::Network;
use neuromap_results::{MappingResult, MappingStats, Placement, StageTiming};
use neuromap_topology::Topology;
use std::time::Instant;
use tracing::info;

/// Runs the complete mapping pipeline.
///
/// # Errors
///
/// Returns the first fatal [`MappingError`] of any stage. Synapse loss is
/// not an error; check [`MappingResult::is_lossless`].
pub fn map_network(
    network: &Network,
    topology: &Topology,
    config: &MappingConfig,
) -> Result<MappingResult, MappingError> {
    network.validate_placement()?;
    info!(
        target: "neuromap::pnr",
        "mapping {} neurons in {} populations onto {:?} ({} chips)",
        network.neuron_count(),
        network.populations().len(),
        topology.name(),
        topology.chip_count()
    );

    let started = Instant::now();
    let placed = place(network, topology, &config.placement)?;
    let unplaced = placed.unplaced.len() as u64;
    let placement = Placement::new(placed.items);
    let placement_time = started.elapsed();
    info!(
        target: "neuromap::pnr",
        "placed {} neurons ({} unplaced)",
        placement.len(),
        unplaced
    );

    let started = Instant::now();
    let routed = route(network, topology, &placement, config.routing.spill)?;
    let routing_time = started.elapsed();
    info!(
        target: "neuromap::pnr",
        "routed {} synapses over {} drivers, {} lost",
        routed.synapse_count,
        routed.routing.active_drivers(),
        routed.synapse_loss()
    );

    let started = Instant::now();
    let analog_outputs = if config.analog.enabled {
        assign_analog(network, topology, &placement)?
    } else {
        channel_inventory(topology)
    };
    let analog_time = started.elapsed();

    let mut stats = MappingStats::new(
        network.neuron_count(),
        unplaced,
        routed.synapse_count,
        routed.synapse_loss(),
    );
    stats.timing = StageTiming {
        placement: placement_time,
        routing: routing_time,
        analog: analog_time,
    };
    info!(
        target: "neuromap::pnr",
        "mapping finished in {:.1} ms",
        stats.timing.total_ms()
    );

    Ok(MappingResult::new(
        placement,
        routed.routing,
        analog_outputs,
        stats,
        routed.lost,
    ))
}
