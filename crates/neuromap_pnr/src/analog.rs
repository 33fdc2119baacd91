//! Analog output assignment.

use crate::error::MappingError;
use neuromap_common::ChipCoord;
use neuromap_network::Network;
use neuromap_results::{AnalogOutputs, Placement};
use neuromap_topology::Topology;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// An empty binding table over the channel inventory of every chip.
pub fn channel_inventory(topology: &Topology) -> AnalogOutputs {
    AnalogOutputs::new(
        topology
            .chips()
            .map(|chip| (chip.coord, chip.analog_outputs.clone())),
    )
}

/// Binds every recorded neuron to an analog output channel of its chip.
///
/// Recorded neurons are the placed neurons of computed populations marked
/// for voltage recording, taken in placement order. Demand is checked per
/// chip before anything is bound.
///
/// # Errors
///
/// Fails with [`MappingError::CapacityExceeded`] if a chip hosts more
/// recorded neurons than it has channels.
pub fn assign_analog(
    network: &Network,
    topology: &Topology,
    placement: &Placement,
) -> Result<AnalogOutputs, MappingError> {
    let mut outputs = channel_inventory(topology);

    for pop in network.populations() {
        if pop.record_voltage && pop.is_external() {
            warn!(
                target: "neuromap::analog",
                "population {:?} is an external input and cannot be recorded",
                pop.label
            );
        }
    }

    let recorded: Vec<_> = placement
        .iter()
        .filter(|item| !item.is_external())
        .filter(|item| {
            network
                .population(item.bio_neuron.population)
                .is_some_and(|p| p.record_voltage)
        })
        .collect();

    let mut demand: BTreeMap<ChipCoord, usize> = BTreeMap::new();
    for item in &recorded {
        *demand.entry(item.chip()).or_default() += 1;
    }
    for (chip, requested) in demand {
        let available = outputs.channels(chip).map_or(0, <[_]>::len);
        if requested > available {
            return Err(MappingError::CapacityExceeded {
                chip,
                requested,
                available,
            });
        }
    }

    for item in recorded {
        let bound = outputs.record(&item.logical_neuron)?;
        debug!(
            target: "neuromap::analog",
            "recording {} on {} channel {}",
            item.bio_neuron,
            bound.chip,
            bound.channel
        );
    }
    Ok(outputs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::placement::place;
    use neuromap_config::PlacementConfig;
    use neuromap_network::CellType;
    use neuromap_topology::load_topology;

    fn run(network: &Network) -> Result<AnalogOutputs, MappingError> {
        let topo = load_topology("single_chip").unwrap();
        let out = place(network, &topo, &PlacementConfig::default()).unwrap();
        assign_analog(network, &topo, &Placement::new(out.items))
    }

    #[test]
    fn unrecorded_network_binds_nothing() {
        let mut net = Network::new();
        net.add_population("p", 4, CellType::Computed).unwrap();
        let outputs = run(&net).unwrap();
        assert!(outputs.is_empty());
        assert_eq!(outputs.channels(ChipCoord::new(0, 0)).unwrap().len(), 2);
    }

    #[test]
    fn too_many_recorded_neurons() {
        let mut net = Network::new();
        let p = net.add_population("p", 3, CellType::Computed).unwrap();
        net.record_voltage(p).unwrap();
        let err = run(&net).unwrap_err();
        assert!(matches!(
            err,
            MappingError::CapacityExceeded {
                requested: 3,
                available: 2,
                ..
            }
        ));
    }

    #[test]
    fn external_recording_is_skipped() {
        let mut net = Network::new();
        let p = net.add_population("in", 2, CellType::ExternalInput).unwrap();
        net.record_voltage(p).unwrap();
        assert!(run(&net).unwrap().is_empty());
    }
}
