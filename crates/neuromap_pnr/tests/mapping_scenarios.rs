//! End-to-end mapping runs over small networks.
//!
//! Each test builds a network in memory, maps it onto a preset or a
//! hand-built fabric, and checks the result through the query interface of
//! `MappingResult`.

use neuromap_common::{BioNeuronId, ChipCoord, DenmemId, StpMode};
use neuromap_config::{MappingConfig, PlacementConfig, SpillPolicy};
use neuromap_network::{CellType, Connector, Network, StpDescriptor};
use neuromap_pnr::{map_network, MappingError};
use neuromap_results::{LossReason, MappingResult};
use neuromap_topology::{load_topology, FabricDescription, Topology};
use std::collections::{HashMap, HashSet};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn all_to_all() -> Connector {
    Connector::AllToAll {
        allow_self_connections: true,
    }
}

fn tm(tau_rec: f64, tau_facil: f64) -> StpDescriptor {
    StpDescriptor::TsodyksMarkram {
        u: 0.5,
        tau_rec,
        tau_facil,
    }
}

fn map(network: &Network, preset: &str) -> Result<MappingResult, MappingError> {
    let topo = load_topology(preset).unwrap();
    map_network(network, &topo, &MappingConfig::default())
}

/// A fabric of `width` x 1 chips with one synapse driver of `capacity` each.
fn starved_fabric(width: u16, capacity: u32) -> Topology {
    let mut desc = FabricDescription::grid("starved", width, 1);
    desc.defaults.synapse_drivers = 1;
    desc.defaults.driver_capacity = capacity;
    Topology::from_description(&desc).unwrap()
}

/// Two computed populations with recurrent and feed-forward projections
/// plus an external stimulus.
fn small_cortex() -> Network {
    let mut net = Network::new();
    let exc = net.add_population("exc", 40, CellType::Computed).unwrap();
    let inh = net.add_population("inh", 10, CellType::Computed).unwrap();
    let stim = net.add_population("stim", 20, CellType::ExternalInput).unwrap();
    net.add_projection(
        exc,
        exc,
        Connector::FixedProbability {
            p_connect: 0.1,
            seed: 7,
        },
        0.5,
        Some(tm(100.0, 0.0)),
    )
    .unwrap();
    net.add_projection(exc, inh, all_to_all(), 0.5, None).unwrap();
    net.add_projection(inh, exc, all_to_all(), -1.0, Some(tm(0.0, 30.0)))
        .unwrap();
    net.add_projection(
        stim,
        exc,
        Connector::FixedProbability {
            p_connect: 0.2,
            seed: 1,
        },
        1.0,
        None,
    )
    .unwrap();
    net
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[test]
fn single_neuron_without_projections() {
    let mut net = Network::new();
    net.add_population("p", 1, CellType::Computed).unwrap();
    let result = map(&net, "single_chip").unwrap();

    assert_eq!(result.placement.len(), 1);
    assert_eq!(result.stats.synapse_loss(), 0);
    assert!(result.is_lossless());
    assert!(result.analog_outputs.is_empty());
    assert!(result.driver_assignments.is_empty());
}

#[test]
fn external_sources_get_addresses_only() {
    let mut net = Network::new();
    let tgt = net.add_population("target", 1, CellType::Computed).unwrap();
    let a = net.add_population("a", 2, CellType::ExternalInput).unwrap();
    let b = net.add_population("b", 5, CellType::ExternalInput).unwrap();
    net.add_projection(a, tgt, all_to_all(), 1.0, None).unwrap();
    net.add_projection(b, tgt, all_to_all(), 1.0, None).unwrap();

    let result = map(&net, "single_chip").unwrap();
    assert_eq!(result.placement.len(), 8);

    let default_size = PlacementConfig::default().default_neuron_size as usize;
    for item in &result.placement {
        if item.bio_neuron.population == tgt {
            assert!(item.neuron_block.is_some());
            assert_eq!(item.logical_neuron.size(), default_size);
            assert_eq!(result.stats.denmems(item.bio_neuron).len(), default_size);
        } else {
            assert!(item.is_external());
            assert!(item.neuron_block.is_none());
            assert!(item.logical_neuron.denmems().is_empty());
            assert!(result.stats.denmems(item.bio_neuron).is_empty());
        }
    }
    assert_eq!(result.stats.num_synapses(), 7);
    assert!(result.is_lossless());
}

#[test]
fn analog_capacity_per_chip() {
    let chip = ChipCoord::new(0, 0);
    let build = |pinned: usize| {
        let mut net = Network::new();
        for i in 0..pinned {
            let p = net
                .add_population(format!("p{i}"), 1, CellType::Computed)
                .unwrap();
            net.record_voltage(p).unwrap();
            net.placement.on_chip(p, chip);
        }
        net
    };

    let err = map(&build(3), "quad").unwrap_err();
    match err {
        MappingError::CapacityExceeded {
            chip: c,
            requested,
            available,
        } => {
            assert_eq!(c, chip);
            assert_eq!(requested, 3);
            assert_eq!(available, 2);
        }
        other => panic!("expected CapacityExceeded, got {other:?}"),
    }

    let result = map(&build(2), "quad").unwrap();
    assert_eq!(result.analog_outputs.len(), 2);
    for item in result.analog_outputs.iter() {
        let placed = result
            .placement
            .find_by_logical_neuron(item.logical_neuron())
            .unwrap();
        assert_eq!(&placed.logical_neuron, item.logical_neuron());
        assert_eq!(item.chip, chip);
    }
}

#[test]
fn one_driver_per_stp_mode() {
    let mut net = Network::new();
    let tgt = net.add_population("target", 1, CellType::Computed).unwrap();
    let dynamics = [Some(tm(100.0, 0.0)), Some(tm(0.0, 50.0)), None];
    let mut sources = Vec::new();
    for (i, dyn_) in dynamics.into_iter().enumerate() {
        let src = net
            .add_population(format!("src{i}"), 1, CellType::ExternalInput)
            .unwrap();
        net.add_projection(src, tgt, Connector::OneToOne, 1.0, dyn_)
            .unwrap();
        sources.push(src);
    }

    let result = map(&net, "single_chip").unwrap();
    assert_eq!(result.driver_assignments.active_drivers(), 3);

    let modes: HashSet<StpMode> = result.driver_assignments.iter().map(|d| d.mode).collect();
    assert_eq!(
        modes,
        [StpMode::Depression, StpMode::Facilitation, StpMode::Static]
            .into_iter()
            .collect()
    );

    let source_addrs: Vec<_> = sources
        .iter()
        .map(|&p| result.stats.hw_ids(BioNeuronId::new(p, 0))[0])
        .collect();
    for driver in result.driver_assignments.iter() {
        assert_eq!(driver.synapses.len(), 1);
        let matches = source_addrs
            .iter()
            .filter(|&&a| a == driver.synapses[0].source)
            .count();
        assert_eq!(matches, 1);
    }
}

// ---------------------------------------------------------------------------
// Invariants
// ---------------------------------------------------------------------------

#[test]
fn address_lookup_is_a_bijection() {
    let net = small_cortex();
    let result = map(&net, "quad").unwrap();
    assert_eq!(result.placement.len() as u64, net.neuron_count());

    let mut seen = HashSet::new();
    for bio in net.neurons() {
        let hw = result.stats.hw_ids(bio);
        assert_eq!(hw.len(), 1);
        assert!(seen.insert(hw[0]), "address {} reused", hw[0]);
        let back = result.stats.bio_id(hw[0]).unwrap();
        assert_eq!(back, bio);
        assert_eq!(result.stats.hw_ids(back), hw);
    }
}

#[test]
fn denmems_are_distinct_and_sized() {
    let mut net = small_cortex();
    let big = net.add_population("big", 30, CellType::Computed).unwrap();
    net.placement.with_neuron_size(big, 8);
    let result = map(&net, "quad").unwrap();

    let mut owners = HashMap::new();
    for item in result.placement.iter().filter(|i| !i.is_external()) {
        let expected = if item.bio_neuron.population == big { 8 } else { 4 };
        let denmems = result.stats.denmems(item.bio_neuron);
        assert_eq!(denmems.len(), expected);
        for &d in denmems {
            assert_eq!(owners.insert(d, item.bio_neuron), None);
            assert_eq!(result.stats.bio_id_of_denmem(d), Some(item.bio_neuron));
        }
    }
}

#[test]
fn drivers_never_mix_modes() {
    let net = small_cortex();
    let result = map(&net, "quad").unwrap();
    assert!(result.is_lossless());
    assert!(result.driver_assignments.active_drivers() > 0);

    for driver in result.driver_assignments.iter() {
        assert!(driver.mode.is_routable());
        assert!(driver.load() <= driver.capacity as usize);
        for binding in &driver.synapses {
            let projection = net.projection(binding.projection).unwrap();
            assert_eq!(projection.stp_mode(), Some(driver.mode));
        }
    }
    assert_eq!(
        result.driver_assignments.bound_synapses() as u64,
        result.stats.num_synapses()
    );
}

#[test]
fn record_is_idempotent() {
    let mut net = Network::new();
    let p = net.add_population("p", 2, CellType::Computed).unwrap();
    let mut result = map(&net, "single_chip").unwrap();
    let logical = result
        .placement
        .find(BioNeuronId::new(p, 1))
        .unwrap()
        .logical_neuron
        .clone();

    let first = result.analog_outputs.record(&logical).unwrap().clone();
    let second = result.analog_outputs.record(&logical).unwrap().clone();
    assert_eq!(first, second);
    assert_eq!(result.analog_outputs.len(), 1);
}

// ---------------------------------------------------------------------------
// Failure and degradation paths
// ---------------------------------------------------------------------------

#[test]
fn lenient_placement_leaves_neurons_unplaced() {
    let mut desc = FabricDescription::grid("tiny", 1, 1);
    desc.defaults.denmems = 16;
    desc.defaults.denmems_per_block = 8;
    desc.defaults.output_buffers = 2;
    let topo = Topology::from_description(&desc).unwrap();

    let mut net = Network::new();
    let p = net.add_population("p", 6, CellType::Computed).unwrap();
    net.add_projection(p, p, Connector::OneToOne, 1.0, None)
        .unwrap();

    let strict = map_network(&net, &topo, &MappingConfig::default()).unwrap_err();
    assert!(matches!(strict, MappingError::ResourceExhaustion { .. }));

    let mut config = MappingConfig::default();
    config.placement.strict = false;
    let result = map_network(&net, &topo, &config).unwrap();
    assert_eq!(result.placement.len(), 4);
    assert_eq!(result.stats.unplaced_neurons(), 2);
    assert_eq!(result.stats.num_neurons(), 6);
    assert!(result.placement.find(BioNeuronId::new(p, 5)).is_none());
    assert!(result.stats.hw_ids(BioNeuronId::new(p, 5)).is_empty());
    assert_eq!(result.stats.synapse_loss(), 2);
    assert!(result
        .lost_synapses
        .iter()
        .all(|l| l.reason == LossReason::Unplaced));
}

#[test]
fn overlapping_manual_pins_conflict() {
    let mut net = Network::new();
    let a = net.add_population("a", 4, CellType::Computed).unwrap();
    let b = net.add_population("b", 1, CellType::Computed).unwrap();
    let chip = ChipCoord::new(0, 0);
    net.placement
        .on_denmems(a, chip, DenmemId::from_raw(0))
        .on_denmems(b, chip, DenmemId::from_raw(8));
    let err = map(&net, "single_chip").unwrap_err();
    assert!(matches!(err, MappingError::PlacementConflict { .. }));
    assert!(err.to_string().contains("\"a\""));
}

#[test]
fn driver_overflow_is_counted_as_loss() {
    let mut net = Network::new();
    let tgt = net.add_population("t", 1, CellType::Computed).unwrap();
    let src = net.add_population("s", 5, CellType::ExternalInput).unwrap();
    net.add_projection(src, tgt, all_to_all(), 1.0, None).unwrap();
    net.placement.on_chip(tgt, ChipCoord::new(0, 0));

    let topo = starved_fabric(2, 3);
    let result = map_network(&net, &topo, &MappingConfig::default()).unwrap();
    assert!(!result.is_lossless());
    assert_eq!(result.stats.synapse_loss(), 2);
    assert_eq!(result.lost_synapses.len(), 2);
    assert!(result
        .lost_synapses
        .iter()
        .all(|l| l.reason == LossReason::DriverCapacity));

    let mut config = MappingConfig::default();
    config.routing.spill = SpillPolicy::Neighbors;
    let result = map_network(&net, &topo, &config).unwrap();
    assert!(result.is_lossless());
    let spilled: Vec<_> = result
        .driver_assignments
        .iter()
        .filter(|d| d.is_spilled())
        .collect();
    assert_eq!(spilled.len(), 1);
    assert_eq!(spilled[0].chip, ChipCoord::new(1, 0));
    assert_eq!(spilled[0].target_chip, ChipCoord::new(0, 0));
    assert_eq!(spilled[0].load(), 2);
}

#[test]
fn chip_without_drivers_is_fatal() {
    let mut net = Network::new();
    let tgt = net.add_population("t", 1, CellType::Computed).unwrap();
    let src = net.add_population("s", 1, CellType::ExternalInput).unwrap();
    net.add_projection(src, tgt, all_to_all(), 1.0, None).unwrap();

    let topo = starved_fabric(1, 0);
    let err = map_network(&net, &topo, &MappingConfig::default()).unwrap_err();
    assert!(matches!(err, MappingError::RoutingUnreachable { .. }));
}

#[test]
fn invalid_directive_is_rejected_before_placement() {
    let mut net = Network::new();
    let p = net.add_population("p", 2, CellType::Computed).unwrap();
    net.placement
        .on_neuron(BioNeuronId::new(p, 9), ChipCoord::new(0, 0));
    let err = map(&net, "single_chip").unwrap_err();
    assert!(matches!(err, MappingError::Network(_)));
}

#[test]
fn disabled_analog_pass_binds_nothing() {
    let mut net = Network::new();
    let p = net.add_population("p", 5, CellType::Computed).unwrap();
    net.record_voltage(p).unwrap();
    let topo = load_topology("single_chip").unwrap();
    let mut config = MappingConfig::default();
    config.analog.enabled = false;
    let result = map_network(&net, &topo, &config).unwrap();
    assert!(result.analog_outputs.is_empty());
    assert_eq!(
        result.analog_outputs.channels(ChipCoord::new(0, 0)).map(<[_]>::len),
        Some(2)
    );
}
