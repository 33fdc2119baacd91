//! Placement engine.
//!
//! Assigns every biological neuron a hardware address and, for computed
//! neurons, a run of denmems. Placement is a sequence of passes over one
//! shared allocation state:
//!
//! 1. manual directives for computed populations (single-neuron pins,
//!    denmem pins, chip pins),
//! 2. manual directives for external inputs,
//! 3. automatic placement of the remaining computed neurons,
//! 4. automatic placement of the remaining external inputs near their targets.
//!
//! Manual directives reserve their resources before any automatic search
//! runs, so automatic placement only sees what is left.

mod auto;
mod input;
mod manual;
mod state;

use crate::error::MappingError;
use neuromap_common::{BioNeuronId, ChipCoord, HardwareAddress};
use neuromap_config::PlacementConfig;
use neuromap_network::{Network, Population};
use neuromap_results::{LogicalNeuron, PlacementItem};
use neuromap_topology::Topology;
use state::{ChipState, InputSlot, NeuronSlot};
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, warn};

/// Output of the placement engine.
#[derive(Debug, Clone, Default)]
pub struct PlacementOutcome {
    /// Committed items in placement order.
    pub items: Vec<PlacementItem>,
    /// Neurons that could not be placed (non-strict mode only).
    pub unplaced: Vec<BioNeuronId>,
}

/// Places every neuron of `network` on `topology`.
///
/// # Errors
///
/// Fails on unknown chips or invalid neuron sizes in directives, on
/// overlapping denmem pins, and, in strict mode, when a neuron cannot be
/// placed.
pub fn place(
    network: &Network,
    topology: &Topology,
    config: &PlacementConfig,
) -> Result<PlacementOutcome, MappingError> {
    let mut placer = Placer::new(network, topology, config)?;
    placer.place_manual_neurons()?;
    placer.place_manual_inputs()?;
    placer.place_auto_neurons()?;
    placer.place_auto_inputs()?;
    Ok(placer.finish())
}

/// Shared state of one placement run.
struct Placer<'a> {
    network: &'a Network,
    config: &'a PlacementConfig,
    fabric: BTreeMap<ChipCoord, ChipState<'a>>,
    items: Vec<PlacementItem>,
    decided: HashSet<BioNeuronId>,
    unplaced: Vec<BioNeuronId>,
}

impl<'a> Placer<'a> {
    fn new(
        network: &'a Network,
        topology: &'a Topology,
        config: &'a PlacementConfig,
    ) -> Result<Self, MappingError> {
        let placer = Self {
            network,
            config,
            fabric: topology.chips().map(|c| (c.coord, ChipState::new(c))).collect(),
            items: Vec::new(),
            decided: HashSet::new(),
            unplaced: Vec::new(),
        };
        placer.validate_directives()?;
        Ok(placer)
    }

    fn validate_directives(&self) -> Result<(), MappingError> {
        let manual = &self.network.placement;
        let largest_block = self
            .fabric
            .values()
            .map(|c| c.resources().denmems_per_block)
            .max()
            .unwrap_or(0);

        for pop in self.network.populations() {
            let context = || format!("placement of population {:?}", pop.label);
            let mut named: Vec<ChipCoord> = manual.chips_for(pop.id).unwrap_or_default().to_vec();
            named.extend(manual.denmems_for(pop.id).map(|d| d.chip));
            if let Some(&chip) = named.iter().find(|c| !self.fabric.contains_key(c)) {
                return Err(MappingError::UnknownChip {
                    chip,
                    context: context(),
                });
            }
            if let Some(first) = manual.denmems_for(pop.id) {
                let count = self
                    .fabric
                    .get(&first.chip)
                    .map_or(0, |c| c.resources().denmem_count);
                if first.denmem.as_raw() >= count {
                    return Err(MappingError::InvalidDirective {
                        population: pop.label.clone(),
                        reason: format!(
                            "denmem {} is out of range on {} ({count} denmems)",
                            first.denmem, first.chip
                        ),
                    });
                }
            }

            if pop.is_external() {
                continue;
            }
            let size = self.neuron_size(pop);
            let reason = if size < 2 || size % 2 != 0 {
                Some("must be even and at least 2".to_string())
            } else if size > largest_block {
                Some(format!("exceeds the neuron block size {largest_block}"))
            } else {
                None
            };
            if let Some(reason) = reason {
                return Err(MappingError::InvalidNeuronSize {
                    population: pop.label.clone(),
                    size,
                    reason,
                });
            }
        }

        for (neuron, chip) in manual.neuron_pins() {
            if !self.fabric.contains_key(&chip) {
                return Err(MappingError::UnknownChip {
                    chip,
                    context: format!("placement of neuron {neuron}"),
                });
            }
        }
        Ok(())
    }

    fn population(&self, bio: BioNeuronId) -> Option<&'a Population> {
        self.network.population(bio.population)
    }

    fn neuron_size(&self, pop: &Population) -> u32 {
        self.network
            .placement
            .neuron_size(pop.id)
            .unwrap_or(self.config.default_neuron_size)
    }

    /// Neurons of `pop` that no pass has decided on yet.
    fn pending(&self, pop: &'a Population) -> Vec<BioNeuronId> {
        pop.neurons().filter(|n| !self.decided.contains(n)).collect()
    }

    /// Tries to place a computed neuron on one chip.
    fn try_neuron_on(&mut self, bio: BioNeuronId, size: u32, chip: ChipCoord) -> bool {
        let strategy = self.config.address_strategy;
        let Some(slot) = self
            .fabric
            .get_mut(&chip)
            .and_then(|state| state.allocate_neuron(bio.population, size, strategy))
        else {
            return false;
        };
        self.commit_neuron(bio, chip, slot);
        true
    }

    /// Tries to place an external input on one chip.
    fn try_input_on(&mut self, bio: BioNeuronId, chip: ChipCoord) -> bool {
        let strategy = self.config.address_strategy;
        let Some(slot) = self
            .fabric
            .get_mut(&chip)
            .and_then(|state| state.allocate_input(strategy))
        else {
            return false;
        };
        self.commit_input(bio, chip, slot);
        true
    }

    fn commit_neuron(&mut self, bio: BioNeuronId, chip: ChipCoord, slot: NeuronSlot) {
        self.items.push(PlacementItem {
            bio_neuron: bio,
            logical_neuron: LogicalNeuron::Denmems {
                chip,
                denmems: slot.denmems,
            },
            neuron_block: Some(slot.block),
            address: HardwareAddress::new(chip, slot.buffer, slot.address),
        });
        self.decided.insert(bio);
    }

    fn commit_input(&mut self, bio: BioNeuronId, chip: ChipCoord, slot: InputSlot) {
        self.items.push(PlacementItem {
            bio_neuron: bio,
            logical_neuron: LogicalNeuron::External(bio),
            neuron_block: None,
            address: HardwareAddress::new(chip, slot.buffer, slot.address),
        });
        self.decided.insert(bio);
    }

    /// Handles a neuron no candidate chip could take.
    ///
    /// Strict mode fails the run; otherwise the neuron is recorded as
    /// unplaced and later passes skip it.
    fn exhausted(&mut self, bio: BioNeuronId, resource: &str) -> Result<(), MappingError> {
        let label = self
            .population(bio)
            .map_or_else(|| bio.population.to_string(), |p| p.label.clone());
        if self.config.strict {
            return Err(MappingError::ResourceExhaustion {
                population: label,
                resource: resource.to_string(),
            });
        }
        debug!(target: "neuromap::placement", "no {resource} left for {bio} of {label:?}");
        self.unplaced.push(bio);
        self.decided.insert(bio);
        Ok(())
    }

    fn finish(self) -> PlacementOutcome {
        if !self.unplaced.is_empty() {
            warn!(
                target: "neuromap::placement",
                "{} neurons could not be placed",
                self.unplaced.len()
            );
        }
        debug!(
            target: "neuromap::placement",
            "placed {} neurons on {} chips",
            self.items.len(),
            self.fabric
                .values()
                .filter(|c| c.free_denmems() < c.resources().usable_denmems())
                .count()
        );
        PlacementOutcome {
            items: self.items,
            unplaced: self.unplaced,
        }
    }
}
