//! Manual placement passes for computed populations.

use super::state::RunCheck;
use super::Placer;
use crate::error::MappingError;
use neuromap_common::{BioNeuronId, ChipCoord, DenmemCoord, DenmemId, PopulationId};
use tracing::debug;

const NEURON_CIRCUITS: &str = "neuron circuits";

impl Placer<'_> {
    /// Places computed neurons named by manual directives.
    ///
    /// Single-neuron pins go first, then denmem pins, then chip lists, each
    /// in population order.
    pub(super) fn place_manual_neurons(&mut self) -> Result<(), MappingError> {
        let network = self.network;
        let manual = &network.placement;

        let pins: Vec<(BioNeuronId, ChipCoord)> = manual.neuron_pins().collect();
        for (bio, chip) in pins {
            let Some(pop) = self.population(bio) else {
                continue;
            };
            if pop.is_external() || bio.index >= pop.size || self.decided.contains(&bio) {
                continue;
            }
            let size = self.neuron_size(pop);
            if !self.try_neuron_on(bio, size, chip) {
                self.exhausted(bio, NEURON_CIRCUITS)?;
            }
        }

        for pop in network.populations() {
            if pop.is_external() {
                continue;
            }
            if let Some(first) = manual.denmems_for(pop.id) {
                self.place_on_denmems(pop.id, first)?;
            }
        }

        for pop in network.populations() {
            if pop.is_external() {
                continue;
            }
            let Some(chips) = manual.chips_for(pop.id) else {
                continue;
            };
            let size = self.neuron_size(pop);
            let mut cursor = 0;
            for bio in self.pending(pop) {
                while cursor < chips.len() && !self.try_neuron_on(bio, size, chips[cursor]) {
                    cursor += 1;
                }
                if cursor == chips.len() {
                    self.exhausted(bio, NEURON_CIRCUITS)?;
                }
            }
        }
        Ok(())
    }

    /// Lays the pending neurons of a population onto consecutive denmems
    /// from `first` on.
    ///
    /// Blocked denmems and denmems already held by the same population are
    /// stepped over. A run never straddles a neuron block; it moves to the
    /// start of the next block instead. Denmems held by another population
    /// are a conflict.
    fn place_on_denmems(
        &mut self,
        population: PopulationId,
        first: DenmemCoord,
    ) -> Result<(), MappingError> {
        let network = self.network;
        let Some(pop) = network.population(population) else {
            return Ok(());
        };
        let size = self.neuron_size(pop);
        let chip = first.chip;
        let Some(resources) = self.fabric.get(&chip).map(|s| s.resources()) else {
            return Ok(());
        };

        let mut cursor = first.denmem.as_raw();
        'neurons: for bio in self.pending(pop) {
            loop {
                if cursor >= resources.denmem_count || size > resources.denmem_count - cursor {
                    self.exhausted(bio, NEURON_CIRCUITS)?;
                    continue 'neurons;
                }
                let block = resources.block_of(DenmemId::from_raw(cursor));
                let block_end = resources.block_range(block).end;
                let Some(state) = self.fabric.get(&chip) else {
                    return Ok(());
                };
                if cursor + size > block_end || !state.block_accepts_neurons(block) {
                    cursor = block_end;
                    continue;
                }
                match state.check_run(cursor, size) {
                    RunCheck::Blocked(d) => cursor = d + 1,
                    RunCheck::Taken(d, owner) if owner == population => cursor = d + 1,
                    RunCheck::Taken(_, owner) => {
                        let other = network
                            .population(owner)
                            .map_or_else(|| owner.to_string(), |p| p.label.clone());
                        return Err(MappingError::PlacementConflict {
                            population: pop.label.clone(),
                            other,
                            chip,
                        });
                    }
                    RunCheck::Free => {
                        let strategy = self.config.address_strategy;
                        let slot = self
                            .fabric
                            .get_mut(&chip)
                            .and_then(|s| s.take_run(population, block, cursor, size, strategy));
                        match slot {
                            Some(slot) => {
                                debug!(
                                    target: "neuromap::placement",
                                    "pinned {bio} to denmems {cursor}..{} on {chip}",
                                    cursor + size
                                );
                                self.commit_neuron(bio, chip, slot);
                                cursor += size;
                                continue 'neurons;
                            }
                            None => cursor = block_end,
                        }
                    }
                }
            }
        }
        Ok(())
    }
}
