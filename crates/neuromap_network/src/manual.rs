//! Manual placement directives.
//!
//! Directives are collected here without validation. The owning
//! [`Network`](crate::Network) checks them against its populations, and the
//! placement engine checks them against the fabric.

use neuromap_common::{BioNeuronId, ChipCoord, DenmemCoord, DenmemId, PopulationId};
use std::collections::BTreeMap;

/// User-supplied placement constraints for populations and single neurons.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManualPlacement {
    chips: BTreeMap<PopulationId, Vec<ChipCoord>>,
    denmems: BTreeMap<PopulationId, DenmemCoord>,
    neurons: BTreeMap<BioNeuronId, ChipCoord>,
    neuron_sizes: BTreeMap<PopulationId, u32>,
}

impl ManualPlacement {
    /// Creates an empty set of directives.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pins a population to one chip.
    pub fn on_chip(&mut self, population: PopulationId, chip: ChipCoord) -> &mut Self {
        self.on_chips(population, [chip])
    }

    /// Restricts a population to a list of chips, tried in the given order.
    pub fn on_chips(
        &mut self,
        population: PopulationId,
        chips: impl IntoIterator<Item = ChipCoord>,
    ) -> &mut Self {
        self.chips.insert(population, chips.into_iter().collect());
        self
    }

    /// Pins a population to consecutive denmems starting at `first`.
    pub fn on_denmems(
        &mut self,
        population: PopulationId,
        chip: ChipCoord,
        first: DenmemId,
    ) -> &mut Self {
        self.denmems.insert(population, DenmemCoord::new(chip, first));
        self
    }

    /// Pins one neuron to a chip, overriding its population's directive.
    pub fn on_neuron(&mut self, neuron: BioNeuronId, chip: ChipCoord) -> &mut Self {
        self.neurons.insert(neuron, chip);
        self
    }

    /// Overrides the number of denmems per neuron for one population.
    pub fn with_neuron_size(&mut self, population: PopulationId, size: u32) -> &mut Self {
        self.neuron_sizes.insert(population, size);
        self
    }

    /// The chips a population is restricted to, if any.
    pub fn chips_for(&self, population: PopulationId) -> Option<&[ChipCoord]> {
        self.chips.get(&population).map(Vec::as_slice)
    }

    /// The denmem pin of a population, if any.
    pub fn denmems_for(&self, population: PopulationId) -> Option<DenmemCoord> {
        self.denmems.get(&population).copied()
    }

    /// The chip pin of a single neuron, if any.
    pub fn chip_for_neuron(&self, neuron: BioNeuronId) -> Option<ChipCoord> {
        self.neurons.get(&neuron).copied()
    }

    /// All single-neuron pins in neuron id order.
    pub fn neuron_pins(&self) -> impl Iterator<Item = (BioNeuronId, ChipCoord)> + '_ {
        self.neurons.iter().map(|(&n, &c)| (n, c))
    }

    /// The neuron size override of a population, if any.
    pub fn neuron_size(&self, population: PopulationId) -> Option<u32> {
        self.neuron_sizes.get(&population).copied()
    }

    /// Returns `true` if the population has any chip or denmem directive.
    pub fn is_pinned(&self, population: PopulationId) -> bool {
        self.chips.contains_key(&population) || self.denmems.contains_key(&population)
    }

    /// Every population named by any directive.
    pub fn populations(&self) -> impl Iterator<Item = PopulationId> + '_ {
        self.chips
            .keys()
            .chain(self.denmems.keys())
            .chain(self.neuron_sizes.keys())
            .copied()
            .chain(self.neurons.keys().map(|n| n.population))
    }

    /// Returns `true` if no directive has been given.
    pub fn is_empty(&self) -> bool {
        self.chips.is_empty()
            && self.denmems.is_empty()
            && self.neurons.is_empty()
            && self.neuron_sizes.is_empty()
    }
}
