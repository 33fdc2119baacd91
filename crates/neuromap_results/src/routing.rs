//! Synapse driver assignments and lost synapses.

use neuromap_common::{BioNeuronId, ChipCoord, DriverId, HardwareAddress, ProjectionId, StpMode};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One synapse routed through a driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SynapseBinding {
    /// The projection the synapse belongs to.
    pub projection: ProjectionId,
    /// Address of the presynaptic neuron.
    pub source: HardwareAddress,
    /// The postsynaptic neuron.
    pub target: BioNeuronId,
}

/// A synapse driver in use, its fixed STP mode and the synapses bound to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynapseDriverAssignment {
    /// The chip hosting the driver.
    pub chip: ChipCoord,
    /// The chip-local driver id.
    pub driver: DriverId,
    /// The mode fixed when the first synapse was bound.
    pub mode: StpMode,
    /// Maximum number of bindings.
    pub capacity: u32,
    /// The chip hosting the target neurons; differs from `chip` for spilled groups.
    pub target_chip: ChipCoord,
    /// Bound synapses in binding order.
    pub synapses: Vec<SynapseBinding>,
}

impl SynapseDriverAssignment {
    /// Number of bound synapses.
    pub fn load(&self) -> usize {
        self.synapses.len()
    }

    /// Returns `true` if no further synapse fits.
    pub fn is_full(&self) -> bool {
        self.synapses.len() >= self.capacity as usize
    }

    /// Returns `true` if the driver serves neurons on another chip.
    pub fn is_spilled(&self) -> bool {
        self.chip != self.target_chip
    }
}

/// Why a synapse was not routed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LossReason {
    /// The source or the target neuron was not placed.
    Unplaced,
    /// No driver of the required mode had room.
    DriverCapacity,
}

/// A synapse that could not be routed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LostSynapse {
    /// The projection the synapse belongs to.
    pub projection: ProjectionId,
    /// The presynaptic neuron.
    pub source: BioNeuronId,
    /// The postsynaptic neuron.
    pub target: BioNeuronId,
    /// Why it was dropped.
    pub reason: LossReason,
}

/// The driver table of a mapping run, sorted by chip and driver id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SynapseRouting {
    drivers: Vec<SynapseDriverAssignment>,
    #[serde(skip)]
    index: HashMap<(ChipCoord, DriverId), usize>,
}

impl SynapseRouting {
    /// Builds the table from driver assignments in any order.
    pub fn new(mut drivers: Vec<SynapseDriverAssignment>) -> Self {
        drivers.sort_by_key(|d| (d.chip, d.driver));
        let mut routing = Self {
            drivers,
            index: HashMap::new(),
        };
        routing.rebuild_indices();
        routing
    }

    /// Rebuilds the `(chip, driver)` lookup.
    pub fn rebuild_indices(&mut self) {
        self.index = self
            .drivers
            .iter()
            .enumerate()
            .map(|(i, d)| ((d.chip, d.driver), i))
            .collect();
    }

    /// All active drivers.
    pub fn iter(&self) -> std::slice::Iter<'_, SynapseDriverAssignment> {
        self.drivers.iter()
    }

    /// The assignment of one driver, if it is in use.
    pub fn get(&self, chip: ChipCoord, driver: DriverId) -> Option<&SynapseDriverAssignment> {
        self.index.get(&(chip, driver)).map(|&i| &self.drivers[i])
    }

    /// The mode of a driver; [`StpMode::Disabled`] for drivers not in use.
    pub fn mode(&self, chip: ChipCoord, driver: DriverId) -> StpMode {
        self.get(chip, driver).map_or(StpMode::Disabled, |d| d.mode)
    }

    /// Active drivers hosted on `chip`, by driver id.
    pub fn drivers_on(&self, chip: ChipCoord) -> impl Iterator<Item = &SynapseDriverAssignment> {
        self.drivers.iter().filter(move |d| d.chip == chip)
    }

    /// Number of active drivers.
    pub fn active_drivers(&self) -> usize {
        self.drivers.len()
    }

    /// Total number of routed synapses.
    pub fn bound_synapses(&self) -> usize {
        self.drivers.iter().map(SynapseDriverAssignment::load).sum()
    }

    /// Returns `true` if no driver is in use.
    pub fn is_empty(&self) -> bool {
        self.drivers.is_empty()
    }
}

impl PartialEq for SynapseRouting {
    fn eq(&self, other: &Self) -> bool {
        self.drivers == other.drivers
    }
}

impl Eq for SynapseRouting {}

#[cfg(test)]
mod tests {
    use super::*;
    use neuromap_common::{L1Address, OutputBufferId, PopulationId};

    fn driver(chip: ChipCoord, id: u32, mode: StpMode, load: u32) -> SynapseDriverAssignment {
        let source = HardwareAddress::new(chip, OutputBufferId::from_raw(0), L1Address::new(1).unwrap());
        SynapseDriverAssignment {
            chip,
            driver: DriverId::from_raw(id),
            mode,
            capacity: 2,
            target_chip: chip,
            synapses: (0..load)
                .map(|i| SynapseBinding {
                    projection: ProjectionId::from_raw(0),
                    source,
                    target: BioNeuronId::new(PopulationId::from_raw(0), i),
                })
                .collect(),
        }
    }

    #[test]
    fn lookup_and_mode_of_untouched_driver() {
        let c = ChipCoord::new(0, 0);
        let routing = SynapseRouting::new(vec![
            driver(c, 3, StpMode::Static, 1),
            driver(c, 0, StpMode::Depression, 2),
        ]);
        assert_eq!(routing.mode(c, DriverId::from_raw(0)), StpMode::Depression);
        assert_eq!(routing.mode(c, DriverId::from_raw(1)), StpMode::Disabled);
        let ids: Vec<_> = routing.drivers_on(c).map(|d| d.driver.as_raw()).collect();
        assert_eq!(ids, vec![0, 3]);
        assert_eq!(routing.bound_synapses(), 3);
        assert!(routing.get(c, DriverId::from_raw(0)).unwrap().is_full());
    }

    #[test]
    fn spilled_driver() {
        let mut d = driver(ChipCoord::new(1, 0), 0, StpMode::Static, 1);
        assert!(!d.is_spilled());
        d.target_chip = ChipCoord::new(0, 0);
        assert!(d.is_spilled());
    }
}
