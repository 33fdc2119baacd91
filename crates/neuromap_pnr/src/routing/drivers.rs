//! Synapse driver allocation.
//!
//! Drivers are handed out per `(target chip, mode)` group. A driver takes the
//! mode of the group that opened it and only ever receives synapses of that
//! group, so no driver mixes modes.

use super::enumerate::Synapse;
use neuromap_common::{ChipCoord, DriverId, HardwareAddress, StpMode};
use neuromap_config::SpillPolicy;
use neuromap_results::{SynapseBinding, SynapseDriverAssignment};
use neuromap_topology::Topology;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, trace};

/// Free drivers of every chip and the drivers opened so far.
pub(crate) struct DriverPool<'t> {
    topology: &'t Topology,
    spill: SpillPolicy,
    free: BTreeMap<ChipCoord, BTreeSet<DriverId>>,
    opened: Vec<SynapseDriverAssignment>,
}

impl<'t> DriverPool<'t> {
    pub fn new(topology: &'t Topology, spill: SpillPolicy) -> Self {
        let free = topology
            .chips()
            .map(|chip| {
                let ids = chip
                    .drivers
                    .iter()
                    .filter(|d| d.capacity > 0)
                    .map(|d| d.id)
                    .collect();
                (chip.coord, ids)
            })
            .collect();
        Self {
            topology,
            spill,
            free,
            opened: Vec::new(),
        }
    }

    /// Binds the synapses of one group to drivers of its own chip, in order,
    /// and returns those that found no driver.
    pub fn route_group(
        &mut self,
        target_chip: ChipCoord,
        mode: StpMode,
        synapses: &[(Synapse, HardwareAddress)],
    ) -> Vec<(Synapse, HardwareAddress)> {
        self.bind(synapses, |pool| pool.take_on(target_chip, target_chip, mode))
    }

    /// Binds the overflow of a group to drivers of neighboring chips that
    /// are still free, if the spill policy allows it.
    ///
    /// Runs after every group has been routed on its own chip.
    pub fn spill_group(
        &mut self,
        target_chip: ChipCoord,
        mode: StpMode,
        overflow: &[(Synapse, HardwareAddress)],
    ) -> Vec<(Synapse, HardwareAddress)> {
        if self.spill == SpillPolicy::None {
            return overflow.to_vec();
        }
        let neighbors: BTreeSet<ChipCoord> = self.topology.neighbors(target_chip).collect();
        self.bind(overflow, |pool| {
            let (host, i) = neighbors
                .iter()
                .find_map(|&host| pool.take_on(host, target_chip, mode).map(|i| (host, i)))?;
            debug!(
                target: "neuromap::routing",
                "spilled {mode} synapses for {target_chip} to {host}"
            );
            Some(i)
        })
    }

    /// Fills the current driver and opens the next one when it is full.
    fn bind(
        &mut self,
        synapses: &[(Synapse, HardwareAddress)],
        mut open: impl FnMut(&mut Self) -> Option<usize>,
    ) -> Vec<(Synapse, HardwareAddress)> {
        let mut unbound = Vec::new();
        let mut current: Option<usize> = None;
        let mut exhausted = false;

        for &(synapse, source) in synapses {
            let slot = match current.filter(|&i| !self.opened[i].is_full()) {
                Some(i) => Some(i),
                None if exhausted => None,
                None => {
                    let next = open(self);
                    exhausted = next.is_none();
                    next
                }
            };
            match slot {
                Some(i) => {
                    self.opened[i].synapses.push(SynapseBinding {
                        projection: synapse.projection,
                        source,
                        target: synapse.target,
                    });
                    current = Some(i);
                }
                None => unbound.push((synapse, source)),
            }
        }
        unbound
    }

    fn take_on(&mut self, host: ChipCoord, target_chip: ChipCoord, mode: StpMode) -> Option<usize> {
        let driver = self.free.get_mut(&host)?.pop_first()?;
        let capacity = self
            .topology
            .chip(host)
            .and_then(|chip| chip.driver(driver))
            .map_or(0, |slot| slot.capacity);
        trace!(
            target: "neuromap::routing",
            "opened driver {driver} on {host} in {mode} mode (capacity {capacity})"
        );
        self.opened.push(SynapseDriverAssignment {
            chip: host,
            driver,
            mode,
            capacity,
            target_chip,
            synapses: Vec::new(),
        });
        Some(self.opened.len() - 1)
    }

    pub fn into_assignments(self) -> Vec<SynapseDriverAssignment> {
        self.opened
    }
}
