//! Per-chip resource inventory.

use neuromap_common::{
    AnalogChannelId, ChipCoord, DenmemId, DriverId, L1Address, NeuronBlockId, OutputBufferId,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::ops::Range;

/// A synapse driver slot and the number of synapses it can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverSlot {
    /// Chip-local driver id.
    pub id: DriverId,
    /// Maximum number of synapses bound to this driver.
    pub capacity: u32,
}

/// The static resources of one chip.
///
/// Denmems are numbered `0..denmem_count` and grouped into consecutive
/// neuron blocks of `denmems_per_block`. Neuron block `i` emits its spikes
/// through output buffer `i`; buffers beyond the last block carry only
/// external input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChipResources {
    /// The chip coordinate.
    pub coord: ChipCoord,
    /// Number of denmem slots.
    pub denmem_count: u32,
    /// Denmems per neuron block.
    pub denmems_per_block: u32,
    /// Defective denmems that are never allocated.
    pub blocked_denmems: BTreeSet<DenmemId>,
    /// Number of output buffers.
    pub output_buffers: u32,
    /// Address words per output buffer, including the locking address.
    pub addresses_per_buffer: u16,
    /// Synapse driver slots, sorted by id.
    pub drivers: Vec<DriverSlot>,
    /// Analog output channels, sorted by id.
    pub analog_outputs: Vec<AnalogChannelId>,
}

impl ChipResources {
    /// Iterates over all usable (non-blocked) denmems in slot order.
    pub fn denmems(&self) -> impl Iterator<Item = DenmemId> + '_ {
        (0..self.denmem_count)
            .map(DenmemId::from_raw)
            .filter(|d| !self.blocked_denmems.contains(d))
    }

    /// Number of usable denmems.
    pub fn usable_denmems(&self) -> u32 {
        self.denmem_count - self.blocked_denmems.len() as u32
    }

    /// Returns `true` if the denmem exists and is not blocked.
    pub fn is_usable(&self, denmem: DenmemId) -> bool {
        denmem.as_raw() < self.denmem_count && !self.blocked_denmems.contains(&denmem)
    }

    /// Number of neuron blocks on the chip.
    pub fn block_count(&self) -> u32 {
        self.denmem_count / self.denmems_per_block
    }

    /// The neuron block containing `denmem`.
    pub fn block_of(&self, denmem: DenmemId) -> NeuronBlockId {
        NeuronBlockId::from_raw(denmem.as_raw() / self.denmems_per_block)
    }

    /// The raw denmem index range covered by `block`.
    pub fn block_range(&self, block: NeuronBlockId) -> Range<u32> {
        let start = block.as_raw() * self.denmems_per_block;
        start..start + self.denmems_per_block
    }

    /// The output buffer that emits spikes of `block`.
    pub fn output_buffer_of(&self, block: NeuronBlockId) -> OutputBufferId {
        OutputBufferId::from_raw(block.as_raw())
    }

    /// The neuron block feeding `buffer`, if any.
    pub fn block_of_buffer(&self, buffer: OutputBufferId) -> Option<NeuronBlockId> {
        (buffer.as_raw() < self.block_count()).then(|| NeuronBlockId::from_raw(buffer.as_raw()))
    }

    /// All output buffers of the chip in ascending order.
    pub fn buffers(&self) -> impl DoubleEndedIterator<Item = OutputBufferId> {
        (0..self.output_buffers).map(OutputBufferId::from_raw)
    }

    /// The allocatable addresses of one output buffer (locking address excluded).
    pub fn allocatable_addresses(&self) -> impl DoubleEndedIterator<Item = L1Address> {
        (1..self.addresses_per_buffer).filter_map(|a| L1Address::new(a as u8))
    }

    /// Looks up a driver slot by id.
    pub fn driver(&self, id: DriverId) -> Option<&DriverSlot> {
        self.drivers
            .binary_search_by_key(&id, |d| d.id)
            .ok()
            .map(|i| &self.drivers[i])
    }

    /// Sum of the capacities of all drivers.
    pub fn total_driver_capacity(&self) -> u64 {
        self.drivers.iter().map(|d| u64::from(d.capacity)).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chip() -> ChipResources {
        ChipResources {
            coord: ChipCoord::new(0, 0),
            denmem_count: 128,
            denmems_per_block: 32,
            blocked_denmems: [DenmemId::from_raw(3)].into_iter().collect(),
            output_buffers: 5,
            addresses_per_buffer: 64,
            drivers: vec![
                DriverSlot {
                    id: DriverId::from_raw(0),
                    capacity: 8,
                },
                DriverSlot {
                    id: DriverId::from_raw(2),
                    capacity: 4,
                },
            ],
            analog_outputs: vec![AnalogChannelId::from_raw(0)],
        }
    }

    #[test]
    fn usable_denmems_skip_blocked() {
        let c = chip();
        assert_eq!(c.usable_denmems(), 127);
        assert!(!c.is_usable(DenmemId::from_raw(3)));
        assert!(!c.is_usable(DenmemId::from_raw(128)));
        assert!(c.denmems().all(|d| d != DenmemId::from_raw(3)));
    }

    #[test]
    fn block_geometry() {
        let c = chip();
        assert_eq!(c.block_count(), 4);
        assert_eq!(c.block_of(DenmemId::from_raw(33)), NeuronBlockId::from_raw(1));
        assert_eq!(c.block_range(NeuronBlockId::from_raw(2)), 64..96);
        assert_eq!(
            c.output_buffer_of(NeuronBlockId::from_raw(2)),
            OutputBufferId::from_raw(2)
        );
        assert!(c.block_of_buffer(OutputBufferId::from_raw(4)).is_none());
    }

    #[test]
    fn addresses_exclude_locking() {
        let c = chip();
        let addrs: Vec<_> = c.allocatable_addresses().collect();
        assert_eq!(addrs.len(), 63);
        assert!(!addrs.contains(&L1Address::LOCKING));
    }

    #[test]
    fn driver_lookup_and_capacity() {
        let c = chip();
        assert_eq!(c.driver(DriverId::from_raw(2)).unwrap().capacity, 4);
        assert!(c.driver(DriverId::from_raw(1)).is_none());
        assert_eq!(c.total_driver_capacity(), 12);
    }
}
