//! Allocation state of one chip during placement.
//!
//! Every denmem slot and every output buffer of the chip has a record in
//! the arena. Allocation hands out owned [`NeuronSlot`]/[`InputSlot`]
//! values; the records they came from are marked taken and never released.

use neuromap_common::{
    ChipCoord, DenmemId, L1Address, NeuronBlockId, OutputBufferId, PopulationId,
};
use neuromap_config::AddressStrategy;
use neuromap_topology::ChipResources;
use std::collections::BTreeSet;

/// What an output buffer emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BufferMode {
    Unused,
    /// Spikes of external inputs.
    Input,
    /// Spikes of the neurons in its block.
    Output,
}

/// Occupancy of a denmem slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Slot {
    Blocked,
    Free,
    Taken(PopulationId),
}

/// Result of checking a specific denmem run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RunCheck {
    Free,
    Blocked(u32),
    Taken(u32, PopulationId),
}

#[derive(Debug)]
struct Buffer {
    mode: BufferMode,
    free: BTreeSet<L1Address>,
    take_high: bool,
}

impl Buffer {
    fn pop(&mut self, strategy: AddressStrategy) -> Option<L1Address> {
        let high = match strategy {
            AddressStrategy::Low => false,
            AddressStrategy::High => true,
            AddressStrategy::Alternate => {
                let high = self.take_high;
                self.take_high = !high;
                high
            }
        };
        if high {
            self.free.pop_last()
        } else {
            self.free.pop_first()
        }
    }
}

/// Denmems, block and address granted to one computed neuron.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct NeuronSlot {
    pub block: NeuronBlockId,
    pub denmems: Vec<DenmemId>,
    pub buffer: OutputBufferId,
    pub address: L1Address,
}

/// Buffer and address granted to one external input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct InputSlot {
    pub buffer: OutputBufferId,
    pub address: L1Address,
}

#[derive(Debug)]
pub(crate) struct ChipState<'t> {
    resources: &'t ChipResources,
    slots: Vec<Slot>,
    buffers: Vec<Buffer>,
    block_neurons: Vec<u32>,
    free_denmems: u32,
}

impl<'t> ChipState<'t> {
    pub fn new(resources: &'t ChipResources) -> Self {
        let slots = (0..resources.denmem_count)
            .map(|d| {
                if resources.is_usable(DenmemId::from_raw(d)) {
                    Slot::Free
                } else {
                    Slot::Blocked
                }
            })
            .collect();
        let buffers = resources
            .buffers()
            .map(|_| Buffer {
                mode: BufferMode::Unused,
                free: resources.allocatable_addresses().collect(),
                take_high: false,
            })
            .collect();
        Self {
            resources,
            slots,
            buffers,
            block_neurons: vec![0; resources.block_count() as usize],
            free_denmems: resources.usable_denmems(),
        }
    }

    pub fn coord(&self) -> ChipCoord {
        self.resources.coord
    }

    pub fn resources(&self) -> &'t ChipResources {
        self.resources
    }

    pub fn free_denmems(&self) -> u32 {
        self.free_denmems
    }

    pub fn slot(&self, denmem: u32) -> Slot {
        self.slots
            .get(denmem as usize)
            .copied()
            .unwrap_or(Slot::Blocked)
    }

    #[cfg(test)]
    pub fn buffer_mode(&self, buffer: OutputBufferId) -> BufferMode {
        self.buffers
            .get(buffer.index())
            .map_or(BufferMode::Unused, |b| b.mode)
    }

    /// Whether a new neuron could get an address from the block's buffer.
    pub fn block_accepts_neurons(&self, block: NeuronBlockId) -> bool {
        let buffer = self.resources.output_buffer_of(block);
        self.buffers
            .get(buffer.index())
            .is_some_and(|b| b.mode != BufferMode::Input && !b.free.is_empty())
    }

    /// Checks the run `start..start + size` slot by slot.
    pub fn check_run(&self, start: u32, size: u32) -> RunCheck {
        for d in start..start + size {
            match self.slot(d) {
                Slot::Free => {}
                Slot::Blocked => return RunCheck::Blocked(d),
                Slot::Taken(owner) => return RunCheck::Taken(d, owner),
            }
        }
        RunCheck::Free
    }

    /// First run of `size` free denmems inside one block that can still
    /// emit spikes.
    pub fn find_run(&self, size: u32) -> Option<(NeuronBlockId, u32)> {
        if size == 0 || size > self.free_denmems {
            return None;
        }
        (0..self.resources.block_count())
            .map(NeuronBlockId::from_raw)
            .filter(|&b| self.block_accepts_neurons(b))
            .find_map(|block| {
                let mut run = 0;
                for d in self.resources.block_range(block) {
                    if self.slot(d) == Slot::Free {
                        run += 1;
                        if run == size {
                            return Some((block, d + 1 - size));
                        }
                    } else {
                        run = 0;
                    }
                }
                None
            })
    }

    /// Marks a checked run as taken and draws an address from its block's buffer.
    pub fn take_run(
        &mut self,
        owner: PopulationId,
        block: NeuronBlockId,
        start: u32,
        size: u32,
        strategy: AddressStrategy,
    ) -> Option<NeuronSlot> {
        let buffer = self.resources.output_buffer_of(block);
        let state = self.buffers.get_mut(buffer.index())?;
        if state.mode == BufferMode::Input {
            return None;
        }
        let address = state.pop(strategy)?;
        state.mode = BufferMode::Output;

        for d in start..start + size {
            self.slots[d as usize] = Slot::Taken(owner);
        }
        self.free_denmems -= size;
        self.block_neurons[block.index()] += 1;
        Some(NeuronSlot {
            block,
            denmems: (start..start + size).map(DenmemId::from_raw).collect(),
            buffer,
            address,
        })
    }

    /// Finds and takes the first fitting run.
    pub fn allocate_neuron(
        &mut self,
        owner: PopulationId,
        size: u32,
        strategy: AddressStrategy,
    ) -> Option<NeuronSlot> {
        let (block, start) = self.find_run(size)?;
        self.take_run(owner, block, start, size, strategy)
    }

    /// Takes an address on the highest buffer that is not emitting neuron
    /// spikes and whose block hosts no neurons.
    pub fn allocate_input(&mut self, strategy: AddressStrategy) -> Option<InputSlot> {
        let resources = self.resources;
        let buffer = resources.buffers().rev().find(|&buf| {
            let state = &self.buffers[buf.index()];
            let block_empty = resources
                .block_of_buffer(buf)
                .map_or(true, |b| self.block_neurons[b.index()] == 0);
            state.mode != BufferMode::Output && block_empty && !state.free.is_empty()
        })?;
        let state = &mut self.buffers[buffer.index()];
        let address = state.pop(strategy)?;
        state.mode = BufferMode::Input;
        Some(InputSlot { buffer, address })
    }
}
