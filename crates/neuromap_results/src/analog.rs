//! Analog output channel bindings.

use crate::error::AnalogError;
use crate::model::LogicalNeuron;
use neuromap_common::{AnalogChannelId, ChipCoord};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A recorded logical neuron and the channel it is read out on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalogOutputItem {
    /// The chip hosting the neuron.
    pub chip: ChipCoord,
    /// The bound channel.
    pub channel: AnalogChannelId,
    /// The recorded neuron.
    pub logical_neuron: LogicalNeuron,
}

impl AnalogOutputItem {
    /// The recorded neuron.
    pub fn logical_neuron(&self) -> &LogicalNeuron {
        &self.logical_neuron
    }
}

/// The channels available on one chip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelInventory {
    /// The chip.
    pub chip: ChipCoord,
    /// Channel ids in ascending order.
    pub channels: Vec<AnalogChannelId>,
}

/// Analog output bindings plus the per-chip channel inventory they draw from.
///
/// The inventory travels with the bindings so that [`record`](Self::record)
/// keeps working on a result loaded from disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalogOutputs {
    inventory: Vec<ChannelInventory>,
    items: Vec<AnalogOutputItem>,
    #[serde(skip)]
    by_logical: HashMap<LogicalNeuron, usize>,
}

impl AnalogOutputs {
    /// Creates an empty binding table over a channel inventory.
    pub fn new(inventory: impl IntoIterator<Item = (ChipCoord, Vec<AnalogChannelId>)>) -> Self {
        let mut inventory: Vec<ChannelInventory> = inventory
            .into_iter()
            .map(|(chip, mut channels)| {
                channels.sort();
                ChannelInventory { chip, channels }
            })
            .collect();
        inventory.sort_by_key(|inv| inv.chip);
        Self {
            inventory,
            items: Vec::new(),
            by_logical: HashMap::new(),
        }
    }

    /// Binds a logical neuron to the lowest free channel of its chip, or
    /// returns its existing binding.
    pub fn record(&mut self, logical: &LogicalNeuron) -> Result<&AnalogOutputItem, AnalogError> {
        if let Some(&i) = self.by_logical.get(logical) {
            return Ok(&self.items[i]);
        }
        let chip = logical
            .chip()
            .ok_or_else(|| AnalogError::ExternalNeuron(logical.to_string()))?;
        let channels = self.channels(chip).ok_or(AnalogError::UnknownChip(chip))?;
        let channel = channels
            .iter()
            .copied()
            .find(|&c| !self.items.iter().any(|it| it.chip == chip && it.channel == c))
            .ok_or(AnalogError::CapacityExceeded {
                chip,
                available: channels.len(),
            })?;

        let i = self.items.len();
        self.items.push(AnalogOutputItem {
            chip,
            channel,
            logical_neuron: logical.clone(),
        });
        self.by_logical.insert(logical.clone(), i);
        Ok(&self.items[i])
    }

    /// The binding of a logical neuron, if recorded.
    pub fn find(&self, logical: &LogicalNeuron) -> Option<&AnalogOutputItem> {
        self.by_logical.get(logical).map(|&i| &self.items[i])
    }

    /// The channel inventory of a chip.
    pub fn channels(&self, chip: ChipCoord) -> Option<&[AnalogChannelId]> {
        self.inventory
            .binary_search_by_key(&chip, |inv| inv.chip)
            .ok()
            .map(|i| self.inventory[i].channels.as_slice())
    }

    /// Bindings on one chip.
    pub fn on_chip(&self, chip: ChipCoord) -> impl Iterator<Item = &AnalogOutputItem> {
        self.items.iter().filter(move |it| it.chip == chip)
    }

    /// All bindings in binding order.
    pub fn iter(&self) -> std::slice::Iter<'_, AnalogOutputItem> {
        self.items.iter()
    }

    /// Number of bindings.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if nothing is recorded.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Rebuilds the logical-neuron lookup.
    pub fn rebuild_indices(&mut self) {
        self.by_logical = self
            .items
            .iter()
            .enumerate()
            .map(|(i, it)| (it.logical_neuron.clone(), i))
            .collect();
    }
}

impl PartialEq for AnalogOutputs {
    fn eq(&self, other: &Self) -> bool {
        self.inventory == other.inventory && self.items == other.items
    }
}

impl Eq for AnalogOutputs {}

impl<'a> IntoIterator for &'a AnalogOutputs {
    type Item = &'a AnalogOutputItem;
    type IntoIter = std::slice::Iter<'a, AnalogOutputItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
