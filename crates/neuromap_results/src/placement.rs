//! The placement index: every placed neuron, in placement order.

use crate::model::{LogicalNeuron, PlacementItem};
use neuromap_common::{BioNeuronId, ChipCoord};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// All placement items of a mapping run with lookup by biological neuron,
/// logical neuron and chip.
///
/// Items keep the order in which the placement engine committed them.
/// Lookup maps are not serialized; call [`rebuild_indices`](Self::rebuild_indices)
/// after deserialization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Placement {
    items: Vec<PlacementItem>,
    #[serde(skip)]
    by_bio: HashMap<BioNeuronId, usize>,
    #[serde(skip)]
    by_logical: HashMap<LogicalNeuron, usize>,
    #[serde(skip)]
    by_chip: BTreeMap<ChipCoord, Vec<usize>>,
}

impl Placement {
    /// Builds the index from committed items.
    pub fn new(items: Vec<PlacementItem>) -> Self {
        let mut placement = Self {
            items,
            ..Self::default()
        };
        placement.rebuild_indices();
        placement
    }

    /// Rebuilds the lookup maps from the item list.
    pub fn rebuild_indices(&mut self) {
        self.by_bio.clear();
        self.by_logical.clear();
        self.by_chip.clear();
        for (i, item) in self.items.iter().enumerate() {
            self.by_bio.insert(item.bio_neuron, i);
            self.by_logical.insert(item.logical_neuron.clone(), i);
            self.by_chip.entry(item.chip()).or_default().push(i);
        }
    }

    /// The item of a biological neuron; `None` if it was not placed.
    pub fn find(&self, bio: BioNeuronId) -> Option<&PlacementItem> {
        self.by_bio.get(&bio).map(|&i| &self.items[i])
    }

    /// The item realized by a logical neuron.
    pub fn find_by_logical_neuron(&self, logical: &LogicalNeuron) -> Option<&PlacementItem> {
        self.by_logical.get(logical).map(|&i| &self.items[i])
    }

    /// Items whose spikes leave from `chip`, in placement order.
    pub fn find_on_chip(&self, chip: ChipCoord) -> impl Iterator<Item = &PlacementItem> {
        self.by_chip
            .get(&chip)
            .into_iter()
            .flatten()
            .map(|&i| &self.items[i])
    }

    /// All items in placement order.
    pub fn iter(&self) -> std::slice::Iter<'_, PlacementItem> {
        self.items.iter()
    }

    /// Number of placed neurons.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if nothing was placed.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Chips hosting at least one item.
    pub fn chips(&self) -> impl Iterator<Item = ChipCoord> + '_ {
        self.by_chip.keys().copied()
    }
}

impl PartialEq for Placement {
    fn eq(&self, other: &Self) -> bool {
        self.items == other.items
    }
}

impl Eq for Placement {}

impl<'a> IntoIterator for &'a Placement {
    type Item = &'a PlacementItem;
    type IntoIter = std::slice::Iter<'a, PlacementItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
