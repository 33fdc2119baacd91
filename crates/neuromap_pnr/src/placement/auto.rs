//! Automatic placement of computed neurons.

use super::Placer;
use crate::error::MappingError;
use neuromap_common::ChipCoord;
use std::cmp::Reverse;
use tracing::trace;

impl Placer<'_> {
    /// Places every computed neuron no directive has placed yet.
    ///
    /// Populations are handled in id order. For each population the chips
    /// are ranked by free denmems (most first, ties by coordinate) and the
    /// neurons filled first-fit along that ranking.
    pub(super) fn place_auto_neurons(&mut self) -> Result<(), MappingError> {
        let network = self.network;
        for pop in network.populations().iter().filter(|p| !p.is_external()) {
            let pending = self.pending(pop);
            if pending.is_empty() {
                continue;
            }
            let size = self.neuron_size(pop);

            let mut ranking: Vec<(u32, ChipCoord)> = self
                .fabric
                .values()
                .map(|chip| (chip.free_denmems(), chip.coord()))
                .collect();
            ranking.sort_by_key(|&(free, coord)| (Reverse(free), coord));
            trace!(
                target: "neuromap::placement",
                "chip ranking for {:?}: {:?}",
                pop.label,
                ranking
            );

            let mut cursor = 0;
            for bio in pending {
                while cursor < ranking.len() && !self.try_neuron_on(bio, size, ranking[cursor].1) {
                    cursor += 1;
                }
                if cursor == ranking.len() {
                    self.exhausted(bio, "neuron circuits")?;
                }
            }
        }
        Ok(())
    }
}
