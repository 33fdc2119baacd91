//! Placement of external inputs.
//!
//! External inputs occupy no denmems. Each one takes a routing address on
//! an output buffer that no on-chip neuron uses.

use super::Placer;
use crate::error::MappingError;
use neuromap_common::{BioNeuronId, ChipCoord};
use neuromap_network::Population;
use std::collections::BTreeSet;
use tracing::warn;

const ROUTING_ADDRESSES: &str = "routing addresses";

impl<'a> Placer<'a> {
    /// Places external inputs named by single-neuron pins or chip lists.
    pub(super) fn place_manual_inputs(&mut self) -> Result<(), MappingError> {
        let network = self.network;
        let manual = &network.placement;

        let pins: Vec<(BioNeuronId, ChipCoord)> = manual.neuron_pins().collect();
        for (bio, chip) in pins {
            let Some(pop) = self.population(bio) else {
                continue;
            };
            if !pop.is_external() || bio.index >= pop.size || self.decided.contains(&bio) {
                continue;
            }
            if !self.try_input_on(bio, chip) {
                self.exhausted(bio, ROUTING_ADDRESSES)?;
            }
        }

        for pop in network.populations().iter().filter(|p| p.is_external()) {
            if let Some(chips) = manual.chips_for(pop.id) {
                self.place_inputs_in_order(pop, chips)?;
            }
        }
        Ok(())
    }

    /// Places the remaining external inputs close to their targets.
    ///
    /// Candidate chips are ordered by squared distance to the mean position
    /// of the distinct chips hosting the sources' target neurons, then by
    /// coordinate. Sources without placed targets fall back to coordinate
    /// order.
    pub(super) fn place_auto_inputs(&mut self) -> Result<(), MappingError> {
        let network = self.network;
        for pop in network.populations().iter().filter(|p| p.is_external()) {
            if self.pending(pop).is_empty() {
                continue;
            }
            let order = self.chips_near_targets(pop);
            self.place_inputs_in_order(pop, &order)?;
        }
        Ok(())
    }

    fn place_inputs_in_order(
        &mut self,
        pop: &'a Population,
        chips: &[ChipCoord],
    ) -> Result<(), MappingError> {
        let mut cursor = 0;
        for bio in self.pending(pop) {
            while cursor < chips.len() && !self.try_input_on(bio, chips[cursor]) {
                cursor += 1;
            }
            if cursor == chips.len() {
                self.exhausted(bio, ROUTING_ADDRESSES)?;
            }
        }
        Ok(())
    }

    fn chips_near_targets(&self, pop: &Population) -> Vec<ChipCoord> {
        let targets = self.network.targets_of(pop.id);
        let target_chips: BTreeSet<ChipCoord> = self
            .items
            .iter()
            .filter(|item| !item.is_external() && targets.contains(&item.bio_neuron.population))
            .map(|item| item.chip())
            .collect();

        let mut order: Vec<ChipCoord> = self.fabric.keys().copied().collect();
        if target_chips.is_empty() {
            warn!(
                target: "neuromap::placement",
                "external population {:?} has no placed targets, placing in coordinate order",
                pop.label
            );
            return order;
        }

        let n = target_chips.len() as f64;
        let mx = target_chips.iter().map(|c| f64::from(c.x)).sum::<f64>() / n;
        let my = target_chips.iter().map(|c| f64::from(c.y)).sum::<f64>() / n;
        order.sort_by(|a, b| {
            a.distance_sq_to(mx, my)
                .total_cmp(&b.distance_sq_to(mx, my))
                .then_with(|| a.cmp(b))
        });
        order
    }
}

#[cfg(test)]
mod tests {
    use crate::placement::place;
    use neuromap_common::ChipCoord;
    use neuromap_config::PlacementConfig;
    use neuromap_network::{CellType, Connector, Network};
    use neuromap_topology::load_topology;

    #[test]
    fn inputs_land_next_to_their_targets() {
        let mut net = Network::new();
        let tgt = net.add_population("t", 2, CellType::Computed).unwrap();
        let src = net.add_population("s", 3, CellType::ExternalInput).unwrap();
        net.add_projection(
            src,
            tgt,
            Connector::AllToAll {
                allow_self_connections: true,
            },
            1.0,
            None,
        )
        .unwrap();
        net.placement.on_chip(tgt, ChipCoord::new(1, 1));

        let topo = load_topology("quad").unwrap();
        let out = place(&net, &topo, &PlacementConfig::default()).unwrap();
        for item in out.items.iter().filter(|i| i.is_external()) {
            assert_eq!(item.chip(), ChipCoord::new(1, 1));
        }
    }

    #[test]
    fn chip_list_for_inputs() {
        let mut net = Network::new();
        let src = net.add_population("s", 2, CellType::ExternalInput).unwrap();
        net.placement.on_chip(src, ChipCoord::new(0, 1));
        let topo = load_topology("quad").unwrap();
        let out = place(&net, &topo, &PlacementConfig::default()).unwrap();
        assert_eq!(out.items.len(), 2);
        assert!(out.items.iter().all(|i| i.chip() == ChipCoord::new(0, 1)));
    }
}
