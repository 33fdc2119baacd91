//! Static resource model of a neuromorphic fabric.
//!
//! A [`Topology`] lists the chips of the fabric and, per chip, the ordered
//! denmem slots, synapse driver slots with their capacity, analog output
//! channels, output buffers with their address space, and the chips
//! reachable for spike routing. It is built once per run from a validated
//! [`FabricDescription`] and is read-only afterwards.
//!
//! # Usage
//!
//! ```
//! use neuromap_topology::load_topology;
//!
//! let topology = load_topology("quad").unwrap();
//! assert_eq!(topology.chip_count(), 4);
//! ```

#![warn(missing_docs)]

pub mod chip;
pub mod description;
pub mod error;
pub mod presets;

pub use chip::{ChipResources, DriverSlot};
pub use description::{ChipSpec, ChipTemplate, DriverSpec, FabricDescription, LinkSpec};
pub use error::TopologyError;
pub use presets::load_topology;

use neuromap_common::{AnalogChannelId, ChipCoord, DenmemId, DriverId};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use tracing::debug;

/// The validated, immutable resource topology of a fabric.
#[derive(Debug, Clone)]
pub struct Topology {
    name: String,
    chips: BTreeMap<ChipCoord, ChipResources>,
    neighbors: BTreeMap<ChipCoord, BTreeSet<ChipCoord>>,
}

impl Topology {
    /// Validates a fabric description and builds the topology.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError`] for duplicate chips, duplicate slot ids,
    /// links to unknown chips, out-of-range defects, or an inconsistent
    /// block/buffer layout.
    pub fn from_description(desc: &FabricDescription) -> Result<Self, TopologyError> {
        if desc.chips.is_empty() {
            return Err(TopologyError::Empty);
        }

        let mut chips = BTreeMap::new();
        for spec in &desc.chips {
            let coord = ChipCoord::new(spec.x, spec.y);
            let resources = build_chip(coord, &desc.defaults, spec)?;
            if chips.insert(coord, resources).is_some() {
                return Err(TopologyError::DuplicateChip(coord));
            }
        }

        let mut neighbors: BTreeMap<ChipCoord, BTreeSet<ChipCoord>> =
            chips.keys().map(|&c| (c, BTreeSet::new())).collect();

        for (i, link) in desc.links.iter().enumerate() {
            let a = ChipCoord::new(link.a[0], link.a[1]);
            let b = ChipCoord::new(link.b[0], link.b[1]);
            for end in [a, b] {
                if !chips.contains_key(&end) {
                    return Err(TopologyError::UnknownChip {
                        coord: end,
                        context: format!("link #{i}"),
                    });
                }
            }
            if a != b {
                neighbors.entry(a).or_default().insert(b);
                neighbors.entry(b).or_default().insert(a);
            }
        }

        if desc.grid_links {
            let coords: Vec<ChipCoord> = chips.keys().copied().collect();
            for &c in &coords {
                let right = ChipCoord::new(c.x.saturating_add(1), c.y);
                let down = ChipCoord::new(c.x, c.y.saturating_add(1));
                for other in [right, down] {
                    if other != c && chips.contains_key(&other) {
                        neighbors.entry(c).or_default().insert(other);
                        neighbors.entry(other).or_default().insert(c);
                    }
                }
            }
        }

        let name = if desc.name.is_empty() {
            "custom".to_string()
        } else {
            desc.name.clone()
        };
        debug!(target: "neuromap::topology", "built topology {name:?} with {} chips", chips.len());

        Ok(Self {
            name,
            chips,
            neighbors,
        })
    }

    /// Parses a TOML fabric description and builds the topology.
    pub fn from_toml_str(content: &str) -> Result<Self, TopologyError> {
        let desc: FabricDescription =
            toml::from_str(content).map_err(|e| TopologyError::Parse(e.to_string()))?;
        Self::from_description(&desc)
    }

    /// Reads a TOML fabric description from `path` and builds the topology.
    pub fn from_file(path: &Path) -> Result<Self, TopologyError> {
        let content = std::fs::read_to_string(path).map_err(|e| TopologyError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_toml_str(&content)
    }

    /// The fabric name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Iterates over all chips in coordinate order.
    pub fn chips(&self) -> impl Iterator<Item = &ChipResources> {
        self.chips.values()
    }

    /// All chip coordinates in ascending order.
    pub fn coords(&self) -> impl Iterator<Item = ChipCoord> + '_ {
        self.chips.keys().copied()
    }

    /// Returns the resources of the chip at `coord`.
    pub fn chip(&self, coord: ChipCoord) -> Option<&ChipResources> {
        self.chips.get(&coord)
    }

    /// Returns `true` if the fabric contains a chip at `coord`.
    pub fn contains(&self, coord: ChipCoord) -> bool {
        self.chips.contains_key(&coord)
    }

    /// Number of chips.
    pub fn chip_count(&self) -> usize {
        self.chips.len()
    }

    /// Chips reachable from `coord` over one routing link, in coordinate order.
    pub fn neighbors(&self, coord: ChipCoord) -> impl Iterator<Item = ChipCoord> + '_ {
        self.neighbors.get(&coord).into_iter().flatten().copied()
    }

    /// Total usable denmems over all chips.
    pub fn total_denmems(&self) -> u64 {
        self.chips.values().map(|c| u64::from(c.usable_denmems())).sum()
    }
}

fn build_chip(
    coord: ChipCoord,
    template: &ChipTemplate,
    spec: &ChipSpec,
) -> Result<ChipResources, TopologyError> {
    let layout_err = |reason: String| TopologyError::InvalidLayout {
        chip: coord,
        reason,
    };

    if template.denmems_per_block == 0 || template.denmems % template.denmems_per_block != 0 {
        return Err(layout_err(format!(
            "{} denmems cannot be split into blocks of {}",
            template.denmems, template.denmems_per_block
        )));
    }
    let blocks = template.denmems / template.denmems_per_block;
    if blocks > template.output_buffers {
        return Err(layout_err(format!(
            "{blocks} neuron blocks but only {} output buffers",
            template.output_buffers
        )));
    }
    if template.addresses_per_buffer < 2
        || template.addresses_per_buffer > neuromap_common::L1Address::COUNT
    {
        return Err(layout_err(format!(
            "addresses per buffer must be in 2..=64, got {}",
            template.addresses_per_buffer
        )));
    }

    let mut blocked_denmems = BTreeSet::new();
    for &raw in &spec.blocked_denmems {
        let denmem = DenmemId::from_raw(raw);
        if raw >= template.denmems {
            return Err(TopologyError::DenmemOutOfRange {
                chip: coord,
                denmem,
                count: template.denmems,
            });
        }
        blocked_denmems.insert(denmem);
    }

    let mut drivers: Vec<DriverSlot> = match &spec.drivers {
        Some(list) => list
            .iter()
            .map(|d| DriverSlot {
                id: DriverId::from_raw(d.id),
                capacity: d.capacity,
            })
            .collect(),
        None => (0..template.synapse_drivers)
            .map(|i| DriverSlot {
                id: DriverId::from_raw(i),
                capacity: template.driver_capacity,
            })
            .collect(),
    };
    drivers.sort_by_key(|d| d.id);
    if let Some(pair) = drivers.windows(2).find(|w| w[0].id == w[1].id) {
        return Err(TopologyError::DuplicateDriver {
            chip: coord,
            driver: pair[0].id,
        });
    }

    let mut analog_outputs: Vec<AnalogChannelId> = match &spec.analog_outputs {
        Some(list) => list.iter().map(|&c| AnalogChannelId::from_raw(c)).collect(),
        None => (0..template.analog_outputs)
            .map(AnalogChannelId::from_raw)
            .collect(),
    };
    analog_outputs.sort();
    if let Some(pair) = analog_outputs.windows(2).find(|w| w[0] == w[1]) {
        return Err(TopologyError::DuplicateAnalogChannel {
            chip: coord,
            channel: pair[0],
        });
    }

    Ok(ChipResources {
        coord,
        denmem_count: template.denmems,
        denmems_per_block: template.denmems_per_block,
        blocked_denmems,
        output_buffers: template.output_buffers,
        addresses_per_buffer: template.addresses_per_buffer,
        drivers,
        analog_outputs,
    })
}
