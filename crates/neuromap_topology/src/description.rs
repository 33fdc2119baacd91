//! Serializable fabric description, as read from a `fabric.toml` file.
//!
//! A description is a chip template (`[defaults]`), a list of chips with
//! optional per-chip overrides and defects, and the inter-chip links.
//! It is only a transport format: [`Topology::from_description`] validates
//! it and produces the immutable [`Topology`].
//!
//! [`Topology`]: crate::Topology
//! [`Topology::from_description`]: crate::Topology::from_description

use serde::{Deserialize, Serialize};

/// Default resource counts shared by every chip that does not override them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChipTemplate {
    /// Number of denmem slots per chip.
    pub denmems: u32,
    /// Number of denmems per neuron block.
    pub denmems_per_block: u32,
    /// Number of output buffers (mergers) per chip.
    pub output_buffers: u32,
    /// Number of routing address words per output buffer, including the
    /// reserved locking address.
    pub addresses_per_buffer: u16,
    /// Number of synapse drivers per chip.
    pub synapse_drivers: u32,
    /// Number of synapses a single driver can carry.
    pub driver_capacity: u32,
    /// Number of analog output channels per chip.
    pub analog_outputs: u32,
}

impl Default for ChipTemplate {
    fn default() -> Self {
        Self {
            denmems: 512,
            denmems_per_block: 64,
            output_buffers: 8,
            addresses_per_buffer: 64,
            synapse_drivers: 224,
            driver_capacity: 256,
            analog_outputs: 2,
        }
    }
}

/// Explicit synapse driver slot in a chip override.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverSpec {
    /// Chip-local driver id.
    pub id: u32,
    /// Number of synapses this driver can carry.
    pub capacity: u32,
}

/// One chip of the fabric, with optional overrides of the template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChipSpec {
    /// Grid column.
    pub x: u16,
    /// Grid row.
    pub y: u16,
    /// Explicit analog output channel ids (overrides the template count).
    #[serde(default)]
    pub analog_outputs: Option<Vec<u32>>,
    /// Explicit driver list (overrides the template count and capacity).
    #[serde(default)]
    pub drivers: Option<Vec<DriverSpec>>,
    /// Denmems that are defective and must never be allocated.
    #[serde(default)]
    pub blocked_denmems: Vec<u32>,
}

impl ChipSpec {
    /// A chip at `(x, y)` that uses the template unchanged.
    pub fn at(x: u16, y: u16) -> Self {
        Self {
            x,
            y,
            analog_outputs: None,
            drivers: None,
            blocked_denmems: Vec::new(),
        }
    }
}

/// An undirected spike-routing link between two chips.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkSpec {
    /// First endpoint as `[x, y]`.
    pub a: [u16; 2],
    /// Second endpoint as `[x, y]`.
    pub b: [u16; 2],
}

/// The complete fabric description.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FabricDescription {
    /// Human-readable fabric name.
    #[serde(default)]
    pub name: String,
    /// Chip template.
    #[serde(default)]
    pub defaults: ChipTemplate,
    /// All chips of the fabric.
    #[serde(default)]
    pub chips: Vec<ChipSpec>,
    /// Explicit inter-chip links.
    #[serde(default)]
    pub links: Vec<LinkSpec>,
    /// Connect every chip to its 4-neighbours on the grid in addition to `links`.
    #[serde(default)]
    pub grid_links: bool,
}

impl FabricDescription {
    /// A rectangular `width` x `height` grid of template chips with grid links.
    pub fn grid(name: &str, width: u16, height: u16) -> Self {
        let chips = (0..width)
            .flat_map(|x| (0..height).map(move |y| ChipSpec::at(x, y)))
            .collect();
        Self {
            name: name.to_string(),
            defaults: ChipTemplate::default(),
            chips,
            links: Vec::new(),
            grid_links: true,
        }
    }
}
