//! Identifiers that join the biological and the hardware side of a mapping.

use crate::coord::{ChipCoord, L1Address};
use crate::ids::{OutputBufferId, PopulationId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A biological neuron: its population and its index within that population.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct BioNeuronId {
    /// The owning population.
    pub population: PopulationId,
    /// Index of the neuron inside the population.
    pub index: u32,
}

impl BioNeuronId {
    /// Creates a new biological neuron id.
    pub fn new(population: PopulationId, index: u32) -> Self {
        Self { population, index }
    }
}

impl fmt::Display for BioNeuronId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pop{}[{}]", self.population, self.index)
    }
}

/// Error returned when parsing a [`BioNeuronId`] from a string fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseBioNeuronIdError {
    /// The input string that failed to parse.
    pub input: String,
}

impl fmt::Display for ParseBioNeuronIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid neuron id: '{}' (expected \"population:index\")",
            self.input
        )
    }
}

impl std::error::Error for ParseBioNeuronIdError {}

impl FromStr for BioNeuronId {
    type Err = ParseBioNeuronIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseBioNeuronIdError {
            input: s.to_string(),
        };
        let (pop, idx) = s.trim().split_once(':').ok_or_else(err)?;
        let pop = pop.trim().parse().map_err(|_| err())?;
        let index = idx.trim().parse().map_err(|_| err())?;
        Ok(BioNeuronId::new(PopulationId::from_raw(pop), index))
    }
}

/// The routing endpoint of a placed neuron: chip, output buffer and address word.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct HardwareAddress {
    /// The chip emitting the spikes.
    pub chip: ChipCoord,
    /// The output buffer (merger) the neuron is routed through.
    pub output_buffer: OutputBufferId,
    /// The address word on that buffer.
    pub address: L1Address,
}

impl HardwareAddress {
    /// Creates a new hardware address.
    pub fn new(chip: ChipCoord, output_buffer: OutputBufferId, address: L1Address) -> Self {
        Self {
            chip,
            output_buffer,
            address,
        }
    }
}

impl fmt::Display for HardwareAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/buffer({})/{}",
            self.chip, self.output_buffer, self.address
        )
    }
}
