//! Physical coordinates on the neuromorphic fabric.
//!
//! A [`ChipCoord`] names one chip of the fabric grid. A [`DenmemCoord`]
//! combines a chip with a chip-local denmem slot to give a fabric-wide
//! neuron circuit coordinate. [`L1Address`] is the routing address word
//! carried by every spike on the inter-chip bus.

use crate::ids::DenmemId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Grid coordinate of a chip on the fabric.
///
/// Ordered by `x` first, then `y`. This ordering is the deterministic
/// tie-break used by every allocation pass.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct ChipCoord {
    /// Column on the fabric grid.
    pub x: u16,
    /// Row on the fabric grid.
    pub y: u16,
}

impl ChipCoord {
    /// Creates a chip coordinate.
    pub fn new(x: u16, y: u16) -> Self {
        Self { x, y }
    }

    /// Squared Euclidean distance from this chip to the point `(px, py)`.
    pub fn distance_sq_to(self, px: f64, py: f64) -> f64 {
        let dx = f64::from(self.x) - px;
        let dy = f64::from(self.y) - py;
        dx * dx + dy * dy
    }
}

impl fmt::Display for ChipCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "chip({},{})", self.x, self.y)
    }
}

/// Error returned when parsing a [`ChipCoord`] from a string fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseChipCoordError {
    /// The input string that failed to parse.
    pub input: String,
}

impl fmt::Display for ParseChipCoordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid chip coordinate: '{}' (expected \"x,y\")", self.input)
    }
}

impl std::error::Error for ParseChipCoordError {}

impl FromStr for ChipCoord {
    type Err = ParseChipCoordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseChipCoordError {
            input: s.to_string(),
        };
        let (x, y) = s.trim().split_once(',').ok_or_else(err)?;
        let x = x.trim().parse().map_err(|_| err())?;
        let y = y.trim().parse().map_err(|_| err())?;
        Ok(ChipCoord { x, y })
    }
}

/// Fabric-wide coordinate of a single denmem.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct DenmemCoord {
    /// The chip hosting the denmem.
    pub chip: ChipCoord,
    /// The chip-local denmem slot.
    pub denmem: DenmemId,
}

impl DenmemCoord {
    /// Creates a fabric-wide denmem coordinate.
    pub fn new(chip: ChipCoord, denmem: DenmemId) -> Self {
        Self { chip, denmem }
    }
}

impl fmt::Display for DenmemCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/denmem({})", self.chip, self.denmem)
    }
}

/// Routing address word carried by a spike on the inter-chip bus.
///
/// Addresses are 6 bits wide. Address 0 is reserved for repeater locking
/// and is never handed out by an address pool.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct L1Address(u8);

impl L1Address {
    /// Number of distinct address words.
    pub const COUNT: u16 = 64;

    /// The reserved locking address.
    pub const LOCKING: L1Address = L1Address(0);

    /// Creates an address from a raw value, or `None` if it does not fit in 6 bits.
    pub fn new(value: u8) -> Option<Self> {
        (u16::from(value) < Self::COUNT).then_some(Self(value))
    }

    /// Returns the raw address value.
    pub fn value(self) -> u8 {
        self.0
    }
}

impl fmt::Display for L1Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "addr({})", self.0)
    }
}
