//! Short-term plasticity modes of synapse drivers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The short-term plasticity configuration of a synapse driver.
///
/// A driver carries exactly one mode for its whole lifetime once a synapse
/// is bound to it. `Disabled` is the state of a driver that routes nothing.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StpMode {
    /// Short-term depression.
    Depression,
    /// Short-term facilitation.
    Facilitation,
    /// No short-term plasticity.
    Static,
    /// Driver is not in use.
    Disabled,
}

impl StpMode {
    /// The modes a synapse can require, in routing order.
    pub const ROUTABLE: [StpMode; 3] = [StpMode::Depression, StpMode::Facilitation, StpMode::Static];

    /// Returns `true` if this mode can be required by a synapse.
    pub fn is_routable(self) -> bool {
        self != StpMode::Disabled
    }
}

impl fmt::Display for StpMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StpMode::Depression => "depression",
            StpMode::Facilitation => "facilitation",
            StpMode::Static => "static",
            StpMode::Disabled => "disabled",
        };
        f.write_str(name)
    }
}
