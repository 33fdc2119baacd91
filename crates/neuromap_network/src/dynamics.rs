//! Short-term plasticity descriptors and their classification.

use neuromap_common::StpMode;
use serde::{Deserialize, Serialize};

/// Short-term plasticity parameters of a projection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum StpDescriptor {
    /// Tsodyks-Markram synapse model.
    TsodyksMarkram {
        /// Utilization of synaptic efficacy.
        #[serde(default = "default_u")]
        u: f64,
        /// Recovery time constant (ms).
        #[serde(default)]
        tau_rec: f64,
        /// Facilitation time constant (ms).
        #[serde(default)]
        tau_facil: f64,
    },
}

fn default_u() -> f64 {
    0.5
}

impl StpDescriptor {
    /// Classifies the descriptor into the driver mode it requires.
    ///
    /// Returns `None` when both time constants are positive: a driver runs
    /// either depression or facilitation, never both.
    pub fn mode(&self) -> Option<StpMode> {
        match *self {
            StpDescriptor::TsodyksMarkram {
                tau_rec, tau_facil, ..
            } => match (tau_rec > 0.0, tau_facil > 0.0) {
                (true, false) => Some(StpMode::Depression),
                (false, true) => Some(StpMode::Facilitation),
                (false, false) => Some(StpMode::Static),
                (true, true) => None,
            },
        }
    }
}

/// The driver mode required by optional dynamics; no descriptor means static.
pub fn classify(dynamics: Option<&StpDescriptor>) -> Option<StpMode> {
    dynamics.map_or(Some(StpMode::Static), StpDescriptor::mode)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tm(tau_rec: f64, tau_facil: f64) -> StpDescriptor {
        StpDescriptor::TsodyksMarkram {
            u: 0.5,
            tau_rec,
            tau_facil,
        }
    }

    #[test]
    fn classification() {
        assert_eq!(tm(100.0, 0.0).mode(), Some(StpMode::Depression));
        assert_eq!(tm(0.0, 50.0).mode(), Some(StpMode::Facilitation));
        assert_eq!(tm(0.0, 0.0).mode(), Some(StpMode::Static));
        assert_eq!(tm(10.0, 10.0).mode(), None);
    }

    #[test]
    fn missing_descriptor_is_static() {
        assert_eq!(classify(None), Some(StpMode::Static));
        assert_eq!(classify(Some(&tm(1.0, 0.0))), Some(StpMode::Depression));
    }

    #[test]
    fn parse_toml() {
        let d: StpDescriptor = toml::from_str(
            r#"
model = "tsodyks_markram"
tau_facil = 20.0
"#,
        )
        .unwrap();
        assert_eq!(d.mode(), Some(StpMode::Facilitation));
    }
}
