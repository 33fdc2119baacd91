//! Built-in fabric presets.

use crate::description::FabricDescription;
use crate::error::TopologyError;
use crate::Topology;

/// Builds one of the built-in fabrics by name.
///
/// Supported presets (case-insensitive):
/// - `single_chip`: one template chip at `(0, 0)`.
/// - `quad`: a 2x2 grid with 4-neighbour links.
/// - `wafer`: a 6x8 grid with 4-neighbour links.
pub fn load_topology(name: &str) -> Result<Topology, TopologyError> {
    let desc = match name.to_ascii_lowercase().as_str() {
        "single_chip" | "single-chip" | "single" | "chip" => {
            FabricDescription::grid("single_chip", 1, 1)
        }
        "quad" | "2x2" => FabricDescription::grid("quad", 2, 2),
        "wafer" | "6x8" => FabricDescription::grid("wafer", 6, 8),
        _ => return Err(TopologyError::UnknownPreset(name.to_string())),
    };
    Topology::from_description(&desc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use neuromap_common::ChipCoord;

    #[test]
    fn single_chip_preset() {
        let topo = load_topology("single_chip").unwrap();
        assert_eq!(topo.chip_count(), 1);
        let chip = topo.chip(ChipCoord::new(0, 0)).unwrap();
        assert_eq!(chip.usable_denmems(), 512);
        assert_eq!(chip.drivers.len(), 224);
        assert_eq!(chip.analog_outputs.len(), 2);
        assert_eq!(topo.neighbors(ChipCoord::new(0, 0)).count(), 0);
    }

    #[test]
    fn wafer_preset_case_insensitive() {
        let topo = load_topology("WAFER").unwrap();
        assert_eq!(topo.name(), "wafer");
        assert_eq!(topo.chip_count(), 48);
        assert!(topo.contains(ChipCoord::new(5, 7)));
        assert!(!topo.contains(ChipCoord::new(6, 0)));
    }

    #[test]
    fn unknown_preset() {
        let err = load_topology("cluster").unwrap_err();
        assert!(err.to_string().contains("cluster"));
        assert!(err.to_string().contains("wafer"));
    }
}
