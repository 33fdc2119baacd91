//! `neuromap inspect`: summary and per-neuron lookup of a persisted result.

use std::collections::BTreeMap;

use neuromap_common::{BioNeuronId, StpMode};
use neuromap_results::MappingResult;

use crate::{GlobalArgs, InspectArgs};

/// Runs the `neuromap inspect` command.
///
/// Returns exit code 1 if the requested neuron is not placed.
pub fn run(args: &InspectArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let result = MappingResult::from_file(&args.file)?;
    if !global.quiet {
        eprintln!("    Loaded {}", args.file.display());
    }

    match args.bio {
        Some(bio) => match describe_neuron(&result, bio) {
            Some(lines) => {
                for line in lines {
                    println!("{line}");
                }
                Ok(0)
            }
            None => {
                eprintln!("error: neuron {bio} is not placed");
                Ok(1)
            }
        },
        None => {
            for line in summary(&result) {
                println!("{line}");
            }
            Ok(0)
        }
    }
}

fn describe_neuron(result: &MappingResult, bio: BioNeuronId) -> Option<Vec<String>> {
    let item = result.placement.find(bio)?;
    let mut lines = vec![
        format!("neuron:   {bio}"),
        format!("address:  {}", item.address),
        format!("logical:  {}", item.logical_neuron),
    ];
    if let Some(block) = item.neuron_block {
        lines.push(format!("block:    {block}"));
    }
    let denmems = result.stats.denmems(bio);
    if !denmems.is_empty() {
        let ids: Vec<String> = denmems.iter().map(|d| d.denmem.to_string()).collect();
        lines.push(format!("denmems:  {}", ids.join(", ")));
    }
    if let Some(analog) = result.analog_outputs.find(&item.logical_neuron) {
        lines.push(format!("analog:   channel {} on {}", analog.channel, analog.chip));
    }
    Some(lines)
}

fn summary(result: &MappingResult) -> Vec<String> {
    let stats = &result.stats;
    let mut lines = vec![
        format!(
            "neurons:  {} placed, {} unplaced, {} total",
            result.placement.len(),
            stats.unplaced_neurons(),
            stats.num_neurons()
        ),
        format!(
            "synapses: {} realized, {} lost",
            stats.num_synapses(),
            stats.synapse_loss()
        ),
    ];

    let mut by_mode: BTreeMap<StpMode, usize> = BTreeMap::new();
    for driver in result.driver_assignments.iter() {
        *by_mode.entry(driver.mode).or_default() += 1;
    }
    let modes: Vec<String> = by_mode
        .iter()
        .map(|(mode, count)| format!("{count} {mode}"))
        .collect();
    lines.push(format!(
        "drivers:  {} active ({})",
        result.driver_assignments.active_drivers(),
        modes.join(", ")
    ));
    lines.push(format!("analog:   {} recorded", result.analog_outputs.len()));

    let mut per_chip: BTreeMap<_, usize> = BTreeMap::new();
    for item in &result.placement {
        *per_chip.entry(item.chip()).or_default() += 1;
    }
    for (chip, count) in per_chip {
        lines.push(format!("  {chip}: {count} neurons"));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use neuromap_common::{ChipCoord, PopulationId};
    use neuromap_config::MappingConfig;
    use neuromap_network::{CellType, Connector, Network};
    use neuromap_topology::load_topology;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn result() -> MappingResult {
        let mut net = Network::new();
        let stim = net.add_population("stim", 2, CellType::ExternalInput).unwrap();
        let exc = net.add_population("exc", 1, CellType::Computed).unwrap();
        net.record_voltage(exc).unwrap();
        let connector = Connector::AllToAll {
            allow_self_connections: true,
        };
        net.add_projection(stim, exc, connector, 1.0, None).unwrap();
        let topo = load_topology("single_chip").unwrap();
        neuromap_pnr::map_network(&net, &topo, &MappingConfig::default()).unwrap()
    }

    #[test]
    fn neuron_lookup() {
        let result = result();
        let neuron = |pop, index| BioNeuronId::new(PopulationId::from_raw(pop), index);
        let lines = describe_neuron(&result, neuron(1, 0)).unwrap();
        assert!(lines[0].contains("pop1[0]"));
        assert!(lines.iter().any(|l| l.starts_with("denmems:  0, 1, 2, 3")));
        assert!(lines.iter().any(|l| l.starts_with("analog:   channel 0")));

        let external = describe_neuron(&result, neuron(0, 1)).unwrap();
        assert!(external.iter().all(|l| !l.starts_with("denmems")));
        assert!(describe_neuron(&result, neuron(0, 5)).is_none());
    }

    #[test]
    fn summary_lists_chips_and_modes() {
        let lines = summary(&result());
        assert_eq!(lines[0], "neurons:  3 placed, 0 unplaced, 3 total");
        assert_eq!(lines[1], "synapses: 2 realized, 0 lost");
        assert_eq!(lines[2], "drivers:  1 active (1 static)");
        assert!(lines.contains(&format!("  {}: 3 neurons", ChipCoord::new(0, 0))));
    }

    #[test]
    fn inspect_persisted_file() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("run.bin");
        result().to_file(&file).unwrap();
        let global = GlobalArgs {
            quiet: true,
            verbose: false,
        };
        let args = InspectArgs {
            file: file.clone(),
            bio: Some(BioNeuronId::new(PopulationId::from_raw(1), 0)),
        };
        assert_eq!(run(&args, &global).unwrap(), 0);
        let args = InspectArgs {
            file,
            bio: Some(BioNeuronId::new(PopulationId::from_raw(1), 9)),
        };
        assert_eq!(run(&args, &global).unwrap(), 1);
        let args = InspectArgs {
            file: PathBuf::from("/nonexistent/run.bin"),
            bio: None,
        };
        assert!(run(&args, &global).is_err());
    }
}
