//! `neuromap map`: network description to persisted mapping result.
//!
//! 1. Load the run configuration and the fabric
//! 2. Load and validate the network description
//! 3. Place, route and assign analog outputs
//! 4. Write the result

use std::path::PathBuf;

use neuromap_config::{BackendKind, MappingConfig, TopologySource};
use neuromap_pnr::map_network;
use neuromap_results::MappingResult;
use neuromap_topology::{load_topology, Topology};
use tracing::warn;

use crate::{GlobalArgs, MapArgs};

/// Runs the `neuromap map` command.
///
/// Returns exit code 0 on success (synapse loss included) and 1 when the
/// mapping run fails.
pub fn run(args: &MapArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let config = match &args.config {
        Some(path) => neuromap_config::load_config(path)?,
        None => MappingConfig::default(),
    };
    if config.backend.kind != BackendKind::None {
        return Err(format!(
            "backend {:?} is not supported; only \"none\" can be used",
            config.backend.kind
        )
        .into());
    }

    let topology = resolve_topology(args, &config)?;
    let network = neuromap_network::load_network(&args.network)?;

    if !global.quiet {
        eprintln!(
            "   Mapping {} neurons in {} populations onto {} ({} chips)",
            network.neuron_count(),
            network.populations().len(),
            topology.name(),
            topology.chip_count()
        );
    }

    let result = match map_network(&network, &topology, &config) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("error: mapping failed: {e}");
            return Ok(1);
        }
    };

    if !global.quiet {
        print_summary(&result);
    }
    if !result.is_lossless() {
        warn!(
            "{} of {} synapses were not routed",
            result.stats.synapse_loss(),
            result.stats.num_synapses()
        );
    }

    if let Some(path) = output_path(args, &config) {
        result.to_file(&path)?;
        if !global.quiet {
            eprintln!("     Wrote {}", path.display());
        }
    }
    Ok(0)
}

/// Picks the fabric: command line first, then the `[topology]` section.
fn resolve_topology(
    args: &MapArgs,
    config: &MappingConfig,
) -> Result<Topology, Box<dyn std::error::Error>> {
    let source = match (&args.topology, &args.preset) {
        (Some(path), _) => TopologySource::File(path.clone()),
        (None, Some(name)) => TopologySource::Preset(name.clone()),
        (None, None) => config
            .topology_source()
            .ok_or("no fabric given: use --topology, --preset or a [topology] section")?,
    };
    let topology = match source {
        TopologySource::Preset(name) => load_topology(&name)?,
        TopologySource::File(path) => Topology::from_file(&path)?,
    };
    Ok(topology)
}

fn output_path(args: &MapArgs, config: &MappingConfig) -> Option<PathBuf> {
    args.output
        .clone()
        .or_else(|| config.persistence.path.clone())
}

fn print_summary(result: &MappingResult) {
    let stats = &result.stats;
    eprintln!(
        "    Placed {} of {} neurons on {} chips",
        result.placement.len(),
        stats.num_neurons(),
        result.placement.chips().count()
    );
    eprintln!(
        "    Routed {} synapses over {} drivers, {} lost",
        stats.num_synapses() - stats.synapse_loss(),
        result.driver_assignments.active_drivers(),
        stats.synapse_loss()
    );
    eprintln!(
        "  Recording {} neurons, finished in {:.1} ms",
        result.analog_outputs.len(),
        stats.timing.total_ms()
    );
}
