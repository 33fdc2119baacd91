//! neuromap CLI, the command-line front end of the neuromap place-and-route engine.
//!
//! Provides `neuromap map` to map a network description onto a fabric and
//! persist the result, and `neuromap inspect` to query a persisted result.

#![warn(missing_docs)]

mod inspect;
mod map;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use neuromap_common::BioNeuronId;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// neuromap: place and route spiking networks onto neuromorphic hardware.
#[derive(Parser, Debug)]
#[command(name = "neuromap", version, about = "Neuromorphic place-and-route engine")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Enable verbose (debug-level) output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Map a network onto a fabric and write the result.
    Map(MapArgs),
    /// Print a summary of a mapping result or look up one neuron.
    Inspect(InspectArgs),
}

/// Arguments for the `neuromap map` subcommand.
#[derive(Parser, Debug)]
pub struct MapArgs {
    /// Network description (`network.toml`).
    #[arg(short, long)]
    pub network: PathBuf,

    /// Fabric description file.
    #[arg(short, long, conflicts_with = "preset")]
    pub topology: Option<PathBuf>,

    /// Built-in fabric (`single_chip`, `quad`, `wafer`).
    #[arg(short, long)]
    pub preset: Option<String>,

    /// Run configuration (`neuromap.toml`).
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output file; the extension selects the encoding
    /// (`.json`, `.bin`, `.json.gz`, `.bin.gz`).
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for the `neuromap inspect` subcommand.
#[derive(Parser, Debug)]
pub struct InspectArgs {
    /// A persisted mapping result.
    pub file: PathBuf,

    /// Look up one neuron, given as `POPULATION:INDEX`.
    #[arg(long)]
    pub bio: Option<BioNeuronId>,
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Whether to print verbose/debug information.
    pub verbose: bool,
}

impl GlobalArgs {
    /// The default log filter for these flags; `RUST_LOG` takes precedence.
    fn log_filter(&self) -> &'static str {
        if self.quiet {
            "error"
        } else if self.verbose {
            "debug"
        } else {
            "info"
        }
    }
}

fn init_logging(global: &GlobalArgs) {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(global.log_filter())),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

fn main() {
    let cli = Cli::parse();

    let global = GlobalArgs {
        quiet: cli.quiet,
        verbose: cli.verbose,
    };
    init_logging(&global);

    let result = match cli.command {
        Command::Map(ref args) => map::run(args, &global),
        Command::Inspect(ref args) => inspect::run(args, &global),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn parse_map_with_preset() {
        let cli = Cli::parse_from([
            "neuromap",
            "map",
            "--network",
            "net.toml",
            "--preset",
            "wafer",
            "-o",
            "out.bin.gz",
        ]);
        match cli.command {
            Command::Map(ref args) => {
                assert_eq!(args.network, PathBuf::from("net.toml"));
                assert_eq!(args.preset.as_deref(), Some("wafer"));
                assert!(args.topology.is_none());
                assert_eq!(args.output, Some(PathBuf::from("out.bin.gz")));
            }
            _ => panic!("expected Map command"),
        }
    }

    #[test]
    fn topology_and_preset_conflict() {
        let res = Cli::try_parse_from([
            "neuromap",
            "map",
            "--network",
            "net.toml",
            "--preset",
            "quad",
            "--topology",
            "fabric.toml",
        ]);
        assert!(res.is_err());
    }

    #[test]
    fn parse_inspect_with_bio() {
        let cli = Cli::parse_from(["neuromap", "inspect", "out.json", "--bio", "2:17"]);
        match cli.command {
            Command::Inspect(ref args) => {
                assert_eq!(args.file, PathBuf::from("out.json"));
                let bio = args.bio.unwrap();
                assert_eq!(bio.population.as_raw(), 2);
                assert_eq!(bio.index, 17);
            }
            _ => panic!("expected Inspect command"),
        }
    }

    #[test]
    fn invalid_bio_id_rejected() {
        let res = Cli::try_parse_from(["neuromap", "inspect", "out.json", "--bio", "2-17"]);
        assert!(res.is_err());
    }

    #[test]
    fn global_flags() {
        let cli = Cli::parse_from(["neuromap", "-v", "inspect", "out.json"]);
        assert!(cli.verbose);
        assert!(!cli.quiet);
        let global = GlobalArgs {
            quiet: false,
            verbose: true,
        };
        assert_eq!(global.log_filter(), "debug");

        let cli = Cli::parse_from(["neuromap", "inspect", "out.json", "-q"]);
        assert!(cli.quiet);
    }

    #[test]
    fn quiet_and_verbose_conflict() {
        assert!(Cli::try_parse_from(["neuromap", "-q", "-v", "inspect", "x.json"]).is_err());
    }
}
