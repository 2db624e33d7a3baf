//! Bridgegen command-line tool
//!
//! Generates Java interface bindings for the modules listed in a project's
//! bridgegen.toml, from an introspection snapshot of the source runtime.

mod commands;
mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use commands::generate::GenerateArgs;

#[derive(Parser)]
#[command(name = "bridgegen")]
#[command(about = "Java interface bindings for Python modules", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// When to use colors: auto, always, never
    #[arg(long, global = true, default_value = "auto")]
    color: String,

    /// Override registry directory (default: ~/.bridgegen/modules)
    #[arg(long, global = true)]
    registry: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate bindings, write pom.xml and optionally build
    Generate {
        /// Project directory containing bridgegen.toml
        #[arg(short, long, default_value = ".")]
        config: PathBuf,
        /// Introspection snapshot (overrides build.snapshot)
        #[arg(short, long)]
        snapshot: Option<PathBuf>,
        /// Print generated sources instead of writing them
        #[arg(long)]
        stdout: bool,
        /// Skip the build step
        #[arg(long)]
        no_build: bool,
    },

    /// Register the project's modules without generating
    Register {
        /// Project directory containing bridgegen.toml
        #[arg(short, long, default_value = ".")]
        config: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Generate {
            config,
            snapshot,
            stdout,
            no_build,
        } => commands::generate::execute(GenerateArgs {
            config_dir: config,
            snapshot,
            registry: cli.registry,
            stdout,
            no_build,
            color: cli.color,
        }),

        Commands::Register { config } => commands::register::execute(config, cli.registry, cli.color),
    }
}

/// `RUST_LOG` sets the level; `--verbose` forces debug.
fn init_logging(verbose: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.init();
}
