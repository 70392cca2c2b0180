//! Vintage CLI - offline renderer and patch browser for the vintage synth.

mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "vintage")]
#[command(author, version, about = "Vintage polyphonic synth CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a note sequence to a stereo WAV file
    Render(commands::render::RenderArgs),

    /// List synth parameters and their ranges
    Params(commands::params::ParamsArgs),

    /// List factory and user patches
    Patches(commands::patches::PatchesArgs),
}

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout stays clean for `params --json`.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Render(args) => commands::render::run(args),
        Commands::Params(args) => commands::params::run(args),
        Commands::Patches(args) => commands::patches::run(args),
    }
}
