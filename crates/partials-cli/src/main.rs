//! Partials CLI - Command-line interface for phase-vocoder partial analysis.

mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "partials")]
#[command(author, version, about = "Sinusoidal partial analysis and resynthesis", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a WAV file into partials
    Analyze(commands::analyze::AnalyzeArgs),

    /// Resynthesize a WAV file from its partials
    Resynth(commands::resynth::ResynthArgs),

    /// Extract the partial series around a frequency
    Band(commands::band::BandArgs),

    /// Print or save the default analysis configuration
    Config(commands::config::ConfigArgs),

    /// Display WAV file information
    Info(commands::info::InfoArgs),
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze(args) => commands::analyze::run(args),
        Commands::Resynth(args) => commands::resynth::run(args),
        Commands::Band(args) => commands::band::run(args),
        Commands::Config(args) => commands::config::run(args),
        Commands::Info(args) => commands::info::run(args),
    }
}
