//! Default configuration command.

use clap::Args;
use partials_analysis::AnalysisConfig;
use std::path::PathBuf;

#[derive(Args)]
pub struct ConfigArgs {
    /// Sample rate written into the configuration
    #[arg(long, default_value = "44100")]
    sample_rate: f32,

    /// Save to a file instead of printing
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Validate an existing configuration file instead
    #[arg(long, conflicts_with = "output")]
    check: Option<PathBuf>,
}

pub fn run(args: ConfigArgs) -> anyhow::Result<()> {
    if let Some(path) = &args.check {
        let config = AnalysisConfig::load(path)?;
        config.validate()?;
        println!("{} is valid (hop {})", path.display(), config.hop());
        return Ok(());
    }

    let config = AnalysisConfig::new(args.sample_rate);
    match &args.output {
        Some(path) => {
            config.save(path)?;
            println!("Saved default configuration to {}", path.display());
        }
        None => print!("{}", config.to_toml()?),
    }

    Ok(())
}
