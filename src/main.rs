//! Entry point for the npgo application.
//! Parses the ensemble member and year range, then runs the NPGO pipeline.

use clap::Parser;
use npgo::cli::Args;
use npgo::parallel::ParallelConfig;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command-line arguments
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = args.to_config()?;
    ParallelConfig::from_threads(args.threads).setup_global_pool()?;

    let output = npgo::run(&config)?;
    println!("✅ Saved result to {}", output.display());

    Ok(())
}
