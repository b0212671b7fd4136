//! Entry point for the `premerge` binary.

mod cli;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "premerge",
    version,
    about = "Preliminary merge build step: merge a target branch before the build runs"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the preliminary merge step across all configured repositories
    Run {
        /// Step configuration file
        #[arg(long, value_name = "FILE", default_value = "premerge.toml")]
        config: PathBuf,

        /// Build id the premerge branch name is derived from
        #[arg(long)]
        build_id: u64,

        /// Shared build state file read and published to
        #[arg(long, value_name = "FILE", default_value = ".premerge-state.json")]
        state: PathBuf,
    },

    /// Validate a step configuration file
    Validate {
        /// Step configuration file
        #[arg(long, value_name = "FILE", default_value = "premerge.toml")]
        config: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run {
            config,
            build_id,
            state,
        } => cli::run::run_step(&config, &state, build_id).await?,
        Commands::Validate { config } => cli::run::validate_step(&config)?,
    }
    Ok(())
}
