mod commands;

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "hainfra")]
#[command(about = "Provision and tear down Rancher HA test clusters", long_about = None)]
struct Cli {
    /// Path to tool-config.yml (default: HAINFRA_CONFIG_PATH or discovery)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply the Terraform module and write a bundle per HA instance
    Setup,
    /// Destroy the infrastructure and remove bundles and Terraform state
    Cleanup {
        /// Only remove local files, do not run terraform destroy
        #[arg(long)]
        local_only: bool,
    },
    /// Write bundles from the current Terraform state or a saved output document
    Render {
        /// JSON file with the output map (default: read `terraform output`)
        #[arg(short, long)]
        outputs: Option<PathBuf>,
    },
    /// Load and validate the configuration
    Validate,
    /// Show version information
    Version,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    // no config needed
    if matches!(cli.command, Commands::Version) {
        println!("hainfra {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let (config_path, config) =
        hainfra_config::load_from(cli.config.as_deref()).context("failed to load configuration")?;
    tracing::debug!("Loaded config from {}", config_path.display());

    match cli.command {
        Commands::Setup => commands::setup::handle(&config).await?,
        Commands::Cleanup { local_only } => commands::cleanup::handle(&config, local_only).await?,
        Commands::Render { outputs } => commands::render::handle(&config, outputs.as_deref()).await?,
        Commands::Validate => commands::validate::handle(&config_path, &config)?,
        Commands::Version => unreachable!("Version is handled before config loading"),
    }

    Ok(())
}
