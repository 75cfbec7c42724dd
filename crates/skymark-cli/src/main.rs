mod cmd;
mod poster;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "skymark",
    about = "Mirror a Hatena bookmark feed to Bluesky, posting each bookmark exactly once",
    version,
    propagate_version = true
)]
struct Cli {
    /// Path to the config file
    #[arg(
        long,
        global = true,
        env = "SKYMARK_CONFIG",
        default_value = "skymark.yaml"
    )]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a starter config file
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },

    /// Validate the config and Bluesky credentials, print the banner
    Check,

    /// Run a single sync pass: fetch, post new entries, prune the store
    Run,

    /// Run sync passes on an interval until interrupted
    Watch,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Run | Commands::Watch => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .init();

    let result = match cli.command {
        Commands::Init { force } => cmd::init::run(&cli.config, force),
        Commands::Check => cmd::check::run(&cli.config).await,
        Commands::Run => cmd::run::run(&cli.config).await,
        Commands::Watch => cmd::watch::run(&cli.config).await,
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
