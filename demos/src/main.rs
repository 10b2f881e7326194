use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod backend;
mod commands;

use backend::{create_device, get_backend_name};

#[derive(Parser)]
#[command(name = "esnet")]
#[command(about = "ESNet: efficient symmetric network for real-time semantic segmentation")]
struct Cli {
    /// Model configuration file (JSON). Defaults to the published ESNet layout.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the network and print the shape of every stage
    Summary {
        /// Batch size
        #[arg(short, long, default_value_t = 1)]
        batch: usize,

        /// Input height (multiple of 8)
        #[arg(long, default_value_t = 512)]
        height: usize,

        /// Input width (multiple of 8)
        #[arg(long, default_value_t = 1024)]
        width: usize,
    },

    /// Time forward passes on a square input
    Bench {
        /// Number of forward passes
        #[arg(short, long, default_value_t = 20)]
        iterations: usize,

        /// Input height and width (multiple of 8)
        #[arg(short, long, default_value_t = 512)]
        size: usize,
    },

    /// Write the model configuration as JSON
    Config {
        /// Output path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Show backend information
    Info,
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();
    let device = create_device();
    tracing::info!(backend = get_backend_name(), "using backend");

    let config = commands::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Summary {
            batch,
            height,
            width,
        } => commands::summary(&config, batch, height, width, &device),
        Commands::Bench { iterations, size } => commands::bench(&config, iterations, size, &device),
        Commands::Config { output } => commands::write_config(&config, &output),
        Commands::Info => {
            println!("ESNet Information:");
            println!("  Backend: {}", get_backend_name());
            println!("  Device: {device:?}");
            Ok(())
        }
    }
}
