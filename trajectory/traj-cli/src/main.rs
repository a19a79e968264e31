//! `traj-extract`: end-effector trajectories and segmentation labels from
//! recorded manipulation sessions.
//!
//! # Commands
//!
//! - `traj-extract extract <BAG>` - Write the aligned trajectory as CSV
//! - `traj-extract label <BAG> --labels <JSON>` - Print the ground-truth entry
//! - `traj-extract prepare <BAG> --labels <JSON>` - Write both next to each other
//! - `traj-extract topics <BAG>` - List topics, types and message counts
//!
//! Set `RUST_LOG` to override the log filter; `-v` enables debug output.

mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::commands::ConfigArgs;

/// Extract end-effector trajectories from ROS1 bags
#[derive(Parser)]
#[command(name = "traj-extract")]
#[command(about = "End-effector trajectory extraction and ground-truth lookup", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable debug-level logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract the aligned end-effector trajectory as CSV
    Extract {
        /// The bag file to read
        #[arg(name = "BAG")]
        bag: PathBuf,

        /// Output CSV file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        config: ConfigArgs,
    },

    /// Print the ground-truth segmentation entry for a bag as JSON
    Label {
        /// The bag whose file name is looked up
        #[arg(name = "BAG")]
        bag: PathBuf,

        /// Ground-truth JSON file
        #[arg(short, long)]
        labels: PathBuf,
    },

    /// Write `<stem>_trajectory.csv` and `<stem>_segmentation.json`
    Prepare {
        /// The bag file to read
        #[arg(name = "BAG")]
        bag: PathBuf,

        /// Ground-truth JSON file
        #[arg(short, long)]
        labels: PathBuf,

        /// Directory to write into
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,

        #[command(flatten)]
        config: ConfigArgs,
    },

    /// List the topics recorded in a bag
    Topics {
        /// The bag file to read
        #[arg(name = "BAG")]
        bag: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Extract {
            bag,
            output,
            config,
        } => commands::extract(&bag, output.as_deref(), &config),
        Commands::Label { bag, labels } => commands::label(&bag, &labels),
        Commands::Prepare {
            bag,
            labels,
            out_dir,
            config,
        } => commands::prepare(&bag, &labels, &out_dir, &config),
        Commands::Topics { bag } => commands::topics(&bag),
    }
}
