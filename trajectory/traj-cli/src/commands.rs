//! Subcommand implementations.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Args, ValueEnum};
use tracing::{info, warn};
use traj_bag::{BagReader, ExtractConfig, Stores, extract_from_source};
use traj_types::{TargetZone, Trajectory};

/// Built-in schema sets selectable from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StoreArg {
    /// ROS1 Noetic message definitions
    Ros1Noetic,
    /// Only definitions embedded in the bag
    Empty,
}

impl From<StoreArg> for Stores {
    fn from(arg: StoreArg) -> Self {
        match arg {
            StoreArg::Ros1Noetic => Self::Ros1Noetic,
            StoreArg::Empty => Self::Empty,
        }
    }
}

/// Extraction settings: an optional JSON file plus per-field overrides.
#[derive(Debug, Default, Args)]
pub struct ConfigArgs {
    /// JSON extraction config; missing fields keep their defaults
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Topic carrying transforms and gripper readings
    #[arg(long)]
    pub topic: Option<String>,

    /// End-effector frame
    #[arg(long)]
    pub child_frame: Option<String>,

    /// Base frame
    #[arg(long)]
    pub parent_frame: Option<String>,

    /// Raw gripper readings are divided by this
    #[arg(long)]
    pub gripper_divisor: Option<f64>,

    /// Output time zone (`EST`, `UTC`, or an offset such as `+09:00`)
    #[arg(long)]
    pub zone: Option<String>,

    /// Built-in message definitions
    #[arg(long, value_enum)]
    pub store: Option<StoreArg>,
}

impl ConfigArgs {
    /// Builds and validates the extraction config.
    pub fn resolve(&self) -> Result<ExtractConfig> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => ExtractConfig::default(),
        };

        if let Some(topic) = &self.topic {
            config = config.with_topic(topic.clone());
        }
        if self.child_frame.is_some() || self.parent_frame.is_some() {
            let child = self.child_frame.clone().unwrap_or(config.child_frame.clone());
            let parent = self
                .parent_frame
                .clone()
                .unwrap_or(config.parent_frame.clone());
            config = config.with_frames(child, parent);
        }
        if let Some(divisor) = self.gripper_divisor {
            config = config.with_gripper_divisor(divisor);
        }
        if let Some(zone) = &self.zone {
            let zone = TargetZone::parse(zone).with_context(|| format!("Invalid --zone {zone}"))?;
            config = config.with_zone(zone);
        }
        if let Some(store) = self.store {
            config = config.with_store(store.into());
        }

        config.validate().context("Invalid extraction config")?;
        Ok(config)
    }
}

fn load_config(path: &Path) -> Result<ExtractConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Failed to parse config {}", path.display()))
}

/// Output file names derived from the bag's stem.
pub fn output_paths(bag: &Path, out_dir: &Path) -> Result<(PathBuf, PathBuf)> {
    let Some(stem) = bag.file_stem().map(|s| s.to_string_lossy()) else {
        bail!("Bag path has no file name: {}", bag.display());
    };
    Ok((
        out_dir.join(format!("{stem}_trajectory.csv")),
        out_dir.join(format!("{stem}_segmentation.json")),
    ))
}

fn run_extraction(bag: &Path, args: &ConfigArgs) -> Result<Trajectory> {
    let config = args.resolve()?;
    let reader = BagReader::open_with_store(bag, config.store)
        .with_context(|| format!("Failed to open bag {}", bag.display()))?;
    let (trajectory, stats) = extract_from_source(&reader, &config)
        .with_context(|| format!("Failed to extract trajectory from {}", bag.display()))?;

    info!(
        rows = trajectory.len(),
        transforms = stats.transforms_accepted,
        grippers = stats.gripper_samples,
        dropped = stats.rows_dropped,
        incomplete = stats.rows_incomplete,
        "extracted"
    );
    Ok(trajectory)
}

fn write_csv_file(trajectory: &Trajectory, path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    trajectory
        .write_csv(BufWriter::new(file))
        .with_context(|| format!("Failed to write {}", path.display()))
}

/// `extract`: trajectory CSV to a file or stdout.
pub fn extract(bag: &Path, output: Option<&Path>, config: &ConfigArgs) -> Result<()> {
    let trajectory = run_extraction(bag, config)?;

    match output {
        Some(path) => {
            write_csv_file(&trajectory, path)?;
            info!(path = %path.display(), "wrote trajectory");
        }
        None => trajectory
            .write_csv(io::stdout().lock())
            .context("Failed to write trajectory to stdout")?,
    }
    Ok(())
}

/// `label`: ground-truth entry as pretty JSON on stdout.
pub fn label(bag: &Path, labels: &Path) -> Result<()> {
    let Some(entry) = traj_labels::get_ground_truth_segmentation(labels, bag)
        .with_context(|| format!("Failed to read labels {}", labels.display()))?
    else {
        return Ok(());
    };

    let mut out = io::stdout().lock();
    serde_json::to_writer_pretty(&mut out, &entry)?;
    writeln!(out)?;
    Ok(())
}

/// `prepare`: trajectory CSV and segmentation JSON side by side.
pub fn prepare(bag: &Path, labels: &Path, out_dir: &Path, config: &ConfigArgs) -> Result<()> {
    let (csv_path, json_path) = output_paths(bag, out_dir)?;
    let segmentation = traj_labels::get_ground_truth_segmentation(labels, bag)
        .with_context(|| format!("Failed to read labels {}", labels.display()))?;
    let trajectory = run_extraction(bag, config)?;

    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;
    write_csv_file(&trajectory, &csv_path)?;
    info!(path = %csv_path.display(), rows = trajectory.len(), "wrote trajectory");

    match segmentation {
        Some(entry) => {
            let file = File::create(&json_path)
                .with_context(|| format!("Failed to create {}", json_path.display()))?;
            serde_json::to_writer_pretty(BufWriter::new(file), &entry)
                .with_context(|| format!("Failed to write {}", json_path.display()))?;
            info!(path = %json_path.display(), "wrote segmentation");
        }
        None => warn!(bag = %bag.display(), "no segmentation written"),
    }
    Ok(())
}

/// `topics`: one line per topic.
pub fn topics(bag: &Path) -> Result<()> {
    let reader =
        BagReader::open(bag).with_context(|| format!("Failed to open bag {}", bag.display()))?;
    let topics = reader.topics().context("Failed to read bag index")?;

    let mut out = io::stdout().lock();
    for topic in topics {
        writeln!(
            out,
            "{:<32} {:<36} {:>8} msgs ({} conn)",
            topic.topic, topic.msgtype, topic.message_count, topic.connections
        )?;
    }
    Ok(())
}
