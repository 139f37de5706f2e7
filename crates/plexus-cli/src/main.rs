//! plexus CLI entry point.
//!
//! Two-phase GCN training on a page-page graph: load (or synthesize) a
//! dataset, pretrain, checkpoint, retrain with early stopping, and write
//! metrics and figures to the output directory.

use anyhow::{Context, Result};
use candle_core::Device;
use clap::Parser;
use plexus_core::PipelineConfig;
use plexus_data::PageDataset;
use std::path::PathBuf;

/// plexus version from Cargo.toml
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser, Debug)]
#[command(name = "plexus")]
#[command(version = VERSION)]
#[command(about = "Two-phase GCN node classification on a page-page graph", long_about = None)]
struct Args {
    /// Edge list CSV (header `id_1,id_2`)
    #[arg(long)]
    edges: Option<PathBuf>,

    /// Target table CSV (header `id,page_type`)
    #[arg(long)]
    targets: Option<PathBuf>,

    /// Optional node feature CSV (header `id,f0,f1,...`)
    #[arg(long)]
    features: Option<PathBuf>,

    /// Generate a synthetic dataset with this many nodes per class instead
    /// of loading CSV files
    #[arg(long)]
    synthetic: Option<usize>,

    /// Number of classes for the synthetic dataset
    #[arg(long, default_value = "4")]
    synthetic_classes: usize,

    /// Output directory for checkpoints, figures, and the history log
    #[arg(short, long, default_value = ".")]
    out_dir: PathBuf,

    /// Random seed for splitting and synthetic data
    #[arg(long, default_value = "42")]
    seed: u64,

    /// Rows sampled for the training subset
    #[arg(long, default_value = "200")]
    train_size: usize,

    /// Rows sampled for the validation subset
    #[arg(long, default_value = "200")]
    val_size: usize,

    /// Epoch budget for the pretraining fit
    #[arg(long, default_value = "100")]
    pretrain_epochs: usize,

    /// Epoch cap for the retraining fit
    #[arg(long, default_value = "200")]
    retrain_epochs: usize,

    /// Early-stopping patience on validation accuracy
    #[arg(long, default_value = "20")]
    patience: usize,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut config = PipelineConfig::default();
    config.out_dir = args.out_dir;
    config.seed = args.seed;
    config.split.train_size = args.train_size;
    config.split.val_size = args.val_size;
    config.train.pretrain_epochs = args.pretrain_epochs;
    config.train.retrain_epochs = args.retrain_epochs;
    config.train.patience = args.patience;

    let dataset = match (&args.synthetic, &args.edges, &args.targets) {
        (Some(per_class), _, _) => {
            log::info!(
                "generating synthetic dataset: {} classes x {per_class} nodes",
                args.synthetic_classes
            );
            PageDataset::synthetic(args.synthetic_classes, *per_class, 32, 0.05, 0.002, args.seed)
                .context("failed to generate synthetic dataset")?
        }
        (None, Some(edges), Some(targets)) => {
            PageDataset::from_csv(edges, targets, args.features.as_deref())
                .context("failed to load dataset")?
        }
        _ => anyhow::bail!("provide --edges and --targets, or --synthetic <N>"),
    };

    let device = Device::cuda_if_available(0)?;
    let outcome = plexus_train::run(dataset, &config, &device)?;

    log::info!(
        "run complete: {} pretrain epochs, {} retrain epochs, test_acc={:.3}",
        outcome.pretrain_history.len(),
        outcome.retrain_history.len(),
        outcome.test_acc
    );
    for artifact in &outcome.artifacts {
        log::info!("artifact: {}", artifact.display());
    }
    Ok(())
}
