//! Two-phase training orchestration.
//!
//! Drives the pipeline state machine
//! `Idle → Pretraining → Checkpointed → Retraining → Finalized`:
//! a fixed-budget pretraining fit with CSV epoch logging, a checkpoint and
//! loss plot, then an early-stopped retraining fit on a fresh data grouping
//! followed by the comparison plots, the final checkpoint, and a test-set
//! evaluation. Any failure aborts the run where it happened; nothing is
//! caught or retried, and artifacts written before the failure point stay
//! on disk.

use crate::early_stopping::EarlyStopping;
use crate::history::{EpochCsvLogger, EpochMetrics, History};
use crate::provider::{GcnProvider, ModelProvider};
use candle_core::Device;
use candle_nn::Optimizer;
use plexus_core::{artifacts, PipelineConfig, PlexusError, Result};
use plexus_data::PageDataset;
use plexus_gnn::{checkpoint, BuiltModel, CheckpointMeta, FullBatchSequence};
use plexus_report as report;
use std::fs;
use std::path::PathBuf;

/// The orchestrator's position in the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Idle,
    Pretraining,
    Checkpointed,
    Retraining,
    Finalized,
}

/// Everything a completed run produced.
#[derive(Debug)]
pub struct TrainingOutcome {
    pub pretrain_history: History,
    pub retrain_history: History,
    pub test_loss: f32,
    pub test_acc: f32,
    /// Checkpoints, figures, and the history log, in write order
    pub artifacts: Vec<PathBuf>,
}

/// Drives one two-phase run against a collaborator.
pub struct TrainingOrchestrator<'a, P: ModelProvider> {
    provider: &'a P,
    config: &'a PipelineConfig,
    stage: PipelineStage,
}

impl<'a, P: ModelProvider> TrainingOrchestrator<'a, P> {
    pub fn new(provider: &'a P, config: &'a PipelineConfig) -> Self {
        Self {
            provider,
            config,
            stage: PipelineStage::Idle,
        }
    }

    pub fn stage(&self) -> PipelineStage {
        self.stage
    }

    /// Runs the full two-phase protocol.
    pub fn run(&mut self) -> Result<TrainingOutcome> {
        self.config.validate()?;
        fs::create_dir_all(&self.config.out_dir)?;
        let out_dir = &self.config.out_dir;
        let mut written = Vec::new();

        // Pretraining: fixed budget, no validation, every epoch logged.
        self.stage = PipelineStage::Pretraining;
        log::info!(
            "pretraining for {} epochs",
            self.config.train.pretrain_epochs
        );
        let train_seq = self.provider.train_generator()?;
        let mut built = self.provider.initial_model()?;
        let log_path = out_dir.join(artifacts::HISTORY_LOG);
        let mut logger = EpochCsvLogger::open(&log_path)?;
        let pretrain_history = fit(
            &mut built,
            &train_seq,
            self.config.train.pretrain_epochs,
            None,
            &mut logger,
            None,
        )?;

        // Checkpointed: persist weights, plot the loss curve.
        let meta = CheckpointMeta {
            epochs_trained: pretrain_history.len(),
            classes: self.provider.classes().to_vec(),
            gcn: self.provider.gcn_config().clone(),
            best_val_acc: None,
        };
        let (weights, sidecar) =
            checkpoint::save(&built.varmap, &meta, out_dir, artifacts::PRETRAINED_MODEL)?;
        written.extend([weights, sidecar]);
        let fig = report::loss_figure(&pretrain_history.losses());
        written.push(report::save_figure(
            &fig,
            &out_dir.join(artifacts::PRETRAINING_PLOT),
        )?);
        self.stage = PipelineStage::Checkpointed;

        // Retraining: fresh grouping and model, early-stopped on val_acc.
        self.stage = PipelineStage::Retraining;
        log::info!(
            "retraining for up to {} epochs (patience {})",
            self.config.train.retrain_epochs,
            self.config.train.patience
        );
        let group = self.provider.data_group()?;
        let mut retrained = self.provider.retrain_model(&group)?;
        let gens = self.provider.generators(&group)?;
        let mut early = EarlyStopping::new(self.config.train.patience);
        let retrain_history = fit(
            &mut retrained,
            &gens.train,
            self.config.train.retrain_epochs,
            Some(&gens.val),
            &mut logger,
            Some(&mut early),
        )?;

        // Finalized: comparison plots, final checkpoint, test evaluation.
        let fig = report::accuracy_figure(&retrain_history.accs(), &retrain_history.val_accs());
        written.push(report::save_figure(
            &fig,
            &out_dir.join(artifacts::ACCURACY_PLOT),
        )?);
        let fig =
            report::loss_comparison_figure(&retrain_history.losses(), &retrain_history.val_losses());
        written.push(report::save_figure(
            &fig,
            &out_dir.join(artifacts::LOSS_PLOT),
        )?);

        let meta = CheckpointMeta {
            epochs_trained: retrain_history.len(),
            classes: self.provider.classes().to_vec(),
            gcn: self.provider.gcn_config().clone(),
            best_val_acc: early.best().map(|(_, v)| v),
        };
        let (weights, sidecar) =
            checkpoint::save(&retrained.varmap, &meta, out_dir, artifacts::FINAL_MODEL)?;
        written.extend([weights, sidecar]);
        written.push(log_path);

        let (test_loss, test_acc) = if gens.test.is_empty() {
            log::warn!("test subset is empty; skipping evaluation");
            (f32::NAN, f32::NAN)
        } else {
            let (loss, acc) = retrained.model.evaluate(&gens.test)?;
            log::info!("test evaluation: loss={loss:.4} acc={acc:.3}");
            (loss, acc)
        };

        self.stage = PipelineStage::Finalized;
        Ok(TrainingOutcome {
            pretrain_history,
            retrain_history,
            test_loss,
            test_acc,
            artifacts: written,
        })
    }
}

/// Fits a compiled model on one sequence.
///
/// Per epoch: one full-batch gradient step, then an evaluation pass with
/// dropout disabled (plus validation when present), a CSV row, and the
/// early-stopping check. On stop, the best-seen weights are restored.
fn fit(
    built: &mut BuiltModel,
    train: &FullBatchSequence,
    epochs: usize,
    val: Option<&FullBatchSequence>,
    logger: &mut EpochCsvLogger,
    mut early: Option<&mut EarlyStopping>,
) -> Result<History> {
    let mut history = History::new();

    for epoch in 0..epochs {
        let loss = built.model.training_loss(train)?;
        built.optimizer.backward_step(&loss)?;

        let (loss, acc) = built.model.evaluate(train)?;
        if !loss.is_finite() {
            return Err(PlexusError::numerical(format!(
                "non-finite training loss at epoch {epoch}"
            )));
        }

        let (val_loss, val_acc) = match val {
            Some(seq) => {
                let (l, a) = built.model.evaluate(seq)?;
                (Some(l), Some(a))
            }
            None => (None, None),
        };

        match (val_loss, val_acc) {
            (Some(vl), Some(va)) => log::info!(
                "epoch {epoch}: loss={loss:.4} acc={acc:.3} val_loss={vl:.4} val_acc={va:.3}"
            ),
            _ => log::info!("epoch {epoch}: loss={loss:.4} acc={acc:.3}"),
        }

        let metrics = EpochMetrics {
            epoch,
            loss,
            acc,
            val_loss,
            val_acc,
        };
        logger.log(&metrics)?;
        history.push(metrics);

        if let Some(es) = early.as_deref_mut() {
            let monitored = val_acc.ok_or_else(|| {
                PlexusError::config("early stopping requires validation data")
            })?;
            if es.observe(epoch, monitored, &built.varmap)? {
                log::info!(
                    "early stopping at epoch {epoch} (no improvement for {} epochs)",
                    es.patience()
                );
                break;
            }
        }
    }

    if let Some(es) = early {
        es.restore_best(&built.varmap)?;
        if let Some((epoch, value)) = es.best() {
            log::info!("restored best weights from epoch {epoch} (val_acc={value:.3})");
        }
    }

    Ok(history)
}

/// Explicit-construction mode: builds the default [`GcnProvider`] from a
/// dataset and runs the two-phase protocol. Takes no tunables beyond the
/// configuration object.
pub fn run(
    dataset: PageDataset,
    config: &PipelineConfig,
    device: &Device,
) -> Result<TrainingOutcome> {
    let provider = GcnProvider::new(dataset, config.clone(), device.clone())?;
    TrainingOrchestrator::new(&provider, config).run()
}

/// Generator-callback mode: drives any collaborator through the same
/// protocol.
pub fn run_with_provider<P: ModelProvider>(
    provider: &P,
    config: &PipelineConfig,
) -> Result<TrainingOutcome> {
    TrainingOrchestrator::new(provider, config).run()
}
