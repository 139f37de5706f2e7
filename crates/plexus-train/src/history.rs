//! Per-epoch metric history and the append-mode CSV log.

use plexus_core::Result;
use serde::Serialize;
use std::fs::OpenOptions;
use std::path::Path;

/// Metrics recorded after one epoch. Validation fields are absent during
/// the pretraining phase.
#[derive(Debug, Clone, Serialize)]
pub struct EpochMetrics {
    pub epoch: usize,
    pub loss: f32,
    pub acc: f32,
    pub val_loss: Option<f32>,
    pub val_acc: Option<f32>,
}

/// Ordered per-epoch records produced by one fit call.
#[derive(Debug, Clone, Default)]
pub struct History {
    epochs: Vec<EpochMetrics>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, metrics: EpochMetrics) {
        self.epochs.push(metrics);
    }

    pub fn len(&self) -> usize {
        self.epochs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.epochs.is_empty()
    }

    pub fn records(&self) -> &[EpochMetrics] {
        &self.epochs
    }

    pub fn last(&self) -> Option<&EpochMetrics> {
        self.epochs.last()
    }

    pub fn losses(&self) -> Vec<f32> {
        self.epochs.iter().map(|e| e.loss).collect()
    }

    pub fn accs(&self) -> Vec<f32> {
        self.epochs.iter().map(|e| e.acc).collect()
    }

    pub fn val_losses(&self) -> Vec<f32> {
        self.epochs.iter().filter_map(|e| e.val_loss).collect()
    }

    pub fn val_accs(&self) -> Vec<f32> {
        self.epochs.iter().filter_map(|e| e.val_acc).collect()
    }
}

/// Appends one CSV row per epoch to the history log.
///
/// The log accumulates across runs on purpose; the header is written only
/// when the file is new or empty. Each row is flushed immediately so a
/// failed run leaves the rows it completed.
pub struct EpochCsvLogger {
    writer: csv::Writer<std::fs::File>,
}

impl EpochCsvLogger {
    const HEADER: [&'static str; 5] = ["epoch", "loss", "acc", "val_loss", "val_acc"];

    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let fresh = file.metadata()?.len() == 0;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        if fresh {
            writer.write_record(Self::HEADER)?;
            writer.flush()?;
        }
        Ok(Self { writer })
    }

    pub fn log(&mut self, metrics: &EpochMetrics) -> Result<()> {
        let optional = |v: Option<f32>| v.map(|x| x.to_string()).unwrap_or_default();
        self.writer.write_record([
            metrics.epoch.to_string(),
            metrics.loss.to_string(),
            metrics.acc.to_string(),
            optional(metrics.val_loss),
            optional(metrics.val_acc),
        ])?;
        self.writer.flush()?;
        Ok(())
    }
}
