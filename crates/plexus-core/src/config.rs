//! Pipeline configuration.
//!
//! All tunables live in one immutable, validated configuration object that
//! is passed into the components that need it. Defaults reproduce the
//! reference pipeline; `validate()` enforces the documented ranges.

use crate::errors::{PlexusError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// File names of the artifacts a run writes into its output directory.
pub mod artifacts {
    /// Append-mode per-epoch metric log.
    pub const HISTORY_LOG: &str = "history_log.csv";
    /// Checkpoint stem written after the pretraining phase.
    pub const PRETRAINED_MODEL: &str = "pre_trained_model";
    /// Checkpoint stem written after the retraining phase.
    pub const FINAL_MODEL: &str = "finalised_model";
    /// Single-series loss curve from the pretraining phase.
    pub const PRETRAINING_PLOT: &str = "pretraining_plot.png";
    /// Train/validation accuracy curves from the retraining phase.
    pub const ACCURACY_PLOT: &str = "pretrained_plot_accuracy.png";
    /// Train/validation loss curves from the retraining phase.
    pub const LOSS_PLOT: &str = "pretrained_plot_loss.png";
}

/// Activation applied after a graph convolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activation {
    Relu,
    Tanh,
    /// No nonlinearity.
    Identity,
}

/// Train/validation/test partitioning quotas.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplitConfig {
    /// Rows sampled for the training subset
    pub train_size: usize,
    /// Rows sampled from the remainder for the validation subset
    pub val_size: usize,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            train_size: 200,
            val_size: 200,
        }
    }
}

/// GCN architecture and optimizer settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GcnConfig {
    /// Output width of each graph convolution layer
    pub layer_sizes: Vec<usize>,
    /// Activation per layer; must match `layer_sizes` in length
    pub activations: Vec<Activation>,
    /// Dropout probability applied before each convolution, in [0, 1)
    pub dropout: f32,
    /// Adam learning rate
    pub learning_rate: f64,
}

impl Default for GcnConfig {
    fn default() -> Self {
        Self {
            layer_sizes: vec![16, 16],
            activations: vec![Activation::Relu, Activation::Relu],
            dropout: 0.5,
            learning_rate: 0.01,
        }
    }
}

/// Epoch budgets and early-stopping settings for the two training phases.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    /// Fixed epoch budget for the pretraining fit
    pub pretrain_epochs: usize,
    /// Upper epoch bound for the retraining fit
    pub retrain_epochs: usize,
    /// Early-stopping patience on validation accuracy (epochs)
    pub patience: usize,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            pretrain_epochs: 100,
            retrain_epochs: 200,
            patience: 20,
        }
    }
}

/// Top-level configuration for a pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub split: SplitConfig,
    pub gcn: GcnConfig,
    pub train: TrainConfig,
    /// Directory receiving checkpoints, plots, and the history log
    pub out_dir: PathBuf,
    /// Seed for the split sampler and the synthetic dataset
    pub seed: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            split: SplitConfig::default(),
            gcn: GcnConfig::default(),
            train: TrainConfig::default(),
            out_dir: PathBuf::from("."),
            seed: 42,
        }
    }
}

impl PipelineConfig {
    /// Validates all value ranges. Called once before a run starts.
    pub fn validate(&self) -> Result<()> {
        if self.split.train_size == 0 {
            return Err(PlexusError::config("train_size must be > 0"));
        }
        if self.split.val_size == 0 {
            return Err(PlexusError::config("val_size must be > 0"));
        }
        if self.gcn.layer_sizes.is_empty() {
            return Err(PlexusError::config("layer_sizes must not be empty"));
        }
        if self.gcn.layer_sizes.len() != self.gcn.activations.len() {
            return Err(PlexusError::config(format!(
                "layer_sizes ({}) and activations ({}) must have equal length",
                self.gcn.layer_sizes.len(),
                self.gcn.activations.len()
            )));
        }
        if self.gcn.layer_sizes.contains(&0) {
            return Err(PlexusError::config("layer sizes must be > 0"));
        }
        if !(0.0..1.0).contains(&self.gcn.dropout) {
            return Err(PlexusError::config(format!(
                "dropout must be in [0, 1), got {}",
                self.gcn.dropout
            )));
        }
        if self.gcn.learning_rate <= 0.0 {
            return Err(PlexusError::config("learning_rate must be > 0"));
        }
        if self.train.pretrain_epochs == 0 || self.train.retrain_epochs == 0 {
            return Err(PlexusError::config("epoch budgets must be > 0"));
        }
        if self.train.patience == 0 {
            return Err(PlexusError::config("patience must be > 0"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = PipelineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.split.train_size, 200);
        assert_eq!(config.train.pretrain_epochs, 100);
        assert_eq!(config.train.retrain_epochs, 200);
        assert_eq!(config.train.patience, 20);
    }

    #[test]
    fn test_dropout_range_rejected() {
        let mut config = PipelineConfig::default();
        config.gcn.dropout = 1.0;
        assert!(config.validate().is_err());
        config.gcn.dropout = -0.1;
        assert!(config.validate().is_err());
        config.gcn.dropout = 0.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_layer_activation_mismatch_rejected() {
        let mut config = PipelineConfig::default();
        config.gcn.activations = vec![Activation::Relu];
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("equal length"));
    }
}
