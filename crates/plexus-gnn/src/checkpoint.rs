//! Model checkpointing.
//!
//! A checkpoint is a safetensors weight file plus a JSON metadata sidecar
//! carrying the information needed to rebuild and resume the model: the
//! architecture config, the class vocabulary, and training counters.

use candle_nn::VarMap;
use plexus_core::{GcnConfig, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Metadata persisted next to the weight file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckpointMeta {
    /// Epochs completed when the checkpoint was written
    pub epochs_trained: usize,
    /// Class names in encoder order
    pub classes: Vec<String>,
    /// Architecture/optimizer settings the weights belong to
    pub gcn: GcnConfig,
    /// Best validation accuracy seen (retraining phase only)
    pub best_val_acc: Option<f32>,
}

/// Writes `<dir>/<stem>.safetensors` and `<dir>/<stem>.json`.
pub fn save(
    varmap: &VarMap,
    meta: &CheckpointMeta,
    dir: &Path,
    stem: &str,
) -> Result<(PathBuf, PathBuf)> {
    fs::create_dir_all(dir)?;
    let weights_path = dir.join(format!("{stem}.safetensors"));
    varmap.save(&weights_path)?;
    let meta_path = dir.join(format!("{stem}.json"));
    fs::write(&meta_path, serde_json::to_string_pretty(meta)?)?;
    log::info!("saved checkpoint '{stem}' to {}", dir.display());
    Ok((weights_path, meta_path))
}

/// Loads weights into an existing (shape-compatible) varmap and returns the
/// sidecar metadata.
pub fn load(varmap: &mut VarMap, dir: &Path, stem: &str) -> Result<CheckpointMeta> {
    let weights_path = dir.join(format!("{stem}.safetensors"));
    varmap.load(&weights_path)?;
    let meta_path = dir.join(format!("{stem}.json"));
    let meta: CheckpointMeta = serde_json::from_str(&fs::read_to_string(meta_path)?)?;
    Ok(meta)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::FullBatchGenerator;
    use crate::model::build;
    use candle_core::Device;
    use plexus_core::SplitConfig;
    use plexus_data::{split, PageDataset};

    #[test]
    fn test_checkpoint_round_trip_preserves_predictions() {
        // A frozen model reloaded from disk must predict identically on a
        // fixed batch.
        let dataset = PageDataset::synthetic(2, 10, 4, 0.6, 0.1, 21).unwrap();
        let config = SplitConfig {
            train_size: 10,
            val_size: 5,
        };
        let s = split::split(&dataset.targets, &config, 21).unwrap();
        let generator = FullBatchGenerator::new(&dataset.graph, &Device::Cpu).unwrap();
        let seq = generator.flow(&dataset.graph, &s.train).unwrap();

        let gcn = plexus_core::GcnConfig::default();
        let built = build(generator.feature_dim(), 2, &gcn, &Device::Cpu).unwrap();
        let before: Vec<f32> = built
            .model
            .predict_proba(&seq)
            .unwrap()
            .flatten_all()
            .unwrap()
            .to_vec1()
            .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let meta = CheckpointMeta {
            epochs_trained: 0,
            classes: s.encoder.classes().to_vec(),
            gcn: gcn.clone(),
            best_val_acc: None,
        };
        let (weights, sidecar) = save(&built.varmap, &meta, dir.path(), "frozen").unwrap();
        assert!(weights.exists());
        assert!(sidecar.exists());

        let mut reloaded = build(generator.feature_dim(), 2, &gcn, &Device::Cpu).unwrap();
        let restored_meta = load(&mut reloaded.varmap, dir.path(), "frozen").unwrap();
        assert_eq!(restored_meta.classes, meta.classes);

        let after: Vec<f32> = reloaded
            .model
            .predict_proba(&seq)
            .unwrap()
            .flatten_all()
            .unwrap()
            .to_vec1()
            .unwrap();
        assert_eq!(before.len(), after.len());
        for (b, a) in before.iter().zip(after.iter()) {
            assert!((b - a).abs() < 1e-6);
        }
    }
}
