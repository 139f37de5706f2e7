//! The data/model collaborator interface.
//!
//! The orchestrator needs exactly five things from its collaborator: a
//! pretraining generator, an initial model, a fresh data grouping for the
//! retrain phase, a retrain-ready model for that grouping, and the
//! grouping's train/test/val generators — returned together as one value,
//! never fished out of side-channel attributes.

use candle_core::Device;
use plexus_core::{GcnConfig, PipelineConfig, Result};
use plexus_data::{split, PageDataset, Split};
use plexus_gnn::{build, BuiltModel, FullBatchGenerator, FullBatchSequence};

/// A data grouping for the retrain phase: a fresh split of the target
/// table, carrying its own shared label encoder.
pub struct DataGroup {
    pub split: Split,
}

/// The three generators for one data grouping.
pub struct GeneratorSet {
    pub train: FullBatchSequence,
    pub test: FullBatchSequence,
    pub val: FullBatchSequence,
}

/// Everything the training orchestrator requires from its collaborator.
pub trait ModelProvider {
    /// Generator for the pretraining fit.
    fn train_generator(&self) -> Result<FullBatchSequence>;

    /// Freshly compiled model for the pretraining fit.
    fn initial_model(&self) -> Result<BuiltModel>;

    /// A fresh data grouping for the retrain phase.
    fn data_group(&self) -> Result<DataGroup>;

    /// Freshly compiled model for retraining on `group`.
    fn retrain_model(&self, group: &DataGroup) -> Result<BuiltModel>;

    /// Train/test/val generators for `group`.
    fn generators(&self, group: &DataGroup) -> Result<GeneratorSet>;

    /// Class names, in encoder order, for checkpoint metadata.
    fn classes(&self) -> &[String];

    /// Architecture config the models were compiled with.
    fn gcn_config(&self) -> &GcnConfig;
}

/// Default collaborator: wires a [`PageDataset`] through the splitter, the
/// full-batch generator, and the model builder.
pub struct GcnProvider {
    dataset: PageDataset,
    config: PipelineConfig,
    device: Device,
    generator: FullBatchGenerator,
    split: Split,
}

impl GcnProvider {
    pub fn new(dataset: PageDataset, config: PipelineConfig, device: Device) -> Result<Self> {
        config.validate()?;
        let split = split::split(&dataset.targets, &config.split, config.seed)?;
        let generator = FullBatchGenerator::new(&dataset.graph, &device)?;
        Ok(Self {
            dataset,
            config,
            device,
            generator,
            split,
        })
    }

    pub fn num_classes(&self) -> usize {
        self.split.encoder.num_classes()
    }
}

impl ModelProvider for GcnProvider {
    fn train_generator(&self) -> Result<FullBatchSequence> {
        self.generator.flow(&self.dataset.graph, &self.split.train)
    }

    fn initial_model(&self) -> Result<BuiltModel> {
        build(
            self.generator.feature_dim(),
            self.num_classes(),
            &self.config.gcn,
            &self.device,
        )
    }

    fn data_group(&self) -> Result<DataGroup> {
        // Resample with a derived seed so the retrain phase sees a fresh
        // grouping, reproducibly.
        let split = split::split(
            &self.dataset.targets,
            &self.config.split,
            self.config.seed.wrapping_add(1),
        )?;
        Ok(DataGroup { split })
    }

    fn retrain_model(&self, group: &DataGroup) -> Result<BuiltModel> {
        build(
            self.generator.feature_dim(),
            group.split.encoder.num_classes(),
            &self.config.gcn,
            &self.device,
        )
    }

    fn generators(&self, group: &DataGroup) -> Result<GeneratorSet> {
        Ok(GeneratorSet {
            train: self.generator.flow(&self.dataset.graph, &group.split.train)?,
            test: self.generator.flow(&self.dataset.graph, &group.split.test)?,
            val: self.generator.flow(&self.dataset.graph, &group.split.val)?,
        })
    }

    fn classes(&self) -> &[String] {
        self.split.encoder.classes()
    }

    fn gcn_config(&self) -> &GcnConfig {
        &self.config.gcn
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plexus_core::{SplitConfig, TrainConfig};

    fn small_config() -> PipelineConfig {
        PipelineConfig {
            split: SplitConfig {
                train_size: 20,
                val_size: 10,
            },
            train: TrainConfig {
                pretrain_epochs: 2,
                retrain_epochs: 2,
                patience: 1,
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_provider_wires_dataset() {
        let dataset = PageDataset::synthetic(3, 15, 6, 0.5, 0.05, 13).unwrap();
        let provider = GcnProvider::new(dataset, small_config(), Device::Cpu).unwrap();

        assert_eq!(provider.num_classes(), 3);
        assert_eq!(provider.classes().len(), 3);

        let seq = provider.train_generator().unwrap();
        assert_eq!(seq.len(), 20);

        let group = provider.data_group().unwrap();
        let gens = provider.generators(&group).unwrap();
        assert_eq!(gens.train.len(), 20);
        assert_eq!(gens.val.len(), 10);
        assert_eq!(gens.test.len(), 45 - 30);
    }

    #[test]
    fn test_data_group_is_a_fresh_grouping() {
        let dataset = PageDataset::synthetic(3, 20, 6, 0.5, 0.05, 13).unwrap();
        let provider = GcnProvider::new(dataset, small_config(), Device::Cpu).unwrap();

        let group = provider.data_group().unwrap();
        assert_eq!(group.split.train.len(), 20);

        // The grouping is reproducible across calls but resampled relative
        // to the pretraining split.
        let again = provider.data_group().unwrap();
        assert_eq!(group.split.train.ids, again.split.train.ids);

        let pretrain_ilocs: Vec<u32> = provider
            .train_generator()
            .unwrap()
            .indices
            .flatten_all()
            .unwrap()
            .to_vec1()
            .unwrap();
        let group_ilocs: Vec<u32> = provider
            .generators(&group)
            .unwrap()
            .train
            .indices
            .flatten_all()
            .unwrap()
            .to_vec1()
            .unwrap();
        assert_ne!(pretrain_ilocs, group_ilocs);
    }
}
