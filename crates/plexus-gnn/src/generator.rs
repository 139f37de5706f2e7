//! Full-batch data generation.
//!
//! The generator holds the whole graph as tensors — the feature matrix and
//! the normalized adjacency operator — and produces self-contained
//! [`FullBatchSequence`]s for any subset of labeled nodes. Normalization
//! happens here, inside the generator, so callers never hand the model a
//! raw adjacency.

use candle_core::{Device, Tensor};
use ndarray::Array2;
use plexus_core::Result;
use plexus_data::adjacency;
use plexus_data::resolver;
use plexus_data::{PageGraph, Subset};

/// One full-batch "sequence": everything a fit or evaluate step needs.
///
/// The feature and adjacency tensors are shared (cheap clones of the
/// generator's storage); `indices` selects the labeled nodes, in the order
/// the subset listed them.
#[derive(Clone)]
pub struct FullBatchSequence {
    /// Node features `(N, F)` for the whole graph
    pub features: Tensor,
    /// Normalized adjacency `(N, N)` with self-loops
    pub adj: Tensor,
    /// Selected node positions, shape `(1, n)`
    pub indices: Tensor,
    /// One-hot targets `(n, C)` for the selected nodes
    pub targets: Tensor,
    /// Class indices `(n,)` for the selected nodes
    pub classes: Tensor,
}

impl FullBatchSequence {
    /// Number of selected nodes.
    pub fn len(&self) -> usize {
        self.indices.elem_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Whole-graph tensor store with internal adjacency normalization.
pub struct FullBatchGenerator {
    features: Tensor,
    adj: Tensor,
    feature_dim: usize,
    device: Device,
}

impl FullBatchGenerator {
    pub fn new(graph: &PageGraph, device: &Device) -> Result<Self> {
        let n = graph.node_count();
        let features = array_to_tensor(graph.features(), device)?;
        let norm = adjacency::normalize(graph);
        let adj = array_to_tensor(&norm, device)?;
        log::debug!("full-batch generator ready: {n} nodes, {} feature dims", graph.feature_dim());
        Ok(Self {
            features,
            adj,
            feature_dim: graph.feature_dim(),
            device: device.clone(),
        })
    }

    /// Feature dimension the model's first layer must accept.
    pub fn feature_dim(&self) -> usize {
        self.feature_dim
    }

    /// The normalized adjacency operator held by this generator.
    pub fn adjacency(&self) -> &Tensor {
        &self.adj
    }

    /// Builds a sequence for a split subset: resolves the subset's ids to
    /// positional indices (order-preserving) and attaches its targets.
    pub fn flow(&self, graph: &PageGraph, subset: &Subset) -> Result<FullBatchSequence> {
        let indices = resolver::node_indices(graph, &subset.ids, &self.device)?;
        let targets = array_to_tensor(&subset.targets, &self.device)?;
        let classes = class_indices(&subset.targets, &self.device)?;
        Ok(FullBatchSequence {
            features: self.features.clone(),
            adj: self.adj.clone(),
            indices,
            targets,
            classes,
        })
    }
}

fn array_to_tensor(array: &Array2<f32>, device: &Device) -> Result<Tensor> {
    let (rows, cols) = array.dim();
    let values: Vec<f32> = array.iter().copied().collect();
    Ok(Tensor::from_vec(values, (rows, cols), device)?)
}

/// Row-wise argmax of a one-hot matrix as a `u32` class tensor.
fn class_indices(onehot: &Array2<f32>, device: &Device) -> Result<Tensor> {
    let mut classes = Vec::with_capacity(onehot.nrows());
    for row in onehot.rows() {
        let mut best = 0usize;
        let mut best_value = f32::NEG_INFINITY;
        for (j, &v) in row.iter().enumerate() {
            if v > best_value {
                best_value = v;
                best = j;
            }
        }
        classes.push(best as u32);
    }
    let n = classes.len();
    Ok(Tensor::from_vec(classes, (n,), device)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use plexus_core::SplitConfig;
    use plexus_data::{split, PageDataset};

    #[test]
    fn test_generator_matches_reference_normalization() {
        let dataset = PageDataset::synthetic(2, 8, 4, 0.6, 0.1, 3).unwrap();
        let generator = FullBatchGenerator::new(&dataset.graph, &Device::Cpu).unwrap();

        let reference = adjacency::normalize(&dataset.graph);
        let n = dataset.graph.node_count();
        let internal: Vec<f32> = generator
            .adjacency()
            .flatten_all()
            .unwrap()
            .to_vec1()
            .unwrap();
        for i in 0..n {
            for j in 0..n {
                assert!((internal[i * n + j] - reference[[i, j]]).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn test_flow_carries_subset_in_order() {
        let dataset = PageDataset::synthetic(3, 20, 6, 0.5, 0.05, 5).unwrap();
        let config = SplitConfig {
            train_size: 20,
            val_size: 20,
        };
        let s = split::split(&dataset.targets, &config, 11).unwrap();
        let generator = FullBatchGenerator::new(&dataset.graph, &Device::Cpu).unwrap();
        let seq = generator.flow(&dataset.graph, &s.train).unwrap();

        assert_eq!(seq.len(), 20);
        assert_eq!(seq.indices.dims(), &[1, 20]);
        assert_eq!(seq.targets.dims(), &[20, 3]);

        let ilocs: Vec<u32> = seq.indices.flatten_all().unwrap().to_vec1().unwrap();
        let classes: Vec<u32> = seq.classes.to_vec1().unwrap();
        for (slot, id) in s.train.ids.iter().enumerate() {
            assert_eq!(ilocs[slot] as usize, dataset.graph.iloc(id).unwrap());
            let label = dataset.targets.label_of(id).unwrap();
            let expected = s.encoder.class_index(label).unwrap() as u32;
            assert_eq!(classes[slot], expected);
        }
    }
}
