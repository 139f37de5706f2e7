//! GCN node classifier and model building.
//!
//! The classifier is a stack of graph convolutions followed by a dense
//! classification head; `build` compiles it together with its parameter
//! store and Adam optimizer (AdamW with zero weight decay).

use crate::conv::GcnConv;
use crate::generator::FullBatchSequence;
use candle_core::{DType, Device, Tensor, D};
use candle_nn::{linear, loss, ops, AdamW, Linear, Module, Optimizer, ParamsAdamW, VarBuilder, VarMap};
use plexus_core::{GcnConfig, Result};

/// Two-layer (by default) GCN with a dense softmax head.
///
/// Dropout is applied before each convolution during training only; the
/// head produces logits and softmax is deferred to prediction/loss.
pub struct GcnClassifier {
    convs: Vec<GcnConv>,
    head: Linear,
    dropout: f32,
}

impl GcnClassifier {
    pub fn new(
        vb: VarBuilder,
        in_features: usize,
        num_classes: usize,
        config: &GcnConfig,
    ) -> Result<Self> {
        let mut convs = Vec::with_capacity(config.layer_sizes.len());
        let mut width = in_features;
        for (i, (&size, &activation)) in config
            .layer_sizes
            .iter()
            .zip(config.activations.iter())
            .enumerate()
        {
            convs.push(GcnConv::new(
                width,
                size,
                activation,
                vb.pp(format!("conv{i}")),
            )?);
            width = size;
        }
        let head = linear(width, num_classes, vb.pp("head"))?;
        Ok(Self {
            convs,
            head,
            dropout: config.dropout,
        })
    }

    /// Logits for every node in the graph, `(N, C)`.
    pub fn forward(&self, features: &Tensor, adj: &Tensor, train: bool) -> Result<Tensor> {
        let mut x = features.clone();
        for conv in &self.convs {
            if train && self.dropout > 0.0 {
                x = ops::dropout(&x, self.dropout)?;
            }
            x = conv.forward(&x, adj)?;
        }
        Ok(self.head.forward(&x)?)
    }

    /// Logits restricted to a sequence's selected nodes, `(n, C)`.
    pub fn logits(&self, seq: &FullBatchSequence, train: bool) -> Result<Tensor> {
        let all = self.forward(&seq.features, &seq.adj, train)?;
        let selector = seq.indices.flatten_all()?;
        Ok(all.index_select(&selector, 0)?)
    }

    /// Categorical cross-entropy over a sequence, with dropout active.
    pub fn training_loss(&self, seq: &FullBatchSequence) -> Result<Tensor> {
        let logits = self.logits(seq, true)?;
        Ok(loss::cross_entropy(&logits, &seq.classes)?)
    }

    /// `(loss, accuracy)` over a sequence with dropout disabled.
    pub fn evaluate(&self, seq: &FullBatchSequence) -> Result<(f32, f32)> {
        let logits = self.logits(seq, false)?;
        let loss = loss::cross_entropy(&logits, &seq.classes)?.to_scalar::<f32>()?;
        let correct = logits
            .argmax(D::Minus1)?
            .eq(&seq.classes)?
            .to_dtype(DType::F32)?;
        let accuracy = correct.mean_all()?.to_scalar::<f32>()?;
        Ok((loss, accuracy))
    }

    /// Per-class probabilities for a sequence's nodes, `(n, C)`.
    pub fn predict_proba(&self, seq: &FullBatchSequence) -> Result<Tensor> {
        let logits = self.logits(seq, false)?;
        Ok(ops::softmax(&logits, D::Minus1)?)
    }
}

/// A compiled model: the classifier, its parameter store, and optimizer.
pub struct BuiltModel {
    pub model: GcnClassifier,
    pub varmap: VarMap,
    pub optimizer: AdamW,
}

/// Constructs and compiles a classifier for `num_classes` outputs on top of
/// the generator's feature width. No fitting happens here.
pub fn build(
    feature_dim: usize,
    num_classes: usize,
    config: &GcnConfig,
    device: &Device,
) -> Result<BuiltModel> {
    let varmap = VarMap::new();
    let vb = VarBuilder::from_varmap(&varmap, DType::F32, device);
    let model = GcnClassifier::new(vb, feature_dim, num_classes, config)?;
    let optimizer = AdamW::new(
        varmap.all_vars(),
        ParamsAdamW {
            lr: config.learning_rate,
            weight_decay: 0.0,
            ..Default::default()
        },
    )?;
    log::debug!(
        "built GCN: {} -> {:?} -> {num_classes}",
        feature_dim,
        config.layer_sizes
    );
    Ok(BuiltModel {
        model,
        varmap,
        optimizer,
    })
}
