//! Graph convolution layer.
//!
//! Implements the Kipf & Welling propagation rule
//! `H' = act(Â · H · W)` where `Â` is the symmetrically normalized
//! adjacency with self-loops supplied by the caller.

use candle_core::Tensor;
use candle_nn::{linear, Linear, Module, VarBuilder};
use plexus_core::{Activation, Result};

/// A single graph convolution: linear transform, neighborhood aggregation,
/// then the configured activation.
pub struct GcnConv {
    linear: Linear,
    activation: Activation,
}

impl GcnConv {
    pub fn new(
        in_features: usize,
        out_features: usize,
        activation: Activation,
        vb: VarBuilder,
    ) -> Result<Self> {
        let linear = linear(in_features, out_features, vb)?;
        Ok(Self { linear, activation })
    }

    /// Forward pass.
    ///
    /// `x` is `(N, in_features)`, `adj` the normalized `(N, N)` operator
    /// with self-loops; returns `(N, out_features)`.
    pub fn forward(&self, x: &Tensor, adj: &Tensor) -> Result<Tensor> {
        let h = self.linear.forward(x)?;
        let h = adj.matmul(&h)?;
        let out = match self.activation {
            Activation::Relu => h.relu()?,
            Activation::Tanh => h.tanh()?,
            Activation::Identity => h,
        };
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use candle_core::{DType, Device};
    use candle_nn::VarMap;

    #[test]
    fn test_forward_shape() {
        let device = Device::Cpu;
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);
        let conv = GcnConv::new(4, 8, Activation::Relu, vb).unwrap();

        let x = Tensor::zeros((5, 4), DType::F32, &device).unwrap();
        let adj = Tensor::eye(5, DType::F32, &device).unwrap();
        let out = conv.forward(&x, &adj).unwrap();
        assert_eq!(out.dims(), &[5, 8]);
    }

    #[test]
    fn test_relu_clamps_negative() {
        let device = Device::Cpu;
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);
        let conv = GcnConv::new(2, 3, Activation::Relu, vb).unwrap();

        let x = Tensor::from_vec(vec![-1.0f32, -2.0, 3.0, 4.0], (2, 2), &device).unwrap();
        let adj = Tensor::eye(2, DType::F32, &device).unwrap();
        let out = conv.forward(&x, &adj).unwrap();
        let values: Vec<f32> = out.flatten_all().unwrap().to_vec1().unwrap();
        assert!(values.iter().all(|v| *v >= 0.0));
    }
}
