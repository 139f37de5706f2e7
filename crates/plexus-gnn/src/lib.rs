//! # plexus-gnn
//!
//! The trainable model half of the plexus pipeline: graph convolution
//! layers, the GCN node classifier, the full-batch data generator with
//! internal adjacency normalization, and checkpoint persistence.
//!
//! Built on candle; the classifier follows
//! `H' = act(Â H W)` per layer with a dense softmax head, and the
//! optimizer is Adam (AdamW with zero weight decay) at the configured
//! learning rate.

pub mod checkpoint;
pub mod conv;
pub mod generator;
pub mod model;

pub use checkpoint::CheckpointMeta;
pub use conv::GcnConv;
pub use generator::{FullBatchGenerator, FullBatchSequence};
pub use model::{build, BuiltModel, GcnClassifier};
