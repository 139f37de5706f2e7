//! # plexus-core
//!
//! Core configuration and errors for the plexus GCN training pipeline.
//!
//! This crate defines the abstractions shared across all plexus components:
//! - **Config**: the validated, immutable pipeline configuration
//! - **Errors**: unified error handling with `PlexusError`
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐
//! │ plexus-core  │  ← config/errors
//! └──────────────┘
//!        ▲
//!   ┌────┴─────┬─────────────┐
//! ┌─▼────────┐ ┌─▼──────────┐│
//! │plexus-data│ │ plexus-gnn │▼
//! └───────────┘ └────────────┘
//!        ▲             ▲   ┌──────────────┐
//!        └──────┬──────┘   │plexus-report │
//!               │          └──────▲───────┘
//!       ┌───────▼──────┐         │
//!       │ plexus-train │─────────┘
//!       └──────────────┘
//! ```

pub mod config;
pub mod errors;

pub use config::{
    artifacts, Activation, GcnConfig, PipelineConfig, SplitConfig, TrainConfig,
};
pub use errors::{PlexusError, Result};

/// Crate version (from Cargo.toml)
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
