//! Sampling statistics and per-sub-trial kinematic features.

pub mod features;
pub mod sampling;

pub use features::feature_vector;
pub use sampling::{SamplingConfig, SamplingStats};
