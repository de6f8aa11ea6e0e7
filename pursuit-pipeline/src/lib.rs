pub mod config;
pub mod outcome;
pub mod runner;
pub mod summary;

pub use config::{ConfigError, PathsConfig, PipelineConfig, SegmentationConfig};
pub use outcome::TrialOutcome;
pub use runner::{Pipeline, PipelineError, PipelineRun, load_trajectories};
pub use summary::{FileRejection, RunSummary};
