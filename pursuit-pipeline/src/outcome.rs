use pursuit_core::{Subtrial, Trial, TrialKey, Warning};
use pursuit_ingest::IngestError;
use pursuit_kinematics::SamplingStats;
use pursuit_segment::{SegmentError, Segmentation};
use std::path::PathBuf;

/// What happened to one raw trajectory file.
#[derive(Debug)]
pub enum TrialOutcome {
    /// Loaded and split; its sub-trials go on to the join.
    Segmented {
        path: PathBuf,
        trial: Trial,
        segmentation: Segmentation,
        stats: SamplingStats,
        warnings: Vec<Warning>,
    },
    /// Loaded but too short to split. Left out of the join.
    Excluded {
        path: PathBuf,
        key: TrialKey,
        stats: SamplingStats,
        error: SegmentError,
        warnings: Vec<Warning>,
    },
    /// Failed validation.
    Rejected { path: PathBuf, error: IngestError },
}

impl TrialOutcome {
    pub fn subtrials(&self) -> Vec<Subtrial<'_>> {
        match self {
            TrialOutcome::Segmented {
                trial,
                segmentation,
                ..
            } => segmentation.subtrials(trial),
            _ => Vec::new(),
        }
    }

    pub fn warnings(&self) -> &[Warning] {
        match self {
            TrialOutcome::Segmented { warnings, .. } | TrialOutcome::Excluded { warnings, .. } => {
                warnings
            }
            TrialOutcome::Rejected { .. } => &[],
        }
    }
}
