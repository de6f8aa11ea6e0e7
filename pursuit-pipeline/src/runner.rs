use crate::config::{ConfigError, PipelineConfig};
use crate::outcome::TrialOutcome;
use crate::summary::RunSummary;
use pursuit_core::VertexTable;
use pursuit_dataset::{DatasetError, JoinError, JoinOutput, join, save_master};
use pursuit_ingest::{
    IngestError, LoadedTrajectory, discover_trajectories, load_evaluations, load_trajectory,
};
use pursuit_kinematics::{SamplingConfig, SamplingStats};
use pursuit_segment::Segmenter;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error("join halted: {0}")]
    Join(#[from] JoinError),

    #[error(transparent)]
    Dataset(#[from] DatasetError),

    #[error("cannot start worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("cannot write summary {}: {source}", .path.display())]
    Summary {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result of a full run.
#[derive(Debug)]
pub struct PipelineRun {
    pub join: JoinOutput,
    pub summary: RunSummary,
}

fn worker_pool(threads: usize) -> Result<rayon::ThreadPool, rayon::ThreadPoolBuildError> {
    let mut builder = rayon::ThreadPoolBuilder::new().thread_name(|i| format!("pursuit-{i}"));
    if threads > 0 {
        builder = builder.num_threads(threads);
    }
    builder.build()
}

/// Loads every file on a worker pool, keeping input order.
pub fn load_trajectories(
    paths: &[PathBuf],
    threads: usize,
) -> Result<Vec<(PathBuf, Result<LoadedTrajectory, IngestError>)>, PipelineError> {
    let pool = worker_pool(threads)?;
    Ok(pool.install(|| {
        paths
            .par_iter()
            .map(|path| (path.clone(), load_trajectory(path)))
            .collect()
    }))
}

/// Load, segment and join, driven by one validated config.
#[derive(Debug)]
pub struct Pipeline {
    config: PipelineConfig,
    vertices: VertexTable,
}

impl Pipeline {
    /// Fails before touching any data file if the config is unusable.
    pub fn new(config: PipelineConfig) -> Result<Self, PipelineError> {
        config.validate()?;
        let vertices = config.vertex_table()?;
        Ok(Self { config, vertices })
    }

    pub fn segmenter(&self) -> Segmenter<'_> {
        Segmenter::new(&self.vertices)
    }

    /// Loads and segments one file. Never fails: every failure is an outcome.
    pub fn process_trial(&self, path: &Path) -> TrialOutcome {
        process_trial(path, &self.segmenter(), &self.config.sampling)
    }

    /// Runs [`Self::process_trial`] for every path on the worker pool.
    pub fn process_trials(&self, paths: &[PathBuf]) -> Result<Vec<TrialOutcome>, PipelineError> {
        let pool = worker_pool(self.config.workers.threads)?;
        let segmenter = self.segmenter();
        let sampling = &self.config.sampling;
        Ok(pool.install(|| {
            paths
                .par_iter()
                .map(|path| process_trial(path, &segmenter, sampling))
                .collect()
        }))
    }

    /// Full run: discover, load and segment in parallel, join, write.
    pub fn run(&self) -> Result<PipelineRun, PipelineError> {
        let paths = &self.config.paths;
        let files = discover_trajectories(&paths.trajectories_dir)?;
        info!(
            dir = %paths.trajectories_dir.display(),
            files = files.len(),
            "processing trajectories"
        );

        let outcomes = self.process_trials(&files)?;
        let mut summary = RunSummary::from_outcomes(&outcomes);

        let evaluations = load_evaluations(&paths.evaluations)?;
        let features = self.config.features.enabled.then_some(&self.config.sampling);
        let joined = join(
            outcomes.iter().flat_map(TrialOutcome::subtrials),
            evaluations,
            features,
        )?;
        summary.record_join(&joined);

        save_master(&paths.output, &joined.records)?;
        if let Some(summary_path) = &paths.summary {
            write_summary(summary_path, &summary)?;
        }

        info!(
            records = summary.records,
            rejected = summary.files_rejected,
            excluded = summary.trials_excluded,
            unmatched = summary.unmatched,
            orphans = summary.orphans,
            "run complete"
        );
        Ok(PipelineRun {
            join: joined,
            summary,
        })
    }
}

fn write_summary(path: &Path, summary: &RunSummary) -> Result<(), PipelineError> {
    let json = serde_json::to_string_pretty(summary)?;
    let io_err = |source| PipelineError::Summary {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
    }
    std::fs::write(path, json).map_err(io_err)
}

fn process_trial(path: &Path, segmenter: &Segmenter<'_>, sampling: &SamplingConfig) -> TrialOutcome {
    let path_buf = path.to_path_buf();
    let LoadedTrajectory { trial, warnings } = match load_trajectory(path) {
        Ok(loaded) => loaded,
        Err(error) => {
            warn!(%error, "trajectory rejected");
            return TrialOutcome::Rejected {
                path: path_buf,
                error,
            };
        }
    };
    let stats = SamplingStats::from_samples(trial.samples(), sampling);

    match segmenter.segment(&trial) {
        Ok(segmentation) => {
            let mut warnings = warnings;
            warnings.extend(segmentation.warnings());
            TrialOutcome::Segmented {
                path: path_buf,
                trial,
                segmentation,
                stats,
                warnings,
            }
        }
        Err(error) => TrialOutcome::Excluded {
            path: path_buf,
            key: trial.key(),
            stats,
            error,
            warnings,
        },
    }
}
