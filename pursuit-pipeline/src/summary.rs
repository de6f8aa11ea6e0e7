use crate::outcome::TrialOutcome;
use pursuit_core::Warning;
use pursuit_dataset::JoinOutput;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileRejection {
    pub file: String,
    pub rows_rejected: usize,
    pub reason: String,
}

/// Counts reported alongside the output dataset.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunSummary {
    pub files_discovered: usize,
    pub files_loaded: usize,
    pub files_rejected: usize,
    pub rows_rejected: usize,
    pub trials_excluded: usize,
    pub subtrials: usize,
    pub records: usize,
    pub unmatched: usize,
    pub orphans: usize,
    pub empty_trials: usize,
    pub empty_subtrials: usize,
    pub sampling_gaps: usize,
    pub rejected_files: Vec<FileRejection>,
    pub excluded_trials: Vec<String>,
    pub warnings: Vec<Warning>,
}

impl RunSummary {
    /// Tallies per-file outcomes. Join counts are added by [`Self::record_join`].
    pub fn from_outcomes(outcomes: &[TrialOutcome]) -> Self {
        let mut summary = Self {
            files_discovered: outcomes.len(),
            ..Self::default()
        };
        for outcome in outcomes {
            summary.warnings.extend_from_slice(outcome.warnings());
            match outcome {
                TrialOutcome::Segmented {
                    segmentation,
                    stats,
                    ..
                } => {
                    summary.files_loaded += 1;
                    summary.subtrials += segmentation.ranges().len();
                    summary.sampling_gaps += stats.gaps;
                }
                TrialOutcome::Excluded {
                    key, stats, error, ..
                } => {
                    summary.files_loaded += 1;
                    summary.trials_excluded += 1;
                    summary.sampling_gaps += stats.gaps;
                    summary.excluded_trials.push(format!("{key}: {error}"));
                }
                TrialOutcome::Rejected { path, error } => {
                    summary.files_rejected += 1;
                    summary.rows_rejected += error.rejected_rows();
                    summary.rejected_files.push(FileRejection {
                        file: path.display().to_string(),
                        rows_rejected: error.rejected_rows(),
                        reason: error.to_string(),
                    });
                }
            }
        }
        summary.recount_warnings();
        summary
    }

    pub fn record_join(&mut self, output: &JoinOutput) {
        self.records = output.records.len();
        self.warnings.extend_from_slice(&output.warnings);
        self.recount_warnings();
    }

    fn recount_warnings(&mut self) {
        let mut counts = [0usize; 4];
        for warning in &self.warnings {
            let slot = match warning {
                Warning::EmptyTrial(_) => 0,
                Warning::EmptySubtrial(_) => 1,
                Warning::UnmatchedSubtrial(_) => 2,
                Warning::OrphanEvaluation(_) => 3,
            };
            counts[slot] += 1;
        }
        [
            self.empty_trials,
            self.empty_subtrials,
            self.unmatched,
            self.orphans,
        ] = counts;
    }

    pub fn has_rejections(&self) -> bool {
        self.files_rejected > 0
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Run summary:")?;
        writeln!(
            f,
            "  Files: {} discovered, {} loaded, {} rejected ({} rows)",
            self.files_discovered, self.files_loaded, self.files_rejected, self.rows_rejected
        )?;
        writeln!(
            f,
            "  Trials excluded: {}, empty trials: {}",
            self.trials_excluded, self.empty_trials
        )?;
        writeln!(
            f,
            "  Sub-trials: {} ({} empty), master records: {}",
            self.subtrials, self.empty_subtrials, self.records
        )?;
        writeln!(
            f,
            "  Unmatched sub-trials: {}, orphan evaluations: {}",
            self.unmatched, self.orphans
        )?;
        write!(f, "  Sampling gaps: {}", self.sampling_gaps)?;
        for rejection in &self.rejected_files {
            write!(f, "\n  rejected {}", rejection.reason)?;
        }
        for excluded in &self.excluded_trials {
            write!(f, "\n  excluded {excluded}")?;
        }
        Ok(())
    }
}
