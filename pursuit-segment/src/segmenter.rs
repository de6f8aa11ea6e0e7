use crate::proximity::VertexProximity;
use pursuit_core::constants::SUBTRIALS_PER_TRIAL;
use pursuit_core::{BoundaryPolicy, Subtrial, Trial, TrialKey, VertexTable, Warning};
use std::ops::Range;
use tracing::{debug, warn};

/// Fewest samples a trial needs to be split.
pub const MIN_SAMPLES: usize = SUBTRIALS_PER_TRIAL;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SegmentError {
    #[error("trial {key} has {samples} samples, segmentation needs at least {required}")]
    InsufficientData {
        key: TrialKey,
        samples: usize,
        required: usize,
    },
}

/// Start indices of the five sub-trials of one trial.
///
/// Sub-trial `k` (1-based) covers `starts[k-1]..starts[k]`; the last one
/// runs to the end of the trial. `starts[0]` is always 0 and the starts
/// never decrease, so the ranges partition the trial.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segmentation {
    key: TrialKey,
    starts: [usize; SUBTRIALS_PER_TRIAL],
    len: usize,
}

impl Segmentation {
    pub fn key(&self) -> TrialKey {
        self.key
    }

    pub fn starts(&self) -> &[usize; SUBTRIALS_PER_TRIAL] {
        &self.starts
    }

    /// The four interior boundaries, in order.
    pub fn boundaries(&self) -> &[usize] {
        &self.starts[1..]
    }

    pub fn ranges(&self) -> [Range<usize>; SUBTRIALS_PER_TRIAL] {
        std::array::from_fn(|k| {
            let end = self.starts.get(k + 1).copied().unwrap_or(self.len);
            self.starts[k]..end
        })
    }

    /// Borrowed sub-trial views, ordered by sub-trial index.
    ///
    /// `trial` must be the trial this segmentation was computed from.
    pub fn subtrials<'t>(&self, trial: &'t Trial) -> Vec<Subtrial<'t>> {
        debug_assert_eq!(trial.key(), self.key);
        debug_assert_eq!(trial.len(), self.len);
        self.ranges()
            .into_iter()
            .zip(1u32..)
            .filter_map(|(range, k)| trial.subtrial(k, range))
            .collect()
    }

    /// One [`Warning::EmptySubtrial`] per collapsed range.
    pub fn warnings(&self) -> Vec<Warning> {
        self.ranges()
            .iter()
            .zip(1u32..)
            .filter(|(r, _)| r.is_empty())
            .filter_map(|(_, k)| self.key.subtrial(k).ok())
            .map(Warning::EmptySubtrial)
            .collect()
    }
}

/// Applies a [`BoundaryPolicy`] against a shared vertex table.
#[derive(Debug, Clone)]
pub struct Segmenter<'v, P: BoundaryPolicy = VertexProximity> {
    vertices: &'v VertexTable,
    policy: P,
}

impl<'v> Segmenter<'v, VertexProximity> {
    pub fn new(vertices: &'v VertexTable) -> Self {
        Self::with_policy(vertices, VertexProximity)
    }
}

impl<'v, P: BoundaryPolicy> Segmenter<'v, P> {
    pub fn with_policy(vertices: &'v VertexTable, policy: P) -> Self {
        Self { vertices, policy }
    }

    pub fn segment(&self, trial: &Trial) -> Result<Segmentation, SegmentError> {
        let samples = trial.samples();
        if samples.len() < MIN_SAMPLES {
            warn!(trial = %trial.key(), samples = samples.len(), "too few samples to segment");
            return Err(SegmentError::InsufficientData {
                key: trial.key(),
                samples: samples.len(),
                required: MIN_SAMPLES,
            });
        }

        let mut starts = [0usize; SUBTRIALS_PER_TRIAL];
        for (k, vertex) in self.vertices.boundary_vertices().iter().enumerate() {
            let from = starts[k];
            // window is non-empty: from <= previous boundary < len
            let boundary = self
                .policy
                .locate(samples, from, *vertex)
                .map_or(from, |i| i.max(from));
            starts[k + 1] = boundary;
        }

        let segmentation = Segmentation {
            key: trial.key(),
            starts,
            len: samples.len(),
        };
        debug!(
            trial = %trial.key(),
            policy = self.policy.name(),
            boundaries = ?segmentation.boundaries(),
            "trial segmented"
        );
        Ok(segmentation)
    }
}
