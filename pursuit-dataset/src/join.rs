use crate::error::JoinError;
use pursuit_core::{Evaluation, MasterRecord, Subtrial, SubtrialId, Warning};
use pursuit_kinematics::{SamplingConfig, feature_vector};
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct JoinOutput {
    /// Ordered by participant, trial, sub-trial.
    pub records: Vec<MasterRecord>,
    /// Unmatched sub-trials, then orphan evaluations, each in id order.
    pub warnings: Vec<Warning>,
}

impl JoinOutput {
    pub fn unmatched(&self) -> usize {
        self.warnings
            .iter()
            .filter(|w| matches!(w, Warning::UnmatchedSubtrial(_)))
            .count()
    }

    pub fn orphans(&self) -> usize {
        self.warnings
            .iter()
            .filter(|w| matches!(w, Warning::OrphanEvaluation(_)))
            .count()
    }
}

/// Joins sub-trials with their consensus evaluations.
///
/// Output does not depend on input order. With `features` set, each record
/// also gets its kinematic feature vector.
pub fn join<'a>(
    subtrials: impl IntoIterator<Item = Subtrial<'a>>,
    evaluations: impl IntoIterator<Item = Evaluation>,
    features: Option<&SamplingConfig>,
) -> Result<JoinOutput, JoinError> {
    let mut by_id: BTreeMap<SubtrialId, Evaluation> = BTreeMap::new();
    for evaluation in evaluations {
        match by_id.entry(evaluation.id) {
            Entry::Occupied(e) => return Err(JoinError::DuplicateId(*e.key())),
            Entry::Vacant(v) => {
                v.insert(evaluation);
            }
        }
    }

    let mut sorted: BTreeMap<SubtrialId, Subtrial<'a>> = BTreeMap::new();
    for subtrial in subtrials {
        match sorted.entry(subtrial.id) {
            Entry::Occupied(e) => return Err(JoinError::DuplicateSubtrial(*e.key())),
            Entry::Vacant(v) => {
                v.insert(subtrial);
            }
        }
    }

    let mut records = Vec::with_capacity(sorted.len());
    let mut warnings = Vec::new();
    for (id, subtrial) in sorted {
        match by_id.remove(&id) {
            Some(evaluation) => records.push(MasterRecord {
                id,
                text: evaluation.text,
                label: evaluation.label,
                samples: subtrial.samples.to_vec(),
                features: features.map(|cfg| feature_vector(subtrial.samples, cfg)),
            }),
            None => {
                warn!(%id, "sub-trial has no evaluation");
                warnings.push(Warning::UnmatchedSubtrial(id));
            }
        }
    }
    for id in by_id.into_keys() {
        warn!(%id, "evaluation matches no sub-trial");
        warnings.push(Warning::OrphanEvaluation(id));
    }

    info!(
        records = records.len(),
        warnings = warnings.len(),
        "join complete"
    );
    Ok(JoinOutput { records, warnings })
}
