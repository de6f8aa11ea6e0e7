use crate::id::{SubtrialId, TrialKey};
use serde::Serialize;
use std::fmt;

/// Non-fatal findings. They affect dataset completeness, never abort a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Warning {
    /// Raw file had a header and no rows.
    EmptyTrial(TrialKey),
    /// Two consecutive boundaries coincided.
    EmptySubtrial(SubtrialId),
    /// Sub-trial has no evaluation row.
    UnmatchedSubtrial(SubtrialId),
    /// Evaluation row names a sub-trial that was never produced.
    OrphanEvaluation(SubtrialId),
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::EmptyTrial(key) => write!(f, "trial {key} has no motion data"),
            Warning::EmptySubtrial(id) => write!(f, "sub-trial {id} is empty"),
            Warning::UnmatchedSubtrial(id) => write!(f, "sub-trial {id} has no evaluation"),
            Warning::OrphanEvaluation(id) => {
                write!(f, "evaluation {id} matches no sub-trial")
            }
        }
    }
}
