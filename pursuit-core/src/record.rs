use crate::evaluation::Label;
use crate::id::SubtrialId;
use crate::trial::Sample;
use std::collections::BTreeMap;

/// Precomputed feature name to value. Sorted so serialization is stable.
pub type FeatureVector = BTreeMap<String, f64>;

/// A sub-trial joined with its consensus evaluation.
///
/// Owns a copy of the sub-trial samples; the originating trial is not
/// retained past the join.
#[derive(Debug, Clone, PartialEq)]
pub struct MasterRecord {
    pub id: SubtrialId,
    pub text: String,
    pub label: Label,
    pub samples: Vec<Sample>,
    pub features: Option<FeatureVector>,
}
