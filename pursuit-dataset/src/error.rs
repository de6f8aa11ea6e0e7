use pursuit_core::SubtrialId;

/// Failures that stop the join. Both mean the inputs cannot be trusted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum JoinError {
    #[error("evaluation id {0} appears more than once; consensus data is ambiguous")]
    DuplicateId(SubtrialId),

    #[error("sub-trial {0} was produced by more than one trial")]
    DuplicateSubtrial(SubtrialId),
}

#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("invalid Subtrial column: {0}")]
    Subtrial(String),

    #[error("invalid feature_vector column: {0}")]
    FeatureVector(String),

    #[error("master dataset schema error: {0}")]
    Schema(String),

    #[error("master dataset row {row}, field {field}: {reason}")]
    Row {
        row: usize,
        field: &'static str,
        reason: String,
    },

    #[error("test fraction {0} outside 0..=1")]
    TestFraction(f64),

    #[error(transparent)]
    Join(#[from] JoinError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
