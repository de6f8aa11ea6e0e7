use std::path::PathBuf;

/// One bad field value. `row` is the 0-based data row (header excluded).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("row {row}: {field} = {value:?}: {reason}")]
pub struct RowValidationError {
    pub row: usize,
    pub field: &'static str,
    pub value: String,
    pub reason: String,
}

impl RowValidationError {
    pub(crate) fn new(
        row: usize,
        field: &'static str,
        value: &str,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            row,
            field,
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

fn first_row(errors: &[RowValidationError]) -> String {
    errors
        .first()
        .map(|e| format!(", first: {e}"))
        .unwrap_or_default()
}

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// Header or row structure does not match the file format.
    #[error("{}: schema error: {reason}", .path.display())]
    Schema { path: PathBuf, reason: String },

    /// The file was fully scanned and these rows failed validation.
    #[error("{}: {} invalid row(s){}", .path.display(), .errors.len(), first_row(.errors))]
    Rows {
        path: PathBuf,
        errors: Vec<RowValidationError>,
    },

    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

impl IngestError {
    pub(crate) fn schema(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        IngestError::Schema {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        IngestError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        IngestError::Csv {
            path: path.into(),
            source,
        }
    }

    /// Number of rejected rows, zero for whole-file failures.
    pub fn rejected_rows(&self) -> usize {
        match self {
            IngestError::Rows { errors, .. } => errors.len(),
            _ => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_message_names_the_first_bad_row() {
        let err = IngestError::Rows {
            path: PathBuf::from("SHSA_1_1.csv"),
            errors: vec![
                RowValidationError::new(4, "X", "1200", "outside 0..=1000"),
                RowValidationError::new(9, "Event", "2", "must be 0 or 1"),
            ],
        };
        assert_eq!(
            err.to_string(),
            "SHSA_1_1.csv: 2 invalid row(s), first: row 4: X = \"1200\": outside 0..=1000"
        );
        assert_eq!(err.rejected_rows(), 2);
    }

    #[test]
    fn rows_message_without_rows() {
        let err = IngestError::Rows {
            path: PathBuf::from("SHSA_1_1.csv"),
            errors: Vec::new(),
        };
        assert_eq!(err.to_string(), "SHSA_1_1.csv: 0 invalid row(s)");
    }
}
