use crate::error::{IngestError, RowValidationError};
use crate::naming::trial_key_for;
use pursuit_core::constants::{COORD_MAX, TRAJECTORY_HEADER};
use pursuit_core::{Sample, Trial, TrialKey, Warning};
use std::fs::File;
use std::io;
use std::path::Path;
use tracing::{debug, warn};

/// A trial that passed validation, plus anything worth flagging about it.
#[derive(Debug, Clone)]
pub struct LoadedTrajectory {
    pub trial: Trial,
    pub warnings: Vec<Warning>,
}

/// Loads one raw trajectory file. The trial key comes from the file name.
pub fn load_trajectory(path: &Path) -> Result<LoadedTrajectory, IngestError> {
    let key = trial_key_for(path)?;
    let file = File::open(path).map_err(|e| IngestError::io(path, e))?;
    parse_trajectory(key, file, path)
}

/// Parses trajectory CSV from `reader`. `origin` only labels errors.
pub fn parse_trajectory<R: io::Read>(
    key: TrialKey,
    reader: R,
    origin: &Path,
) -> Result<LoadedTrajectory, IngestError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let header = rdr.headers().map_err(|e| IngestError::csv(origin, e))?;
    if !header.iter().eq(TRAJECTORY_HEADER) {
        return Err(IngestError::schema(
            origin,
            format!(
                "expected header {}, found {}",
                TRAJECTORY_HEADER.join(","),
                header.iter().collect::<Vec<_>>().join(",")
            ),
        ));
    }

    let mut samples = Vec::new();
    let mut errors = Vec::new();
    let mut last_timestamp: Option<f64> = None;

    for (row, record) in rdr.records().enumerate() {
        let record = record.map_err(|e| IngestError::csv(origin, e))?;
        if record.len() != TRAJECTORY_HEADER.len() {
            return Err(IngestError::schema(
                origin,
                format!(
                    "row {row} has {} fields, expected {}",
                    record.len(),
                    TRAJECTORY_HEADER.len()
                ),
            ));
        }

        let before = errors.len();
        let timestamp = parse_timestamp(row, &record[0], last_timestamp, &mut errors);
        let x = parse_coordinate(row, "X", &record[1], &mut errors);
        let y = parse_coordinate(row, "Y", &record[2], &mut errors);
        let event = parse_event(row, &record[3], &mut errors);

        if let Some(t) = timestamp {
            last_timestamp = Some(t);
        }
        if errors.len() == before {
            if let (Some(t), Some(x), Some(y), Some(e)) = (timestamp, x, y, event) {
                samples.push(Sample::new(t, x, y, e));
            }
        }
    }

    if !errors.is_empty() {
        warn!(
            file = %origin.display(),
            rejected = errors.len(),
            "trajectory rejected"
        );
        return Err(IngestError::Rows {
            path: origin.to_path_buf(),
            errors,
        });
    }

    let mut warnings = Vec::new();
    if samples.is_empty() {
        warn!(trial = %key, "trajectory has a header but no samples");
        warnings.push(Warning::EmptyTrial(key));
    }
    debug!(trial = %key, samples = samples.len(), "trajectory loaded");

    Ok(LoadedTrajectory {
        trial: Trial::new(key, samples),
        warnings,
    })
}

fn parse_timestamp(
    row: usize,
    raw: &str,
    previous: Option<f64>,
    errors: &mut Vec<RowValidationError>,
) -> Option<f64> {
    let value = match raw.parse::<f64>() {
        Ok(v) => v,
        Err(_) => {
            errors.push(RowValidationError::new(row, "Timestamp", raw, "not a number"));
            return None;
        }
    };
    if !value.is_finite() || value < 0.0 {
        errors.push(RowValidationError::new(
            row,
            "Timestamp",
            raw,
            "must be a finite non-negative number of seconds",
        ));
        return None;
    }
    if let Some(prev) = previous {
        if value < prev {
            errors.push(RowValidationError::new(
                row,
                "Timestamp",
                raw,
                format!("decreases from {prev}"),
            ));
            return None;
        }
    }
    Some(value)
}

fn parse_coordinate(
    row: usize,
    field: &'static str,
    raw: &str,
    errors: &mut Vec<RowValidationError>,
) -> Option<u16> {
    match raw.parse::<i64>() {
        Ok(v) if (0..=COORD_MAX as i64).contains(&v) => Some(v as u16),
        Ok(_) => {
            errors.push(RowValidationError::new(
                row,
                field,
                raw,
                format!("outside 0..={COORD_MAX}"),
            ));
            None
        }
        Err(_) => {
            errors.push(RowValidationError::new(row, field, raw, "not an integer"));
            None
        }
    }
}

fn parse_event(row: usize, raw: &str, errors: &mut Vec<RowValidationError>) -> Option<bool> {
    match raw {
        "0" => Some(false),
        "1" => Some(true),
        _ => {
            errors.push(RowValidationError::new(row, "Event", raw, "must be 0 or 1"));
            None
        }
    }
}

/// Writes samples in the raw trajectory format.
pub fn write_trajectory(path: &Path, samples: &[Sample]) -> Result<(), IngestError> {
    let mut wtr = csv::Writer::from_path(path).map_err(|e| IngestError::csv(path, e))?;
    wtr.write_record(TRAJECTORY_HEADER)
        .map_err(|e| IngestError::csv(path, e))?;
    for s in samples {
        wtr.write_record([
            s.timestamp.to_string(),
            s.x.to_string(),
            s.y.to_string(),
            u8::from(s.event).to_string(),
        ])
        .map_err(|e| IngestError::csv(path, e))?;
    }
    wtr.flush().map_err(|e| IngestError::io(path, e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(body: &str) -> Result<LoadedTrajectory, IngestError> {
        let key = TrialKey::new(1, 1).unwrap();
        parse_trajectory(key, body.as_bytes(), Path::new("SHSA_1_1.csv"))
    }

    #[test]
    fn sample_count_matches_data_rows() {
        let loaded = parse("Timestamp,X,Y,Event\n0.0,885,394,0\n0.2,883,398,0\n0.4,880,405,1\n")
            .unwrap();
        assert_eq!(loaded.trial.len(), 3);
        assert!(loaded.warnings.is_empty());
        assert_eq!(loaded.trial.samples()[2], Sample::new(0.4, 880, 405, true));
    }

    #[test]
    fn header_must_match_exactly() {
        for header in ["timestamp,X,Y,Event", "Timestamp,Y,X,Event", "Timestamp,X,Y", ""] {
            let body = format!("{header}\n0.0,1,1,0\n");
            assert!(
                matches!(parse(&body), Err(IngestError::Schema { .. })),
                "{header:?}"
            );
        }
    }

    #[test]
    fn collects_every_bad_row_before_failing() {
        let body = "Timestamp,X,Y,Event\n\
                    0.0,1200,394,0\n\
                    0.2,883,398,0\n\
                    -0.4,880,abc,2\n\
                    0.6,880,405,0\n";
        let Err(IngestError::Rows { errors, .. }) = parse(body) else {
            panic!("expected row errors");
        };
        let found: Vec<(usize, &str)> = errors.iter().map(|e| (e.row, e.field)).collect();
        assert_eq!(found, [(0, "X"), (2, "Timestamp"), (2, "Y"), (2, "Event")]);
        assert_eq!(errors[0].value, "1200");
    }

    #[test]
    fn decreasing_timestamp_is_a_row_error() {
        let body = "Timestamp,X,Y,Event\n0.4,1,1,0\n0.2,1,1,0\n";
        let Err(IngestError::Rows { errors, .. }) = parse(body) else {
            panic!("expected row errors");
        };
        assert_eq!(errors.len(), 1);
        assert_eq!((errors[0].row, errors[0].field), (1, "Timestamp"));
    }

    #[test]
    fn gaps_and_repeated_timestamps_are_tolerated() {
        let body = "Timestamp,X,Y,Event\n0.0,1,1,0\n0.0,2,2,0\n3.7,3,3,0\n";
        assert_eq!(parse(body).unwrap().trial.len(), 3);
    }

    #[test]
    fn wrong_field_count_is_structural() {
        let body = "Timestamp,X,Y,Event\n0.0,1,1,0\n0.2,1,1\n";
        assert!(matches!(parse(body), Err(IngestError::Schema { .. })));
    }

    #[test]
    fn header_only_file_is_valid_with_warning() {
        let loaded = parse("Timestamp,X,Y,Event\n").unwrap();
        assert!(loaded.trial.is_empty());
        assert_eq!(loaded.warnings, [Warning::EmptyTrial(TrialKey::new(1, 1).unwrap())]);
    }
}
