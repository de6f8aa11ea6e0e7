use crate::error::{IngestError, RowValidationError};
use pursuit_core::constants::EVALUATION_HEADER;
use pursuit_core::{Evaluation, Label, SubtrialId};
use std::fs::File;
use std::io;
use std::path::Path;
use tracing::{info, warn};

/// Loads the consensus evaluation file.
///
/// Rows come back in file order. Duplicate ids are not rejected here; the
/// joiner decides what a duplicate means.
pub fn load_evaluations(path: &Path) -> Result<Vec<Evaluation>, IngestError> {
    let file = File::open(path).map_err(|e| IngestError::io(path, e))?;
    let evaluations = read_evaluations(file, path)?;
    info!(file = %path.display(), rows = evaluations.len(), "evaluations loaded");
    Ok(evaluations)
}

pub fn read_evaluations<R: io::Read>(
    reader: R,
    origin: &Path,
) -> Result<Vec<Evaluation>, IngestError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let header = rdr.headers().map_err(|e| IngestError::csv(origin, e))?;
    if !header.iter().eq(EVALUATION_HEADER) {
        return Err(IngestError::schema(
            origin,
            format!(
                "expected header {}, found {}",
                EVALUATION_HEADER.join(","),
                header.iter().collect::<Vec<_>>().join(",")
            ),
        ));
    }

    let mut evaluations = Vec::new();
    let mut errors = Vec::new();

    for (row, record) in rdr.records().enumerate() {
        let record = record.map_err(|e| IngestError::csv(origin, e))?;
        if record.len() != EVALUATION_HEADER.len() {
            return Err(IngestError::schema(
                origin,
                format!(
                    "row {row} has {} fields, expected {}",
                    record.len(),
                    EVALUATION_HEADER.len()
                ),
            ));
        }

        let id = record[0]
            .parse::<SubtrialId>()
            .map_err(|e| errors.push(RowValidationError::new(row, "id", &record[0], e.to_string())))
            .ok();

        let text = &record[1];
        if text.trim().is_empty() {
            errors.push(RowValidationError::new(row, "text", text, "must not be empty"));
        }

        let label = record[2]
            .parse::<u8>()
            .map_err(|_| "not an integer".to_string())
            .and_then(|v| Label::try_from(v).map_err(|e| e.to_string()))
            .map_err(|reason| {
                errors.push(RowValidationError::new(row, "label", &record[2], reason))
            })
            .ok();

        if let (Some(id), Some(label)) = (id, label) {
            if !text.trim().is_empty() {
                evaluations.push(Evaluation {
                    id,
                    text: text.to_string(),
                    label,
                });
            }
        }
    }

    if !errors.is_empty() {
        warn!(file = %origin.display(), rejected = errors.len(), "evaluation file rejected");
        return Err(IngestError::Rows {
            path: origin.to_path_buf(),
            errors,
        });
    }
    Ok(evaluations)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read(body: &str) -> Result<Vec<Evaluation>, IngestError> {
        read_evaluations(body.as_bytes(), Path::new("softData-v02.csv"))
    }

    #[test]
    fn reads_quoted_text() {
        let rows = read(
            "id,text,label\n\
             P1-T1-S1,\"Smooth, confident stroke\",3\n\
             P1-T1-S2,\"Hesitates at the vertex,\nthen overshoots\",1\n",
        )
        .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].text, "Smooth, confident stroke");
        assert_eq!(rows[1].label.value(), 1);
        assert!(rows[1].text.contains('\n'));
    }

    #[test]
    fn reports_all_invalid_rows() {
        let Err(IngestError::Rows { errors, .. }) = read(
            "id,text,label\n\
             P1-T1-S1,fine,2\n\
             P25-T1-S1,out of namespace,2\n\
             P1-T1-S3,,4\n\
             P1-T1-S4,ok,x\n",
        ) else {
            panic!("expected row errors");
        };
        let found: Vec<(usize, &str)> = errors.iter().map(|e| (e.row, e.field)).collect();
        assert_eq!(found, [(1, "id"), (2, "text"), (2, "label"), (3, "label")]);
    }

    #[test]
    fn duplicate_ids_pass_through() {
        let rows = read("id,text,label\nP1-T1-S1,a,1\nP1-T1-S1,b,2\n").unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn header_must_match() {
        assert!(matches!(
            read("id,label,text\nP1-T1-S1,1,a\n"),
            Err(IngestError::Schema { .. })
        ));
    }
}
