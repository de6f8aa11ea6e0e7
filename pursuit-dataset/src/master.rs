use crate::codec::{decode_features, decode_subtrial, encode_features, encode_subtrial};
use crate::error::{DatasetError, JoinError};
use pursuit_core::constants::MASTER_HEADER;
use pursuit_core::{Label, MasterRecord, SubtrialId};
use std::collections::HashSet;
use std::fs::File;
use std::io;
use std::path::Path;
use tracing::info;

pub fn write_master<W: io::Write>(writer: W, records: &[MasterRecord]) -> Result<(), DatasetError> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(MASTER_HEADER)?;
    for record in records {
        wtr.write_record([
            record.id.to_string(),
            record.text.clone(),
            record.label.to_string(),
            encode_subtrial(&record.samples)?,
            encode_features(record.features.as_ref())?,
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn save_master(path: &Path, records: &[MasterRecord]) -> Result<(), DatasetError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    write_master(File::create(path)?, records)?;
    info!(file = %path.display(), records = records.len(), "master dataset written");
    Ok(())
}

/// Parses a master dataset. The `feature_vector` column may be left out
/// entirely; when present, empty cells mean no features.
pub fn read_master<R: io::Read>(reader: R) -> Result<Vec<MasterRecord>, DatasetError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let header = rdr.headers()?;
    let columns = header.len();
    let full = header.iter().eq(MASTER_HEADER);
    let without_features = header.iter().eq(MASTER_HEADER[..4].iter().copied());
    if !full && !without_features {
        return Err(DatasetError::Schema(format!(
            "expected header {}, found {}",
            MASTER_HEADER.join(","),
            header.iter().collect::<Vec<_>>().join(",")
        )));
    }

    let mut records = Vec::new();
    let mut seen = HashSet::new();
    for (row, record) in rdr.records().enumerate() {
        let record = record?;
        if record.len() != columns {
            return Err(DatasetError::Schema(format!(
                "row {row} has {} fields, expected {columns}",
                record.len()
            )));
        }
        let field_err = |field: &'static str, reason: String| DatasetError::Row { row, field, reason };

        let id: SubtrialId = record[0]
            .parse()
            .map_err(|e: pursuit_core::IdError| field_err("id", e.to_string()))?;
        if !seen.insert(id) {
            return Err(JoinError::DuplicateId(id).into());
        }
        let text = record[1].to_string();
        if text.trim().is_empty() {
            return Err(field_err("text", "must not be empty".to_string()));
        }
        let label = record[2]
            .parse::<u8>()
            .map_err(|e| e.to_string())
            .and_then(|v| Label::try_from(v).map_err(|e| e.to_string()))
            .map_err(|reason| field_err("label", reason))?;
        let samples = decode_subtrial(&record[3])
            .map_err(|e| field_err("Subtrial", e.to_string()))?;
        let features = match record.get(4) {
            Some(raw) => {
                decode_features(raw).map_err(|e| field_err("feature_vector", e.to_string()))?
            }
            None => None,
        };

        records.push(MasterRecord {
            id,
            text,
            label,
            samples,
            features,
        });
    }
    Ok(records)
}

pub fn load_master(path: &Path) -> Result<Vec<MasterRecord>, DatasetError> {
    read_master(File::open(path)?)
}
