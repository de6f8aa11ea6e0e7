use crate::error::IngestError;
use lazy_static::lazy_static;
use pursuit_core::TrialKey;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

lazy_static! {
    static ref RAW_FILE: Regex =
        Regex::new(r"^SHSA_(\d+)_(\d+)\.csv$").expect("raw file pattern compiles");
}

/// `SHSA_<participant>_<trial>.csv`
pub fn raw_file_name(key: TrialKey) -> String {
    format!("SHSA_{}_{}.csv", key.participant(), key.trial())
}

/// Participant and trial numbers encoded in a raw file name, unchecked
/// against the dataset namespace. `None` if the name is not a raw file.
pub fn parse_raw_file_name(name: &str) -> Option<(u32, u32)> {
    let caps = RAW_FILE.captures(name)?;
    Some((caps[1].parse().ok()?, caps[2].parse().ok()?))
}

/// Trial key for a raw file path. Out-of-range numbers are a schema error.
pub fn trial_key_for(path: &Path) -> Result<TrialKey, IngestError> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| IngestError::schema(path, "path has no file name"))?;
    let (participant, trial) = parse_raw_file_name(name).ok_or_else(|| {
        IngestError::schema(
            path,
            format!("file name {name:?} does not match SHSA_<participant>_<trial>.csv"),
        )
    })?;
    TrialKey::new(participant, trial).map_err(|e| IngestError::schema(path, e.to_string()))
}

fn raw_entries(dir: &Path) -> Result<Vec<(u32, u32, PathBuf)>, IngestError> {
    let mut found = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| IngestError::io(dir, e))? {
        let entry = entry.map_err(|e| IngestError::io(dir, e))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        match path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(parse_raw_file_name)
        {
            Some((p, t)) => found.push((p, t, path)),
            None => debug!(path = %path.display(), "skipping non-trajectory file"),
        }
    }
    Ok(found)
}

/// All raw trajectory files in `dir`, ordered by participant then trial.
pub fn discover_trajectories(dir: &Path) -> Result<Vec<PathBuf>, IngestError> {
    let mut found = raw_entries(dir)?;
    found.sort();
    debug!(dir = %dir.display(), files = found.len(), "discovered trajectory files");
    Ok(found.into_iter().map(|(_, _, path)| path).collect())
}

/// Participant number the next recording session should use: one past the
/// highest number already on disk, or 1 for an empty directory.
pub fn next_participant_number(dir: &Path) -> Result<u32, IngestError> {
    if !dir.exists() {
        return Ok(1);
    }
    Ok(raw_entries(dir)?
        .iter()
        .map(|(p, _, _)| *p)
        .max()
        .map_or(1, |max| max + 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_names_round_trip() {
        let key = TrialKey::new(7, 3).unwrap();
        let name = raw_file_name(key);
        assert_eq!(name, "SHSA_7_3.csv");
        assert_eq!(parse_raw_file_name(&name), Some((7, 3)));
        assert_eq!(trial_key_for(Path::new("data/SHSA_7_3.csv")).unwrap(), key);
    }

    #[test]
    fn rejects_foreign_and_out_of_range_names() {
        assert_eq!(parse_raw_file_name("SHSA_7_3.txt"), None);
        assert_eq!(parse_raw_file_name("softData-v02.csv"), None);
        assert!(matches!(
            trial_key_for(Path::new("SHSA_30_1.csv")),
            Err(IngestError::Schema { .. })
        ));
        assert!(matches!(
            trial_key_for(Path::new("notes.csv")),
            Err(IngestError::Schema { .. })
        ));
    }
}
