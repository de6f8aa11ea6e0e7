//! JSON encodings of the `Subtrial` and `feature_vector` columns.
//!
//! `Subtrial` is four parallel arrays keyed by row index:
//!
//! ```text
//! {"Timestamp":{"0":0.0,"1":0.2},"X":{"0":885,"1":883},"Y":{"0":394,"1":398},"Event":{"0":0,"1":0}}
//! ```
//!
//! Parsing is strict: exactly these four keys, canonical indices `0..n`
//! in every array, and values in their raw-file ranges.

use crate::error::DatasetError;
use pursuit_core::constants::COORD_MAX;
use pursuit_core::{FeatureVector, Sample};
use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::fmt;
use std::marker::PhantomData;

struct Indexed<T>(Vec<T>);

impl<T: Serialize> Serialize for Indexed<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (i, v) in self.0.iter().enumerate() {
            map.serialize_entry(&i.to_string(), v)?;
        }
        map.end()
    }
}

#[derive(Serialize)]
struct ColumnsOut {
    #[serde(rename = "Timestamp")]
    timestamp: Indexed<f64>,
    #[serde(rename = "X")]
    x: Indexed<u16>,
    #[serde(rename = "Y")]
    y: Indexed<u16>,
    #[serde(rename = "Event")]
    event: Indexed<u8>,
}

/// One column as parsed, keyed by its raw index string. A repeated key is
/// an error rather than last-one-wins.
struct Column<T>(BTreeMap<String, T>);

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Column<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ColumnVisitor<T>(PhantomData<T>);

        impl<'de, T: Deserialize<'de>> Visitor<'de> for ColumnVisitor<T> {
            type Value = Column<T>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map from row index to value")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut column = BTreeMap::new();
                while let Some((key, value)) = access.next_entry::<String, T>()? {
                    match column.entry(key) {
                        Entry::Occupied(e) => {
                            return Err(de::Error::custom(format!(
                                "row index {:?} appears more than once",
                                e.key()
                            )));
                        }
                        Entry::Vacant(v) => {
                            v.insert(value);
                        }
                    }
                }
                Ok(Column(column))
            }
        }

        deserializer.deserialize_map(ColumnVisitor(PhantomData))
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ColumnsIn {
    #[serde(rename = "Timestamp")]
    timestamp: Column<f64>,
    #[serde(rename = "X")]
    x: Column<i64>,
    #[serde(rename = "Y")]
    y: Column<i64>,
    #[serde(rename = "Event")]
    event: Column<i64>,
}

pub fn encode_subtrial(samples: &[Sample]) -> Result<String, DatasetError> {
    let columns = ColumnsOut {
        timestamp: Indexed(samples.iter().map(|s| s.timestamp).collect()),
        x: Indexed(samples.iter().map(|s| s.x).collect()),
        y: Indexed(samples.iter().map(|s| s.y).collect()),
        event: Indexed(samples.iter().map(|s| u8::from(s.event)).collect()),
    };
    Ok(serde_json::to_string(&columns)?)
}

/// Orders a column by index, requiring keys to be exactly `"0".."n-1"`.
fn ordered<T>(name: &str, column: BTreeMap<String, T>) -> Result<Vec<T>, DatasetError> {
    let mut indexed = Vec::with_capacity(column.len());
    for (key, value) in column {
        let index: usize = key
            .parse()
            .ok()
            .filter(|i: &usize| i.to_string() == key)
            .ok_or_else(|| DatasetError::Subtrial(format!("{name}: key {key:?} is not a row index")))?;
        indexed.push((index, value));
    }
    indexed.sort_by_key(|(i, _)| *i);
    for (expected, (index, _)) in indexed.iter().enumerate() {
        if *index != expected {
            return Err(DatasetError::Subtrial(format!(
                "{name}: row index {expected} missing"
            )));
        }
    }
    Ok(indexed.into_iter().map(|(_, v)| v).collect())
}

pub fn decode_subtrial(raw: &str) -> Result<Vec<Sample>, DatasetError> {
    let columns: ColumnsIn =
        serde_json::from_str(raw).map_err(|e| DatasetError::Subtrial(e.to_string()))?;
    let timestamps = ordered("Timestamp", columns.timestamp.0)?;
    let xs = ordered("X", columns.x.0)?;
    let ys = ordered("Y", columns.y.0)?;
    let events = ordered("Event", columns.event.0)?;

    let n = timestamps.len();
    if xs.len() != n || ys.len() != n || events.len() != n {
        return Err(DatasetError::Subtrial(format!(
            "column lengths differ: Timestamp {n}, X {}, Y {}, Event {}",
            xs.len(),
            ys.len(),
            events.len()
        )));
    }

    let coord = |name: &str, i: usize, v: i64| -> Result<u16, DatasetError> {
        if (0..=COORD_MAX as i64).contains(&v) {
            Ok(v as u16)
        } else {
            Err(DatasetError::Subtrial(format!(
                "{name}[{i}] = {v} outside 0..={COORD_MAX}"
            )))
        }
    };

    let mut samples = Vec::with_capacity(n);
    for i in 0..n {
        let t = timestamps[i];
        if !(t.is_finite() && t >= 0.0) {
            return Err(DatasetError::Subtrial(format!(
                "Timestamp[{i}] = {t} is not a non-negative time"
            )));
        }
        let event = match events[i] {
            0 => false,
            1 => true,
            other => {
                return Err(DatasetError::Subtrial(format!(
                    "Event[{i}] = {other}, expected 0 or 1"
                )));
            }
        };
        samples.push(Sample::new(t, coord("X", i, xs[i])?, coord("Y", i, ys[i])?, event));
    }
    Ok(samples)
}

/// `None` encodes as the empty string.
pub fn encode_features(features: Option<&FeatureVector>) -> Result<String, DatasetError> {
    match features {
        Some(fv) => Ok(serde_json::to_string(fv)?),
        None => Ok(String::new()),
    }
}

pub fn decode_features(raw: &str) -> Result<Option<FeatureVector>, DatasetError> {
    if raw.trim().is_empty() {
        return Ok(None);
    }
    serde_json::from_str(raw)
        .map(Some)
        .map_err(|e| DatasetError::FeatureVector(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_parallel_arrays_in_row_order() {
        let samples: Vec<Sample> = (0..12)
            .map(|i| Sample::new(i as f64 * 0.2, 100 + i, 200, i == 11))
            .collect();
        let json = encode_subtrial(&samples).unwrap();
        assert!(json.starts_with(r#"{"Timestamp":{"0":0.0,"1":0.2,"#));
        assert!(json.contains(r#""9":109,"10":110,"11":111}"#));
        assert!(json.ends_with(r#""10":0,"11":1}}"#));
        assert_eq!(decode_subtrial(&json).unwrap(), samples);
    }

    #[test]
    fn empty_subtrial_round_trips() {
        let json = encode_subtrial(&[]).unwrap();
        assert_eq!(json, r#"{"Timestamp":{},"X":{},"Y":{},"Event":{}}"#);
        assert!(decode_subtrial(&json).unwrap().is_empty());
    }

    #[test]
    fn rejects_malformed_columns() {
        let cases = [
            // missing column
            r#"{"Timestamp":{"0":0.0},"X":{"0":1},"Y":{"0":1}}"#,
            // extra column
            r#"{"Timestamp":{"0":0.0},"X":{"0":1},"Y":{"0":1},"Event":{"0":0},"Z":{}}"#,
            // index gap
            r#"{"Timestamp":{"0":0.0,"2":0.4},"X":{"0":1,"2":1},"Y":{"0":1,"2":1},"Event":{"0":0,"2":0}}"#,
            // repeated index
            r#"{"Timestamp":{"0":0.0,"0":9.5},"X":{"0":1},"Y":{"0":1},"Event":{"0":0}}"#,
            r#"{"Timestamp":{"0":0.0},"X":{"0":1,"0":2},"Y":{"0":1},"Event":{"0":0}}"#,
            // non-canonical index
            r#"{"Timestamp":{"00":0.0},"X":{"00":1},"Y":{"00":1},"Event":{"00":0}}"#,
            // ragged
            r#"{"Timestamp":{"0":0.0,"1":0.2},"X":{"0":1},"Y":{"0":1},"Event":{"0":0}}"#,
            // out of range
            r#"{"Timestamp":{"0":0.0},"X":{"0":1200},"Y":{"0":1},"Event":{"0":0}}"#,
            r#"{"Timestamp":{"0":0.0},"X":{"0":1},"Y":{"0":1},"Event":{"0":2}}"#,
            r#"{"Timestamp":{"0":-1.0},"X":{"0":1},"Y":{"0":1},"Event":{"0":0}}"#,
            "not json",
        ];
        for case in cases {
            assert!(
                matches!(decode_subtrial(case), Err(DatasetError::Subtrial(_))),
                "{case}"
            );
        }
    }

    #[test]
    fn repeated_row_index_is_not_overwritten() {
        let err = decode_subtrial(
            r#"{"Timestamp":{"0":0.0,"0":9.5},"X":{"0":1},"Y":{"0":1},"Event":{"0":0}}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("\"0\" appears more than once"), "{err}");
    }

    #[test]
    fn features_are_optional() {
        assert_eq!(encode_features(None).unwrap(), "");
        assert_eq!(decode_features("").unwrap(), None);

        let fv = FeatureVector::from([("duration_s".to_string(), 1.5)]);
        let json = encode_features(Some(&fv)).unwrap();
        assert_eq!(json, r#"{"duration_s":1.5}"#);
        assert_eq!(decode_features(&json).unwrap(), Some(fv));
        assert!(decode_features("[1,2]").is_err());
    }
}
