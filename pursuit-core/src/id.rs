use crate::constants::{PARTICIPANT_COUNT, SUBTRIALS_PER_TRIAL, TRIALS_PER_PARTICIPANT};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

lazy_static! {
    static ref SUBTRIAL_ID: Regex =
        Regex::new(r"^P(\d+)-T(\d+)-S(\d+)$").expect("sub-trial id pattern compiles");
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdError {
    #[error("malformed sub-trial id {0:?}, expected P<p>-T<t>-S<s>")]
    Malformed(String),

    #[error("{field} {value} outside 1..={max}")]
    OutOfRange {
        field: &'static str,
        value: u32,
        max: u32,
    },
}

fn check_range(field: &'static str, value: u32, max: u32) -> Result<u8, IdError> {
    if (1..=max).contains(&value) {
        Ok(value as u8)
    } else {
        Err(IdError::OutOfRange { field, value, max })
    }
}

/// Identifies one raw trajectory file: `(participant, trial)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TrialKey {
    participant: u8,
    trial: u8,
}

impl TrialKey {
    pub fn new(participant: u32, trial: u32) -> Result<Self, IdError> {
        Ok(Self {
            participant: check_range("participant", participant, PARTICIPANT_COUNT as u32)?,
            trial: check_range("trial", trial, TRIALS_PER_PARTICIPANT as u32)?,
        })
    }

    pub fn participant(&self) -> u8 {
        self.participant
    }

    pub fn trial(&self) -> u8 {
        self.trial
    }

    /// Id of the `subtrial`-th segment (1-based) of this trial.
    pub fn subtrial(&self, subtrial: u32) -> Result<SubtrialId, IdError> {
        Ok(SubtrialId {
            key: *self,
            subtrial: check_range("sub-trial", subtrial, SUBTRIALS_PER_TRIAL as u32)?,
        })
    }
}

impl fmt::Display for TrialKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}-T{}", self.participant, self.trial)
    }
}

/// `P{p}-T{t}-S{s}`. Orders by participant, trial, then sub-trial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubtrialId {
    key: TrialKey,
    subtrial: u8,
}

impl SubtrialId {
    pub fn new(participant: u32, trial: u32, subtrial: u32) -> Result<Self, IdError> {
        TrialKey::new(participant, trial)?.subtrial(subtrial)
    }

    pub fn key(&self) -> TrialKey {
        self.key
    }

    pub fn participant(&self) -> u8 {
        self.key.participant
    }

    pub fn trial(&self) -> u8 {
        self.key.trial
    }

    pub fn subtrial(&self) -> u8 {
        self.subtrial
    }
}

impl fmt::Display for SubtrialId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-S{}", self.key, self.subtrial)
    }
}

impl FromStr for SubtrialId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let caps = SUBTRIAL_ID
            .captures(s)
            .ok_or_else(|| IdError::Malformed(s.to_string()))?;
        let num = |i: usize| -> Result<u32, IdError> {
            caps[i]
                .parse::<u32>()
                .map_err(|_| IdError::Malformed(s.to_string()))
        };
        Self::new(num(1)?, num(2)?, num(3)?)
    }
}

impl Serialize for SubtrialId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SubtrialId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_formats_ids() {
        let id: SubtrialId = "P12-T3-S5".parse().unwrap();
        assert_eq!(id.participant(), 12);
        assert_eq!(id.trial(), 3);
        assert_eq!(id.subtrial(), 5);
        assert_eq!(id.to_string(), "P12-T3-S5");
    }

    #[test]
    fn rejects_ids_outside_namespace() {
        assert_eq!(
            "P25-T1-S1".parse::<SubtrialId>(),
            Err(IdError::OutOfRange {
                field: "participant",
                value: 25,
                max: 24
            })
        );
        assert!(matches!(
            "P1-T6-S1".parse::<SubtrialId>(),
            Err(IdError::OutOfRange { field: "trial", .. })
        ));
        assert!(matches!(
            "P1-T1-S0".parse::<SubtrialId>(),
            Err(IdError::OutOfRange { field: "sub-trial", .. })
        ));
    }

    #[test]
    fn rejects_malformed_ids() {
        for bad in ["", "P1-T1", "p1-t1-s1", "P1-T1-S1 ", "P1_T1_S1", "P-T1-S1"] {
            assert!(matches!(bad.parse::<SubtrialId>(), Err(IdError::Malformed(_))), "{bad}");
        }
    }

    #[test]
    fn ordering_is_numeric_not_lexicographic() {
        let mut ids: Vec<SubtrialId> = ["P10-T1-S1", "P2-T5-S5", "P2-T1-S2", "P2-T1-S1"]
            .iter()
            .map(|s| s.parse().unwrap())
            .collect();
        ids.sort();
        let formatted: Vec<String> = ids.iter().map(ToString::to_string).collect();
        assert_eq!(formatted, ["P2-T1-S1", "P2-T1-S2", "P2-T5-S5", "P10-T1-S1"]);
    }
}
