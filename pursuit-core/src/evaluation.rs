use crate::id::SubtrialId;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("label {0} outside {min}..={max}", min = Label::MIN, max = Label::MAX)]
pub struct LabelError(pub u8);

/// Consensus skill class, `1..=3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Label(u8);

impl Label {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 3;

    pub fn value(&self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Label {
    type Error = LabelError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Label(value))
        } else {
            Err(LabelError(value))
        }
    }
}

impl From<Label> for u8 {
    fn from(label: Label) -> u8 {
        label.0
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One consensus-resolved assessor record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evaluation {
    pub id: SubtrialId,
    pub text: String,
    pub label: Label,
}
