use crate::id::{SubtrialId, TrialKey};
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// One mouse observation from a raw trajectory row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Seconds since tracking started.
    pub timestamp: f64,
    pub x: u16,
    pub y: u16,
    /// Space bar held down.
    pub event: bool,
}

impl Sample {
    pub fn new(timestamp: f64, x: u16, y: u16, event: bool) -> Self {
        Self {
            timestamp,
            x,
            y,
            event,
        }
    }

    pub fn position(&self) -> (f64, f64) {
        (self.x as f64, self.y as f64)
    }
}

/// A loaded trajectory file. Sample order is temporal order.
#[derive(Debug, Clone, PartialEq)]
pub struct Trial {
    key: TrialKey,
    samples: Vec<Sample>,
}

impl Trial {
    pub fn new(key: TrialKey, samples: Vec<Sample>) -> Self {
        Self { key, samples }
    }

    pub fn key(&self) -> TrialKey {
        self.key
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Positions of every sample recorded with the space bar down.
    pub fn event_positions(&self) -> Vec<(u16, u16)> {
        event_positions(&self.samples)
    }

    /// Sample indices where the space bar goes from released to pressed.
    pub fn press_onsets(&self) -> Vec<usize> {
        press_onsets(&self.samples)
    }

    /// View of `range` as sub-trial `subtrial` (1-based).
    ///
    /// Returns `None` if the range falls outside the trial or the index is
    /// outside the sub-trial namespace.
    pub fn subtrial(&self, subtrial: u32, range: Range<usize>) -> Option<Subtrial<'_>> {
        if range.start > range.end || range.end > self.samples.len() {
            return None;
        }
        let id = self.key.subtrial(subtrial).ok()?;
        Some(Subtrial {
            id,
            samples: &self.samples[range.clone()],
            range,
        })
    }
}

/// `(x, y)` of every sample recorded with the space bar down.
pub fn event_positions(samples: &[Sample]) -> Vec<(u16, u16)> {
    samples
        .iter()
        .filter(|s| s.event)
        .map(|s| (s.x, s.y))
        .collect()
}

/// Indices `i` where `samples[i].event` is set and the previous sample's is
/// not. A press already held at index 0 counts as an onset.
pub fn press_onsets(samples: &[Sample]) -> Vec<usize> {
    let mut prev = false;
    let mut onsets = Vec::new();
    for (i, s) in samples.iter().enumerate() {
        if s.event && !prev {
            onsets.push(i);
        }
        prev = s.event;
    }
    onsets
}

/// Borrowed contiguous slice of a [`Trial`].
#[derive(Debug, Clone, PartialEq)]
pub struct Subtrial<'a> {
    pub id: SubtrialId,
    pub range: Range<usize>,
    pub samples: &'a [Sample],
}

impl Subtrial<'_> {
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}
