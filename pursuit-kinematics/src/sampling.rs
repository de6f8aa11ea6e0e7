use pursuit_core::Sample;
use pursuit_core::constants::NOMINAL_INTERVAL_S;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// How sample intervals are judged. Gaps are counted, never rejected.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    pub nominal_interval_s: f64,
    /// An interval longer than `gap_factor * nominal_interval_s` is a gap.
    pub gap_factor: f64,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            nominal_interval_s: NOMINAL_INTERVAL_S,
            gap_factor: 5.0,
        }
    }
}

impl SamplingConfig {
    pub fn gap_threshold_s(&self) -> f64 {
        self.nominal_interval_s * self.gap_factor
    }
}

/// Interval statistics over one run of samples.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SamplingStats {
    pub samples: usize,
    pub duration_s: f64,
    pub mean_interval_s: f64,
    /// Population standard deviation of the intervals.
    pub interval_jitter_s: f64,
    pub min_interval_s: f64,
    pub max_interval_s: f64,
    pub gaps: usize,
    pub effective_hz: f64,
}

impl SamplingStats {
    pub fn from_samples(samples: &[Sample], config: &SamplingConfig) -> Self {
        let intervals: Vec<f64> = samples
            .windows(2)
            .map(|w| w[1].timestamp - w[0].timestamp)
            .collect();
        if intervals.is_empty() {
            return Self {
                samples: samples.len(),
                ..Self::default()
            };
        }

        let n = intervals.len() as f64;
        let mean = intervals.iter().sum::<f64>() / n;
        let var = intervals.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
        let min = intervals.iter().copied().fold(f64::INFINITY, f64::min);
        let max = intervals.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let threshold = config.gap_threshold_s();
        let gaps = intervals.iter().filter(|&&d| d > threshold).count();
        if gaps > 0 {
            debug!(gaps, max_interval_s = max, threshold_s = threshold, "sampling gaps");
        }

        Self {
            samples: samples.len(),
            duration_s: samples[samples.len() - 1].timestamp - samples[0].timestamp,
            mean_interval_s: mean,
            interval_jitter_s: var.sqrt(),
            min_interval_s: min,
            max_interval_s: max,
            gaps,
            effective_hz: if mean > 0.0 { 1.0 / mean } else { 0.0 },
        }
    }
}
