use crate::sampling::{SamplingConfig, SamplingStats};
use pursuit_core::{FeatureVector, Sample, press_onsets};

/// Hard-data features for one sub-trial.
pub fn feature_vector(samples: &[Sample], sampling: &SamplingConfig) -> FeatureVector {
    let stats = SamplingStats::from_samples(samples, sampling);
    let path_length: f64 = samples
        .windows(2)
        .map(|w| {
            let (x0, y0) = w[0].position();
            let (x1, y1) = w[1].position();
            (x1 - x0).hypot(y1 - y0)
        })
        .sum();
    let mean_speed = if stats.duration_s > 0.0 {
        path_length / stats.duration_s
    } else {
        0.0
    };

    FeatureVector::from([
        ("duration_s".to_string(), stats.duration_s),
        ("path_length_px".to_string(), path_length),
        ("mean_speed_px_s".to_string(), mean_speed),
        ("sample_count".to_string(), samples.len() as f64),
        (
            "event_count".to_string(),
            samples.iter().filter(|s| s.event).count() as f64,
        ),
        ("press_count".to_string(), press_onsets(samples).len() as f64),
        ("mean_interval_s".to_string(), stats.mean_interval_s),
        ("interval_jitter_s".to_string(), stats.interval_jitter_s),
    ])
}
