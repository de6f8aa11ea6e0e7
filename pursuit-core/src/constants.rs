//! Namespace and coordinate bounds of the star-pentagon dataset.

/// Participants are numbered `1..=PARTICIPANT_COUNT`.
pub const PARTICIPANT_COUNT: u8 = 24;

/// Trials per participant, numbered `1..=TRIALS_PER_PARTICIPANT`.
pub const TRIALS_PER_PARTICIPANT: u8 = 5;

/// Every trial splits into exactly this many sub-trials.
pub const SUBTRIALS_PER_TRIAL: usize = 5;

/// Screen coordinates lie in `[0, COORD_MAX]` on both axes.
pub const COORD_MAX: u16 = 1000;

/// Nominal mouse sampling interval in seconds. Not enforced.
pub const NOMINAL_INTERVAL_S: f64 = 0.2;

/// Raw trajectory header, exact order.
pub const TRAJECTORY_HEADER: [&str; 4] = ["Timestamp", "X", "Y", "Event"];

/// Consensus evaluation header, exact order.
pub const EVALUATION_HEADER: [&str; 3] = ["id", "text", "label"];

/// Master dataset header, exact order.
pub const MASTER_HEADER: [&str; 5] = ["id", "text", "label", "Subtrial", "feature_vector"];
