//! Reading and validating the raw dataset files.
//!
//! Trajectory files (`SHSA_<participant>_<trial>.csv`) become [`Trial`]s,
//! the consensus evaluation file becomes a list of [`Evaluation`]s. Every
//! row of a file is checked before the file is accepted or rejected, so a
//! rejected file reports all of its bad rows at once.
//!
//! [`Trial`]: pursuit_core::Trial
//! [`Evaluation`]: pursuit_core::Evaluation

pub mod error;
pub mod evaluation;
pub mod naming;
pub mod trajectory;

pub use error::{IngestError, RowValidationError};
pub use evaluation::{load_evaluations, read_evaluations};
pub use naming::{
    discover_trajectories, next_participant_number, parse_raw_file_name, raw_file_name,
    trial_key_for,
};
pub use trajectory::{LoadedTrajectory, load_trajectory, parse_trajectory, write_trajectory};
