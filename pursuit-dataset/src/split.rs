use crate::error::DatasetError;
use pursuit_core::MasterRecord;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use std::collections::BTreeSet;

/// Train/test partition with no participant on both sides.
#[derive(Debug, Clone, PartialEq)]
pub struct Split {
    pub train: Vec<MasterRecord>,
    pub test: Vec<MasterRecord>,
    /// Sorted.
    pub test_participants: Vec<u8>,
}

/// Deterministically assigns whole participants to the test side.
///
/// The participant count on the test side is `test_fraction` of all
/// participants, rounded, and kept in `1..n` whenever the fraction is
/// strictly between 0 and 1 and there are at least two participants.
/// Record order within each side follows the input.
pub fn split_by_participant(
    records: Vec<MasterRecord>,
    test_fraction: f64,
    seed: u64,
) -> Result<Split, DatasetError> {
    if !(0.0..=1.0).contains(&test_fraction) {
        return Err(DatasetError::TestFraction(test_fraction));
    }

    let mut participants: Vec<u8> = records
        .iter()
        .map(|r| r.id.participant())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let n = participants.len();
    let mut n_test = (test_fraction * n as f64).round() as usize;
    if test_fraction > 0.0 && test_fraction < 1.0 && n >= 2 {
        n_test = n_test.clamp(1, n - 1);
    }

    let mut rng = StdRng::seed_from_u64(seed);
    participants.shuffle(&mut rng);
    let mut test_participants = participants[..n_test].to_vec();
    test_participants.sort_unstable();

    let (test, train): (Vec<_>, Vec<_>) = records
        .into_iter()
        .partition(|r| test_participants.binary_search(&r.id.participant()).is_ok());

    Ok(Split {
        train,
        test,
        test_participants,
    })
}
