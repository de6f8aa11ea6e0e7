use crate::trial::Sample;
use crate::vertex::Point;

/// Decides where a sub-trial ends.
///
/// `locate` searches `samples[from..]` and returns the absolute index of the
/// boundary sample for `vertex`, or `None` when the window is empty. The
/// returned index must be `>= from` so boundaries never move backwards.
pub trait BoundaryPolicy: Send + Sync + std::fmt::Debug {
    fn locate(&self, samples: &[Sample], from: usize, vertex: Point) -> Option<usize>;

    fn name(&self) -> &'static str;
}
