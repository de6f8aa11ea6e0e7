//! Splits a trial into its five geometric sub-trials.
//!
//! The path is traced in a fixed order, so boundaries are found by a single
//! forward scan: the boundary for vertex `k` is searched only among samples
//! not yet claimed by sub-trials `1..k`.

pub mod proximity;
pub mod segmenter;

pub use proximity::VertexProximity;
pub use segmenter::{MIN_SAMPLES, SegmentError, Segmentation, Segmenter};
