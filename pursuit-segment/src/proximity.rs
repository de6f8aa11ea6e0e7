use pursuit_core::{BoundaryPolicy, Point, Sample};

/// Boundary at the sample closest to the vertex (Euclidean). Ties go to the
/// earliest sample.
#[derive(Debug, Clone, Copy, Default)]
pub struct VertexProximity;

impl BoundaryPolicy for VertexProximity {
    fn locate(&self, samples: &[Sample], from: usize, vertex: Point) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (i, s) in samples.iter().enumerate().skip(from) {
            let (x, y) = s.position();
            let d = vertex.distance_sq(x, y);
            // strict `<` keeps the first arrival on ties
            if best.is_none_or(|(_, bd)| d < bd) {
                best = Some((i, d));
            }
        }
        best.map(|(i, _)| i)
    }

    fn name(&self) -> &'static str {
        "vertex-proximity"
    }
}
