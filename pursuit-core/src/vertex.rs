use crate::constants::{COORD_MAX, SUBTRIALS_PER_TRIAL};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_sq(&self, x: f64, y: f64) -> f64 {
        let dx = self.x - x;
        let dy = self.y - y;
        dx * dx + dy * dy
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum VertexError {
    #[error("vertex table needs exactly {expected} vertices, got {got}")]
    Count { expected: usize, got: usize },

    #[error("vertex {index} at ({x}, {y}) lies outside the 0..={max} screen")]
    OutOfBounds { index: usize, x: f64, y: f64, max: u16 },
}

/// Reference vertices of the star pentagon in tracing order.
///
/// Index 0 is the start circle. The boundary between sub-trial `k` and
/// `k + 1` is placed by proximity to vertex `k`, for `k` in `1..=4`.
#[derive(Debug, Clone, PartialEq)]
pub struct VertexTable {
    vertices: [Point; SUBTRIALS_PER_TRIAL],
}

impl VertexTable {
    pub fn new(vertices: [Point; SUBTRIALS_PER_TRIAL]) -> Result<Self, VertexError> {
        let max = COORD_MAX as f64;
        for (index, v) in vertices.iter().enumerate() {
            let inside = |c: f64| c.is_finite() && (0.0..=max).contains(&c);
            if !inside(v.x) || !inside(v.y) {
                return Err(VertexError::OutOfBounds {
                    index,
                    x: v.x,
                    y: v.y,
                    max: COORD_MAX,
                });
            }
        }
        Ok(Self { vertices })
    }

    /// Builds a table from `[x, y]` pairs, as they appear in config files.
    pub fn from_pairs(pairs: &[[f64; 2]]) -> Result<Self, VertexError> {
        let points: Vec<Point> = pairs.iter().map(|[x, y]| Point::new(*x, *y)).collect();
        let vertices: [Point; SUBTRIALS_PER_TRIAL] =
            points.try_into().map_err(|p: Vec<Point>| VertexError::Count {
                expected: SUBTRIALS_PER_TRIAL,
                got: p.len(),
            })?;
        Self::new(vertices)
    }

    pub fn start(&self) -> Point {
        self.vertices[0]
    }

    pub fn vertices(&self) -> &[Point; SUBTRIALS_PER_TRIAL] {
        &self.vertices
    }

    /// Vertices that close sub-trials `1..=4`, in order.
    pub fn boundary_vertices(&self) -> &[Point] {
        &self.vertices[1..]
    }
}
