//! Page geometry.

use serde::{Deserialize, Serialize};

/// An axis-aligned bounding box in page coordinates (origin top-left, Y grows downward).
///
/// Serialized as a `[x0, y0, x1, y1]` array, the same order used by the
/// `##x0;y0;x1;y1##` table markers.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f32; 4]", into = "[f32; 4]")]
pub struct BBox {
    /// Left edge
    pub x0: f32,
    /// Top edge
    pub y0: f32,
    /// Right edge
    pub x1: f32,
    /// Bottom edge
    pub y1: f32,
}

impl BBox {
    /// Create a bounding box from its corners.
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Parse the coordinate payload of a table marker (`"x0;y0;x1;y1"`).
    pub fn from_marker(coords: &str) -> Option<Self> {
        let values: Vec<f32> = coords
            .split(';')
            .map(|c| c.trim().parse::<f32>())
            .collect::<std::result::Result<_, _>>()
            .ok()?;
        match values.as_slice() {
            [x0, y0, x1, y1] => Some(Self::new(*x0, *y0, *x1, *y1)),
            _ => None,
        }
    }

    /// Width of the box.
    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    /// Height of the box.
    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }

    /// Same horizontal extent, new vertical extent.
    pub fn with_vertical(&self, y0: f32, y1: f32) -> Self {
        Self::new(self.x0, y0, self.x1, y1)
    }

    /// Check whether two boxes overlap with a non-empty area.
    pub fn intersects(&self, other: &BBox) -> bool {
        self.x0 < other.x1 && other.x0 < self.x1 && self.y0 < other.y1 && other.y0 < self.y1
    }

    /// Check whether `other` lies inside this box, allowing `tolerance` points of slack.
    pub fn contains(&self, other: &BBox, tolerance: f32) -> bool {
        other.x0 >= self.x0 - tolerance
            && other.y0 >= self.y0 - tolerance
            && other.x1 <= self.x1 + tolerance
            && other.y1 <= self.y1 + tolerance
    }
}

impl From<[f32; 4]> for BBox {
    fn from(c: [f32; 4]) -> Self {
        Self::new(c[0], c[1], c[2], c[3])
    }
}

impl From<BBox> for [f32; 4] {
    fn from(b: BBox) -> Self {
        [b.x0, b.y0, b.x1, b.y1]
    }
}
