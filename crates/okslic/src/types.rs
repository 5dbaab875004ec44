use rgb::RGB8;
use std::cmp::Ordering;

/// A superpixel representative: a sub-pixel position and the mean sRGB color
/// of its members.
///
/// Identity is positional. Two centroids compare equal when their positions
/// match, whatever their colors; ordering is by `(y, x)`.
#[derive(Debug, Copy, Clone)]
pub struct Centroid {
    pub x: f32,
    pub y: f32,
    pub color: RGB8,
}

impl Centroid {
    pub fn new(x: f32, y: f32, color: RGB8) -> Self {
        Self { x, y, color }
    }

    /// Squared euclidean distance between the centroid and a pixel position.
    #[inline(always)]
    pub(crate) fn spatial_squared_distance(&self, x: f32, y: f32) -> f32 {
        let dx = self.x - x;
        let dy = self.y - y;
        dx.mul_add(dx, dy * dy)
    }

    /// `|dx| + |dy|` between two centroid positions.
    #[inline]
    pub fn displacement(&self, other: &Self) -> f32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }
}

impl PartialEq for Centroid {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Centroid {}

impl PartialOrd for Centroid {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Centroid {
    fn cmp(&self, other: &Self) -> Ordering {
        self.y
            .total_cmp(&other.y)
            .then_with(|| self.x.total_cmp(&other.x))
    }
}
