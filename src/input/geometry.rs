//! Bounding boxes and the sibling-similarity test used to recognize feeds.

/// How far apart, in pixels, two widths (or heights) may be while still
/// counting as the same.
pub const SIMILARITY_TOLERANCE: f64 = 2.0;

/// A rendered bounding box in document pixels.
#[derive(Copy, Clone, Serialize, Deserialize, Debug, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Rect {
        Rect {
            x: x,
            y: y,
            width: width,
            height: height,
        }
    }

    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// Determines whether `a` and `b` look like two entries of the same list.
///
/// Boxes stacked vertically (a column) must share a width; boxes side by
/// side (a row) must share a height. A column entry with zero height is
/// not rendered and never similar.
pub fn is_similar(a: &Rect, b: &Rect) -> bool {
    let (ax, ay) = a.center();
    let (bx, by) = b.center();
    if (ay - by).abs() > (ax - bx).abs() {
        if b.height == 0.0 {
            return false;
        }
        (a.width - b.width).abs() <= SIMILARITY_TOLERANCE
    } else {
        (a.height - b.height).abs() <= SIMILARITY_TOLERANCE
    }
}
