use serde::{Deserialize, Serialize};

/// Tolerance used when comparing layout coordinates read back from a host.
pub const EPSILON: f32 = 0.01;

/// A box in the coordinate space of some reference ancestor.
///
/// Unlike a paint rectangle this is oriented around the vertical flow: `top`
/// grows downwards and `bottom()` is derived.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub top: f32,
    pub left: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(top: f32, left: f32, width: f32, height: f32) -> Self {
        Self {
            top,
            left,
            width,
            height,
        }
    }

    pub fn zero_height(top: f32, left: f32, width: f32) -> Self {
        Self::new(top, left, width, 0.0)
    }

    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }

    pub fn right(&self) -> f32 {
        self.left + self.width
    }

    /// Smallest rectangle covering both `self` and `other`.
    pub fn union(&self, other: &Rect) -> Rect {
        let top = self.top.min(other.top);
        let left = self.left.min(other.left);
        let bottom = self.bottom().max(other.bottom());
        let right = self.right().max(other.right());
        Rect {
            top,
            left,
            width: right - left,
            height: bottom - top,
        }
    }

    /// Translates the rectangle into the coordinate space whose origin is `origin`.
    pub fn relative_to(&self, origin: &Rect) -> Rect {
        Rect {
            top: self.top - origin.top,
            left: self.left - origin.left,
            width: self.width,
            height: self.height,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.height <= 0.0 && self.width <= 0.0
    }
}

/// Union of an iterator of rectangles, `None` when the iterator is empty.
pub fn union_all<'a>(rects: impl IntoIterator<Item = &'a Rect>) -> Option<Rect> {
    rects
        .into_iter()
        .fold(None, |acc: Option<Rect>, r| match acc {
            Some(a) => Some(a.union(r)),
            None => Some(*r),
        })
}

/// Robust floating point equality for layout calculations.
pub fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

/// `a <= b` allowing for subpixel noise.
pub fn approx_le(a: f32, b: f32) -> bool {
    a <= b + EPSILON
}
