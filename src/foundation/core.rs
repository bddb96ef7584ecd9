pub use kurbo::{Affine, BezPath, Point, Rect, Vec2};

/// Integer device rectangle anchored at its top-left corner.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct IntRect {
    /// Left edge.
    pub x: i32,
    /// Top edge.
    pub y: i32,
    /// Width in device pixels. Zero or negative means empty.
    pub width: i32,
    /// Height in device pixels. Zero or negative means empty.
    pub height: i32,
}

impl IntRect {
    /// Rectangle from origin and size.
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle covering `0..width` x `0..height`.
    pub fn from_size(width: u32, height: u32) -> Self {
        Self::new(
            0,
            0,
            i32::try_from(width).unwrap_or(i32::MAX),
            i32::try_from(height).unwrap_or(i32::MAX),
        )
    }

    /// Exclusive right edge.
    pub fn right(&self) -> i32 {
        self.x.saturating_add(self.width)
    }

    /// Exclusive bottom edge.
    pub fn bottom(&self) -> i32 {
        self.y.saturating_add(self.height)
    }

    /// True when the rectangle covers no pixels.
    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Whether the pixel at `(x, y)` lies inside.
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Overlap of two rectangles; empty rectangles come back with zero size.
    pub fn intersect(&self, other: &IntRect) -> IntRect {
        let x0 = self.x.max(other.x);
        let y0 = self.y.max(other.y);
        let x1 = self.right().min(other.right());
        let y1 = self.bottom().min(other.bottom());
        IntRect::new(x0, y0, x1.saturating_sub(x0).max(0), y1.saturating_sub(y0).max(0))
    }

    /// Smallest integer rectangle containing `rect`.
    pub fn round_out(rect: Rect) -> IntRect {
        let lo = f64::from(i32::MIN);
        let hi = f64::from(i32::MAX);
        let x0 = rect.x0.min(rect.x1).floor().clamp(lo, hi);
        let y0 = rect.y0.min(rect.y1).floor().clamp(lo, hi);
        let x1 = rect.x0.max(rect.x1).ceil().clamp(lo, hi);
        let y1 = rect.y0.max(rect.y1).ceil().clamp(lo, hi);
        IntRect::new(
            x0 as i32,
            y0 as i32,
            (x1 - x0).min(hi) as i32,
            (y1 - y0).min(hi) as i32,
        )
    }

    /// Same rectangle in floating point.
    pub fn to_rect(&self) -> Rect {
        Rect::new(
            f64::from(self.x),
            f64::from(self.y),
            f64::from(self.right()),
            f64::from(self.bottom()),
        )
    }
}

/// Source and destination rectangles of a copy or composite.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct TwoRect {
    /// Area read from the source.
    pub src: IntRect,
    /// Area written on the destination.
    pub dest: IntRect,
}

impl TwoRect {
    /// Pair a source and destination rectangle.
    pub const fn new(src: IntRect, dest: IntRect) -> Self {
        Self { src, dest }
    }

    /// Same rectangle on both sides.
    pub const fn identity(rect: IntRect) -> Self {
        Self {
            src: rect,
            dest: rect,
        }
    }

    /// Any non-positive width or height on either side.
    pub fn is_invalid(&self) -> bool {
        self.src.width <= 0 || self.src.height <= 0 || self.dest.width <= 0 || self.dest.height <= 0
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
