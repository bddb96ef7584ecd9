use kurbo::{Affine, BezPath, Point, Rect, Shape};

use crate::foundation::config::RenderMethod;
use crate::foundation::core::IntRect;
use crate::paint::color::RenderColor;
use crate::paint::paint::{FillRule, Paint};
use crate::render::pixels::Image;

/// Counters kept by a canvas, for diagnostics and tests.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CanvasStats {
    /// Clip paths applied.
    pub clips: u64,
    /// Primitives drawn (paths, rects, points, lines, images, clears).
    pub draws: u64,
    /// `save` calls.
    pub saves: u64,
    /// `restore` calls that popped a state.
    pub restores: u64,
    /// `flush` calls.
    pub flushes: u64,
}

/// Drawing destination of a surface.
///
/// The save stack follows the usual convention: a pristine canvas has a save count of 1 and
/// `restore` never pops below it.
pub trait Canvas {
    /// Width in device pixels.
    fn width(&self) -> u32;
    /// Height in device pixels.
    fn height(&self) -> u32;
    /// Tier backing this canvas.
    fn method(&self) -> RenderMethod;

    /// Push the current transform and clip.
    fn save(&mut self);
    /// Pop the last pushed state. Does nothing on a pristine canvas.
    fn restore(&mut self);
    /// Depth of the save stack, 1 when nothing is saved.
    fn save_count(&self) -> usize;

    /// Intersect the clip with `path` (mapped by the current transform).
    fn clip_path(&mut self, path: &BezPath, fill: FillRule, anti_alias: bool);
    /// Intersect the clip with `rect`.
    fn clip_rect(&mut self, rect: Rect, anti_alias: bool) {
        self.clip_path(&rect.to_path(0.1), FillRule::NonZero, anti_alias);
    }
    /// Pre-multiply the current transform by `transform`.
    fn concat(&mut self, transform: Affine);
    /// Current transform.
    fn total_matrix(&self) -> Affine;

    /// Replace every pixel inside the clip with `color`.
    fn clear(&mut self, color: RenderColor);
    /// Fill or stroke `path` with `paint`.
    fn draw_path(&mut self, path: &BezPath, fill: FillRule, paint: &Paint);
    /// Fill or stroke `rect`.
    fn draw_rect(&mut self, rect: Rect, paint: &Paint) {
        self.draw_path(&rect.to_path(0.1), FillRule::NonZero, paint);
    }
    /// Paint the single device pixel containing `(x, y)`.
    fn draw_point(&mut self, x: f64, y: f64, paint: &Paint);
    /// Stroke the segment from `p0` to `p1`.
    fn draw_line(&mut self, p0: Point, p1: Point, paint: &Paint) {
        let mut path = BezPath::new();
        path.move_to(p0);
        path.line_to(p1);
        let mut stroke_paint = paint.clone();
        stroke_paint.style = crate::paint::paint::PaintStyle::Stroke;
        self.draw_path(&path, FillRule::NonZero, &stroke_paint);
    }
    /// Draw the `src` part of `image` scaled into `dst`.
    fn draw_image_rect(&mut self, image: &Image, src: Rect, dst: Rect, paint: &Paint);
    /// Draw `image` unscaled with its top-left corner at `(x, y)`.
    fn draw_image(&mut self, image: &Image, x: f64, y: f64, paint: &Paint) {
        let (w, h) = (f64::from(image.width()), f64::from(image.height()));
        self.draw_image_rect(
            image,
            Rect::new(0.0, 0.0, w, h),
            Rect::new(x, y, x + w, y + h),
            paint,
        );
    }

    /// Immutable copy of the current pixels.
    fn snapshot(&mut self) -> Image;
    /// Immutable copy of `rect` (clamped to the canvas).
    fn snapshot_rect(&mut self, rect: IntRect) -> Image;
    /// Submit pending work to the device.
    fn flush(&mut self);
    /// Counters.
    fn stats(&self) -> CanvasStats {
        CanvasStats::default()
    }
}
