use std::path::Path;
use std::rc::Rc;
use std::sync::Arc;

use anyhow::Context as _;
use kurbo::{Affine, BezPath, Cap, Join, Point, Rect, Shape, Stroke, Vec2};

use crate::backend::clip::ClipState;
use crate::backend::composite;
use crate::backend::flush::FlushScheduler;
use crate::backend::platform::{EventLoop, GeometryProvider, GpuPlatform};
use crate::backend::surface::{SharedSurface, SurfaceManager};
use crate::backend::xor::XorEmulator;
use crate::foundation::config::{GraphicsOpts, RenderConfig, RenderMethod};
use crate::foundation::core::{IntRect, TwoRect};
use crate::foundation::error::{RasterError, RasterResult};
use crate::geometry::polygon::{
    PolyPolygon, Polygon, poly_polygon_to_path, polygon_to_path, snap_hairline_edges,
};
use crate::geometry::region::Region;
use crate::paint::blend::BlendMode;
use crate::paint::color::{
    Color, RenderColor, RopColor, from_render_color, to_render_color,
    to_render_color_with_transparency,
};
use crate::paint::paint::{FillRule, Paint, Shader};
use crate::render::bitmap::{Bitmap, RenderableBitmap};
use crate::render::canvas::{Canvas, CanvasStats};
use crate::render::pixels::{AlphaType, Image, PixelBuffer};

/// Stroke offset on raster surfaces; lands hairlines on pixel centers after antialiasing.
const RASTER_STROKE_OFFSET: f64 = 0.25;
/// Stroke offset on GPU surfaces.
const GPU_STROKE_OFFSET: f64 = 0.5;
/// Polylines are always offset to pixel centers.
const POLYLINE_OFFSET: f64 = 0.5;
/// Widest line that may be drawn with [`LineJoin::None`].
const MAX_UNJOINED_WIDTH: f64 = 1.3;

/// Process-lifetime collaborators shared by every graphics backend.
#[derive(Clone)]
pub struct BackendEnv {
    /// Backend selection, including the sticky "GPU disabled" state.
    pub config: Arc<RenderConfig>,
    /// Presentation contexts and shared GPU state.
    pub platform: Rc<dyn GpuPlatform>,
    /// Idle scheduling for deferred flushes.
    pub event_loop: Rc<dyn EventLoop>,
}

/// How polyline segments are joined.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum LineJoin {
    /// No join. Only acceptable for thin lines, drawn as miter.
    None,
    /// Beveled corners.
    Bevel,
    /// Mitered corners, limited by the minimum miter angle.
    #[default]
    Miter,
    /// Rounded corners.
    Round,
}

/// How open polyline ends are capped.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum LineCap {
    /// Flat end at the endpoint.
    #[default]
    Butt,
    /// Semicircle past the endpoint.
    Round,
    /// Square past the endpoint.
    Square,
}

/// Flavor of [`GraphicsBackend::invert_polygon`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum InvertMode {
    /// Invert the whole area.
    #[default]
    Solid,
    /// Invert a dashed two pixel frame along the outline.
    TrackFrame,
    /// Invert every other 2x2 cell of a 4x4 checkerboard.
    Checker,
}

/// Optional capabilities a caller may ask about.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OutputSupport {
    /// Transformed vector polygons and polylines.
    B2DDraw,
    /// Rectangles with a transparency percentage.
    TransparentRect,
    /// Native Bezier primitives.
    Bezier,
    /// Native gradients.
    Gradient,
    /// Encapsulated PostScript.
    Eps,
}

/// Point kind in a Bezier point array.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PolyFlag {
    /// On-curve point.
    Normal,
    /// Off-curve control point.
    Control,
}

/// Two-color axial gradient.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Gradient {
    /// Start color.
    pub start: Color,
    /// End color.
    pub end: Color,
    /// Angle in degrees, counter-clockwise.
    pub angle: f64,
}

/// Device-independent drawing backend for one drawable.
///
/// Owns the drawable's surface, its clip region, XOR emulation state and flush scheduling.
/// Every drawing entry point ensures the surface exists (recreating it after a resize), draws
/// into it (or into the XOR session buffer), and then either flushes or schedules a flush.
pub struct GraphicsBackend {
    geometry: Rc<dyn GeometryProvider>,
    opts: GraphicsOpts,
    surfaces: SurfaceManager,
    clip: ClipState,
    xor: XorEmulator,
    flush: FlushScheduler,
    line_color: Option<Color>,
    fill_color: Option<Color>,
}

impl GraphicsBackend {
    /// Backend for `geometry`. The surface is created on first use.
    pub fn new(env: &BackendEnv, geometry: Rc<dyn GeometryProvider>, opts: GraphicsOpts) -> Self {
        Self {
            geometry,
            surfaces: SurfaceManager::new(Arc::clone(&env.config), Rc::clone(&env.platform)),
            clip: ClipState::default(),
            xor: XorEmulator::default(),
            flush: FlushScheduler::new(Rc::clone(&env.event_loop), opts.flush_pixel_threshold),
            opts,
            line_color: None,
            fill_color: None,
        }
    }

    /// Create the surface now instead of on first draw.
    pub fn init(&mut self) {
        self.ensure_surface();
    }

    /// Release the surface. The next drawing call creates a new one.
    pub fn deinit(&mut self) {
        self.destroy_surface();
    }

    /// Whether the current surface is GPU-backed.
    pub fn is_gpu(&self) -> bool {
        self.surfaces.is_gpu()
    }

    /// Options in effect.
    pub fn opts(&self) -> &GraphicsOpts {
        &self.opts
    }

    /// Toggle antialiasing of vector drawing.
    pub fn set_antialias(&mut self, antialias: bool) {
        self.opts.antialias = antialias;
    }

    /// Counters of the current surface's canvas.
    pub fn surface_stats(&self) -> Option<CanvasStats> {
        self.surfaces.current().map(|s| s.borrow().canvas().stats())
    }

    /// Save depth of the current surface's canvas.
    pub fn surface_save_count(&self) -> Option<usize> {
        self.surfaces.current().map(|s| s.borrow().canvas().save_count())
    }

    /// Size of the current surface.
    pub fn surface_size(&self) -> Option<(u32, u32)> {
        self.surfaces.current().map(|s| {
            let s = s.borrow();
            (s.width(), s.height())
        })
    }

    /// Raw pixels drawn since the last pressure flush.
    pub fn pending_pixels(&self) -> u64 {
        self.flush.pending_pixels()
    }

    /// Color depth of every surface.
    pub fn bit_count(&self) -> u16 {
        32
    }

    /// Width of the drawable.
    pub fn graphics_width(&self) -> u32 {
        self.geometry.width()
    }

    /// Whether an optional capability is available.
    pub fn supports_operation(&self, op: OutputSupport) -> bool {
        matches!(op, OutputSupport::B2DDraw | OutputSupport::TransparentRect)
    }

    fn ensure_surface(&mut self) -> SharedSurface {
        let width = self.geometry.width().max(1);
        let height = self.geometry.height().max(1);
        if let Some(surface) = self.surfaces.current() {
            let size = {
                let s = surface.borrow();
                (s.width(), s.height())
            };
            if size == (width, height) || self.opts.avoid_resize_recreation {
                return surface;
            }
            tracing::info!(
                old_width = size.0,
                old_height = size.1,
                width,
                height,
                "recreating surface after resize"
            );
            self.destroy_surface();
        }
        let surface = self.surfaces.create(self.geometry.as_ref());
        let (w, h) = {
            let s = surface.borrow();
            (s.width(), s.height())
        };
        self.clip.reset_to(w, h);
        self.flush.reset_for_new_surface();
        surface
    }

    fn destroy_surface(&mut self) {
        self.flush.stop();
        self.xor.reset();
        self.surfaces.destroy();
    }

    fn pre_draw(&mut self) -> SharedSurface {
        let surface = self.ensure_surface();
        debug_assert!(!self.xor.is_enabled() || self.xor.is_idle());
        surface
    }

    fn post_draw(&mut self, surface: &SharedSurface) {
        if self.xor.is_enabled() {
            let mut s = surface.borrow_mut();
            self.xor.apply(s.canvas_mut());
        }
        if !self.geometry.is_offscreen() {
            self.flush.after_draw(surface);
        }
        let mut s = surface.borrow_mut();
        self.flush.check_pressure(&mut s);
    }

    /// Run one drawing operation on the draw canvas (the surface, or the XOR session while XOR
    /// mode is on). `bound` is the device area the operation may touch; `None` means anywhere.
    fn draw(&mut self, bound: Option<Rect>, op: impl FnOnce(&mut dyn Canvas, RenderMethod)) {
        let surface = self.pre_draw();
        {
            let mut s = surface.borrow_mut();
            let method = s.method();
            if self.xor.is_enabled() {
                let (w, h) = (s.width(), s.height());
                if let Some(canvas) = self.xor.session_canvas(w, h, self.clip.region()) {
                    op(canvas, method);
                }
            } else {
                op(s.canvas_mut(), method);
            }
        }
        if let Some(bound) = bound {
            self.xor.extend(bound);
        }
        self.post_draw(&surface);
    }

    /// Flush and present now.
    pub fn perform_flush(&mut self) {
        if let Some(surface) = self.surfaces.current() {
            self.flush.flush_now(&surface);
        }
    }

    /// Line color for outlines, or `None` to draw no outlines.
    pub fn set_line_color(&mut self, color: Option<Color>) {
        self.line_color = color;
    }

    /// Fill color for areas, or `None` to draw no fills.
    pub fn set_fill_color(&mut self, color: Option<Color>) {
        self.fill_color = color;
    }

    /// Line color from a raster operation.
    pub fn set_rop_line_color(&mut self, rop: RopColor) {
        self.line_color = Some(rop.color());
    }

    /// Fill color from a raster operation.
    pub fn set_rop_fill_color(&mut self, rop: RopColor) {
        self.fill_color = Some(rop.color());
    }

    /// Enable or disable XOR drawing.
    pub fn set_xor_mode(&mut self, enabled: bool) {
        if self.xor.is_enabled() != enabled {
            self.xor.set_enabled(enabled);
        }
    }

    /// Whether XOR drawing is on.
    pub fn is_xor_mode(&self) -> bool {
        self.xor.is_enabled()
    }

    /// Current clip region.
    pub fn clip_region(&self) -> &Region {
        self.clip.region()
    }

    /// Replace the clip region. Setting the current region again touches nothing.
    pub fn set_clip_region(&mut self, region: &Region) -> bool {
        if self.surfaces.current().is_some() && self.clip.is_current(region) {
            return true;
        }
        let surface = self.ensure_surface();
        tracing::debug!(?region, "setclipregion");
        let mut s = surface.borrow_mut();
        self.clip.replace(region.clone(), s.canvas_mut());
        true
    }

    /// Clip to the whole drawable.
    pub fn reset_clip_region(&mut self) {
        let region = Region::from_rect(IntRect::from_size(
            self.geometry.width().max(1),
            self.geometry.height().max(1),
        ));
        self.set_clip_region(&region);
    }

    /// Set one pixel to the line color.
    pub fn draw_pixel(&mut self, x: i32, y: i32) {
        if let Some(color) = self.line_color {
            self.draw_pixel_color(x, y, color);
        }
    }

    /// Set one pixel to `color`, replacing the destination including alpha.
    pub fn draw_pixel_color(&mut self, x: i32, y: i32, color: Color) {
        tracing::debug!(x, y, ?color, "drawpixel");
        let paint = Paint::fill(to_render_color(color)).with_blend(BlendMode::Src);
        let (fx, fy) = (f64::from(x), f64::from(y));
        self.draw(Some(Rect::new(fx, fy, fx + 1.0, fy + 1.0)), |canvas, _| {
            canvas.draw_point(fx + 0.5, fy + 0.5, &paint);
        });
    }

    /// Hairline from `(x1, y1)` to `(x2, y2)` in the line color.
    pub fn draw_line(&mut self, x1: i32, y1: i32, x2: i32, y2: i32) {
        let Some(color) = self.line_color else {
            return;
        };
        tracing::debug!(x1, y1, x2, y2, ?color, "drawline");
        let paint = Paint::stroke(to_render_color(color)).with_anti_alias(self.opts.antialias);
        let p1 = Point::new(f64::from(x1), f64::from(y1));
        let p2 = Point::new(f64::from(x2), f64::from(y2));
        let bound = Rect::from_points(p1, p2);
        let bound = Rect::new(bound.x0, bound.y0, bound.x1 + 1.0, bound.y1 + 1.0);
        self.draw(Some(bound), |canvas, method| {
            let off = stroke_offset(method);
            canvas.draw_line(p1 + Vec2::new(off, off), p2 + Vec2::new(off, off), &paint);
        });
    }

    /// Rectangle filled with the fill color and outlined with the line color, never antialiased.
    pub fn draw_rect(&mut self, x: i32, y: i32, width: i32, height: i32) {
        self.draw_alpha_rect_inner(x, y, width, height, 0.0, true);
    }

    /// Rectangle drawn with `transparency_percent` (0 = opaque, 100 = invisible).
    pub fn draw_alpha_rect(
        &mut self,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        transparency_percent: u8,
    ) -> bool {
        let t = f64::from(transparency_percent.min(100)) / 100.0;
        self.draw_alpha_rect_inner(x, y, width, height, t, false);
        true
    }

    fn draw_alpha_rect_inner(
        &mut self,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        transparency: f64,
        block_aa: bool,
    ) {
        let (fill, line) = (self.fill_color, self.line_color);
        if fill.is_none() && line.is_none() {
            return;
        }
        tracing::debug!(x, y, width, height, transparency, "drawrect");
        let anti_alias = !block_aa && self.opts.antialias;
        let (fx, fy) = (f64::from(x), f64::from(y));
        let (fw, fh) = (f64::from(width), f64::from(height));
        self.draw(Some(Rect::new(fx, fy, fx + fw, fy + fh)), |canvas, _| {
            if let Some(fill) = fill {
                let paint = Paint::fill(to_render_color_with_transparency(fill, transparency))
                    .with_anti_alias(anti_alias);
                canvas.draw_rect(Rect::new(fx, fy, fx + fw, fy + fh), &paint);
            }
            if let Some(line) = line {
                // Hairline through the centers of the outermost pixel rows and columns.
                let paint = Paint::stroke(to_render_color_with_transparency(line, transparency))
                    .with_anti_alias(anti_alias);
                canvas.draw_rect(
                    Rect::new(fx + 0.5, fy + 0.5, fx + fw - 0.5, fy + fh - 0.5),
                    &paint,
                );
            }
        });
    }

    /// Open polyline through `points`, one unit wide.
    pub fn draw_polyline(&mut self, points: &[Point]) {
        self.draw_poly_line_b2d(
            Affine::IDENTITY,
            &Polygon::open(points.to_vec()),
            0.0,
            Vec2::new(1.0, 1.0),
            LineJoin::Miter,
            LineCap::Butt,
            15f64.to_radians(),
            false,
        );
    }

    /// Closed polygon through `points`.
    pub fn draw_polygon(&mut self, points: &[Point]) {
        let poly = PolyPolygon::from(Polygon::closed(points.to_vec()));
        self.draw_poly_polygon_b2d(Affine::IDENTITY, &poly, 0.0);
    }

    /// Closed polygons filled together under the even-odd rule.
    pub fn draw_poly_polygon(&mut self, polygons: &[Vec<Point>]) {
        let poly = PolyPolygon::new(polygons.iter().map(|p| Polygon::closed(p.clone())).collect());
        self.draw_poly_polygon_b2d(Affine::IDENTITY, &poly, 0.0);
    }

    /// Fill and outline `polygons` mapped through `transform`.
    ///
    /// Returns `true` (handled) also when nothing is drawn: empty geometry, no colors, or a
    /// transparency outside `[0, 1)`.
    pub fn draw_poly_polygon_b2d(
        &mut self,
        transform: Affine,
        polygons: &PolyPolygon,
        transparency: f64,
    ) -> bool {
        let fill = self.fill_color;
        let line = self.line_color;
        if polygons.polygons().iter().all(Polygon::is_empty)
            || (fill.is_none() && line.is_none())
            || !(0.0..1.0).contains(&transparency)
        {
            return true;
        }
        tracing::debug!(polygons = polygons.len(), transparency, "drawpolypolygon");
        let path = poly_polygon_to_path(&polygons.transformed(transform));
        let anti_alias = self.opts.antialias;
        self.draw(Some(path.bounding_box()), |canvas, method| {
            if let Some(fill) = fill {
                let paint = Paint::fill(to_render_color_with_transparency(fill, transparency))
                    .with_anti_alias(anti_alias);
                canvas.draw_path(&path, FillRule::EvenOdd, &paint);
            }
            if let Some(line) = line {
                let off = stroke_offset(method);
                let mut outline = path.clone();
                outline.apply_affine(Affine::translate((off, off)));
                let paint = Paint::stroke(to_render_color_with_transparency(line, transparency))
                    .with_anti_alias(anti_alias);
                canvas.draw_path(&outline, FillRule::EvenOdd, &paint);
            }
        });
        true
    }

    /// Stroke `polyline` mapped through `transform`.
    ///
    /// `line_widths` are in object units; `miter_minimum_angle` is in radians. Returns `false`
    /// (not handled) for unjoined lines wider than 1.3 device units.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_poly_line_b2d(
        &mut self,
        transform: Affine,
        polyline: &Polygon,
        transparency: f64,
        line_widths: Vec2,
        join: LineJoin,
        cap: LineCap,
        miter_minimum_angle: f64,
        pixel_snap_hairline: bool,
    ) -> bool {
        let Some(line) = self.line_color else {
            return true;
        };
        if polyline.is_empty() || !(0.0..1.0).contains(&transparency) {
            return true;
        }

        let [a, b, c, d, _, _] = transform.as_coeffs();
        let device = Vec2::new(
            a * line_widths.x + c * line_widths.y,
            b * line_widths.x + d * line_widths.y,
        );
        let widths = if device.x < 1.0 && line_widths.x >= 1.0 {
            line_widths
        } else {
            device
        };
        if join == LineJoin::None && widths.x > MAX_UNJOINED_WIDTH {
            return false;
        }

        tracing::debug!(points = polyline.len(), width = widths.x, ?join, ?cap, "drawpolyline");
        let mut device_line = polyline.transformed(transform);
        if pixel_snap_hairline {
            device_line = snap_hairline_edges(&device_line);
        }
        let mut path = polygon_to_path(&device_line);
        path.apply_affine(Affine::translate((POLYLINE_OFFSET, POLYLINE_OFFSET)));

        let stroke = Stroke::new(widths.x)
            .with_join(match join {
                LineJoin::Bevel => Join::Bevel,
                LineJoin::Round => Join::Round,
                LineJoin::None | LineJoin::Miter => Join::Miter,
            })
            .with_miter_limit(1.0 / (miter_minimum_angle / 2.0).sin())
            .with_caps(match cap {
                LineCap::Butt => Cap::Butt,
                LineCap::Round => Cap::Round,
                LineCap::Square => Cap::Square,
            });
        let paint = Paint::stroke(to_render_color_with_transparency(line, transparency))
            .with_anti_alias(self.opts.antialias)
            .with_stroke(stroke);
        let half = widths.x.max(1.0) / 2.0;
        let bound = path.bounding_box().inflate(half, half);
        self.draw(Some(bound), |canvas, _| {
            canvas.draw_path(&path, FillRule::EvenOdd, &paint);
        });
        true
    }

    /// Bezier polylines are not handled by this backend.
    pub fn draw_poly_line_bezier(&mut self, _points: &[Point], _flags: &[PolyFlag]) -> bool {
        false
    }

    /// Bezier polygons are not handled by this backend.
    pub fn draw_polygon_bezier(&mut self, _points: &[Point], _flags: &[PolyFlag]) -> bool {
        false
    }

    /// Bezier poly-polygons are not handled by this backend.
    pub fn draw_poly_polygon_bezier(&mut self, _polygons: &[(Vec<Point>, Vec<PolyFlag>)]) -> bool {
        false
    }

    /// Encapsulated PostScript is not handled by this backend.
    pub fn draw_eps(&mut self, _area: IntRect, _data: &[u8]) -> bool {
        false
    }

    /// Native gradients are not handled by this backend.
    pub fn draw_gradient(&mut self, _polygons: &PolyPolygon, _gradient: &Gradient) -> bool {
        false
    }

    fn snapshot_own(&mut self) -> Image {
        let surface = self.ensure_surface();
        let mut s = surface.borrow_mut();
        s.canvas_mut().snapshot()
    }

    /// Copy a `width` x `height` area from `(src_x, src_y)` to `(dest_x, dest_y)`.
    pub fn copy_area(
        &mut self,
        dest_x: i32,
        dest_y: i32,
        src_x: i32,
        src_y: i32,
        width: i32,
        height: i32,
    ) {
        if (dest_x, dest_y) == (src_x, src_y) {
            return;
        }
        tracing::debug!(dest_x, dest_y, src_x, src_y, width, height, "copyarea");
        let image = self.snapshot_own();
        let src = IntRect::new(src_x, src_y, width, height).to_rect();
        let dest = IntRect::new(dest_x, dest_y, width, height).to_rect();
        let paint = Paint::default().with_blend(BlendMode::Src);
        self.draw(Some(dest), |canvas, _| canvas.draw_image_rect(&image, src, dest, &paint));
    }

    /// Copy `pos.src` of `source` (or of this backend) into `pos.dest`.
    pub fn copy_bits(&mut self, pos: &TwoRect, source: Option<&mut GraphicsBackend>) {
        if pos.is_invalid() {
            return;
        }
        tracing::debug!(?pos, other = source.is_some(), "copybits");
        let image = match source {
            Some(other) => other.snapshot_own(),
            None => self.snapshot_own(),
        };
        let (src, dest) = (pos.src.to_rect(), pos.dest.to_rect());
        let paint = Paint::default().with_blend(BlendMode::Src);
        self.draw(Some(dest), |canvas, _| canvas.draw_image_rect(&image, src, dest, &paint));
    }

    fn draw_image(&mut self, pos: &TwoRect, image: &Image, blend: BlendMode) {
        tracing::debug!(?pos, ?blend, "drawimage");
        let (src, dest) = (pos.src.to_rect(), pos.dest.to_rect());
        let paint = Paint::default().with_blend(blend);
        self.draw(Some(dest), |canvas, _| canvas.draw_image_rect(image, src, dest, &paint));
    }

    /// Multiply `bitmap` onto the destination.
    pub fn blend_bitmap(&mut self, pos: &TwoRect, bitmap: &dyn RenderableBitmap) -> bool {
        if pos.is_invalid() {
            return false;
        }
        self.draw_image(pos, &bitmap.image(), BlendMode::Multiply);
        true
    }

    /// Draw `source` through the combination of `mask` and a separate `alpha` layer.
    pub fn blend_alpha_bitmap(
        &mut self,
        pos: &TwoRect,
        source: &dyn RenderableBitmap,
        mask: &dyn RenderableBitmap,
        alpha: &dyn RenderableBitmap,
    ) -> bool {
        if pos.is_invalid() {
            return false;
        }
        let Some(image) = composite::with_mask_and_alpha(source, mask, alpha) else {
            return false;
        };
        self.draw_image(pos, &image, BlendMode::SrcOver);
        true
    }

    /// Draw `bitmap` over the destination.
    pub fn draw_bitmap(&mut self, pos: &TwoRect, bitmap: &dyn RenderableBitmap) {
        if pos.is_invalid() {
            return;
        }
        self.draw_image(pos, &bitmap.image(), BlendMode::SrcOver);
    }

    /// Draw `bitmap` through a transparency mask.
    pub fn draw_bitmap_with_mask(
        &mut self,
        pos: &TwoRect,
        bitmap: &dyn RenderableBitmap,
        mask: &dyn RenderableBitmap,
    ) {
        self.draw_alpha_bitmap(pos, bitmap, mask);
    }

    /// Paint `color` wherever `mask` is dark.
    pub fn draw_mask(&mut self, pos: &TwoRect, mask: &dyn RenderableBitmap, color: Color) -> bool {
        if pos.is_invalid() {
            return false;
        }
        let Some(image) = composite::colorized_mask(mask, to_render_color(color)) else {
            return false;
        };
        self.draw_image(pos, &image, BlendMode::SrcOver);
        true
    }

    /// Draw `source` with `alpha` interpreted as one-minus-alpha.
    pub fn draw_alpha_bitmap(
        &mut self,
        pos: &TwoRect,
        source: &dyn RenderableBitmap,
        alpha: &dyn RenderableBitmap,
    ) -> bool {
        if pos.is_invalid() {
            return false;
        }
        let Some(image) = composite::with_alpha(source, Some(alpha)) else {
            return false;
        };
        self.draw_image(pos, &image, BlendMode::SrcOver);
        true
    }

    /// Draw raw premultiplied pixels. Counts toward the pixel budget that forces a flush.
    pub fn draw_pixels(&mut self, pos: &TwoRect, pixels: Image, blend: BlendMode) {
        let count = u64::from(pixels.width()) * u64::from(pixels.height());
        self.flush.add_pending_pixels(count);
        self.draw_image(pos, &pixels, blend);
    }

    /// Draw `source` so that its origin, top-right and bottom-left corners land on `null`, `x`
    /// and `y`.
    pub fn draw_transformed_bitmap(
        &mut self,
        null: Point,
        x: Point,
        y: Point,
        source: &dyn RenderableBitmap,
        alpha: Option<&dyn RenderableBitmap>,
    ) -> bool {
        let (w, h) = source.size();
        if w == 0 || h == 0 {
            return false;
        }
        let Some(image) = composite::with_alpha(source, alpha) else {
            return false;
        };
        let x_rel = x - null;
        let y_rel = y - null;
        let (w, h) = (f64::from(w), f64::from(h));
        let matrix = Affine::new([
            x_rel.x / w,
            x_rel.y / w,
            y_rel.x / h,
            y_rel.y / h,
            null.x,
            null.y,
        ]);
        tracing::debug!(?null, ?x, ?y, "drawtransformedbitmap");
        self.draw(None, |canvas, _| {
            canvas.save();
            canvas.concat(matrix);
            canvas.draw_image(&image, 0.0, 0.0, &Paint::default());
            canvas.restore();
        });
        true
    }

    /// Copy of a surface area, taken after flushing.
    pub fn get_bitmap(&mut self, x: i32, y: i32, width: i32, height: i32) -> Bitmap {
        let surface = self.ensure_surface();
        let mut s = surface.borrow_mut();
        s.flush();
        tracing::debug!(x, y, width, height, "getbitmap");
        Bitmap::from_image(s.canvas_mut().snapshot_rect(IntRect::new(x, y, width, height)))
    }

    /// Color of one pixel, read after flushing. Pixels outside the surface read as fully
    /// transparent.
    pub fn get_pixel(&mut self, x: i32, y: i32) -> Color {
        let surface = self.ensure_surface();
        let mut s = surface.borrow_mut();
        s.flush();
        let image = s.canvas_mut().snapshot_rect(IntRect::new(x, y, 1, 1));
        if image.width() == 0 || image.height() == 0 {
            return from_render_color(RenderColor::TRANSPARENT);
        }
        from_render_color(RenderColor::from_premul(image.premul(0, 0)))
    }

    /// Invert an axis-aligned rectangle.
    pub fn invert_rect(&mut self, x: i32, y: i32, width: i32, height: i32, mode: InvertMode) {
        let rect = IntRect::new(x, y, width, height).to_rect();
        self.invert_polygon(&Polygon::from_rect(rect), mode);
    }

    /// Invert the closed polygon through `points`.
    pub fn invert_points(&mut self, points: &[Point], mode: InvertMode) {
        self.invert_polygon(&Polygon::closed(points.to_vec()), mode);
    }

    /// Invert the area of `polygon`.
    pub fn invert_polygon(&mut self, polygon: &Polygon, mode: InvertMode) {
        let path = polygon_to_path(polygon);
        if path.elements().is_empty() {
            return;
        }
        let bounds = path.bounding_box();
        tracing::debug!(?mode, ?bounds, "invert");
        self.draw(Some(bounds), |canvas, _| invert_path(canvas, &path, bounds, mode));
    }

    /// Write the surface to a PNG file.
    pub fn dump_png(&mut self, path: &Path) -> RasterResult<()> {
        let surface = self.ensure_surface();
        let snapshot = {
            let mut s = surface.borrow_mut();
            s.flush();
            s.canvas_mut().snapshot()
        };
        let (width, height) = (snapshot.width(), snapshot.height());
        let img = image::RgbaImage::from_raw(width, height, snapshot.to_unpremul_bytes())
            .ok_or_else(|| RasterError::validation("surface snapshot has unexpected length"))?;
        img.save(path).with_context(|| format!("write {}", path.display()))?;
        Ok(())
    }
}

impl Drop for GraphicsBackend {
    fn drop(&mut self) {
        self.destroy_surface();
    }
}

fn stroke_offset(method: RenderMethod) -> f64 {
    match method {
        RenderMethod::Gpu => GPU_STROKE_OFFSET,
        RenderMethod::Raster => RASTER_STROKE_OFFSET,
    }
}

fn invert_path(canvas: &mut dyn Canvas, path: &BezPath, bounds: Rect, mode: InvertMode) {
    let white = RenderColor::WHITE;
    match mode {
        InvertMode::TrackFrame => {
            canvas.save();
            canvas.clip_rect(bounds, false);
            let paint = Paint::stroke(white)
                .with_blend(BlendMode::Difference)
                .with_anti_alias(false)
                .with_stroke(Stroke::new(2.0).with_dashes(0.0, [4.0, 4.0]));
            canvas.draw_path(path, FillRule::EvenOdd, &paint);
            canvas.restore();
        }
        InvertMode::Checker => {
            let paint = Paint::fill(white)
                .with_blend(BlendMode::Difference)
                .with_anti_alias(false)
                .with_shader(Shader::Repeat(checker_tile()));
            canvas.draw_path(path, FillRule::EvenOdd, &paint);
        }
        InvertMode::Solid => {
            let paint = Paint::fill(white)
                .with_blend(BlendMode::Difference)
                .with_anti_alias(false);
            canvas.draw_path(path, FillRule::EvenOdd, &paint);
        }
    }
}

/// 4x4 tile: two rows of white-white-black-black, then two rows of black-black-white-white.
fn checker_tile() -> Image {
    let mut tile = PixelBuffer::new(4, 4, AlphaType::Premul);
    for y in 0..4 {
        for x in 0..4 {
            let white = (x < 2) == (y < 2);
            let v = if white { 255 } else { 0 };
            tile.set_raw(x, y, [v, v, v, 255]);
        }
    }
    Arc::new(tile)
}

#[cfg(test)]
#[path = "../../tests/unit/backend/graphics.rs"]
mod tests;
