use std::sync::Arc;

use kurbo::{Affine, BezPath, Point, Rect, Shape, StrokeOpts};
use smallvec::SmallVec;

use crate::foundation::config::RenderMethod;
use crate::foundation::core::IntRect;
use crate::foundation::error::{RasterError, RasterResult};
use crate::foundation::math::mul_div255_u8;
use crate::paint::blend::{BlendMode, composite};
use crate::paint::color::RenderColor;
use crate::paint::paint::{FillRule, Paint, PaintStyle, Shader};
use crate::render::canvas::{Canvas, CanvasStats};
use crate::render::pixels::{AlphaType, Image, PixelBuffer};

const STROKE_TOLERANCE: f64 = 0.05;

#[derive(Clone, Debug)]
struct CanvasState {
    transform: Affine,
    /// Per-pixel clip coverage; `None` means unclipped.
    clip: Option<Arc<Vec<u8>>>,
}

impl Default for CanvasState {
    fn default() -> Self {
        Self {
            transform: Affine::IDENTITY,
            clip: None,
        }
    }
}

enum Source<'a> {
    Solid([u8; 4]),
    Pattern(&'a PixelBuffer),
    /// Image pixel at `(x - dx, y - dy)`.
    Shifted {
        image: &'a PixelBuffer,
        dx: i32,
        dy: i32,
    },
    /// Coverage-weighted premultiplied colors, one per canvas pixel.
    Layer(&'a [u8]),
}

enum Coverage<'a> {
    Full,
    Mask(&'a [u8]),
}

/// Software canvas over an RGBA8 [`PixelBuffer`].
///
/// Path coverage and image sampling are computed with `vello_cpu` into a scratch pixmap; the
/// result is then blended into the buffer one pixel at a time, so every [`BlendMode`] works and
/// the clip is applied exactly.
pub struct RasterCanvas {
    pixels: PixelBuffer,
    width_u16: u16,
    height_u16: u16,
    method: RenderMethod,
    state: CanvasState,
    stack: SmallVec<[CanvasState; 4]>,
    ctx: Option<vello_cpu::RenderContext>,
    scratch: Option<vello_cpu::Pixmap>,
    stats: CanvasStats,
}

impl std::fmt::Debug for RasterCanvas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RasterCanvas")
            .field("width", &self.width_u16)
            .field("height", &self.height_u16)
            .field("method", &self.method)
            .field("save_count", &self.save_count())
            .finish_non_exhaustive()
    }
}

impl RasterCanvas {
    /// Premultiplied canvas, fully transparent.
    pub fn new(width: u32, height: u32) -> RasterResult<Self> {
        Self::with_alpha_type(width, height, AlphaType::Premul)
    }

    /// Canvas storing pixels with the given alpha type.
    pub fn with_alpha_type(width: u32, height: u32, alpha: AlphaType) -> RasterResult<Self> {
        let width_u16: u16 = width
            .try_into()
            .map_err(|_| RasterError::validation("canvas width exceeds u16"))?;
        let height_u16: u16 = height
            .try_into()
            .map_err(|_| RasterError::validation("canvas height exceeds u16"))?;
        if width_u16 == 0 || height_u16 == 0 {
            return Err(RasterError::validation(format!(
                "canvas size must be non-zero, got {width}x{height}"
            )));
        }
        Ok(Self {
            pixels: PixelBuffer::new(width, height, alpha),
            width_u16,
            height_u16,
            method: RenderMethod::Raster,
            state: CanvasState::default(),
            stack: SmallVec::new(),
            ctx: None,
            scratch: None,
            stats: CanvasStats::default(),
        })
    }

    /// Report `method` from [`Canvas::method`]; used by GPU contexts that rasterize on the CPU.
    pub fn tagged(mut self, method: RenderMethod) -> Self {
        self.method = method;
        self
    }

    /// Current pixels.
    pub fn pixels(&self) -> &PixelBuffer {
        &self.pixels
    }

    fn bounds(&self) -> IntRect {
        self.pixels.bounds()
    }

    /// Pixels touched by geometry with device bounds `bbox`, limited to the canvas.
    fn device_area(&self, bbox: Rect) -> IntRect {
        let visible = bbox.intersect(self.bounds().to_rect().inflate(1.0, 1.0));
        outset(IntRect::round_out(visible), 1)
    }

    fn device_path(&self, path: &BezPath) -> BezPath {
        let mut device = path.clone();
        device.apply_affine(self.state.transform);
        device
    }

    /// Device-space outline of `path` stroked with `paint.stroke`.
    fn outline(&self, path: &BezPath, paint: &Paint) -> BezPath {
        if paint.stroke.width <= 0.0 {
            let mut hair = paint.stroke.clone();
            hair.width = 1.0;
            let device = self.device_path(path);
            return kurbo::stroke(device.iter(), &hair, &StrokeOpts::default(), STROKE_TOLERANCE);
        }
        let mut out = kurbo::stroke(
            path.iter(),
            &paint.stroke,
            &StrokeOpts::default(),
            STROKE_TOLERANCE,
        );
        out.apply_affine(self.state.transform);
        out
    }

    fn take_ctx(&mut self) -> vello_cpu::RenderContext {
        let mut ctx = match self.ctx.take() {
            Some(ctx) if ctx.width() == self.width_u16 && ctx.height() == self.height_u16 => ctx,
            _ => vello_cpu::RenderContext::new(self.width_u16, self.height_u16),
        };
        ctx.reset();
        ctx
    }

    fn take_scratch(&mut self) -> vello_cpu::Pixmap {
        let mut scratch = self
            .scratch
            .take()
            .unwrap_or_else(|| vello_cpu::Pixmap::new(self.width_u16, self.height_u16));
        scratch.data_as_u8_slice_mut().fill(0);
        scratch
    }

    /// Per-pixel coverage (0..=255) of a device-space path.
    fn coverage(&mut self, device: &BezPath, fill: FillRule, anti_alias: bool) -> Vec<u8> {
        let mut ctx = self.take_ctx();
        let mut scratch = self.take_scratch();

        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_fill_rule(fill_to_cpu(fill));
        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(255, 255, 255, 255));
        ctx.fill_path(&bezpath_to_cpu(device));
        ctx.flush();
        ctx.render_to_pixmap(&mut scratch);

        let coverage = scratch
            .data_as_u8_slice()
            .chunks_exact(4)
            .map(|px| match (anti_alias, px[3]) {
                (true, a) => a,
                (false, a) if a >= 128 => 255,
                (false, _) => 0,
            })
            .collect();

        self.ctx = Some(ctx);
        self.scratch = Some(scratch);
        coverage
    }

    /// Sample `src` of `image` through `transform`; returns coverage-weighted premultiplied
    /// colors for every canvas pixel.
    fn image_layer(
        &mut self,
        image: &PixelBuffer,
        transform: Affine,
        src: Rect,
    ) -> Option<Vec<u8>> {
        let bytes = image.to_premul_bytes();
        let pixmap = match pixmap_from_premul_bytes(&bytes, image.width(), image.height()) {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!(error = %e, "image too large to sample");
                return None;
            }
        };
        let paint = vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
            sampler: vello_cpu::peniko::ImageSampler::default(),
        };

        let mut ctx = self.take_ctx();
        let mut scratch = self.take_scratch();
        ctx.set_transform(affine_to_cpu(transform));
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_fill_rule(vello_cpu::peniko::Fill::NonZero);
        ctx.set_paint(paint);
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(src.x0, src.y0, src.x1, src.y1));
        ctx.flush();
        ctx.render_to_pixmap(&mut scratch);
        let layer = scratch.data_as_u8_slice().to_vec();

        self.ctx = Some(ctx);
        self.scratch = Some(scratch);
        Some(layer)
    }

    fn composite(
        &mut self,
        area: IntRect,
        mode: BlendMode,
        source: Source<'_>,
        coverage: Coverage<'_>,
    ) {
        let area = area.intersect(&self.bounds());
        if area.is_empty() {
            return;
        }
        let stride = self.pixels.width() as usize;
        let clip = self.state.clip.clone();

        for y in area.y..area.bottom() {
            for x in area.x..area.right() {
                let (ux, uy) = (x as u32, y as u32);
                let i = (uy as usize) * stride + ux as usize;
                let geometric = match &coverage {
                    Coverage::Full => 255,
                    Coverage::Mask(mask) => mask[i],
                };
                let cov = match &clip {
                    Some(clip) => mul_div255_u8(geometric, clip[i]),
                    None => geometric,
                };
                if cov == 0 {
                    continue;
                }
                let src = match &source {
                    Source::Solid(px) => *px,
                    Source::Pattern(tile) => {
                        if tile.width() == 0 || tile.height() == 0 {
                            continue;
                        }
                        tile.premul(ux % tile.width(), uy % tile.height())
                    }
                    Source::Shifted { image, dx, dy } => {
                        let (sx, sy) = (x - dx, y - dy);
                        if !image.bounds().contains(sx, sy) {
                            continue;
                        }
                        image.premul(sx as u32, sy as u32)
                    }
                    Source::Layer(layer) => unweight(
                        [layer[i * 4], layer[i * 4 + 1], layer[i * 4 + 2], layer[i * 4 + 3]],
                        geometric,
                    ),
                };
                let dst = self.pixels.premul(ux, uy);
                self.pixels.set_premul(ux, uy, composite(mode, src, dst, cov));
            }
        }
    }

    fn fill_device_path(&mut self, device: &BezPath, fill: FillRule, paint: &Paint) {
        if device.elements().is_empty() {
            return;
        }
        let area = self.device_area(device.bounding_box());
        let coverage = self.coverage(device, fill, paint.anti_alias);
        let source = match &paint.shader {
            Shader::Solid => Source::Solid(paint.color.to_premul()),
            Shader::Repeat(tile) => Source::Pattern(tile.as_ref()),
        };
        self.composite(area, paint.blend, source, Coverage::Mask(&coverage));
    }
}

impl Canvas for RasterCanvas {
    fn width(&self) -> u32 {
        self.pixels.width()
    }

    fn height(&self) -> u32 {
        self.pixels.height()
    }

    fn method(&self) -> RenderMethod {
        self.method
    }

    fn save(&mut self) {
        self.stats.saves += 1;
        self.stack.push(self.state.clone());
    }

    fn restore(&mut self) {
        if let Some(state) = self.stack.pop() {
            self.stats.restores += 1;
            self.state = state;
        }
    }

    fn save_count(&self) -> usize {
        self.stack.len() + 1
    }

    fn clip_path(&mut self, path: &BezPath, fill: FillRule, anti_alias: bool) {
        self.stats.clips += 1;
        let device = self.device_path(path);
        let coverage = if device.elements().is_empty() {
            vec![0; (self.pixels.width() as usize) * (self.pixels.height() as usize)]
        } else {
            self.coverage(&device, fill, anti_alias)
        };
        let combined = match &self.state.clip {
            Some(prev) => prev
                .iter()
                .zip(coverage.iter())
                .map(|(&a, &b)| mul_div255_u8(a, b))
                .collect(),
            None => coverage,
        };
        self.state.clip = Some(Arc::new(combined));
    }

    fn concat(&mut self, transform: Affine) {
        self.state.transform = self.state.transform * transform;
    }

    fn total_matrix(&self) -> Affine {
        self.state.transform
    }

    fn clear(&mut self, color: RenderColor) {
        self.stats.draws += 1;
        let area = self.bounds();
        self.composite(area, BlendMode::Src, Source::Solid(color.to_premul()), Coverage::Full);
    }

    fn draw_path(&mut self, path: &BezPath, fill: FillRule, paint: &Paint) {
        self.stats.draws += 1;
        match paint.style {
            PaintStyle::Fill => {
                let device = self.device_path(path);
                self.fill_device_path(&device, fill, paint);
            }
            PaintStyle::Stroke => {
                let device = self.outline(path, paint);
                self.fill_device_path(&device, FillRule::NonZero, paint);
            }
        }
    }

    fn draw_point(&mut self, x: f64, y: f64, paint: &Paint) {
        self.stats.draws += 1;
        let p = self.state.transform * Point::new(x, y);
        let area = IntRect::new(p.x.floor() as i32, p.y.floor() as i32, 1, 1);
        let source = match &paint.shader {
            Shader::Solid => Source::Solid(paint.color.to_premul()),
            Shader::Repeat(tile) => Source::Pattern(tile.as_ref()),
        };
        self.composite(area, paint.blend, source, Coverage::Full);
    }

    fn draw_image_rect(&mut self, image: &Image, src: Rect, dst: Rect, paint: &Paint) {
        self.stats.draws += 1;
        let src = src.intersect(image.bounds().to_rect());
        if src.width() <= 0.0 || src.height() <= 0.0 || dst.width() <= 0.0 || dst.height() <= 0.0 {
            return;
        }
        let map = Affine::translate((dst.x0, dst.y0))
            * Affine::scale_non_uniform(dst.width() / src.width(), dst.height() / src.height())
            * Affine::translate((-src.x0, -src.y0));
        let full = self.state.transform * map;

        if let Some((dx, dy)) = integer_translation(full)
            && is_integral(src)
        {
            let src_px = IntRect::round_out(src);
            let area = IntRect::new(src_px.x + dx, src_px.y + dy, src_px.width, src_px.height);
            let source = Source::Shifted {
                image: image.as_ref(),
                dx,
                dy,
            };
            self.composite(area, paint.blend, source, Coverage::Full);
            return;
        }

        let mut quad = src.to_path(0.1);
        quad.apply_affine(full);
        let area = self.device_area(quad.bounding_box());
        let coverage = self.coverage(&quad, FillRule::NonZero, paint.anti_alias);
        let Some(layer) = self.image_layer(image, full, src) else {
            return;
        };
        self.composite(area, paint.blend, Source::Layer(&layer), Coverage::Mask(&coverage));
    }

    fn snapshot(&mut self) -> Image {
        Arc::new(self.pixels.clone())
    }

    fn snapshot_rect(&mut self, rect: IntRect) -> Image {
        Arc::new(self.pixels.extract(rect, AlphaType::Premul))
    }

    fn flush(&mut self) {
        self.stats.flushes += 1;
    }

    fn stats(&self) -> CanvasStats {
        self.stats
    }
}

fn outset(r: IntRect, by: i32) -> IntRect {
    IntRect::new(
        r.x.saturating_sub(by),
        r.y.saturating_sub(by),
        r.width.saturating_add(by.saturating_mul(2)),
        r.height.saturating_add(by.saturating_mul(2)),
    )
}

fn is_integral(r: Rect) -> bool {
    [r.x0, r.y0, r.x1, r.y1].iter().all(|v| v.fract() == 0.0)
}

fn integer_translation(a: Affine) -> Option<(i32, i32)> {
    let [xx, yx, xy, yy, tx, ty] = a.as_coeffs();
    if xx == 1.0 && yy == 1.0 && yx == 0.0 && xy == 0.0 && tx.fract() == 0.0 && ty.fract() == 0.0 {
        Some((tx as i32, ty as i32))
    } else {
        None
    }
}

/// Undo the coverage weighting `vello_cpu` applied to a sampled color.
fn unweight(px: [u8; 4], coverage: u8) -> [u8; 4] {
    match coverage {
        0 => [0, 0, 0, 0],
        255 => px,
        c => {
            let c = u32::from(c);
            let up = |v: u8| ((u32::from(v) * 255 + c / 2) / c).min(255) as u8;
            let a = up(px[3]);
            [up(px[0]).min(a), up(px[1]).min(a), up(px[2]).min(a), a]
        }
    }
}

fn fill_to_cpu(fill: FillRule) -> vello_cpu::peniko::Fill {
    match fill {
        FillRule::NonZero => vello_cpu::peniko::Fill::NonZero,
        FillRule::EvenOdd => vello_cpu::peniko::Fill::EvenOdd,
    }
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(vello_cpu::kurbo::Point::new(p.x, p.y)),
            PathEl::LineTo(p) => out.line_to(vello_cpu::kurbo::Point::new(p.x, p.y)),
            PathEl::QuadTo(p1, p2) => out.quad_to(
                vello_cpu::kurbo::Point::new(p1.x, p1.y),
                vello_cpu::kurbo::Point::new(p2.x, p2.y),
            ),
            PathEl::CurveTo(p1, p2, p3) => out.curve_to(
                vello_cpu::kurbo::Point::new(p1.x, p1.y),
                vello_cpu::kurbo::Point::new(p2.x, p2.y),
                vello_cpu::kurbo::Point::new(p3.x, p3.y),
            ),
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

fn pixmap_from_premul_bytes(
    bytes: &[u8],
    width: u32,
    height: u32,
) -> RasterResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| RasterError::validation("pixmap width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| RasterError::validation("pixmap height exceeds u16"))?;
    let pixels = bytes
        .chunks_exact(4)
        .map(|px| {
            vello_cpu::peniko::color::PremulRgba8::from_u8_array([px[0], px[1], px[2], px[3]])
        })
        .collect();
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(pixels, w, h, true))
}

#[cfg(test)]
#[path = "../../tests/unit/render/raster.rs"]
mod tests;
