use std::sync::Arc;

use kurbo::Rect;

use crate::backend::clip::apply_region;
use crate::foundation::core::IntRect;
use crate::geometry::region::Region;
use crate::paint::blend::BlendMode;
use crate::paint::paint::Paint;
use crate::render::canvas::Canvas;
use crate::render::pixels::{AlphaType, PixelBuffer};
use crate::render::raster::RasterCanvas;

/// Margin added around the accumulated bound so antialiased edges are included.
const XOR_MARGIN: f64 = 2.0;

/// XOR drawing emulation.
///
/// While enabled, every drawing operation renders into a transparent, unpremultiplied session
/// buffer the size of the surface. After the operation the affected rectangle of the surface is
/// read back, XOR-ed channel-wise (red, green, blue; alpha untouched) with the session buffer and
/// copied back. Drawing the same thing twice therefore restores the original pixels.
#[derive(Debug, Default)]
pub(crate) struct XorEmulator {
    enabled: bool,
    session: Option<RasterCanvas>,
    extents: Option<Rect>,
}

impl XorEmulator {
    pub(crate) fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub(crate) fn set_enabled(&mut self, enabled: bool) {
        if self.enabled != enabled {
            tracing::debug!(enabled, "xor mode");
        }
        self.enabled = enabled;
        self.reset();
    }

    /// Drop the session buffer and accumulated bound.
    pub(crate) fn reset(&mut self) {
        self.session = None;
        self.extents = None;
    }

    /// No bound has been accumulated since the last application.
    pub(crate) fn is_idle(&self) -> bool {
        self.extents.is_none()
    }

    pub(crate) fn has_session(&self) -> bool {
        self.session.is_some()
    }

    /// Session canvas, created lazily with the surface size and clipped to `region`.
    pub(crate) fn session_canvas(
        &mut self,
        width: u32,
        height: u32,
        region: &Region,
    ) -> Option<&mut dyn Canvas> {
        if self.session.is_none() {
            let created = RasterCanvas::with_alpha_type(width, height, AlphaType::Unpremul);
            let mut canvas = match created {
                Ok(c) => c,
                Err(e) => {
                    tracing::warn!(error = %e, "cannot allocate xor session buffer");
                    return None;
                }
            };
            canvas.save();
            apply_region(&mut canvas, region);
            self.session = Some(canvas);
        }
        self.session.as_mut().map(|c| c as &mut dyn Canvas)
    }

    /// Grow the accumulated bound.
    pub(crate) fn extend(&mut self, rect: Rect) {
        if !self.enabled {
            return;
        }
        let rect = Rect::new(
            rect.x0.min(rect.x1),
            rect.y0.min(rect.y1),
            rect.x0.max(rect.x1),
            rect.y0.max(rect.y1),
        );
        self.extents = Some(match self.extents {
            Some(prev) => prev.union(rect),
            None => rect,
        });
    }

    /// XOR the session into `target`, then end the session.
    pub(crate) fn apply(&mut self, target: &mut dyn Canvas) {
        let Some(session) = self.session.take() else {
            self.extents = None;
            return;
        };
        let surface_rect = IntRect::from_size(target.width(), target.height());
        let area = match self.extents.take() {
            None => surface_rect,
            Some(r) => {
                IntRect::round_out(r.inflate(XOR_MARGIN, XOR_MARGIN)).intersect(&surface_rect)
            }
        };
        if area.is_empty() {
            return;
        }
        tracing::debug!(x = area.x, y = area.y, w = area.width, h = area.height, "applyxor");

        let current = target.snapshot_rect(area);
        let mut mixed = PixelBuffer::new(current.width(), current.height(), AlphaType::Unpremul);
        let xor_pixels = session.pixels();
        for y in 0..mixed.height() {
            for x in 0..mixed.width() {
                let [r, g, b, a] = current.unpremul(x, y);
                let [xr, xg, xb, _] = xor_pixels.raw(area.x as u32 + x, area.y as u32 + y);
                mixed.set_raw(x, y, [r ^ xr, g ^ xg, b ^ xb, a]);
            }
        }

        let full = Rect::new(0.0, 0.0, f64::from(mixed.width()), f64::from(mixed.height()));
        target.draw_image_rect(
            &Arc::new(mixed),
            full,
            area.to_rect(),
            &Paint::default().with_blend(BlendMode::Src),
        );
    }
}

#[cfg(test)]
#[path = "../../tests/unit/backend/xor.rs"]
mod tests;
