//! Scratch-surface combinations of bitmaps and alpha masks.
//!
//! Alpha bitmaps store transparency (255 = fully transparent), so the combinations below punch
//! them out of the color with `DstOut` rather than multiplying by them.

use crate::paint::blend::BlendMode;
use crate::paint::color::RenderColor;
use crate::paint::paint::Paint;
use crate::render::bitmap::RenderableBitmap;
use crate::render::canvas::Canvas;
use crate::render::pixels::Image;
use crate::render::raster::RasterCanvas;

fn scratch(width: u32, height: u32) -> Option<RasterCanvas> {
    match RasterCanvas::new(width, height) {
        Ok(c) => Some(c),
        Err(e) => {
            tracing::warn!(error = %e, "cannot allocate scratch surface");
            None
        }
    }
}

fn blit(canvas: &mut RasterCanvas, image: &Image, blend: BlendMode) {
    canvas.draw_image(image, 0.0, 0.0, &Paint::default().with_blend(blend));
}

/// Source color with `alpha` applied as one-minus-alpha.
pub(crate) fn with_alpha(
    source: &dyn RenderableBitmap,
    alpha: Option<&dyn RenderableBitmap>,
) -> Option<Image> {
    let (w, h) = source.size();
    let mut canvas = scratch(w, h)?;
    blit(&mut canvas, &source.image(), BlendMode::Src);
    if let Some(alpha) = alpha {
        blit(&mut canvas, &alpha.alpha_image(), BlendMode::DstOut);
    }
    Some(canvas.snapshot())
}

/// Combine a mask and a separate alpha layer, then keep the source where the result is clear.
///
/// The exact combination would be `1 - (1 - floor(alpha)) * mask`; the floor is not applied.
pub(crate) fn with_mask_and_alpha(
    source: &dyn RenderableBitmap,
    mask: &dyn RenderableBitmap,
    alpha: &dyn RenderableBitmap,
) -> Option<Image> {
    let (w, h) = source.size();
    let mut canvas = scratch(w, h)?;
    canvas.clear(RenderColor::TRANSPARENT);
    blit(&mut canvas, &mask.alpha_image(), BlendMode::Src);
    blit(&mut canvas, &alpha.alpha_image(), BlendMode::DstOut);
    blit(&mut canvas, &source.image(), BlendMode::SrcOut);
    Some(canvas.snapshot())
}

/// `color` everywhere the mask is dark; the mask's gray level is its transparency.
pub(crate) fn colorized_mask(mask: &dyn RenderableBitmap, color: RenderColor) -> Option<Image> {
    let (w, h) = mask.size();
    let mut canvas = scratch(w, h)?;
    canvas.clear(color);
    blit(&mut canvas, &mask.alpha_image(), BlendMode::DstOut);
    Some(canvas.snapshot())
}

#[cfg(test)]
#[path = "../../tests/unit/backend/composite.rs"]
mod tests;
