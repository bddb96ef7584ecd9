use std::sync::Arc;

use crate::foundation::error::{RasterError, RasterResult};
use crate::paint::color::RenderColor;
use crate::render::pixels::{AlphaType, Image, PixelBuffer};

/// What the compositing operations need from a bitmap.
pub trait RenderableBitmap {
    /// Width and height in pixels.
    fn size(&self) -> (u32, u32);
    /// Premultiplied color image.
    fn image(&self) -> Image;
    /// Alpha-only image: each pixel's gray level becomes its alpha, color channels are zero.
    ///
    /// For alpha bitmaps the gray level is transparency, so compositing this image with
    /// `DstOut` keeps `1 - transparency` of the destination.
    fn alpha_image(&self) -> Image;
}

/// In-memory bitmap.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bitmap {
    pixels: Image,
}

impl Bitmap {
    /// Wrap an existing image.
    pub fn from_image(image: Image) -> Self {
        Self { pixels: image }
    }

    /// Straight-alpha RGBA8 bytes.
    pub fn from_rgba8(width: u32, height: u32, rgba: Vec<u8>) -> RasterResult<Self> {
        let buf = PixelBuffer::from_vec(width, height, AlphaType::Unpremul, rgba)?;
        Ok(Self::from_image(Arc::new(buf)))
    }

    /// One gray byte per pixel (masks and alpha bitmaps).
    pub fn from_gray8(width: u32, height: u32, gray: &[u8]) -> RasterResult<Self> {
        if gray.len() != (width as usize) * (height as usize) {
            return Err(RasterError::validation(format!(
                "gray bitmap {width}x{height} needs {} bytes, got {}",
                (width as usize) * (height as usize),
                gray.len()
            )));
        }
        let data = gray.iter().flat_map(|&v| [v, v, v, 255]).collect();
        Self::from_rgba8(width, height, data)
    }

    /// Bitmap filled with one color.
    pub fn solid(width: u32, height: u32, color: RenderColor) -> Self {
        let mut buf = PixelBuffer::new(width, height, AlphaType::Premul);
        buf.fill_premul(color.to_premul());
        Self::from_image(Arc::new(buf))
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Straight color at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> RenderColor {
        let [r, g, b, a] = self.pixels.unpremul(x, y);
        RenderColor::rgba(r, g, b, a)
    }

    /// Underlying pixels.
    pub fn pixels(&self) -> &PixelBuffer {
        &self.pixels
    }
}

impl RenderableBitmap for Bitmap {
    fn size(&self) -> (u32, u32) {
        (self.width(), self.height())
    }

    fn image(&self) -> Image {
        Arc::clone(&self.pixels)
    }

    fn alpha_image(&self) -> Image {
        let mut out = PixelBuffer::new(self.width(), self.height(), AlphaType::Premul);
        for y in 0..self.height() {
            for x in 0..self.width() {
                let level = self.pixels.unpremul(x, y)[0];
                out.set_raw(x, y, [0, 0, 0, level]);
            }
        }
        Arc::new(out)
    }
}
