use std::sync::Arc;

use crate::foundation::core::IntRect;
use crate::foundation::error::{RasterError, RasterResult};
use crate::foundation::math::{premul_rgba8, unpremul_rgba8};

/// How color channels relate to alpha in a [`PixelBuffer`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum AlphaType {
    /// Channels are multiplied by alpha.
    #[default]
    Premul,
    /// Channels are stored independently of alpha.
    Unpremul,
}

/// Row-major RGBA8 pixels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    alpha: AlphaType,
    data: Vec<u8>,
}

/// Immutable shared pixels, e.g. a surface snapshot.
pub type Image = Arc<PixelBuffer>;

impl PixelBuffer {
    /// Transparent buffer.
    pub fn new(width: u32, height: u32, alpha: AlphaType) -> Self {
        let len = (width as usize) * (height as usize) * 4;
        Self {
            width,
            height,
            alpha,
            data: vec![0; len],
        }
    }

    /// Wrap existing bytes; the length must be `width * height * 4`.
    pub fn from_vec(
        width: u32,
        height: u32,
        alpha: AlphaType,
        data: Vec<u8>,
    ) -> RasterResult<Self> {
        let expected = (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4);
        if data.len() != expected {
            return Err(RasterError::validation(format!(
                "pixel buffer {width}x{height} needs {expected} bytes, got {}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            alpha,
            data,
        })
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Storage alpha type.
    pub fn alpha_type(&self) -> AlphaType {
        self.alpha
    }

    /// Raw bytes in storage format.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Mutable raw bytes in storage format.
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Full-buffer rectangle.
    pub fn bounds(&self) -> IntRect {
        IntRect::from_size(self.width, self.height)
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        ((y as usize) * (self.width as usize) + (x as usize)) * 4
    }

    /// Raw stored pixel.
    pub fn raw(&self, x: u32, y: u32) -> [u8; 4] {
        let i = self.offset(x, y);
        [
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ]
    }

    /// Overwrite a stored pixel without conversion.
    pub fn set_raw(&mut self, x: u32, y: u32, px: [u8; 4]) {
        let i = self.offset(x, y);
        self.data[i..i + 4].copy_from_slice(&px);
    }

    /// Pixel as premultiplied RGBA8.
    pub fn premul(&self, x: u32, y: u32) -> [u8; 4] {
        let px = self.raw(x, y);
        match self.alpha {
            AlphaType::Premul => px,
            AlphaType::Unpremul => premul_rgba8(px),
        }
    }

    /// Store a premultiplied pixel, converting to the storage format.
    pub fn set_premul(&mut self, x: u32, y: u32, px: [u8; 4]) {
        let stored = match self.alpha {
            AlphaType::Premul => px,
            AlphaType::Unpremul => unpremul_rgba8(px),
        };
        self.set_raw(x, y, stored);
    }

    /// Pixel as straight (unpremultiplied) RGBA8.
    pub fn unpremul(&self, x: u32, y: u32) -> [u8; 4] {
        let px = self.raw(x, y);
        match self.alpha {
            AlphaType::Premul => unpremul_rgba8(px),
            AlphaType::Unpremul => px,
        }
    }

    /// Fill every pixel with a premultiplied value.
    pub fn fill_premul(&mut self, px: [u8; 4]) {
        let stored = match self.alpha {
            AlphaType::Premul => px,
            AlphaType::Unpremul => unpremul_rgba8(px),
        };
        for chunk in self.data.chunks_exact_mut(4) {
            chunk.copy_from_slice(&stored);
        }
    }

    /// Copy of `rect` (clamped to the buffer) in the requested storage format.
    pub fn extract(&self, rect: IntRect, alpha: AlphaType) -> PixelBuffer {
        let r = rect.intersect(&self.bounds());
        let mut out = PixelBuffer::new(r.width.max(0) as u32, r.height.max(0) as u32, alpha);
        for y in 0..out.height {
            for x in 0..out.width {
                let sx = r.x as u32 + x;
                let sy = r.y as u32 + y;
                let px = match alpha {
                    AlphaType::Premul => self.premul(sx, sy),
                    AlphaType::Unpremul => self.unpremul(sx, sy),
                };
                out.set_raw(x, y, px);
            }
        }
        out
    }

    /// Premultiplied copy of the whole buffer as bytes.
    pub fn to_premul_bytes(&self) -> Vec<u8> {
        match self.alpha {
            AlphaType::Premul => self.data.clone(),
            AlphaType::Unpremul => self
                .data
                .chunks_exact(4)
                .flat_map(|px| premul_rgba8([px[0], px[1], px[2], px[3]]))
                .collect(),
        }
    }

    /// Straight-alpha copy of the whole buffer as bytes.
    pub fn to_unpremul_bytes(&self) -> Vec<u8> {
        match self.alpha {
            AlphaType::Unpremul => self.data.clone(),
            AlphaType::Premul => self
                .data
                .chunks_exact(4)
                .flat_map(|px| unpremul_rgba8([px[0], px[1], px[2], px[3]]))
                .collect(),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/pixels.rs"]
mod tests;
