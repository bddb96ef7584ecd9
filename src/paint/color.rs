use crate::foundation::math::{premul_rgba8, unpremul_rgba8};

/// Toolkit color: RGB plus a transparency byte (0 = opaque, 255 = fully transparent).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Color {
    /// Red.
    pub r: u8,
    /// Green.
    pub g: u8,
    /// Blue.
    pub b: u8,
    /// Transparency, inverse of alpha.
    pub transparency: u8,
}

impl Color {
    /// Opaque black.
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    /// Opaque white.
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    /// Opaque color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self {
            r,
            g,
            b,
            transparency: 0,
        }
    }

    /// Same color with the given transparency byte.
    pub const fn with_transparency(self, transparency: u8) -> Self {
        Self {
            transparency,
            ..self
        }
    }
}

/// Straight-alpha RGBA8 as the renderer consumes it (255 = opaque).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct RenderColor {
    /// Red.
    pub r: u8,
    /// Green.
    pub g: u8,
    /// Blue.
    pub b: u8,
    /// Alpha.
    pub a: u8,
}

impl RenderColor {
    /// Fully transparent black.
    pub const TRANSPARENT: RenderColor = RenderColor::rgba(0, 0, 0, 0);
    /// Opaque black.
    pub const BLACK: RenderColor = RenderColor::rgba(0, 0, 0, 255);
    /// Opaque white.
    pub const WHITE: RenderColor = RenderColor::rgba(255, 255, 255, 255);

    /// Color from channels.
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Premultiplied channel array.
    pub fn to_premul(self) -> [u8; 4] {
        premul_rgba8([self.r, self.g, self.b, self.a])
    }

    /// Recover a straight color from premultiplied channels.
    pub fn from_premul(px: [u8; 4]) -> Self {
        let [r, g, b, a] = unpremul_rgba8(px);
        Self { r, g, b, a }
    }
}

/// Map a toolkit color to the renderer: alpha is the inverse of transparency.
pub fn to_render_color(color: Color) -> RenderColor {
    RenderColor::rgba(color.r, color.g, color.b, 255 - color.transparency)
}

/// Like [`to_render_color`], additionally scaling alpha by `1 - transparency`.
///
/// `transparency` is a fraction in `[0, 1]`; values outside are clamped.
pub fn to_render_color_with_transparency(color: Color, transparency: f64) -> RenderColor {
    let base = to_render_color(color);
    let keep = (1.0 - transparency).clamp(0.0, 1.0);
    RenderColor {
        a: (f64::from(base.a) * keep) as u8,
        ..base
    }
}

/// Map a renderer color back to the toolkit representation.
pub fn from_render_color(color: RenderColor) -> Color {
    Color {
        r: color.r,
        g: color.g,
        b: color.b,
        transparency: 255 - color.a,
    }
}

/// Raster-operation colors that replace the line or fill color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum RopColor {
    /// All bits cleared.
    Zero,
    /// All bits set.
    One,
    /// Invert the destination. Drawn as white; callers pair it with XOR mode.
    Invert,
}

impl RopColor {
    /// Concrete color used for drawing.
    pub fn color(self) -> Color {
        match self {
            RopColor::Zero => Color::BLACK,
            RopColor::One | RopColor::Invert => Color::WHITE,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/paint/color.rs"]
mod tests;
