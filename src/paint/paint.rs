use kurbo::{Cap, Join, Stroke};

use crate::paint::blend::BlendMode;
use crate::paint::color::RenderColor;
use crate::render::pixels::Image;

/// Winding rule used to turn a path into covered area.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum FillRule {
    /// Non-zero winding.
    #[default]
    NonZero,
    /// Even-odd; overlapping subpaths cancel.
    EvenOdd,
}

/// Whether a path is filled or outlined.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PaintStyle {
    /// Fill the path interior.
    #[default]
    Fill,
    /// Stroke the path outline with [`Paint::stroke`].
    Stroke,
}

/// Where source colors come from.
#[derive(Clone, Debug, Default)]
pub enum Shader {
    /// [`Paint::color`] everywhere.
    #[default]
    Solid,
    /// Image tiled in device space starting at the origin.
    Repeat(Image),
}

/// Everything a canvas needs to draw one primitive.
#[derive(Clone, Debug)]
pub struct Paint {
    /// Solid color (straight alpha).
    pub color: RenderColor,
    /// Fill or stroke.
    pub style: PaintStyle,
    /// Blend mode for compositing onto the destination.
    pub blend: BlendMode,
    /// Antialiased coverage; otherwise coverage is thresholded at one half.
    pub anti_alias: bool,
    /// Stroke geometry. A width of zero is a one device pixel hairline.
    pub stroke: Stroke,
    /// Color source.
    pub shader: Shader,
}

impl Default for Paint {
    fn default() -> Self {
        Self {
            color: RenderColor::BLACK,
            style: PaintStyle::Fill,
            blend: BlendMode::SrcOver,
            anti_alias: true,
            stroke: hairline(),
            shader: Shader::Solid,
        }
    }
}

/// Zero-width butt-capped miter stroke.
pub fn hairline() -> Stroke {
    Stroke::new(0.0).with_join(Join::Miter).with_caps(Cap::Butt)
}

impl Paint {
    /// Solid fill.
    pub fn fill(color: RenderColor) -> Self {
        Self {
            color,
            ..Self::default()
        }
    }

    /// Solid hairline stroke.
    pub fn stroke(color: RenderColor) -> Self {
        Self {
            color,
            style: PaintStyle::Stroke,
            ..Self::default()
        }
    }

    /// Replace the blend mode.
    pub fn with_blend(mut self, blend: BlendMode) -> Self {
        self.blend = blend;
        self
    }

    /// Replace the antialias flag.
    pub fn with_anti_alias(mut self, anti_alias: bool) -> Self {
        self.anti_alias = anti_alias;
        self
    }

    /// Replace the stroke geometry.
    pub fn with_stroke(mut self, stroke: Stroke) -> Self {
        self.stroke = stroke;
        self
    }

    /// Replace the shader.
    pub fn with_shader(mut self, shader: Shader) -> Self {
        self.shader = shader;
        self
    }
}
