//! Blend modes on premultiplied RGBA8.
//!
//! Every function takes `src` and `dst` as premultiplied `[r, g, b, a]` and returns the
//! premultiplied result. [`composite`] additionally interpolates between the destination and the
//! blended result by a coverage value, which is how antialiasing and clipping are applied.

use crate::foundation::math::div255;

/// Blend mode applied when a source is drawn onto a destination.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum BlendMode {
    /// Source over destination.
    #[default]
    SrcOver,
    /// Replace the destination.
    Src,
    /// Keep the destination where the source is transparent.
    DstOut,
    /// Keep the source where the destination is transparent.
    SrcOut,
    /// Multiply colors.
    Multiply,
    /// Absolute difference of colors. Drawing white inverts the destination.
    Difference,
}

/// Blend one premultiplied pixel onto another.
pub fn blend(mode: BlendMode, src: [u8; 4], dst: [u8; 4]) -> [u8; 4] {
    let sa = u32::from(src[3]);
    let da = u32::from(dst[3]);
    let channel = |f: &dyn Fn(u32, u32) -> u8| -> [u8; 4] {
        [
            f(u32::from(src[0]), u32::from(dst[0])),
            f(u32::from(src[1]), u32::from(dst[1])),
            f(u32::from(src[2]), u32::from(dst[2])),
            f(sa, da),
        ]
    };
    match mode {
        BlendMode::Src => src,
        BlendMode::SrcOver => {
            channel(&|s, d| (s + u32::from(div255(d * (255 - sa)))).min(255) as u8)
        }
        BlendMode::DstOut => channel(&|_, d| div255(d * (255 - sa))),
        BlendMode::SrcOut => channel(&|s, _| div255(s * (255 - da))),
        BlendMode::Multiply => {
            let mut out = channel(&|s, d| div255(s * (255 - da) + d * (255 - sa) + s * d));
            out[3] = union_alpha(sa, da);
            out
        }
        BlendMode::Difference => {
            let mut out = channel(&|s, d| {
                let cross = u32::from(div255((s * da).min(d * sa)));
                (s + d).saturating_sub(2 * cross).min(255) as u8
            });
            out[3] = union_alpha(sa, da);
            out
        }
    }
}

fn union_alpha(sa: u32, da: u32) -> u8 {
    (sa + da - u32::from(div255(sa * da))).min(255) as u8
}

/// Blend `src` onto `dst`, then keep `coverage / 255` of the result and the rest of `dst`.
pub fn composite(mode: BlendMode, src: [u8; 4], dst: [u8; 4], coverage: u8) -> [u8; 4] {
    if coverage == 0 {
        return dst;
    }
    let blended = blend(mode, src, dst);
    if coverage == 255 {
        return blended;
    }
    let c = u32::from(coverage);
    let lerp = |r: u8, d: u8| div255(u32::from(r) * c + u32::from(d) * (255 - c));
    [
        lerp(blended[0], dst[0]),
        lerp(blended[1], dst[1]),
        lerp(blended[2], dst[2]),
        lerp(blended[3], dst[3]),
    ]
}

#[cfg(test)]
#[path = "../../tests/unit/paint/blend.rs"]
mod tests;
