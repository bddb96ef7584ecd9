use crate::foundation::core::IntRect;
use crate::geometry::region::{Region, region_to_path};
use crate::paint::paint::FillRule;
use crate::render::canvas::Canvas;

/// Current clip region and how it is applied to a canvas.
///
/// Surface canvases keep exactly one saved level above the pristine state (save count 2). The
/// clip always lives in that top level, so replacing it is a restore (dropping the old clip)
/// followed by a save and a fresh clip.
#[derive(Debug, Default)]
pub(crate) struct ClipState {
    region: Region,
}

impl ClipState {
    pub(crate) fn region(&self) -> &Region {
        &self.region
    }

    /// Record a full-surface region without touching any canvas; used right after surface
    /// creation, when the canvas is unclipped.
    pub(crate) fn reset_to(&mut self, width: u32, height: u32) {
        self.region = Region::from_rect(IntRect::from_size(width, height));
    }

    /// Whether `region` equals the current one.
    pub(crate) fn is_current(&self, region: &Region) -> bool {
        &self.region == region
    }

    /// Store `region` and apply it to `canvas`.
    pub(crate) fn replace(&mut self, region: Region, canvas: &mut dyn Canvas) {
        debug_assert_eq!(canvas.save_count(), 2);
        self.region = region;
        canvas.restore();
        canvas.save();
        apply_region(canvas, &self.region);
    }
}

/// Clip `canvas` to `region` under the even-odd rule, without antialiasing.
pub(crate) fn apply_region(canvas: &mut dyn Canvas, region: &Region) {
    let path = region_to_path(region);
    canvas.clip_path(&path, FillRule::EvenOdd, false);
}
