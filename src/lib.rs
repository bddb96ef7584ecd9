//! Device-independent 2D drawing backend.
//!
//! A [`GraphicsBackend`] owns the surface of one drawable, preferring a GPU surface and falling
//! back to a CPU raster surface when the GPU tier cannot be brought up. On top of the surface it
//! maintains a clip region, emulates XOR drawing, and decides when drawing is flushed and
//! presented.
#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Surface lifecycle, clipping, XOR emulation, flushing and the drawing entry points.
pub mod backend;
/// Configuration, errors and basic geometry types.
pub mod foundation;
/// Polygons, paths and clip regions.
pub mod geometry;
/// Colors, blend modes and paints.
pub mod paint;
/// Canvases, pixel buffers and bitmaps.
pub mod render;

pub use backend::graphics::{
    BackendEnv, Gradient, GraphicsBackend, InvertMode, LineCap, LineJoin, OutputSupport, PolyFlag,
};
pub use backend::headless::{
    HeadlessPlatform, HeadlessWindow, ManualEventLoop, PresentLog, SimulatedGpuContext,
};
pub use backend::platform::{
    EventLoop, GeometryProvider, GpuPlatform, IdleTaskId, NativeWindow, PresentationContext,
    SharedGpuContext, TaskPriority,
};
pub use foundation::config::{GraphicsOpts, RenderConfig, RenderMethod};
pub use foundation::core::{Affine, BezPath, IntRect, Point, Rect, TwoRect, Vec2};
pub use foundation::error::{RasterError, RasterResult};
pub use geometry::polygon::{ControlPoints, PolyPolygon, Polygon};
pub use geometry::region::Region;
pub use paint::blend::BlendMode;
pub use paint::color::{Color, RenderColor, RopColor};
pub use paint::paint::{FillRule, Paint};
pub use render::bitmap::{Bitmap, RenderableBitmap};
pub use render::canvas::{Canvas, CanvasStats};
pub use render::pixels::{AlphaType, Image, PixelBuffer};
pub use render::raster::RasterCanvas;
#[cfg(feature = "gpu")]
pub use render::gpu::{GpuCanvas, WgpuContext};
