/// Bitmaps accepted by the drawing entry points.
pub mod bitmap;
/// The canvas abstraction every surface draws through.
pub mod canvas;
/// `wgpu` texture-backed surfaces.
#[cfg(feature = "gpu")]
pub mod gpu;
/// RGBA8 pixel buffers.
pub mod pixels;
/// CPU canvas built on `vello_cpu`.
pub mod raster;
