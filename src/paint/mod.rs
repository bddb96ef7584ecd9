/// Porter-Duff and separable blend modes over premultiplied RGBA8.
pub mod blend;
/// Device colors and their renderer-side representation.
pub mod color;
/// Paint descriptions handed to a canvas.
pub mod paint;
