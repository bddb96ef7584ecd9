use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use crate::backend::platform::{GeometryProvider, GpuPlatform, PresentationContext};
use crate::foundation::config::{RenderConfig, RenderMethod};
use crate::render::canvas::Canvas;
use crate::render::raster::RasterCanvas;

/// Drawable surface plus, for on-screen surfaces, the context that presents it.
///
/// Field order matters: the canvas (back buffer) is dropped before the context that owns the
/// underlying resources.
pub(crate) struct Surface {
    canvas: Box<dyn Canvas>,
    context: Option<Box<dyn PresentationContext>>,
}

pub(crate) type SharedSurface = Rc<RefCell<Surface>>;

impl Surface {
    pub(crate) fn width(&self) -> u32 {
        self.canvas.width()
    }

    pub(crate) fn height(&self) -> u32 {
        self.canvas.height()
    }

    pub(crate) fn method(&self) -> RenderMethod {
        self.canvas.method()
    }

    pub(crate) fn canvas_mut(&mut self) -> &mut dyn Canvas {
        self.canvas.as_mut()
    }

    pub(crate) fn canvas(&self) -> &dyn Canvas {
        self.canvas.as_ref()
    }

    /// Submit pending work without presenting.
    pub(crate) fn flush(&mut self) {
        self.canvas.flush();
    }

    /// Submit pending work and present on-screen surfaces.
    pub(crate) fn flush_and_present(&mut self) {
        self.canvas.flush();
        if let Some(ctx) = self.context.as_mut() {
            ctx.swap_buffers(self.canvas.as_mut());
        }
    }
}

/// Creates, recreates and releases the surface of one graphics backend.
pub(crate) struct SurfaceManager {
    config: Arc<RenderConfig>,
    platform: Rc<dyn GpuPlatform>,
    surface: Option<SharedSurface>,
}

impl SurfaceManager {
    pub(crate) fn new(config: Arc<RenderConfig>, platform: Rc<dyn GpuPlatform>) -> Self {
        Self {
            config,
            platform,
            surface: None,
        }
    }

    pub(crate) fn current(&self) -> Option<SharedSurface> {
        self.surface.clone()
    }

    pub(crate) fn is_gpu(&self) -> bool {
        self.surface
            .as_ref()
            .is_some_and(|s| s.borrow().method() == RenderMethod::Gpu)
    }

    /// Create the surface for `geometry`, trying each allowed tier in order.
    ///
    /// The new canvas gets its base save level pushed, so its save count is 2.
    ///
    /// # Panics
    ///
    /// Panics when even the raster tier cannot produce a surface.
    #[tracing::instrument(
        skip(self, geometry),
        fields(width = geometry.width(), height = geometry.height())
    )]
    pub(crate) fn create(&mut self, geometry: &dyn GeometryProvider) -> SharedSurface {
        debug_assert!(self.surface.is_none());
        let width = geometry.width().max(1);
        let height = geometry.height().max(1);
        let offscreen = geometry.is_offscreen();

        for method in self.config.candidates() {
            let created = if offscreen {
                self.create_offscreen(width, height, method)
            } else {
                self.create_window(geometry, width, height, method)
            };
            match created {
                Some(mut surface) => {
                    surface.canvas.save();
                    tracing::info!(?method, offscreen, "created surface");
                    let surface = Rc::new(RefCell::new(surface));
                    self.surface = Some(Rc::clone(&surface));
                    return surface;
                }
                None if method == RenderMethod::Gpu => {
                    tracing::warn!(offscreen, "cannot create GPU surface, disabling GPU rendering");
                    self.config.disable(RenderMethod::Gpu);
                }
                None => {}
            }
        }
        panic!("cannot create a {width}x{height} surface with any rendering method");
    }

    fn create_window(
        &self,
        geometry: &dyn GeometryProvider,
        width: u32,
        height: u32,
        method: RenderMethod,
    ) -> Option<Surface> {
        let mut context = self.platform.create_presentation_context(
            geometry.native_window(),
            width,
            height,
            method,
        )?;
        let canvas = context.back_buffer(width, height)?;
        Some(Surface {
            canvas,
            context: Some(context),
        })
    }

    fn create_offscreen(&self, width: u32, height: u32, method: RenderMethod) -> Option<Surface> {
        let canvas: Box<dyn Canvas> = match method {
            RenderMethod::Gpu => {
                let shared = match self.platform.shared_context() {
                    Some(shared) => shared,
                    None => {
                        // A throwaway presentation context makes the platform set up its
                        // shared GPU state.
                        drop(self.platform.create_presentation_context(
                            None,
                            width,
                            height,
                            RenderMethod::Gpu,
                        ));
                        self.platform.shared_context()?
                    }
                };
                shared.create_surface(width, height)?
            }
            RenderMethod::Raster => match RasterCanvas::new(width, height) {
                Ok(c) => Box::new(c),
                Err(e) => {
                    tracing::warn!(error = %e, "cannot allocate raster surface");
                    return None;
                }
            },
        };
        Some(Surface {
            canvas,
            context: None,
        })
    }

    /// Flush and release the surface, then its presentation context.
    pub(crate) fn destroy(&mut self) {
        let Some(surface) = self.surface.take() else {
            return;
        };
        let mut surface = surface.borrow_mut();
        debug_assert_eq!(surface.canvas.save_count(), 2);
        debug_assert_eq!(surface.canvas.total_matrix(), kurbo::Affine::IDENTITY);
        surface.flush();
        tracing::info!(method = ?surface.method(), "destroyed surface");
    }
}
