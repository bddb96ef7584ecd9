//! GPU tier backed by `wgpu`.
//!
//! Drawing is rasterized on the CPU; each flush uploads the pixels into a device texture and
//! submits the queue, so presentation contexts can sample the texture directly.

use kurbo::{Affine, BezPath, Point, Rect};

use crate::backend::platform::SharedGpuContext;
use crate::foundation::config::RenderMethod;
use crate::foundation::core::IntRect;
use crate::foundation::error::{RasterError, RasterResult};
use crate::paint::color::RenderColor;
use crate::paint::paint::{FillRule, Paint};
use crate::render::canvas::{Canvas, CanvasStats};
use crate::render::pixels::Image;
use crate::render::raster::RasterCanvas;

/// Device and queue shared by every GPU surface of the process.
#[derive(Clone, Debug)]
pub struct WgpuContext {
    device: wgpu::Device,
    queue: wgpu::Queue,
}

impl WgpuContext {
    /// Pick an adapter and open a device on it.
    pub fn new() -> RasterResult<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: None,
            force_fallback_adapter: false,
        }))
        .map_err(|e| match e {
            wgpu::RequestAdapterError::NotFound { .. } => {
                RasterError::backend("no gpu adapter available")
            }
            other => RasterError::backend(format!("wgpu request_adapter failed: {other:?}")),
        })?;

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("rasterbridge"),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            experimental_features: wgpu::ExperimentalFeatures::default(),
            memory_hints: wgpu::MemoryHints::MemoryUsage,
            trace: wgpu::Trace::Off,
        }))
        .map_err(|e| RasterError::backend(format!("wgpu request_device failed: {e:?}")))?;

        tracing::info!(adapter = ?adapter.get_info().name, "opened gpu device");
        Ok(Self { device, queue })
    }
}

impl SharedGpuContext for WgpuContext {
    fn create_surface(&self, width: u32, height: u32) -> Option<Box<dyn Canvas>> {
        let max = self.device.limits().max_texture_dimension_2d;
        if width > max || height > max {
            tracing::warn!(width, height, max, "gpu surface exceeds texture limits");
            return None;
        }
        let cpu = match RasterCanvas::new(width, height) {
            Ok(c) => c.tagged(RenderMethod::Gpu),
            Err(e) => {
                tracing::warn!(error = %e, "cannot allocate gpu staging canvas");
                return None;
            }
        };
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("rasterbridge_surface"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_DST
                | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        Some(Box::new(GpuCanvas {
            cpu,
            texture,
            context: self.clone(),
        }))
    }
}

/// Canvas whose flushed contents live in a premultiplied `Rgba8Unorm` texture.
pub struct GpuCanvas {
    cpu: RasterCanvas,
    texture: wgpu::Texture,
    context: WgpuContext,
}

impl GpuCanvas {
    /// Texture holding the last flushed frame.
    pub fn texture(&self) -> &wgpu::Texture {
        &self.texture
    }

    fn upload(&self) {
        let pixels = self.cpu.pixels();
        self.context.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            pixels.data(),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(pixels.width() * 4),
                rows_per_image: Some(pixels.height()),
            },
            wgpu::Extent3d {
                width: pixels.width(),
                height: pixels.height(),
                depth_or_array_layers: 1,
            },
        );
        self.context.queue.submit([]);
    }
}

impl Canvas for GpuCanvas {
    fn width(&self) -> u32 {
        self.cpu.width()
    }

    fn height(&self) -> u32 {
        self.cpu.height()
    }

    fn method(&self) -> RenderMethod {
        RenderMethod::Gpu
    }

    fn save(&mut self) {
        self.cpu.save();
    }

    fn restore(&mut self) {
        self.cpu.restore();
    }

    fn save_count(&self) -> usize {
        self.cpu.save_count()
    }

    fn clip_path(&mut self, path: &BezPath, fill: FillRule, anti_alias: bool) {
        self.cpu.clip_path(path, fill, anti_alias);
    }

    fn concat(&mut self, transform: Affine) {
        self.cpu.concat(transform);
    }

    fn total_matrix(&self) -> Affine {
        self.cpu.total_matrix()
    }

    fn clear(&mut self, color: RenderColor) {
        self.cpu.clear(color);
    }

    fn draw_path(&mut self, path: &BezPath, fill: FillRule, paint: &Paint) {
        self.cpu.draw_path(path, fill, paint);
    }

    fn draw_rect(&mut self, rect: Rect, paint: &Paint) {
        self.cpu.draw_rect(rect, paint);
    }

    fn draw_point(&mut self, x: f64, y: f64, paint: &Paint) {
        self.cpu.draw_point(x, y, paint);
    }

    fn draw_line(&mut self, p0: Point, p1: Point, paint: &Paint) {
        self.cpu.draw_line(p0, p1, paint);
    }

    fn draw_image_rect(&mut self, image: &Image, src: Rect, dst: Rect, paint: &Paint) {
        self.cpu.draw_image_rect(image, src, dst, paint);
    }

    fn snapshot(&mut self) -> Image {
        self.cpu.snapshot()
    }

    fn snapshot_rect(&mut self, rect: IntRect) -> Image {
        self.cpu.snapshot_rect(rect)
    }

    fn flush(&mut self) {
        self.cpu.flush();
        self.upload();
    }

    fn stats(&self) -> CanvasStats {
        self.cpu.stats()
    }
}
