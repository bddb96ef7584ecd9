use std::sync::atomic::{AtomicBool, Ordering};

use smallvec::SmallVec;

use crate::foundation::error::{RasterError, RasterResult};

/// Rendering tier a surface is created with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMethod {
    /// GPU-accelerated surfaces.
    Gpu,
    /// Software surfaces. Always available and never disabled.
    Raster,
}

impl RenderMethod {
    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "gpu" | "vulkan" | "metal" => Some(Self::Gpu),
            "raster" | "cpu" | "software" => Some(Self::Raster),
            _ => None,
        }
    }
}

/// Process-lifetime backend selection shared by every graphics backend.
///
/// Once a GPU failure is observed the GPU tier is disabled for the remainder of the process;
/// every later surface creation goes straight to raster.
#[derive(Debug)]
pub struct RenderConfig {
    preferred: RenderMethod,
    gpu_disabled: AtomicBool,
}

#[derive(serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct RenderConfigFile {
    #[serde(default = "default_method")]
    render_method: RenderMethod,
    #[serde(default)]
    disable_gpu: bool,
}

fn default_method() -> RenderMethod {
    RenderMethod::Gpu
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self::new(RenderMethod::Gpu)
    }
}

impl RenderConfig {
    /// Config preferring `preferred`.
    pub fn new(preferred: RenderMethod) -> Self {
        Self {
            preferred,
            gpu_disabled: AtomicBool::new(false),
        }
    }

    /// Read `RASTERBRIDGE_RENDER_METHOD` and `RASTERBRIDGE_DISABLE_GPU`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`RenderConfig::from_env`] with an injectable variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let preferred = lookup("RASTERBRIDGE_RENDER_METHOD")
            .and_then(|v| RenderMethod::parse(&v))
            .unwrap_or(RenderMethod::Gpu);
        let disable = lookup("RASTERBRIDGE_DISABLE_GPU")
            .map(|v| matches!(v.trim(), "1" | "true" | "yes"))
            .unwrap_or(false);
        let cfg = Self::new(preferred);
        if disable {
            cfg.disable(RenderMethod::Gpu);
        }
        cfg
    }

    /// Parse `{"render_method": "gpu" | "raster", "disable_gpu": bool}`.
    pub fn from_json(json: &str) -> RasterResult<Self> {
        let file: RenderConfigFile =
            serde_json::from_str(json).map_err(|e| RasterError::config(e.to_string()))?;
        let cfg = Self::new(file.render_method);
        if file.disable_gpu {
            cfg.disable(RenderMethod::Gpu);
        }
        Ok(cfg)
    }

    /// Tier that new surfaces should try first.
    pub fn method_to_use(&self) -> RenderMethod {
        match self.preferred {
            RenderMethod::Gpu if !self.is_disabled(RenderMethod::Gpu) => RenderMethod::Gpu,
            _ => RenderMethod::Raster,
        }
    }

    /// Permanently disable a tier. Raster cannot be disabled.
    pub fn disable(&self, method: RenderMethod) {
        match method {
            RenderMethod::Gpu => self.gpu_disabled.store(true, Ordering::Release),
            RenderMethod::Raster => tracing::warn!("ignoring request to disable raster rendering"),
        }
    }

    /// Whether `method` has been disabled.
    pub fn is_disabled(&self, method: RenderMethod) -> bool {
        match method {
            RenderMethod::Gpu => self.gpu_disabled.load(Ordering::Acquire),
            RenderMethod::Raster => false,
        }
    }

    /// Tiers to attempt, in order. Raster is always last.
    pub fn candidates(&self) -> SmallVec<[RenderMethod; 2]> {
        let mut out = SmallVec::new();
        if self.method_to_use() == RenderMethod::Gpu {
            out.push(RenderMethod::Gpu);
        }
        out.push(RenderMethod::Raster);
        out
    }
}

/// Per graphics-backend options.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct GraphicsOpts {
    /// Antialias vector drawing (rectangle fills from `draw_rect` are never antialiased).
    pub antialias: bool,
    /// Keep the existing surface when the geometry provider reports a new size.
    pub avoid_resize_recreation: bool,
    /// Pixels drawn from raw buffers before a synchronous flush is forced.
    pub flush_pixel_threshold: u64,
}

impl Default for GraphicsOpts {
    fn default() -> Self {
        Self {
            antialias: true,
            avoid_resize_recreation: false,
            flush_pixel_threshold: 10 * 1024 * 1024,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/config.rs"]
mod tests;
