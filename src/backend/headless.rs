//! Window-system-free implementations of the platform interfaces.
//!
//! These back the demo binary and the test suite, and are a reasonable default for offscreen
//! rendering in tools.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::backend::platform::{
    EventLoop, GeometryProvider, GpuPlatform, IdleTaskId, NativeWindow, PresentationContext,
    SharedGpuContext, TaskPriority,
};
use crate::foundation::config::RenderMethod;
use crate::render::canvas::Canvas;
use crate::render::pixels::Image;
use crate::render::raster::RasterCanvas;

/// Resizable drawable.
#[derive(Debug)]
pub struct HeadlessWindow {
    width: Cell<u32>,
    height: Cell<u32>,
    window: Option<NativeWindow>,
}

impl HeadlessWindow {
    /// On-screen drawable backed by a fake native window.
    pub fn window(width: u32, height: u32) -> Rc<Self> {
        static NEXT_ID: std::sync::atomic::AtomicU64 = std::sync::atomic::AtomicU64::new(1);
        let id = NEXT_ID.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        Rc::new(Self {
            width: Cell::new(width),
            height: Cell::new(height),
            window: Some(NativeWindow(id)),
        })
    }

    /// Offscreen drawable (virtual device).
    pub fn offscreen(width: u32, height: u32) -> Rc<Self> {
        Rc::new(Self {
            width: Cell::new(width),
            height: Cell::new(height),
            window: None,
        })
    }

    /// Change the reported size.
    pub fn resize(&self, width: u32, height: u32) {
        self.width.set(width);
        self.height.set(height);
    }
}

impl GeometryProvider for HeadlessWindow {
    fn width(&self) -> u32 {
        self.width.get()
    }

    fn height(&self) -> u32 {
        self.height.get()
    }

    fn is_offscreen(&self) -> bool {
        self.window.is_none()
    }

    fn native_window(&self) -> Option<NativeWindow> {
        self.window
    }
}

/// Frames presented by headless presentation contexts.
#[derive(Clone, Debug, Default)]
pub struct PresentLog {
    inner: Rc<PresentLogInner>,
}

#[derive(Debug, Default)]
struct PresentLogInner {
    presents: Cell<u64>,
    last: RefCell<Option<Image>>,
}

impl PresentLog {
    /// Number of `swap_buffers` calls so far.
    pub fn presents(&self) -> u64 {
        self.inner.presents.get()
    }

    /// Most recently presented frame.
    pub fn last_frame(&self) -> Option<Image> {
        self.inner.last.borrow().clone()
    }

    fn record(&self, frame: Image) {
        self.inner.presents.set(self.inner.presents.get() + 1);
        *self.inner.last.borrow_mut() = Some(frame);
    }
}

struct HeadlessPresentation {
    method: RenderMethod,
    gpu: Option<Rc<dyn SharedGpuContext>>,
    log: PresentLog,
}

impl PresentationContext for HeadlessPresentation {
    fn back_buffer(&mut self, width: u32, height: u32) -> Option<Box<dyn Canvas>> {
        match (self.method, &self.gpu) {
            (RenderMethod::Gpu, Some(gpu)) => gpu.create_surface(width, height),
            (RenderMethod::Gpu, None) => None,
            (RenderMethod::Raster, _) => match RasterCanvas::new(width, height) {
                Ok(c) => Some(Box::new(c)),
                Err(e) => {
                    tracing::warn!(error = %e, "cannot allocate back buffer");
                    None
                }
            },
        }
    }

    fn swap_buffers(&mut self, back_buffer: &mut dyn Canvas) {
        self.log.record(back_buffer.snapshot());
    }
}

/// GPU context that rasterizes on the CPU but reports itself as a GPU tier.
///
/// Useful to exercise GPU-specific code paths (pixel-center offsets, offscreen shared-context
/// creation) on machines without a GPU.
#[derive(Debug, Default)]
pub struct SimulatedGpuContext;

impl SharedGpuContext for SimulatedGpuContext {
    fn create_surface(&self, width: u32, height: u32) -> Option<Box<dyn Canvas>> {
        RasterCanvas::new(width, height)
            .ok()
            .map(|c| Box::new(c.tagged(RenderMethod::Gpu)) as Box<dyn Canvas>)
    }
}

/// Platform without a window system.
///
/// The shared GPU context, if one was supplied, only becomes visible through
/// [`GpuPlatform::shared_context`] after the first GPU presentation context request, mirroring
/// platforms that initialize GPU state lazily.
pub struct HeadlessPlatform {
    gpu: Option<Rc<dyn SharedGpuContext>>,
    gpu_ready: Cell<bool>,
    log: PresentLog,
}

impl Default for HeadlessPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessPlatform {
    /// Raster-only platform; every GPU request fails.
    pub fn new() -> Self {
        Self {
            gpu: None,
            gpu_ready: Cell::new(false),
            log: PresentLog::default(),
        }
    }

    /// Platform whose GPU tier is served by `gpu`.
    pub fn with_gpu(gpu: Rc<dyn SharedGpuContext>) -> Self {
        Self {
            gpu: Some(gpu),
            ..Self::new()
        }
    }

    /// Platform with a [`SimulatedGpuContext`].
    pub fn simulated_gpu() -> Self {
        Self::with_gpu(Rc::new(SimulatedGpuContext))
    }

    /// Log of presented frames.
    pub fn present_log(&self) -> PresentLog {
        self.log.clone()
    }
}

impl GpuPlatform for HeadlessPlatform {
    fn create_presentation_context(
        &self,
        window: Option<NativeWindow>,
        _width: u32,
        _height: u32,
        method: RenderMethod,
    ) -> Option<Box<dyn PresentationContext>> {
        if method == RenderMethod::Gpu {
            self.gpu.as_ref()?;
            self.gpu_ready.set(true);
        }
        window?;
        Some(Box::new(HeadlessPresentation {
            method,
            gpu: self.gpu.clone(),
            log: self.log.clone(),
        }))
    }

    fn shared_context(&self) -> Option<Rc<dyn SharedGpuContext>> {
        if self.gpu_ready.get() {
            self.gpu.clone()
        } else {
            None
        }
    }
}

struct QueuedTask {
    id: IdleTaskId,
    priority: TaskPriority,
    task: Box<dyn FnOnce()>,
}

/// Event loop whose idle tasks run only when [`ManualEventLoop::run_idle`] is called.
pub struct ManualEventLoop {
    dispatching: Cell<bool>,
    next_id: Cell<u64>,
    queue: RefCell<Vec<QueuedTask>>,
}

impl Default for ManualEventLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualEventLoop {
    /// Loop that is not dispatching.
    pub fn new() -> Self {
        Self {
            dispatching: Cell::new(false),
            next_id: Cell::new(1),
            queue: RefCell::new(Vec::new()),
        }
    }

    /// Loop that reports itself as dispatching.
    pub fn dispatching() -> Self {
        let l = Self::new();
        l.set_dispatching(true);
        l
    }

    /// Change what [`EventLoop::is_dispatching`] reports.
    pub fn set_dispatching(&self, dispatching: bool) {
        self.dispatching.set(dispatching);
    }

    /// Number of queued tasks.
    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }

    /// Priority of every queued task, in queue order.
    pub fn pending_priorities(&self) -> Vec<TaskPriority> {
        self.queue.borrow().iter().map(|t| t.priority).collect()
    }

    /// Run every queued task, highest priority first. Returns how many ran.
    pub fn run_idle(&self) -> usize {
        let mut tasks = std::mem::take(&mut *self.queue.borrow_mut());
        tasks.sort_by_key(|t| t.priority);
        let n = tasks.len();
        for t in tasks {
            (t.task)();
        }
        n
    }
}

impl EventLoop for ManualEventLoop {
    fn is_dispatching(&self) -> bool {
        self.dispatching.get()
    }

    fn schedule_idle(&self, priority: TaskPriority, task: Box<dyn FnOnce()>) -> IdleTaskId {
        let id = IdleTaskId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.queue.borrow_mut().push(QueuedTask { id, priority, task });
        id
    }

    fn cancel_idle(&self, id: IdleTaskId) {
        self.queue.borrow_mut().retain(|t| t.id != id);
    }
}
