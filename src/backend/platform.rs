//! Interfaces to the windowing toolkit, the GPU platform layer and the event loop.
//!
//! The graphics backend never talks to a window system directly. It asks a
//! [`GeometryProvider`] how large its drawable is, a [`GpuPlatform`] for presentation contexts
//! and shared GPU state, and an [`EventLoop`] to run deferred flushes when it is idle.

use std::rc::Rc;

use crate::foundation::config::RenderMethod;
use crate::render::canvas::Canvas;

/// Opaque native window handle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NativeWindow(pub u64);

/// Size and kind of the drawable a backend renders into.
pub trait GeometryProvider {
    /// Width in device pixels.
    fn width(&self) -> u32;
    /// Height in device pixels.
    fn height(&self) -> u32;
    /// Offscreen drawables are never presented and never scheduled for idle flushing.
    fn is_offscreen(&self) -> bool;
    /// Native window for on-screen drawables.
    fn native_window(&self) -> Option<NativeWindow> {
        None
    }
}

/// Window-bound context that owns the back buffer and presents it.
pub trait PresentationContext {
    /// Canvas to draw the next frames into. `None` if the context cannot provide one.
    fn back_buffer(&mut self, width: u32, height: u32) -> Option<Box<dyn Canvas>>;
    /// Make the back buffer contents visible.
    fn swap_buffers(&mut self, back_buffer: &mut dyn Canvas);
}

/// GPU state shared by every offscreen surface of the process.
pub trait SharedGpuContext {
    /// Create an offscreen GPU canvas.
    fn create_surface(&self, width: u32, height: u32) -> Option<Box<dyn Canvas>>;
}

/// Platform layer creating presentation contexts and owning the shared GPU context.
pub trait GpuPlatform {
    /// Create a presentation context for `window` using `method`.
    ///
    /// Calling this for [`RenderMethod::Gpu`] also initializes the shared GPU context when the
    /// GPU is usable, even when `window` is `None` and no context is returned.
    fn create_presentation_context(
        &self,
        window: Option<NativeWindow>,
        width: u32,
        height: u32,
        method: RenderMethod,
    ) -> Option<Box<dyn PresentationContext>>;

    /// The shared GPU context, if it has been initialized.
    fn shared_context(&self) -> Option<Rc<dyn SharedGpuContext>>;
}

/// Scheduling priority of idle tasks, highest first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TaskPriority {
    /// Run before anything else.
    Highest,
    /// Run after pending paint work.
    PostPaint,
}

/// Handle returned by [`EventLoop::schedule_idle`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct IdleTaskId(pub u64);

/// Toolkit event loop.
pub trait EventLoop {
    /// Whether the loop is currently dispatching events. Outside dispatch nothing would ever run
    /// an idle task, so work must be done synchronously.
    fn is_dispatching(&self) -> bool;
    /// Run `task` once the loop is idle.
    fn schedule_idle(&self, priority: TaskPriority, task: Box<dyn FnOnce()>) -> IdleTaskId;
    /// Drop a scheduled task that has not run yet.
    fn cancel_idle(&self, id: IdleTaskId);
}
