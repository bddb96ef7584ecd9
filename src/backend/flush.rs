use std::cell::Cell;
use std::rc::{Rc, Weak};

use crate::backend::platform::{EventLoop, IdleTaskId, TaskPriority};
use crate::backend::surface::{SharedSurface, Surface};

struct ScheduledFlush {
    id: IdleTaskId,
    done: Rc<Cell<bool>>,
}

/// Decides when drawing reaches the device.
///
/// On-screen surfaces are flushed immediately when the event loop is not dispatching (nothing
/// else would flush them), otherwise a single idle task is scheduled to flush and present later.
/// Independently, once enough raw pixels were uploaded since the last flush, the surface is
/// flushed synchronously to bound memory use.
pub(crate) struct FlushScheduler {
    event_loop: Rc<dyn EventLoop>,
    scheduled: Option<ScheduledFlush>,
    priority: TaskPriority,
    pending_pixels: u64,
    threshold: u64,
}

impl FlushScheduler {
    pub(crate) fn new(event_loop: Rc<dyn EventLoop>, threshold: u64) -> Self {
        Self {
            event_loop,
            scheduled: None,
            priority: TaskPriority::PostPaint,
            pending_pixels: 0,
            threshold,
        }
    }

    /// Whether an idle flush is scheduled and has not run yet.
    pub(crate) fn is_active(&mut self) -> bool {
        if let Some(s) = &self.scheduled
            && s.done.get()
        {
            // Once a deferred flush has run, later ones are urgent.
            self.scheduled = None;
            self.priority = TaskPriority::Highest;
        }
        self.scheduled.is_some()
    }

    /// Cancel any scheduled flush.
    pub(crate) fn stop(&mut self) {
        if let Some(s) = self.scheduled.take()
            && !s.done.get()
        {
            self.event_loop.cancel_idle(s.id);
        }
    }

    /// State for a brand-new surface.
    pub(crate) fn reset_for_new_surface(&mut self) {
        self.stop();
        self.priority = TaskPriority::PostPaint;
        self.pending_pixels = 0;
    }

    pub(crate) fn add_pending_pixels(&mut self, pixels: u64) {
        self.pending_pixels = self.pending_pixels.saturating_add(pixels);
    }

    pub(crate) fn pending_pixels(&self) -> u64 {
        self.pending_pixels
    }

    /// Flush `surface` now or schedule it, after a draw on an on-screen surface.
    pub(crate) fn after_draw(&mut self, surface: &SharedSurface) {
        if !self.event_loop.is_dispatching() {
            self.flush_now(surface);
        } else if !self.is_active() {
            self.schedule(Rc::downgrade(surface));
        }
    }

    /// Flush and present synchronously, cancelling a scheduled flush.
    pub(crate) fn flush_now(&mut self, surface: &SharedSurface) {
        self.stop();
        match surface.try_borrow_mut() {
            Ok(mut s) => s.flush_and_present(),
            Err(_) => tracing::warn!("surface busy, skipping flush"),
        }
    }

    /// Synchronous flush when the raw-pixel budget is exceeded.
    pub(crate) fn check_pressure(&mut self, surface: &mut Surface) {
        if self.pending_pixels > self.threshold {
            tracing::debug!(pixels = self.pending_pixels, "flushing on pixel pressure");
            surface.flush();
            self.pending_pixels = 0;
        }
    }

    fn schedule(&mut self, surface: Weak<std::cell::RefCell<Surface>>) {
        let done = Rc::new(Cell::new(false));
        let flag = Rc::clone(&done);
        let id = self.event_loop.schedule_idle(
            self.priority,
            Box::new(move || {
                flag.set(true);
                if let Some(surface) = surface.upgrade()
                    && let Ok(mut s) = surface.try_borrow_mut()
                {
                    s.flush_and_present();
                }
            }),
        );
        self.scheduled = Some(ScheduledFlush { id, done });
    }
}
