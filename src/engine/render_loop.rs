//! Cooperative frame loop.
//!
//! The host owns the real display clock and calls
//! [`RenderLoop::on_frame`] whenever the [`FrameScheduler`] it was given
//! fires. Each tick measures delta time, runs every registered callback in
//! registration order, renders, and asks the scheduler for the next frame.
//!
//! The callback list is a snapshot for the duration of a tick. Anything a
//! callback changes through its [`LoopHandle`] (registering, unregistering,
//! stopping) applies once the tick is over, so a stop requested mid-tick
//! still lets the current frame render.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::util::FrameTiming;

/// Host hook that delivers frames.
pub trait FrameScheduler {
    /// Ask for [`RenderLoop::on_frame`] to be called once more.
    fn request_frame(&mut self);

    /// Withdraw an outstanding request, if the host supports it.
    fn cancel_frame(&mut self) {}
}

/// Draws a world once per tick.
pub trait FrameRenderer<W> {
    /// Render failure.
    type Error: fmt::Display;

    /// Draw the current state of `world`.
    ///
    /// # Errors
    ///
    /// Implementation-defined; the loop keeps running after a failed frame.
    fn render(&mut self, world: &mut W) -> Result<(), Self::Error>;
}

/// What a call to [`RenderLoop::on_frame`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Callbacks ran and the frame was rendered.
    Rendered,
    /// The loop is stopped; nothing happened.
    Skipped,
}

/// Identifies one registered callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallbackId(u64);

/// Per-frame callback.
pub type AnimateFn<W> = Box<dyn FnMut(&mut FrameContext<'_, W>)>;

struct Registration<W> {
    id: CallbackId,
    callback: AnimateFn<W>,
}

/// Changes requested during a tick.
struct Pending<W> {
    added: Vec<Registration<W>>,
    stop: bool,
    next_id: u64,
}

impl<W> Pending<W> {
    fn allocate(&mut self) -> CallbackId {
        let id = CallbackId(self.next_id);
        self.next_id += 1;
        id
    }
}

type Removals = Rc<RefCell<Vec<CallbackId>>>;

/// Capability to remove one callback from its loop.
///
/// Removal applies before the next tick starts. Dropping this without
/// calling [`unregister`](Self::unregister) leaves the callback in place.
#[derive(Debug)]
#[must_use = "dropping an Unregister keeps the callback registered forever"]
pub struct Unregister {
    id: CallbackId,
    removals: Weak<RefCell<Vec<CallbackId>>>,
}

impl Unregister {
    /// Id of the callback this removes.
    pub fn id(&self) -> CallbackId {
        self.id
    }

    /// Remove the callback. A no-op if the loop is gone.
    pub fn unregister(self) {
        if let Some(removals) = self.removals.upgrade() {
            removals.borrow_mut().push(self.id);
        }
    }
}

/// Loop controls available to a running callback.
pub struct LoopHandle<'a, W> {
    pending: &'a mut Pending<W>,
    removals: &'a Removals,
}

impl<W> LoopHandle<'_, W> {
    /// Stop after this frame renders.
    pub fn stop(&mut self) {
        self.pending.stop = true;
    }

    /// Whether [`stop`](Self::stop) was called during this tick.
    #[must_use]
    pub fn is_stopping(&self) -> bool {
        self.pending.stop
    }

    /// Register a callback that first runs on the next tick.
    pub fn on_animate(
        &mut self,
        callback: impl FnMut(&mut FrameContext<'_, W>) + 'static,
    ) -> Unregister {
        let id = self.pending.allocate();
        self.pending.added.push(Registration {
            id,
            callback: Box::new(callback),
        });
        Unregister {
            id,
            removals: Rc::downgrade(self.removals),
        }
    }
}

/// Everything a callback sees during a tick.
pub struct FrameContext<'a, W> {
    /// The world being animated.
    pub world: &'a mut W,
    /// Seconds since the previous tick.
    pub delta: f32,
    /// Loop controls.
    pub control: LoopHandle<'a, W>,
}

/// Frame loop over a world `W`, driven by scheduler `S`.
pub struct RenderLoop<W, S> {
    callbacks: Vec<Registration<W>>,
    pending: Pending<W>,
    removals: Removals,
    scheduler: S,
    timing: FrameTiming,
    running: bool,
}

impl<W, S: FrameScheduler> RenderLoop<W, S> {
    /// Stopped loop with no callbacks.
    pub fn new(scheduler: S) -> Self {
        Self {
            callbacks: Vec::new(),
            pending: Pending {
                added: Vec::new(),
                stop: false,
                next_id: 0,
            },
            removals: Rc::new(RefCell::new(Vec::new())),
            scheduler,
            timing: FrameTiming::new(),
            running: false,
        }
    }

    /// Register a per-frame callback, run after those registered earlier.
    pub fn on_animate(
        &mut self,
        callback: impl FnMut(&mut FrameContext<'_, W>) + 'static,
    ) -> Unregister {
        let id = self.pending.allocate();
        self.callbacks.push(Registration {
            id,
            callback: Box::new(callback),
        });
        Unregister {
            id,
            removals: Rc::downgrade(&self.removals),
        }
    }

    /// Start ticking. Returns `false` if already running.
    pub fn start(&mut self) -> bool {
        if self.running {
            return false;
        }
        self.running = true;
        self.pending.stop = false;
        self.timing.reset();
        self.scheduler.request_frame();
        log::debug!("render loop started");
        true
    }

    /// Stop ticking and cancel the pending frame. Returns `false` if
    /// already stopped.
    pub fn stop(&mut self) -> bool {
        if !self.running {
            return false;
        }
        self.running = false;
        self.pending.stop = false;
        self.scheduler.cancel_frame();
        log::debug!("render loop stopped");
        true
    }

    /// Whether the loop is running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Number of registered callbacks, including ones pending removal.
    #[must_use]
    pub fn callback_count(&self) -> usize {
        self.callbacks.len()
    }

    /// Smoothed frames per second.
    #[must_use]
    pub fn fps(&self) -> f32 {
        self.timing.fps()
    }

    /// The scheduler.
    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    /// The scheduler, mutably.
    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    /// Run one tick: callbacks, then render, then schedule the next.
    ///
    /// # Errors
    ///
    /// Returns the renderer's error. The loop stays running and the next
    /// frame is still requested.
    pub fn on_frame<R: FrameRenderer<W>>(
        &mut self,
        world: &mut W,
        renderer: &mut R,
    ) -> Result<TickOutcome, R::Error> {
        if !self.running {
            return Ok(TickOutcome::Skipped);
        }
        self.apply_pending();
        let delta = self.timing.tick();

        for reg in &mut self.callbacks {
            let mut ctx = FrameContext {
                world: &mut *world,
                delta,
                control: LoopHandle {
                    pending: &mut self.pending,
                    removals: &self.removals,
                },
            };
            (reg.callback)(&mut ctx);
        }

        let result = renderer.render(world);

        self.apply_pending();
        if std::mem::take(&mut self.pending.stop) {
            self.running = false;
            self.scheduler.cancel_frame();
            log::debug!("render loop stopped from callback");
        } else {
            self.scheduler.request_frame();
        }
        result.map(|()| TickOutcome::Rendered)
    }

    fn apply_pending(&mut self) {
        self.callbacks.append(&mut self.pending.added);
        let removed = std::mem::take(&mut *self.removals.borrow_mut());
        if !removed.is_empty() {
            self.callbacks.retain(|reg| !removed.contains(&reg.id));
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    #[derive(Default)]
    struct CountingScheduler {
        requested: u32,
        cancelled: u32,
    }

    impl FrameScheduler for CountingScheduler {
        fn request_frame(&mut self) {
            self.requested += 1;
        }

        fn cancel_frame(&mut self) {
            self.cancelled += 1;
        }
    }

    /// Records the world at render time.
    #[derive(Default)]
    struct SnapshotRenderer {
        frames: Vec<Vec<&'static str>>,
    }

    impl FrameRenderer<Vec<&'static str>> for SnapshotRenderer {
        type Error = String;

        fn render(&mut self, world: &mut Vec<&'static str>) -> Result<(), String> {
            self.frames.push(std::mem::take(world));
            Ok(())
        }
    }

    type Loop = RenderLoop<Vec<&'static str>, CountingScheduler>;

    fn tick(lp: &mut Loop, r: &mut SnapshotRenderer) -> TickOutcome {
        let mut world = Vec::new();
        lp.on_frame(&mut world, r).unwrap()
    }

    #[test]
    fn callbacks_run_in_registration_order_before_render() {
        let mut lp = Loop::new(CountingScheduler::default());
        let _a = lp.on_animate(|ctx| ctx.world.push("a"));
        let _b = lp.on_animate(|ctx| ctx.world.push("b"));
        let mut r = SnapshotRenderer::default();
        assert!(lp.start());
        assert_eq!(tick(&mut lp, &mut r), TickOutcome::Rendered);
        assert_eq!(r.frames, vec![vec!["a", "b"]]);
        assert_eq!(lp.scheduler().requested, 2);
    }

    #[test]
    fn start_is_idempotent() {
        let mut lp = Loop::new(CountingScheduler::default());
        assert!(lp.start());
        assert!(!lp.start());
        assert_eq!(lp.scheduler().requested, 1);
    }

    #[test]
    fn stopped_loop_skips_frames() {
        let mut lp = Loop::new(CountingScheduler::default());
        let _a = lp.on_animate(|ctx| ctx.world.push("a"));
        let mut r = SnapshotRenderer::default();
        assert_eq!(tick(&mut lp, &mut r), TickOutcome::Skipped);

        assert!(lp.start());
        assert!(lp.stop());
        assert!(!lp.stop());
        assert_eq!(tick(&mut lp, &mut r), TickOutcome::Skipped);
        assert!(r.frames.is_empty());
        assert_eq!(lp.scheduler().cancelled, 1);
    }

    #[test]
    fn unregister_inside_tick_applies_next_tick() {
        let mut lp = Loop::new(CountingScheduler::default());
        let slot: Rc<Cell<Option<Unregister>>> = Rc::new(Cell::new(None));
        let inner = Rc::clone(&slot);
        let handle = lp.on_animate(move |ctx| {
            ctx.world.push("once");
            if let Some(u) = inner.take() {
                u.unregister();
            }
        });
        slot.set(Some(handle));
        let _b = lp.on_animate(|ctx| ctx.world.push("b"));

        let mut r = SnapshotRenderer::default();
        let _ = lp.start();
        let _ = tick(&mut lp, &mut r);
        let _ = tick(&mut lp, &mut r);
        assert_eq!(r.frames, vec![vec!["once", "b"], vec!["b"]]);
        assert_eq!(lp.callback_count(), 1);
    }

    #[test]
    fn unregister_outside_tick() {
        let mut lp = Loop::new(CountingScheduler::default());
        let a = lp.on_animate(|ctx| ctx.world.push("a"));
        let _b = lp.on_animate(|ctx| ctx.world.push("b"));
        a.unregister();

        let mut r = SnapshotRenderer::default();
        let _ = lp.start();
        let _ = tick(&mut lp, &mut r);
        assert_eq!(r.frames, vec![vec!["b"]]);
    }

    #[test]
    fn registration_inside_tick_runs_next_tick() {
        let mut lp = Loop::new(CountingScheduler::default());
        let added = Rc::new(Cell::new(false));
        let flag = Rc::clone(&added);
        let _a = lp.on_animate(move |ctx| {
            ctx.world.push("a");
            if !flag.replace(true) {
                let _late = ctx.control.on_animate(|ctx| ctx.world.push("late"));
            }
        });

        let mut r = SnapshotRenderer::default();
        let _ = lp.start();
        let _ = tick(&mut lp, &mut r);
        let _ = tick(&mut lp, &mut r);
        assert_eq!(r.frames, vec![vec!["a"], vec!["a", "late"]]);
    }

    #[test]
    fn stop_from_callback_renders_current_frame() {
        let mut lp = Loop::new(CountingScheduler::default());
        let _a = lp.on_animate(|ctx| {
            ctx.world.push("a");
            ctx.control.stop();
        });
        let _b = lp.on_animate(|ctx| {
            assert!(ctx.control.is_stopping());
            ctx.world.push("b");
        });

        let mut r = SnapshotRenderer::default();
        let _ = lp.start();
        assert_eq!(tick(&mut lp, &mut r), TickOutcome::Rendered);
        assert!(!lp.is_running());
        assert_eq!(tick(&mut lp, &mut r), TickOutcome::Skipped);
        assert_eq!(r.frames, vec![vec!["a", "b"]]);
        // one request from start, none after the stopping frame
        assert_eq!(lp.scheduler().requested, 1);
        assert_eq!(lp.scheduler().cancelled, 1);

        assert!(lp.start());
        assert_eq!(tick(&mut lp, &mut r), TickOutcome::Rendered);
    }

    #[test]
    fn render_error_keeps_loop_running() {
        struct Failing;
        impl FrameRenderer<Vec<&'static str>> for Failing {
            type Error = String;
            fn render(&mut self, _: &mut Vec<&'static str>) -> Result<(), String> {
                Err("surface lost".into())
            }
        }
        let mut lp = Loop::new(CountingScheduler::default());
        let _ = lp.start();
        let err = lp.on_frame(&mut Vec::new(), &mut Failing).unwrap_err();
        assert_eq!(err, "surface lost");
        assert!(lp.is_running());
        assert_eq!(lp.scheduler().requested, 2);
    }

    #[test]
    fn delta_is_passed_to_callbacks() {
        let mut lp = Loop::new(CountingScheduler::default());
        let seen = Rc::new(Cell::new(-1.0_f32));
        let out = Rc::clone(&seen);
        let _a = lp.on_animate(move |ctx| out.set(ctx.delta));
        let mut r = SnapshotRenderer::default();
        let _ = lp.start();
        let _ = tick(&mut lp, &mut r);
        assert!(seen.get() >= 0.0);
    }
}
