//! The viewer core: input-driven rotation, selection, viewport handling and
//! the frame loop that ties them together.
//!
//! [`Stage`] is the world a frame operates on. [`ViewerEngine`] pairs it
//! with a [`RenderLoop`] whose first callback advances the stage, so host
//! code only forwards events and calls [`ViewerEngine::on_frame`] when its
//! scheduler fires.

pub mod command;
pub mod render_loop;
pub mod rotation;
pub mod selection;
mod stage;
pub mod viewport;

pub use command::ViewerCommand;
pub use render_loop::{
    CallbackId, FrameContext, FrameRenderer, FrameScheduler, LoopHandle,
    RenderLoop, TickOutcome, Unregister,
};
pub use rotation::{MotionSource, RotationEngine};
pub use selection::{SelectionCoordinator, SelectionEvent};
pub use stage::{PlacedAsset, Stage};
pub use viewport::{ResizeOutcome, ViewportResizeHandler};

use crate::error::ViewerError;
use crate::input::InputEvent;
use crate::options::Options;

/// A [`Stage`] driven by a [`RenderLoop`].
pub struct ViewerEngine<S> {
    stage: Stage,
    render_loop: RenderLoop<Stage, S>,
}

impl<S: FrameScheduler> ViewerEngine<S> {
    /// Build the stage and register its per-frame step as the first
    /// callback. The loop starts stopped.
    ///
    /// # Errors
    ///
    /// Propagates [`Stage::new`] failures.
    pub fn new(
        options: Options,
        width: u32,
        height: u32,
        scheduler: S,
    ) -> Result<Self, ViewerError> {
        let stage = Stage::new(options, width, height)?;
        let mut render_loop: RenderLoop<Stage, S> =
            RenderLoop::new(scheduler);
        let _ = render_loop.on_animate(|ctx| {
            let _ = ctx.world.step(ctx.delta);
        });
        Ok(Self { stage, render_loop })
    }

    /// Start the loop. Returns `false` if already running.
    pub fn start(&mut self) -> bool {
        self.render_loop.start()
    }

    /// Stop the loop. Returns `false` if already stopped.
    pub fn stop(&mut self) -> bool {
        self.render_loop.stop()
    }

    /// Whether the loop is running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.render_loop.is_running()
    }

    /// Run one frame with `renderer`.
    ///
    /// # Errors
    ///
    /// Returns the renderer's error; the loop keeps running.
    pub fn on_frame<R: FrameRenderer<Stage>>(
        &mut self,
        renderer: &mut R,
    ) -> Result<TickOutcome, R::Error> {
        self.render_loop.on_frame(&mut self.stage, renderer)
    }

    /// Register an extra per-frame callback. It runs after the stage step.
    pub fn on_animate(
        &mut self,
        callback: impl FnMut(&mut FrameContext<'_, Stage>) + 'static,
    ) -> Unregister {
        self.render_loop.on_animate(callback)
    }

    /// Forward a pointer or wheel event.
    pub fn handle_input(&mut self, event: InputEvent) {
        self.stage.handle_input(event);
    }

    /// Execute a discrete command.
    pub fn execute(&mut self, command: ViewerCommand) -> bool {
        self.stage.execute(command)
    }

    /// Container resized.
    pub fn resize(&mut self, width: u32, height: u32) -> Option<ResizeOutcome> {
        self.stage.resize(width, height)
    }

    /// Tear down: stop the loop and detach from input.
    pub fn shutdown(&mut self) {
        let _ = self.render_loop.stop();
        self.stage.destroy_input();
    }

    /// Smoothed frames per second.
    #[must_use]
    pub fn fps(&self) -> f32 {
        self.render_loop.fps()
    }

    /// The stage.
    #[must_use]
    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    /// The stage, mutably.
    pub fn stage_mut(&mut self) -> &mut Stage {
        &mut self.stage
    }

    /// The frame scheduler.
    pub fn scheduler_mut(&mut self) -> &mut S {
        self.render_loop.scheduler_mut()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::input::PointerChannel;

    #[derive(Default)]
    struct CountingScheduler {
        requested: usize,
        cancelled: usize,
    }

    impl FrameScheduler for CountingScheduler {
        fn request_frame(&mut self) {
            self.requested += 1;
        }

        fn cancel_frame(&mut self) {
            self.cancelled += 1;
        }
    }

    /// Records the live model's yaw at render time.
    #[derive(Default)]
    struct YawProbe {
        yaws: Vec<f32>,
    }

    impl FrameRenderer<Stage> for YawProbe {
        type Error = String;

        fn render(&mut self, stage: &mut Stage) -> Result<(), String> {
            self.yaws.push(stage.live_model().borrow().orientation().yaw);
            Ok(())
        }
    }

    fn engine() -> ViewerEngine<CountingScheduler> {
        ViewerEngine::new(
            Options::default(),
            1280,
            720,
            CountingScheduler::default(),
        )
        .unwrap()
    }

    #[test]
    fn stopped_engine_does_not_step() {
        let mut engine = engine();
        let mut probe = YawProbe::default();
        assert_eq!(engine.on_frame(&mut probe), Ok(TickOutcome::Skipped));
        assert!(probe.yaws.is_empty());
    }

    #[test]
    fn frames_step_the_stage_before_render() {
        let mut engine = engine();
        let mut probe = YawProbe::default();
        assert!(engine.start());
        for _ in 0..3 {
            assert_eq!(engine.on_frame(&mut probe), Ok(TickOutcome::Rendered));
        }
        assert_eq!(probe.yaws.len(), 3);
        assert!((probe.yaws[0] - 0.004).abs() < 1e-6);
        assert!((probe.yaws[2] - 0.012).abs() < 1e-6);
        assert_eq!(engine.scheduler_mut().requested, 4);
    }

    #[test]
    fn extra_callbacks_see_the_stepped_stage() {
        let mut engine = engine();
        let seen = Rc::new(Cell::new(0.0_f32));
        let sink = Rc::clone(&seen);
        let _keep = engine.on_animate(move |ctx| {
            sink.set(ctx.world.live_model().borrow().orientation().yaw);
        });
        let _ = engine.start();
        let _ = engine.on_frame(&mut YawProbe::default());
        assert!((seen.get() - 0.004).abs() < 1e-6);
    }

    #[test]
    fn shutdown_stops_loop_and_input() {
        let mut engine = engine();
        let _ = engine.start();
        engine.shutdown();
        assert!(!engine.is_running());
        assert_eq!(engine.scheduler_mut().cancelled, 1);
        engine.handle_input(InputEvent::Wheel { delta_y: 100.0 });
        engine.handle_input(InputEvent::PointerDown {
            channel: PointerChannel::Mouse,
            x: 0.0,
            y: 0.0,
        });
        assert!(engine.stage().input().is_destroyed());
        assert_eq!(engine.stage().input().pending_zoom(), 0.0);
    }

    #[test]
    fn commands_reach_the_stage() {
        let mut engine = engine();
        assert!(engine.execute(ViewerCommand::Select(SelectionEvent::Model(2))));
        assert_eq!(engine.stage().selection().active_index(), 2);
        let out = engine.resize(300, 600).unwrap();
        assert_eq!(out.distance_reset, Some(9.0));
    }
}
