//! Per-frame rotation and zoom.
//!
//! The engine holds a non-owning binding to the live model. Each frame it
//! applies exactly one rotation source, chosen by priority: a held rotate
//! button, else idle auto-rotation when nothing is dragging. Drags are
//! applied as they arrive via [`RotationEngine::apply_drag`], not here.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::camera::Camera;
use crate::input::{DragDelta, FrameInput};
use crate::options::InteractionOptions;
use crate::scene::{RotatableTexturedEntity, SharedEntity};

/// Which input governed a frame's rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionSource {
    /// No button, no drag: idle auto-rotation (if enabled).
    Idle,
    /// A drag is in progress; the frame adds nothing.
    Dragging,
    /// A rotate button is held.
    ButtonHeld,
}

/// Applies button, idle and zoom state to the bound model and camera.
#[derive(Debug)]
pub struct RotationEngine {
    target: Option<Weak<RefCell<dyn RotatableTexturedEntity>>>,
    idle_speed: f32,
    button_speed: f32,
    auto_rotate: bool,
    user_zoomed: bool,
}

impl Default for RotationEngine {
    fn default() -> Self {
        Self::new(&InteractionOptions::default())
    }
}

impl RotationEngine {
    /// Unbound engine with the given speeds.
    #[must_use]
    pub fn new(options: &InteractionOptions) -> Self {
        Self {
            target: None,
            idle_speed: options.idle_speed,
            button_speed: options.button_speed,
            auto_rotate: options.auto_rotate,
            user_zoomed: false,
        }
    }

    /// Apply new speeds and the auto-rotate flag.
    pub fn set_options(&mut self, options: &InteractionOptions) {
        self.idle_speed = options.idle_speed;
        self.button_speed = options.button_speed;
        self.auto_rotate = options.auto_rotate;
    }

    /// Rebind to `target`, replacing any previous binding in one step.
    ///
    /// Takes `&mut self`, so it can never interleave with
    /// [`tick`](Self::tick).
    pub fn set_target(&mut self, target: &SharedEntity) {
        self.target = Some(Rc::downgrade(target));
    }

    /// Drop the binding. Later ticks only zoom.
    pub fn clear_target(&mut self) {
        self.target = None;
    }

    /// Whether the engine is bound to exactly `target`.
    #[must_use]
    pub fn is_bound_to(&self, target: &SharedEntity) -> bool {
        self.target
            .as_ref()
            .and_then(Weak::upgrade)
            .is_some_and(|bound| Rc::ptr_eq(&bound, target))
    }

    /// Rotate the bound model by a drag delta, immediately.
    ///
    /// Returns `false` when unbound, when the model was dropped, or when it
    /// is already borrowed.
    pub fn apply_drag(&self, delta: DragDelta) -> bool {
        self.rotate_target(delta.yaw, delta.pitch)
    }

    /// Advance one frame.
    ///
    /// A held button turns the model by `direction * button_speed`
    /// regardless of dragging. Otherwise, when not dragging and
    /// auto-rotate is on, it turns by `idle_speed`. Pending zoom is then
    /// added to the camera distance, clamped to the zoom bounds.
    pub fn tick(
        &mut self,
        input: FrameInput,
        camera: &mut Camera,
    ) -> MotionSource {
        let source = if input.button.is_held() {
            let d_yaw = input.button.sign() * self.button_speed;
            let _ = self.rotate_target(d_yaw, 0.0);
            MotionSource::ButtonHeld
        } else if input.dragging {
            MotionSource::Dragging
        } else {
            if self.auto_rotate {
                let _ = self.rotate_target(self.idle_speed, 0.0);
            }
            MotionSource::Idle
        };

        if input.zoom != 0.0 {
            camera.zoom_by(input.zoom);
            self.user_zoomed = true;
        }
        source
    }

    /// Whether idle auto-rotation is on.
    #[must_use]
    pub fn auto_rotate(&self) -> bool {
        self.auto_rotate
    }

    /// Flip idle auto-rotation, returning the new state.
    pub fn toggle_auto_rotate(&mut self) -> bool {
        self.auto_rotate = !self.auto_rotate;
        let state = if self.auto_rotate { "on" } else { "off" };
        log::debug!("auto-rotate {state}");
        self.auto_rotate
    }

    /// Whether a non-zero wheel zoom has ever been applied.
    #[must_use]
    pub fn user_zoomed(&self) -> bool {
        self.user_zoomed
    }

    fn rotate_target(&self, d_yaw: f32, d_pitch: f32) -> bool {
        let Some(target) = self.target.as_ref().and_then(Weak::upgrade) else {
            return false;
        };
        let Ok(mut model) = target.try_borrow_mut() else {
            log::debug!("rotation target busy, skipping");
            return false;
        };
        model.rotate(d_yaw, d_pitch);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::{ZOOM_MAX, ZOOM_MIN};
    use crate::input::ButtonDirection;
    use crate::options::CameraOptions;
    use crate::scene::{shared, ModelKind, Scene, ShapeModel};

    fn bound() -> (RotationEngine, SharedEntity, Camera) {
        let mut scene = Scene::new();
        let model = shared(ShapeModel::new(ModelKind::Cube, scene.allocate(), 3));
        let mut engine = RotationEngine::default();
        engine.set_target(&model);
        let camera = Camera::new(&CameraOptions::default(), 1.0, 5.0);
        (engine, model, camera)
    }

    fn idle() -> FrameInput {
        FrameInput::default()
    }

    fn yaw(model: &SharedEntity) -> f32 {
        model.borrow().orientation().yaw
    }

    #[test]
    fn idle_ticks_accumulate() {
        let (mut engine, model, mut camera) = bound();
        for _ in 0..10 {
            assert_eq!(engine.tick(idle(), &mut camera), MotionSource::Idle);
        }
        assert!((yaw(&model) - 10.0 * 0.004).abs() < 1e-6);
    }

    #[test]
    fn button_overrides_drag() {
        let (mut engine, model, mut camera) = bound();
        let input = FrameInput {
            button: ButtonDirection::Backward,
            dragging: true,
            zoom: 0.0,
        };
        for _ in 0..5 {
            assert_eq!(engine.tick(input, &mut camera), MotionSource::ButtonHeld);
        }
        assert!((yaw(&model) + 5.0 * 0.028).abs() < 1e-6);
    }

    #[test]
    fn dragging_suppresses_idle() {
        let (mut engine, model, mut camera) = bound();
        let input = FrameInput {
            dragging: true,
            ..FrameInput::default()
        };
        assert_eq!(engine.tick(input, &mut camera), MotionSource::Dragging);
        assert_eq!(yaw(&model), 0.0);
    }

    #[test]
    fn auto_rotate_off_stops_idle_only() {
        let (mut engine, model, mut camera) = bound();
        assert!(!engine.toggle_auto_rotate());
        let _ = engine.tick(idle(), &mut camera);
        assert_eq!(yaw(&model), 0.0);

        let held = FrameInput {
            button: ButtonDirection::Forward,
            ..FrameInput::default()
        };
        let _ = engine.tick(held, &mut camera);
        assert!((yaw(&model) - 0.028).abs() < 1e-6);
    }

    #[test]
    fn zoom_is_clamped() {
        let (mut engine, _model, mut camera) = bound();
        assert!(!engine.user_zoomed());
        let out = FrameInput {
            zoom: 50.0,
            ..FrameInput::default()
        };
        let _ = engine.tick(out, &mut camera);
        assert_eq!(camera.distance(), ZOOM_MAX);
        assert!(engine.user_zoomed());

        let back = FrameInput {
            zoom: -50.0,
            ..FrameInput::default()
        };
        let _ = engine.tick(back, &mut camera);
        assert_eq!(camera.distance(), ZOOM_MIN);
    }

    #[test]
    fn unbound_or_dropped_target_is_a_no_op() {
        let mut engine = RotationEngine::default();
        let mut camera = Camera::new(&CameraOptions::default(), 1.0, 5.0);
        assert_eq!(engine.tick(idle(), &mut camera), MotionSource::Idle);
        assert!(!engine.apply_drag(DragDelta { yaw: 1.0, pitch: 1.0 }));

        let (mut engine, model, mut camera) = bound();
        drop(model);
        let _ = engine.tick(idle(), &mut camera);
        assert!(!engine.apply_drag(DragDelta { yaw: 1.0, pitch: 0.0 }));
    }

    #[test]
    fn busy_target_is_skipped() {
        let (engine, model, _camera) = bound();
        let guard = model.borrow();
        assert!(!engine.apply_drag(DragDelta { yaw: 1.0, pitch: 0.0 }));
        drop(guard);
        assert!(engine.apply_drag(DragDelta { yaw: 1.0, pitch: 0.5 }));
        assert_eq!(model.borrow().orientation().pitch, 0.5);
    }

    #[test]
    fn set_target_replaces_binding() {
        let (mut engine, first, mut camera) = bound();
        let mut scene = Scene::new();
        let second = shared(ShapeModel::new(ModelKind::Sphere, scene.allocate(), 3));
        engine.set_target(&second);
        assert!(engine.is_bound_to(&second));
        assert!(!engine.is_bound_to(&first));
        let _ = engine.tick(idle(), &mut camera);
        assert_eq!(yaw(&first), 0.0);
        assert!(yaw(&second) > 0.0);
    }
}
