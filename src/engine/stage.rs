//! The viewer world: scene, camera, input, rotation, selection and the
//! optional imported asset.

use std::path::PathBuf;

use glam::Mat4;

use super::command::ViewerCommand;
use super::rotation::{MotionSource, RotationEngine};
use super::selection::{SelectionCoordinator, SelectionEvent};
use super::viewport::{ResizeOutcome, ViewportResizeHandler};
use crate::asset::{self, AnimatedAsset, AssetLoader, AssetPoll, PendingAsset};
use crate::camera::Camera;
use crate::error::ViewerError;
use crate::input::{InputAggregator, InputEvent};
use crate::lighting::LightingRig;
use crate::options::Options;
use crate::scene::{
    shared, Backdrop, ModelKind, NodeId, Scene, ShapeModel, SharedEntity,
};
use crate::texture::{TextureFactory, TextureImage};

/// The imported model once it has joined the scene.
#[derive(Debug)]
pub struct PlacedAsset {
    /// Scene node the asset occupies.
    pub node: NodeId,
    /// Root transform (position, scale, facing).
    pub root: Mat4,
    /// The model and its animation state.
    pub asset: AnimatedAsset,
}

#[derive(Debug)]
enum AssetSlot {
    None,
    Loading(PendingAsset),
    Ready(PlacedAsset),
}

/// Everything one viewer frame operates on.
pub struct Stage {
    options: Options,
    scene: Scene,
    camera: Camera,
    input: InputAggregator,
    rotation: RotationEngine,
    selection: SelectionCoordinator<LightingRig>,
    viewport: ViewportResizeHandler,
    textures: Vec<TextureImage>,
    asset: AssetSlot,
}

impl Stage {
    /// Build the stage for a `width` x `height` container.
    ///
    /// Creates the textures and one slot per built-in shape, makes the cube
    /// live, and applies the initial size. A zero size leaves the camera at
    /// the desktop distance until a valid resize arrives.
    ///
    /// # Errors
    ///
    /// Returns [`ViewerError::Viewer`] if no model slots could be built.
    pub fn new(
        options: Options,
        width: u32,
        height: u32,
    ) -> Result<Self, ViewerError> {
        let textures = TextureFactory::default().create_all();
        let mut scene = Scene::with_backdrop(Backdrop::from(&options.display));
        let mut rotation = RotationEngine::new(&options.interaction);

        let slots: Vec<SharedEntity> = ModelKind::ALL
            .iter()
            .map(|&kind| {
                shared(ShapeModel::new(kind, scene.allocate(), textures.len()))
            })
            .collect();
        let selection = SelectionCoordinator::new(
            slots,
            textures.len(),
            LightingRig::new(),
            &mut scene,
            &mut rotation,
        )?;

        let camera = Camera::new(
            &options.camera,
            1.0,
            options.viewport.desktop_distance,
        );
        let mut stage = Self {
            input: InputAggregator::new(&options.interaction),
            viewport: ViewportResizeHandler::new(options.viewport.clone()),
            options,
            scene,
            camera,
            rotation,
            selection,
            textures,
            asset: AssetSlot::None,
        };
        let _ = stage.resize(width, height);
        Ok(stage)
    }

    // ── Input ────────────────────────────────────────────────────────────

    /// Feed one pointer or wheel event. Drag moves rotate the live model
    /// immediately; everything else waits for [`step`](Self::step).
    pub fn handle_input(&mut self, event: InputEvent) {
        if let Some(delta) = self.input.handle_event(event) {
            let _ = self.rotation.apply_drag(delta);
        }
    }

    /// Execute a discrete command.
    pub fn execute(&mut self, command: ViewerCommand) -> bool {
        match command {
            ViewerCommand::Select(event) => self.select(event),
            ViewerCommand::StartButtonRotation(direction) => {
                self.input.start_button_rotation(direction);
                true
            }
            ViewerCommand::ReleaseButtonRotation(direction) => {
                self.input.release_button_rotation(direction);
                true
            }
            ViewerCommand::StopButtonRotation => {
                self.input.stop_button_rotation();
                true
            }
            ViewerCommand::ToggleAutoRotate => {
                let _ = self.rotation.toggle_auto_rotate();
                true
            }
        }
    }

    /// Apply a panel selection.
    pub fn select(&mut self, event: SelectionEvent) -> bool {
        self.selection
            .dispatch(event, &mut self.scene, &mut self.rotation)
    }

    /// Detach from all input for good.
    pub fn destroy_input(&mut self) {
        self.input.destroy();
    }

    // ── Viewport ─────────────────────────────────────────────────────────

    /// Container resized. Returns the surface size to apply, or `None`
    /// for a zero-sized container.
    pub fn resize(&mut self, width: u32, height: u32) -> Option<ResizeOutcome> {
        self.viewport.on_resize(
            width,
            height,
            &mut self.camera,
            self.rotation.user_zoomed(),
        )
    }

    // ── Asset ────────────────────────────────────────────────────────────

    /// Start importing a glTF model in the background. It joins the scene
    /// on the first [`step`](Self::step) after it finishes.
    ///
    /// # Errors
    ///
    /// Returns [`ViewerError::ThreadSpawn`] if the import thread cannot
    /// start.
    pub fn load_asset(
        &mut self,
        path: impl Into<PathBuf>,
    ) -> Result<(), ViewerError> {
        if let AssetSlot::Ready(placed) = &self.asset {
            let _ = self.scene.detach(placed.node);
        }
        self.asset = AssetSlot::Loading(AssetLoader::spawn(path)?);
        Ok(())
    }

    /// Whether an import is still running.
    #[must_use]
    pub fn asset_loading(&self) -> bool {
        matches!(self.asset, AssetSlot::Loading(_))
    }

    /// The imported model, once placed.
    #[must_use]
    pub fn asset(&self) -> Option<&PlacedAsset> {
        match &self.asset {
            AssetSlot::Ready(placed) => Some(placed),
            _ => None,
        }
    }

    fn poll_asset(&mut self) {
        let AssetSlot::Loading(pending) = &self.asset else {
            return;
        };
        let result = match pending.poll() {
            AssetPoll::Pending => return,
            AssetPoll::Ready(result) => result,
        };
        self.asset = match result {
            Ok(asset) => {
                let node = self.scene.allocate();
                let _ = self.scene.attach(node);
                let root = asset::placement(&self.options.asset, self.camera.eye);
                log::info!("asset placed as node {}", node.raw());
                AssetSlot::Ready(PlacedAsset { node, root, asset })
            }
            Err(e) => {
                log::error!("asset import failed: {e}");
                AssetSlot::None
            }
        };
    }

    // ── Frame ────────────────────────────────────────────────────────────

    /// Advance one frame by `dt` seconds.
    ///
    /// Joins a finished import, drains the frame's input snapshot into the
    /// rotation engine, and advances the asset's animation.
    pub fn step(&mut self, dt: f32) -> MotionSource {
        self.poll_asset();
        let frame = self.input.take_frame_input();
        let source = self.rotation.tick(frame, &mut self.camera);
        if let AssetSlot::Ready(placed) = &mut self.asset {
            placed.asset.update(dt);
        }
        source
    }

    // ── Accessors ────────────────────────────────────────────────────────

    /// Current options.
    #[must_use]
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Replace options. Speeds, backdrop and viewport policy apply at
    /// once; the camera keeps its current distance.
    pub fn set_options(&mut self, options: Options) {
        self.input.set_options(&options.interaction);
        self.rotation.set_options(&options.interaction);
        self.viewport.set_options(options.viewport.clone());
        self.scene.set_backdrop(Backdrop::from(&options.display));
        self.camera.fovy = options.camera.fovy;
        self.options = options;
    }

    /// The scene graph.
    #[must_use]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// The camera.
    #[must_use]
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Input state.
    #[must_use]
    pub fn input(&self) -> &InputAggregator {
        &self.input
    }

    /// Rotation state.
    #[must_use]
    pub fn rotation(&self) -> &RotationEngine {
        &self.rotation
    }

    /// Selection state.
    #[must_use]
    pub fn selection(&self) -> &SelectionCoordinator<LightingRig> {
        &self.selection
    }

    /// Lighting, mutably (the renderer clears its dirty flag).
    pub fn lighting_mut(&mut self) -> &mut LightingRig {
        self.selection.lighting_mut()
    }

    /// The live model.
    #[must_use]
    pub fn live_model(&self) -> &SharedEntity {
        self.selection.live()
    }

    /// Textures models can wear, by index.
    #[must_use]
    pub fn textures(&self) -> &[TextureImage] {
        &self.textures
    }

    /// Whether scene attachment and rotation binding agree.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.selection.is_consistent(&self.scene, &self.rotation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::{ZOOM_MAX, ZOOM_MIN};
    use crate::input::{ButtonDirection, KeyAction, PointerChannel};
    use crate::lighting::LightingSubsystem;

    fn stage() -> Stage {
        Stage::new(Options::default(), 1280, 720).unwrap()
    }

    fn live_yaw(stage: &Stage) -> f32 {
        stage.live_model().borrow().orientation().yaw
    }

    #[test]
    fn starts_consistent_with_desktop_distance() {
        let stage = stage();
        assert!(stage.is_consistent());
        assert_eq!(stage.camera().distance(), 5.0);
        assert_eq!(stage.textures().len(), 3);
        assert_eq!(stage.selection().active_index(), 0);
    }

    #[test]
    fn narrow_container_starts_far() {
        let stage = Stage::new(Options::default(), 400, 800).unwrap();
        assert_eq!(stage.camera().distance(), 9.0);
    }

    #[test]
    fn drag_rotates_immediately() {
        let mut stage = stage();
        stage.handle_input(InputEvent::PointerDown {
            channel: PointerChannel::Mouse,
            x: 100.0,
            y: 100.0,
        });
        stage.handle_input(InputEvent::PointerMoved {
            channel: PointerChannel::Mouse,
            x: 110.0,
            y: 95.0,
        });
        let o = stage.live_model().borrow().orientation();
        assert!((o.yaw - 0.12).abs() < 1e-6);
        assert!((o.pitch + 0.06).abs() < 1e-6);

        // no idle motion while the drag is held
        assert_eq!(stage.step(0.016), MotionSource::Dragging);
        assert!((live_yaw(&stage) - 0.12).abs() < 1e-6);
    }

    #[test]
    fn drag_continues_past_the_viewport_edge() {
        let mut stage = stage();
        stage.handle_input(InputEvent::PointerDown {
            channel: PointerChannel::Mouse,
            x: 1270.0,
            y: 10.0,
        });
        stage.handle_input(InputEvent::PointerMoved {
            channel: PointerChannel::Mouse,
            x: 1290.0,
            y: -10.0,
        });
        stage.handle_input(InputEvent::PointerMoved {
            channel: PointerChannel::Mouse,
            x: 1300.0,
            y: -10.0,
        });
        let o = stage.live_model().borrow().orientation();
        assert!((o.yaw - 0.36).abs() < 1e-5);
        assert!((o.pitch + 0.24).abs() < 1e-5);
        assert!(stage.input().is_dragging());
    }

    #[test]
    fn touch_drag_matches_mouse() {
        let mut stage = stage();
        stage.handle_input(InputEvent::PointerDown {
            channel: PointerChannel::Touch,
            x: 0.0,
            y: 0.0,
        });
        stage.handle_input(InputEvent::PointerMoved {
            channel: PointerChannel::Touch,
            x: 10.0,
            y: 0.0,
        });
        assert!((live_yaw(&stage) - 0.12).abs() < 1e-6);
    }

    #[test]
    fn button_hold_via_commands() {
        let mut stage = stage();
        assert!(stage.execute(ViewerCommand::StartButtonRotation(
            ButtonDirection::Forward
        )));
        for _ in 0..3 {
            assert_eq!(stage.step(0.016), MotionSource::ButtonHeld);
        }
        let _ = stage.execute(ViewerCommand::StopButtonRotation);
        assert_eq!(stage.step(0.016), MotionSource::Idle);
        assert!((live_yaw(&stage) - (3.0 * 0.028 + 0.004)).abs() < 1e-6);
    }

    #[test]
    fn overlapping_rotate_keys_follow_the_held_key() {
        let mut stage = stage();
        let _ = stage.execute(ViewerCommand::ToggleAutoRotate);
        for (action, pressed) in [
            (KeyAction::RotateBackward, true),
            (KeyAction::RotateForward, true),
            (KeyAction::RotateBackward, false),
        ] {
            if let Some(command) = action.command(pressed) {
                let _ = stage.execute(command);
            }
        }
        assert_eq!(stage.step(0.016), MotionSource::ButtonHeld);
        assert!((live_yaw(&stage) - 0.028).abs() < 1e-6);

        if let Some(command) = KeyAction::RotateForward.command(false) {
            let _ = stage.execute(command);
        }
        assert_eq!(stage.step(0.016), MotionSource::Idle);
        assert!((live_yaw(&stage) - 0.028).abs() < 1e-6);
    }

    #[test]
    fn wheel_zoom_applies_on_step_and_clamps() {
        let mut stage = stage();
        stage.handle_input(InputEvent::Wheel { delta_y: 100.0 });
        assert_eq!(stage.camera().distance(), 5.0);
        let _ = stage.step(0.016);
        assert!((stage.camera().distance() - 5.8).abs() < 1e-5);
        assert_eq!(stage.input().pending_zoom(), 0.0);

        stage.handle_input(InputEvent::Wheel { delta_y: 10_000.0 });
        let _ = stage.step(0.016);
        assert_eq!(stage.camera().distance(), ZOOM_MAX);
        stage.handle_input(InputEvent::Wheel { delta_y: -10_000.0 });
        let _ = stage.step(0.016);
        assert_eq!(stage.camera().distance(), ZOOM_MIN);
    }

    #[test]
    fn resize_keeps_user_zoom_by_default() {
        let mut stage = stage();
        stage.handle_input(InputEvent::Wheel { delta_y: 100.0 });
        let _ = stage.step(0.0);
        let out = stage.resize(500, 800).unwrap();
        assert_eq!(out.distance_reset, None);
        assert!((stage.camera().distance() - 5.8).abs() < 1e-5);
        assert!(stage.resize(0, 0).is_none());
    }

    #[test]
    fn selections_route_through_commands() {
        let mut stage = stage();
        assert!(stage.execute(ViewerCommand::Select(SelectionEvent::Texture(2))));
        assert!(stage.execute(ViewerCommand::Select(SelectionEvent::Model(1))));
        assert!(stage.execute(ViewerCommand::Select(SelectionEvent::Light(2))));
        assert!(!stage.execute(ViewerCommand::Select(SelectionEvent::Model(7))));

        assert_eq!(stage.selection().active_index(), 1);
        assert_eq!(stage.live_model().borrow().texture_index(), 2);
        assert_eq!(stage.lighting_mut().current_preset(), 2);
        assert!(stage.is_consistent());
    }

    #[test]
    fn toggle_auto_rotate_stops_idle() {
        let mut stage = stage();
        let _ = stage.execute(ViewerCommand::ToggleAutoRotate);
        let _ = stage.step(0.016);
        assert_eq!(live_yaw(&stage), 0.0);
    }

    #[test]
    fn destroyed_input_is_inert() {
        let mut stage = stage();
        let _ = stage.execute(ViewerCommand::ToggleAutoRotate);
        stage.destroy_input();
        stage.handle_input(InputEvent::PointerDown {
            channel: PointerChannel::Mouse,
            x: 0.0,
            y: 0.0,
        });
        stage.handle_input(InputEvent::PointerMoved {
            channel: PointerChannel::Mouse,
            x: 50.0,
            y: 50.0,
        });
        stage.handle_input(InputEvent::Wheel { delta_y: 100.0 });
        let _ = stage.execute(ViewerCommand::StartButtonRotation(
            ButtonDirection::Forward,
        ));
        let _ = stage.step(0.016);
        assert_eq!(live_yaw(&stage), 0.0);
        assert_eq!(stage.camera().distance(), 5.0);
    }

    #[test]
    fn failed_import_leaves_scene_untouched() {
        let mut stage = stage();
        stage.load_asset("/no/such/dir/model.glb").unwrap();
        let before = stage.scene().attached().len();
        for _ in 0..500 {
            let _ = stage.step(0.0);
            if !stage.asset_loading() {
                break;
            }
            std::thread::sleep(std::time::Duration::from_millis(2));
        }
        assert!(!stage.asset_loading());
        assert!(stage.asset().is_none());
        assert_eq!(stage.scene().attached().len(), before);
        assert!(stage.is_consistent());
    }
}
