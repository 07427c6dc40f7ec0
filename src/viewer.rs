//! Standalone viewer window backed by winit.
//!
//! ```no_run
//! # use vitrine::Viewer;
//! Viewer::builder()
//!     .with_asset("assets/models/robot.glb")
//!     .build()
//!     .run()
//!     .unwrap();
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use winit::{
    application::ApplicationHandler,
    event::{ElementState, MouseButton, MouseScrollDelta, Touch, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::PhysicalKey,
    window::{Window, WindowId},
};

use crate::{
    engine::{FrameScheduler, ViewerCommand, ViewerEngine},
    error::ViewerError,
    gpu::{RenderContext, StageRenderer},
    input::{InputEvent, PointerChannel},
    options::Options,
    ui::{Panels, SelectionBus},
};

/// Pixels of scroll per wheel "line".
const LINE_SCROLL_PIXELS: f32 = 100.0;

// ── Builder ──────────────────────────────────────────────────────────────

/// Fluent builder for [`Viewer`].
pub struct ViewerBuilder {
    asset: Option<PathBuf>,
    options: Option<Options>,
    title: String,
}

impl ViewerBuilder {
    fn new() -> Self {
        Self {
            asset: None,
            options: None,
            title: "Vitrine".into(),
        }
    }

    /// Import a glTF model alongside the built-in shapes.
    #[must_use]
    pub fn with_asset(mut self, path: impl Into<PathBuf>) -> Self {
        self.asset = Some(path.into());
        self
    }

    /// Override the default options.
    #[must_use]
    pub fn with_options(mut self, options: Options) -> Self {
        self.options = Some(options);
        self
    }

    /// Set the window title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Consume the builder and produce a [`Viewer`].
    #[must_use]
    pub fn build(self) -> Viewer {
        Viewer {
            asset: self.asset,
            options: self.options,
            title: self.title,
        }
    }
}

// ── Viewer ───────────────────────────────────────────────────────────────

/// A standalone window showing the interactive model viewer.
///
/// Construct via [`Viewer::builder`], then call [`run`](Self::run) to
/// enter the event loop.
pub struct Viewer {
    asset: Option<PathBuf>,
    options: Option<Options>,
    title: String,
}

impl Viewer {
    /// Start a new builder.
    #[must_use]
    pub fn builder() -> ViewerBuilder {
        ViewerBuilder::new()
    }

    /// Open the window and run the event loop. Blocks until the window is
    /// closed.
    ///
    /// # Errors
    ///
    /// Returns [`ViewerError::Viewer`] if the event loop cannot be created
    /// or exits with an error.
    pub fn run(self) -> Result<(), ViewerError> {
        let event_loop =
            EventLoop::new().map_err(|e| ViewerError::Viewer(e.to_string()))?;
        event_loop.set_control_flow(ControlFlow::Wait);

        let bus = SelectionBus::new();
        let panels = Panels::standard(&bus.sender());
        let mut app = ViewerApp {
            window: None,
            engine: None,
            renderer: None,
            bus,
            panels,
            cursor: (0.0, 0.0),
            primary_touch: None,
            asset: self.asset,
            options: self.options,
            title: self.title,
        };

        event_loop
            .run_app(&mut app)
            .map_err(|e| ViewerError::Viewer(e.to_string()))
    }
}

// ── Frame scheduling ─────────────────────────────────────────────────────

/// Delivers frames through winit redraw requests.
struct RedrawScheduler {
    window: Arc<Window>,
}

impl FrameScheduler for RedrawScheduler {
    fn request_frame(&mut self) {
        self.window.request_redraw();
    }
}

// ── Winit app ────────────────────────────────────────────────────────────

struct ViewerApp {
    window: Option<Arc<Window>>,
    engine: Option<ViewerEngine<RedrawScheduler>>,
    renderer: Option<StageRenderer>,
    bus: SelectionBus,
    panels: Panels,
    cursor: (f32, f32),
    /// Only the first finger down drives the touch channel.
    primary_touch: Option<u64>,
    asset: Option<PathBuf>,
    options: Option<Options>,
    title: String,
}

fn viewport_size(inner: winit::dpi::PhysicalSize<u32>) -> (u32, u32) {
    (inner.width, inner.height)
}

impl ViewerApp {
    fn init(&mut self, window: &Arc<Window>) -> Result<(), ViewerError> {
        let (width, height) = viewport_size(window.inner_size());
        let context = pollster::block_on(RenderContext::new(
            Arc::clone(window),
            (width.max(1), height.max(1)),
        ))?;

        let options = self.options.take().unwrap_or_default();
        let asset = self
            .asset
            .take()
            .or_else(|| options.asset.path.as_ref().map(PathBuf::from));
        let scheduler = RedrawScheduler {
            window: Arc::clone(window),
        };
        let mut engine = ViewerEngine::new(options, width, height, scheduler)?;
        if let Some(path) = asset {
            log::info!("importing {}", path.display());
            engine.stage_mut().load_asset(path)?;
        }

        let renderer = StageRenderer::new(context, engine.stage());
        let _ = engine.start();
        self.engine = Some(engine);
        self.renderer = Some(renderer);
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) {
        let (Some(engine), Some(renderer)) =
            (&mut self.engine, &mut self.renderer)
        else {
            return;
        };
        if let Some(outcome) = engine.resize(width, height) {
            renderer.resize(outcome.width, outcome.height);
        }
    }

    fn redraw(&mut self) {
        let (Some(engine), Some(renderer)) =
            (&mut self.engine, &mut self.renderer)
        else {
            return;
        };
        for event in self.bus.drain() {
            let _ = engine.execute(ViewerCommand::Select(event));
        }
        if let Err(e) = engine.on_frame(renderer) {
            log::error!("render error: {e}");
        }
    }

    fn command(&mut self, command: ViewerCommand) {
        // selections go through the panels so their state stays in sync
        if let ViewerCommand::Select(event) = command {
            if !self.panels.activate(event) {
                log::debug!("no panel option for {event:?}");
            }
            if let Some(w) = &self.window {
                w.request_redraw();
            }
            return;
        }
        if let Some(engine) = &mut self.engine {
            let _ = engine.execute(command);
        }
    }

    fn input(&mut self, event: InputEvent) {
        if let Some(engine) = &mut self.engine {
            engine.handle_input(event);
        }
    }

    fn touch(&mut self, touch: Touch) {
        let primary = *self.primary_touch.get_or_insert(touch.id);
        if primary != touch.id {
            return;
        }
        let phase = touch.phase.into();
        let event = InputEvent::pointer(
            PointerChannel::Touch,
            phase,
            touch.location.x as f32,
            touch.location.y as f32,
        );
        if matches!(event, InputEvent::PointerUp { .. }) {
            self.primary_touch = None;
        }
        self.input(event);
    }
}

impl ApplicationHandler for ViewerApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let monitor = event_loop
            .primary_monitor()
            .or_else(|| event_loop.available_monitors().next());
        let attrs = if let Some(mon) = &monitor {
            let mon_size = mon.size();
            let scale = mon.scale_factor();
            let logical_w = (f64::from(mon_size.width) / scale * 0.75) as u32;
            let logical_h = (f64::from(mon_size.height) / scale * 0.75) as u32;
            Window::default_attributes()
                .with_title(&self.title)
                .with_inner_size(winit::dpi::LogicalSize::new(
                    logical_w, logical_h,
                ))
        } else {
            Window::default_attributes().with_title(&self.title)
        };

        let window = match event_loop.create_window(attrs) {
            Ok(w) => Arc::new(w),
            Err(e) => {
                log::error!("Failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };

        if let Err(e) = self.init(&window) {
            log::error!("Failed to initialize viewer: {e}");
            event_loop.exit();
            return;
        }
        window.request_redraw();
        self.window = Some(window);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _id: WindowId,
        event: WindowEvent,
    ) {
        if matches!(event, WindowEvent::CloseRequested) {
            if let Some(engine) = &mut self.engine {
                engine.shutdown();
            }
            event_loop.exit();
            return;
        }

        if self.window.is_none() || self.engine.is_none() {
            return;
        }

        match event {
            WindowEvent::Resized(size) => {
                let (w, h) = viewport_size(size);
                self.resize(w, h);
            }

            WindowEvent::RedrawRequested => self.redraw(),

            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = (position.x as f32, position.y as f32);
                self.input(InputEvent::PointerMoved {
                    channel: PointerChannel::Mouse,
                    x: self.cursor.0,
                    y: self.cursor.1,
                });
            }

            WindowEvent::MouseInput {
                button: MouseButton::Left,
                state,
                ..
            } => {
                let channel = PointerChannel::Mouse;
                let event = match state {
                    ElementState::Pressed => InputEvent::PointerDown {
                        channel,
                        x: self.cursor.0,
                        y: self.cursor.1,
                    },
                    ElementState::Released => InputEvent::PointerUp { channel },
                };
                self.input(event);
            }

            // a drag outlives the cursor leaving the window and ends on
            // release; losing focus means the release may never arrive
            WindowEvent::Focused(false) => {
                self.input(InputEvent::PointerUp {
                    channel: PointerChannel::Mouse,
                });
            }

            WindowEvent::Touch(touch) => self.touch(touch),

            WindowEvent::MouseWheel { delta, .. } => {
                // winit reports scroll-up as positive; the viewer zooms out
                // on positive deltas
                let delta_y = match delta {
                    MouseScrollDelta::LineDelta(_, y) => -y * LINE_SCROLL_PIXELS,
                    MouseScrollDelta::PixelDelta(pos) => -pos.y as f32,
                };
                self.input(InputEvent::Wheel { delta_y });
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if event.repeat {
                    return;
                }
                let PhysicalKey::Code(code) = event.physical_key else {
                    return;
                };
                let key_str = format!("{code:?}");
                let pressed = event.state == ElementState::Pressed;
                let command = self.engine.as_ref().and_then(|engine| {
                    engine
                        .stage()
                        .options()
                        .keybindings
                        .lookup(&key_str)
                        .and_then(|action| action.command(pressed))
                });
                if let Some(command) = command {
                    self.command(command);
                }
            }

            _ => (),
        }
    }
}
