//! GPU resource management and the stage renderer.
//!
//! Provides wgpu device/surface initialization, growable uniform storage,
//! texture uploads, pipeline boilerplate and the [`StageRenderer`] that
//! draws a [`Stage`](crate::engine::Stage).

/// Growable GPU buffers and aligned per-draw uniform packing.
pub mod dynamic_buffer;
/// Shared wgpu boilerplate for the viewer's raster pipelines.
pub mod pipeline_helpers;
/// wgpu device, surface, and queue initialization.
pub mod render_context;
/// Draws the stage each frame.
pub mod stage_renderer;
/// Depth targets and sampled RGBA textures.
pub mod texture;

pub use render_context::{RenderContext, RenderContextError};
pub use stage_renderer::StageRenderer;
