//! Keeps the camera in step with the container size.

use crate::camera::Camera;
use crate::options::{ResizeZoomPolicy, ViewportOptions};

/// What a resize changed. The host resizes its surface to `width` x
/// `height`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeOutcome {
    /// New surface width in pixels.
    pub width: u32,
    /// New surface height in pixels.
    pub height: u32,
    /// New camera aspect ratio.
    pub aspect: f32,
    /// Camera distance after a reset, if one happened.
    pub distance_reset: Option<f32>,
}

/// Applies container size changes to the camera.
#[derive(Debug, Clone)]
pub struct ViewportResizeHandler {
    options: ViewportOptions,
    size: Option<(u32, u32)>,
}

impl ViewportResizeHandler {
    /// Handler that has not seen a valid size yet.
    #[must_use]
    pub fn new(options: ViewportOptions) -> Self {
        Self {
            options,
            size: None,
        }
    }

    /// Replace breakpoints and policy.
    pub fn set_options(&mut self, options: ViewportOptions) {
        self.options = options;
    }

    /// Last valid size, if any.
    #[must_use]
    pub fn size(&self) -> Option<(u32, u32)> {
        self.size
    }

    /// Handle a container resize.
    ///
    /// Zero width or height is ignored. Otherwise the aspect ratio is
    /// updated, and the camera distance is reset to the breakpoint default
    /// according to the [`ResizeZoomPolicy`]: always, or (by default) on
    /// the first valid size and afterwards only while `user_zoomed` is
    /// false.
    pub fn on_resize(
        &mut self,
        width: u32,
        height: u32,
        camera: &mut Camera,
        user_zoomed: bool,
    ) -> Option<ResizeOutcome> {
        if width == 0 || height == 0 {
            log::debug!("ignoring {width}x{height} resize");
            return None;
        }
        let first = self.size.is_none();
        self.size = Some((width, height));

        let aspect = width as f32 / height as f32;
        camera.aspect = aspect;

        let reset = match self.options.resize_policy {
            ResizeZoomPolicy::AlwaysReset => true,
            ResizeZoomPolicy::PreserveUserZoom => first || !user_zoomed,
        };
        let distance_reset = reset.then(|| {
            let distance = self.options.default_distance(width);
            camera.set_distance(distance);
            distance
        });
        Some(ResizeOutcome {
            width,
            height,
            aspect,
            distance_reset,
        })
    }
}
