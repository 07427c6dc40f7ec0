use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Whether a viewport resize may overwrite the camera distance.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default,
    JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum ResizeZoomPolicy {
    /// Reset on the first valid resize, and afterwards only until the user
    /// zooms with the wheel.
    #[default]
    PreserveUserZoom,
    /// Reset to the breakpoint distance on every resize.
    AlwaysReset,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Viewport", inline)]
#[serde(default)]
/// Size-dependent camera defaults.
pub struct ViewportOptions {
    /// Widths below this many pixels use the mobile distance.
    #[schemars(title = "Mobile Breakpoint", range(min = 200, max = 2000))]
    pub mobile_breakpoint: u32,
    /// Default camera distance on narrow viewports.
    #[schemars(title = "Mobile Distance", range(min = 2.5, max = 9.0), extend("step" = 0.1))]
    pub mobile_distance: f32,
    /// Default camera distance on wide viewports.
    #[schemars(title = "Desktop Distance", range(min = 2.5, max = 9.0), extend("step" = 0.1))]
    pub desktop_distance: f32,
    /// Resize behaviour with respect to user zoom.
    #[schemars(title = "Resize Policy")]
    pub resize_policy: ResizeZoomPolicy,
}

impl Default for ViewportOptions {
    fn default() -> Self {
        Self {
            mobile_breakpoint: 600,
            mobile_distance: 9.0,
            desktop_distance: 5.0,
            resize_policy: ResizeZoomPolicy::default(),
        }
    }
}

impl ViewportOptions {
    /// Default camera distance for a viewport of the given width.
    #[must_use]
    pub fn default_distance(&self, width: u32) -> f32 {
        if width < self.mobile_breakpoint {
            self.mobile_distance
        } else {
            self.desktop_distance
        }
    }
}
