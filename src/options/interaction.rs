use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Interaction", inline)]
#[serde(default)]
/// Pointer, wheel and autorotation speeds.
pub struct InteractionOptions {
    /// Radians of rotation per pixel of drag movement.
    #[schemars(title = "Drag Sensitivity", range(min = 0.001, max = 0.05), extend("step" = 0.001))]
    pub drag_sensitivity: f32,
    /// Camera distance change per unit of wheel delta.
    #[schemars(title = "Zoom Sensitivity", range(min = 0.001, max = 0.05), extend("step" = 0.001))]
    pub zoom_sensitivity: f32,
    /// Radians per frame applied while nothing else drives the model.
    #[schemars(title = "Idle Speed", range(min = 0.0, max = 0.05), extend("step" = 0.001))]
    pub idle_speed: f32,
    /// Radians per frame applied while a rotate button is held.
    #[schemars(title = "Button Speed", range(min = 0.005, max = 0.1), extend("step" = 0.001))]
    pub button_speed: f32,
    /// Whether idle autorotation is enabled at startup.
    #[schemars(title = "Auto Rotate")]
    pub auto_rotate: bool,
}

impl Default for InteractionOptions {
    fn default() -> Self {
        Self {
            drag_sensitivity: 0.012,
            zoom_sensitivity: 0.008,
            idle_speed: 0.004,
            button_speed: 0.028,
            auto_rotate: true,
        }
    }
}
