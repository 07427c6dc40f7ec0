use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Display", inline)]
#[serde(default)]
/// Scene backdrop, fog, shadows and ground plane.
pub struct DisplayOptions {
    /// Clear color (linear RGB).
    #[schemars(skip)]
    pub background: [f32; 3],
    /// Fog color (linear RGB).
    #[schemars(skip)]
    pub fog_color: [f32; 3],
    /// Exponential-squared fog density.
    #[schemars(title = "Fog Density", range(min = 0.0, max = 0.2), extend("step" = 0.005))]
    pub fog_density: f32,
    /// Whether the key light casts shadows.
    #[schemars(title = "Shadows")]
    pub shadows: bool,
    /// Shadow map edge length in texels. Read when the renderer is built.
    #[schemars(skip)]
    pub shadow_map_size: u32,
    /// Whether to draw the shadow-catcher ground plane.
    #[schemars(title = "Show Ground")]
    pub show_ground: bool,
    /// Darkness of the shadows on the ground.
    #[schemars(title = "Ground Opacity", range(min = 0.0, max = 1.0), extend("step" = 0.05))]
    pub ground_opacity: f32,
    /// Ground plane height.
    #[schemars(skip)]
    pub ground_y: f32,
    /// Ground plane edge length.
    #[schemars(skip)]
    pub ground_size: f32,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            background: [0.439, 0.439, 0.439],
            fog_color: [0.039, 0.043, 0.055],
            fog_density: 0.06,
            shadows: true,
            shadow_map_size: 1024,
            show_ground: true,
            ground_opacity: 0.25,
            ground_y: -1.6,
            ground_size: 12.0,
        }
    }
}
