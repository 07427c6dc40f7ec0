use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Asset", inline)]
#[serde(default)]
/// Placement of the optional imported glTF model.
pub struct AssetOptions {
    /// Path to a `.glb` / `.gltf` file, if any.
    #[schemars(skip)]
    pub path: Option<String>,
    /// World-space position of the asset root.
    #[schemars(skip)]
    pub position: [f32; 3],
    /// Uniform scale applied to the asset root.
    #[schemars(title = "Scale", range(min = 0.1, max = 10.0), extend("step" = 0.1))]
    pub scale: f32,
    /// Turn the asset to face the camera (about the vertical axis) on load.
    #[schemars(title = "Face Camera")]
    pub face_camera: bool,
}

impl Default for AssetOptions {
    fn default() -> Self {
        Self {
            path: None,
            position: [-3.0, -1.6, 0.0],
            scale: 3.0,
            face_camera: true,
        }
    }
}
