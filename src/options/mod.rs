//! Centralized viewer options with TOML preset support.
//!
//! All tweakable settings (interaction speeds, camera, viewport breakpoints,
//! display, imported asset placement, keybindings) are consolidated here.
//! Options serialize to/from TOML so presets can be kept as files.

mod asset;
mod camera;
mod display;
mod interaction;
mod keybindings;
mod viewport;

use std::path::Path;

pub use asset::AssetOptions;
pub use camera::CameraOptions;
pub use display::DisplayOptions;
pub use interaction::InteractionOptions;
pub use keybindings::KeybindingOptions;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
pub use viewport::{ResizeZoomPolicy, ViewportOptions};

use crate::error::ViewerError;

/// Top-level options container. All sub-structs use `#[serde(default)]` so
/// partial TOML files (e.g. only overriding `[interaction]`) work correctly.
#[derive(
    Debug, Clone, Serialize, Deserialize, PartialEq, Default, JsonSchema,
)]
#[serde(default)]
pub struct Options {
    /// Drag, wheel and autorotation speeds.
    pub interaction: InteractionOptions,
    /// Camera projection parameters.
    pub camera: CameraOptions,
    /// Viewport breakpoints and resize policy.
    pub viewport: ViewportOptions,
    /// Backdrop, fog and ground plane.
    pub display: DisplayOptions,
    /// Optional imported glTF model.
    pub asset: AssetOptions,
    /// Keyboard binding options.
    #[schemars(skip)]
    pub keybindings: KeybindingOptions,
}

impl Options {
    /// Generate JSON Schema describing the UI-exposed options.
    #[must_use]
    pub fn json_schema() -> schemars::Schema {
        schemars::schema_for!(Options)
    }

    /// Load options from a TOML file. Missing fields use defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ViewerError::Io`] if the file cannot be read and
    /// [`ViewerError::OptionsParse`] if it is not valid options TOML.
    pub fn load(path: &Path) -> Result<Self, ViewerError> {
        let content = std::fs::read_to_string(path).map_err(ViewerError::Io)?;
        toml::from_str(&content)
            .map_err(|e| ViewerError::OptionsParse(e.to_string()))
    }

    /// Save options to a TOML file (pretty-printed).
    ///
    /// # Errors
    ///
    /// Returns [`ViewerError::OptionsParse`] if serialization fails and
    /// [`ViewerError::Io`] if the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), ViewerError> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ViewerError::OptionsParse(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(ViewerError::Io)?;
        }
        std::fs::write(path, content).map_err(ViewerError::Io)
    }

    /// Copy of these options with one `section.field` replaced by `value`.
    ///
    /// Lets a host edit options by key path, e.g. a settings form built
    /// from [`json_schema`](Self::json_schema).
    ///
    /// # Errors
    ///
    /// Returns [`ViewerError::OptionsParse`] if the section or field does
    /// not exist or `value` has the wrong type for it.
    pub fn with_field(
        &self,
        section: &str,
        field: &str,
        value: serde_json::Value,
    ) -> Result<Self, ViewerError> {
        let mut root = serde_json::to_value(self)
            .map_err(|e| ViewerError::OptionsParse(e.to_string()))?;
        let slot = root
            .get_mut(section)
            .and_then(|s| s.get_mut(field))
            .ok_or_else(|| {
                ViewerError::OptionsParse(format!(
                    "unknown option {section}.{field}"
                ))
            })?;
        *slot = value;
        serde_json::from_value(root)
            .map_err(|e| ViewerError::OptionsParse(e.to_string()))
    }

    /// List available preset names (TOML file stems) in a directory.
    #[must_use]
    pub fn list_presets(dir: &Path) -> Vec<String> {
        let mut names = Vec::new();
        if let Ok(entries) = std::fs::read_dir(dir) {
            for entry in entries.flatten() {
                let path = entry.path();
                if path.extension().is_some_and(|ext| ext == "toml") {
                    if let Some(stem) =
                        path.file_stem().and_then(|s| s.to_str())
                    {
                        names.push(stem.to_owned());
                    }
                }
            }
        }
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::KeyAction;

    #[test]
    fn default_round_trips_through_toml() {
        let opts = Options::default();
        let toml_str = toml::to_string_pretty(&opts).unwrap();
        let parsed: Options = toml::from_str(&toml_str).unwrap();
        assert_eq!(opts, parsed);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let toml_str = r"
[interaction]
idle_speed = 0.01
";
        let opts: Options = toml::from_str(toml_str).unwrap();
        assert_eq!(opts.interaction.idle_speed, 0.01);
        // Everything else should be default
        assert_eq!(opts.interaction.button_speed, 0.028);
        assert_eq!(opts.viewport.mobile_breakpoint, 600);
        assert_eq!(
            opts.viewport.resize_policy,
            ResizeZoomPolicy::PreserveUserZoom
        );
    }

    #[test]
    fn resize_policy_parses_snake_case() {
        let toml_str = r#"
[viewport]
resize_policy = "always_reset"
"#;
        let opts: Options = toml::from_str(toml_str).unwrap();
        assert_eq!(opts.viewport.resize_policy, ResizeZoomPolicy::AlwaysReset);
    }

    #[test]
    fn keybinding_lookup() {
        let opts = Options::default();
        assert_eq!(
            opts.keybindings.lookup("Digit2"),
            Some(KeyAction::SelectModel(1))
        );
        assert_eq!(
            opts.keybindings.lookup("ArrowLeft"),
            Some(KeyAction::RotateBackward)
        );
        assert_eq!(opts.keybindings.lookup("KeyQ"), None);
    }

    #[test]
    fn keybindings_parse_from_toml() {
        let toml_str = r#"
[keybindings.bindings]
KeyM = "select_model:2"
Space = "toggle_auto_rotate"
"#;
        let opts: Options = toml::from_str(toml_str).unwrap();
        assert_eq!(
            opts.keybindings.lookup("KeyM"),
            Some(KeyAction::SelectModel(2))
        );
        assert_eq!(
            opts.keybindings.lookup("Space"),
            Some(KeyAction::ToggleAutoRotate)
        );
        assert_eq!(opts.keybindings.lookup("Digit1"), None);
    }

    #[test]
    fn breakpoint_selects_distance() {
        let viewport = ViewportOptions::default();
        assert_eq!(viewport.default_distance(599), 9.0);
        assert_eq!(viewport.default_distance(600), 5.0);
    }

    #[test]
    fn schema_has_expected_properties() {
        let schema_value =
            serde_json::to_value(Options::json_schema()).unwrap();
        let props = schema_value["properties"].as_object().unwrap();

        assert!(props.contains_key("interaction"));
        assert!(props.contains_key("camera"));
        assert!(props.contains_key("viewport"));
        assert!(props.contains_key("display"));
        assert!(props.contains_key("asset"));

        // Skipped sections should be absent
        assert!(!props.contains_key("keybindings"));

        let camera = &props["camera"]["properties"];
        assert!(camera.get("fovy").is_some());
        assert!(camera.get("znear").is_none());
    }

    #[test]
    fn with_field_patches_one_option() {
        let opts = Options::default();
        let patched = opts
            .with_field("interaction", "idle_speed", serde_json::json!(0.5))
            .unwrap();
        assert_eq!(patched.interaction.idle_speed, 0.5);
        assert_eq!(patched.camera, opts.camera);

        assert!(opts
            .with_field("interaction", "warp", serde_json::json!(1))
            .is_err());
        assert!(opts
            .with_field("interaction", "auto_rotate", serde_json::json!("x"))
            .is_err());
    }

    #[test]
    fn save_then_load_and_list() {
        let dir = std::env::temp_dir()
            .join(format!("vitrine-options-{}", std::process::id()));
        let path = dir.join("studio.toml");
        let mut opts = Options::default();
        opts.interaction.auto_rotate = false;
        opts.save(&path).unwrap();

        let loaded = Options::load(&path).unwrap();
        assert_eq!(loaded, opts);
        assert_eq!(Options::list_presets(&dir), vec!["studio".to_owned()]);

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
