use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::input::KeyAction;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
/// Configurable keyboard bindings mapping key codes to actions.
pub struct KeybindingOptions {
    /// Maps key string → action (e.g. `"Digit2"` → `select_model:1`).
    pub bindings: HashMap<String, KeyAction>,
}

impl Default for KeybindingOptions {
    fn default() -> Self {
        let bindings = HashMap::from([
            ("Digit1".into(), KeyAction::SelectModel(0)),
            ("Digit2".into(), KeyAction::SelectModel(1)),
            ("Digit3".into(), KeyAction::SelectModel(2)),
            ("KeyZ".into(), KeyAction::SelectTexture(0)),
            ("KeyX".into(), KeyAction::SelectTexture(1)),
            ("KeyC".into(), KeyAction::SelectTexture(2)),
            ("KeyA".into(), KeyAction::SelectLight(0)),
            ("KeyS".into(), KeyAction::SelectLight(1)),
            ("KeyD".into(), KeyAction::SelectLight(2)),
            ("ArrowLeft".into(), KeyAction::RotateBackward),
            ("ArrowRight".into(), KeyAction::RotateForward),
            ("KeyR".into(), KeyAction::ToggleAutoRotate),
        ]);
        Self { bindings }
    }
}

impl KeybindingOptions {
    /// Look up the action for a key string.
    #[must_use]
    pub fn lookup(&self, key: &str) -> Option<KeyAction> {
        self.bindings.get(key).copied()
    }
}
