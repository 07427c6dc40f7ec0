use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::engine::command::ViewerCommand;
use crate::engine::selection::SelectionEvent;
use crate::input::ButtonDirection;

/// Viewer actions that can be bound to keys.
///
/// Serialized as compact strings so TOML presets stay readable:
/// ```toml
/// [keybindings.bindings]
/// Digit1 = "select_model:0"
/// ArrowLeft = "rotate_backward"
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum KeyAction {
    /// Make the model slot at this index live.
    SelectModel(usize),
    /// Apply the texture at this index.
    SelectTexture(usize),
    /// Apply the lighting preset at this index.
    SelectLight(usize),
    /// Rotate toward negative yaw while held.
    RotateBackward,
    /// Rotate toward positive yaw while held.
    RotateForward,
    /// Toggle idle autorotation.
    ToggleAutoRotate,
}

impl KeyAction {
    /// Command for a key press (`pressed = true`) or release.
    ///
    /// Selections and toggles fire on press only; the rotate actions start
    /// on press and stop on release.
    #[must_use]
    pub fn command(self, pressed: bool) -> Option<ViewerCommand> {
        match (self, pressed) {
            (Self::SelectModel(i), true) => {
                Some(ViewerCommand::Select(SelectionEvent::Model(i)))
            }
            (Self::SelectTexture(i), true) => {
                Some(ViewerCommand::Select(SelectionEvent::Texture(i)))
            }
            (Self::SelectLight(i), true) => {
                Some(ViewerCommand::Select(SelectionEvent::Light(i)))
            }
            (Self::ToggleAutoRotate, true) => {
                Some(ViewerCommand::ToggleAutoRotate)
            }
            (Self::RotateBackward, true) => {
                Some(ViewerCommand::StartButtonRotation(
                    ButtonDirection::Backward,
                ))
            }
            (Self::RotateForward, true) => {
                Some(ViewerCommand::StartButtonRotation(
                    ButtonDirection::Forward,
                ))
            }
            (Self::RotateBackward, false) => {
                Some(ViewerCommand::ReleaseButtonRotation(
                    ButtonDirection::Backward,
                ))
            }
            (Self::RotateForward, false) => {
                Some(ViewerCommand::ReleaseButtonRotation(
                    ButtonDirection::Forward,
                ))
            }
            _ => None,
        }
    }
}

impl fmt::Display for KeyAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SelectModel(i) => write!(f, "select_model:{i}"),
            Self::SelectTexture(i) => write!(f, "select_texture:{i}"),
            Self::SelectLight(i) => write!(f, "select_light:{i}"),
            Self::RotateBackward => f.write_str("rotate_backward"),
            Self::RotateForward => f.write_str("rotate_forward"),
            Self::ToggleAutoRotate => f.write_str("toggle_auto_rotate"),
        }
    }
}

impl FromStr for KeyAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rotate_backward" => return Ok(Self::RotateBackward),
            "rotate_forward" => return Ok(Self::RotateForward),
            "toggle_auto_rotate" => return Ok(Self::ToggleAutoRotate),
            _ => {}
        }
        let (name, index) = s
            .split_once(':')
            .ok_or_else(|| format!("unknown key action `{s}`"))?;
        let index: usize = index
            .parse()
            .map_err(|_| format!("bad index in key action `{s}`"))?;
        match name {
            "select_model" => Ok(Self::SelectModel(index)),
            "select_texture" => Ok(Self::SelectTexture(index)),
            "select_light" => Ok(Self::SelectLight(index)),
            _ => Err(format!("unknown key action `{s}`")),
        }
    }
}

impl TryFrom<String> for KeyAction {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<KeyAction> for String {
    fn from(action: KeyAction) -> Self {
        action.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_formats_every_form() {
        for action in [
            KeyAction::SelectModel(2),
            KeyAction::SelectTexture(0),
            KeyAction::SelectLight(1),
            KeyAction::RotateBackward,
            KeyAction::RotateForward,
            KeyAction::ToggleAutoRotate,
        ] {
            assert_eq!(action.to_string().parse::<KeyAction>(), Ok(action));
        }
    }

    #[test]
    fn rejects_unknown_actions() {
        assert!("spin".parse::<KeyAction>().is_err());
        assert!("select_model:x".parse::<KeyAction>().is_err());
        assert!("select_camera:1".parse::<KeyAction>().is_err());
    }

    #[test]
    fn rotate_keys_start_and_stop() {
        assert_eq!(
            KeyAction::RotateForward.command(true),
            Some(ViewerCommand::StartButtonRotation(ButtonDirection::Forward))
        );
        assert_eq!(
            KeyAction::RotateForward.command(false),
            Some(ViewerCommand::ReleaseButtonRotation(
                ButtonDirection::Forward
            ))
        );
    }

    #[test]
    fn selections_fire_on_press_only() {
        assert_eq!(
            KeyAction::SelectTexture(1).command(true),
            Some(ViewerCommand::Select(SelectionEvent::Texture(1)))
        );
        assert_eq!(KeyAction::SelectTexture(1).command(false), None);
        assert_eq!(KeyAction::ToggleAutoRotate.command(false), None);
    }
}
