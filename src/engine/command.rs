//! The viewer's discrete interactive vocabulary.
//!
//! Key presses, panel clicks and programmatic calls all become a
//! `ViewerCommand` and go through
//! [`Stage::execute`](super::Stage::execute). Continuous pointer input
//! travels separately as [`InputEvent`](crate::input::InputEvent)s.

use super::selection::SelectionEvent;
use crate::input::ButtonDirection;

/// A discrete viewer operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerCommand {
    /// Model, texture or lighting selection.
    Select(SelectionEvent),
    /// Begin rotating while a button is held.
    StartButtonRotation(ButtonDirection),
    /// Release one rotate button; another held button takes over.
    ReleaseButtonRotation(ButtonDirection),
    /// Release every rotate button.
    StopButtonRotation,
    /// Turn idle auto-rotation on or off.
    ToggleAutoRotate,
}
