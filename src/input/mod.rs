//! Input handling: event types, per-channel drag state, and the aggregator
//! that turns raw pointer/wheel/button input into rotation and zoom.

/// Pointer, touch and wheel normalization.
pub mod aggregator;
/// Platform-agnostic input events.
pub mod event;
/// Key-bindable viewer actions.
pub mod keyboard;
/// Drag, button and zoom state channels.
pub mod state;

pub use aggregator::InputAggregator;
pub use event::{InputEvent, PointerChannel, PointerPhase};
pub use keyboard::KeyAction;
pub use state::{
    ButtonDirection, DragDelta, FrameInput, PointerState, ZoomAccumulator,
};
