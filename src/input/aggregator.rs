//! Normalizes mouse, touch, wheel and rotate-button input.
//!
//! The `InputAggregator` owns every input-side state channel: one
//! [`PointerState`] per [`PointerChannel`], the held [`ButtonDirection`] and
//! the [`ZoomAccumulator`]. Drag moves produce a [`DragDelta`] that the
//! caller applies to the live model within the same event; everything else
//! waits for the next frame, which drains it via
//! [`take_frame_input`](InputAggregator::take_frame_input).

use super::event::{InputEvent, PointerChannel};
use super::state::{
    ButtonDirection, DragDelta, FrameInput, PointerState, ZoomAccumulator,
};
use crate::options::InteractionOptions;

/// Converts raw pointer/wheel/button input into rotation and zoom state.
pub struct InputAggregator {
    mouse: PointerState,
    touch: PointerState,
    button: ButtonDirection,
    /// Held rotate buttons in press order.
    held: Vec<ButtonDirection>,
    zoom: ZoomAccumulator,
    drag_sensitivity: f32,
    zoom_sensitivity: f32,
    /// Cleared by [`destroy`](Self::destroy); every handler checks it.
    attached: bool,
}

impl InputAggregator {
    /// Create an aggregator with the given sensitivities.
    #[must_use]
    pub fn new(options: &InteractionOptions) -> Self {
        Self {
            mouse: PointerState::default(),
            touch: PointerState::default(),
            button: ButtonDirection::None,
            held: Vec::new(),
            zoom: ZoomAccumulator::default(),
            drag_sensitivity: options.drag_sensitivity,
            zoom_sensitivity: options.zoom_sensitivity,
            attached: true,
        }
    }

    /// Apply new sensitivities without disturbing in-flight drags.
    pub fn set_options(&mut self, options: &InteractionOptions) {
        self.drag_sensitivity = options.drag_sensitivity;
        self.zoom_sensitivity = options.zoom_sensitivity;
    }

    /// Dispatch a platform-agnostic event to the matching handler.
    ///
    /// Returns the rotation to apply immediately, if the event was a drag
    /// move.
    pub fn handle_event(&mut self, event: InputEvent) -> Option<DragDelta> {
        match event {
            InputEvent::PointerDown { channel, x, y } => {
                self.on_drag_start(channel, x, y);
                None
            }
            InputEvent::PointerMoved { channel, x, y } => {
                self.on_drag_move(channel, x, y)
            }
            InputEvent::PointerUp { channel } => {
                self.on_drag_end(channel);
                None
            }
            InputEvent::Wheel { delta_y } => {
                self.on_wheel(delta_y);
                None
            }
        }
    }

    /// Start dragging on `channel` from `(x, y)`.
    pub fn on_drag_start(&mut self, channel: PointerChannel, x: f32, y: f32) {
        if !self.attached {
            return;
        }
        self.pointer_mut(channel).begin(x, y);
    }

    /// Pointer moved to `(x, y)`.
    ///
    /// Returns `None` when `channel` is not dragging. Otherwise returns the
    /// scaled delta since the previous sample; a repeated move to the same
    /// coordinates yields a zero delta.
    pub fn on_drag_move(
        &mut self,
        channel: PointerChannel,
        x: f32,
        y: f32,
    ) -> Option<DragDelta> {
        if !self.attached {
            return None;
        }
        let sensitivity = self.drag_sensitivity;
        let (dx, dy) = self.pointer_mut(channel).advance(x, y)?;
        Some(DragDelta {
            yaw: dx * sensitivity,
            pitch: dy * sensitivity,
        })
    }

    /// Stop dragging on `channel`. Idempotent.
    pub fn on_drag_end(&mut self, channel: PointerChannel) {
        self.pointer_mut(channel).end();
    }

    /// Accumulate a wheel step; applied by the next frame tick.
    pub fn on_wheel(&mut self, delta_y: f32) {
        if !self.attached {
            return;
        }
        self.zoom.add(delta_y * self.zoom_sensitivity);
    }

    /// Hold a rotate button. The most recently pressed button that is
    /// still held sets the direction.
    pub fn start_button_rotation(&mut self, direction: ButtonDirection) {
        if !self.attached {
            return;
        }
        if !direction.is_held() {
            self.stop_button_rotation();
            return;
        }
        self.held.retain(|&d| d != direction);
        self.held.push(direction);
        self.button = direction;
    }

    /// Release one rotate button. If the other one is still held, rotation
    /// continues in its direction.
    pub fn release_button_rotation(&mut self, direction: ButtonDirection) {
        self.held.retain(|&d| d != direction);
        self.button =
            self.held.last().copied().unwrap_or(ButtonDirection::None);
    }

    /// Release every rotate button.
    pub fn stop_button_rotation(&mut self) {
        self.held.clear();
        self.button = ButtonDirection::None;
    }

    /// Whether any channel is mid-drag.
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.mouse.active || self.touch.active
    }

    /// Currently held rotate button.
    #[must_use]
    pub fn button(&self) -> ButtonDirection {
        self.button
    }

    /// Zoom waiting for the next frame.
    #[must_use]
    pub fn pending_zoom(&self) -> f32 {
        self.zoom.pending()
    }

    /// Drag state of one channel.
    #[must_use]
    pub fn pointer(&self, channel: PointerChannel) -> &PointerState {
        match channel {
            PointerChannel::Mouse => &self.mouse,
            PointerChannel::Touch => &self.touch,
        }
    }

    /// Snapshot the state for one frame, draining the zoom accumulator.
    pub fn take_frame_input(&mut self) -> FrameInput {
        FrameInput {
            button: self.button,
            dragging: self.is_dragging(),
            zoom: self.zoom.take(),
        }
    }

    /// Detach from all input. Drags end, the button is released, pending
    /// zoom is dropped, and every later event is ignored.
    ///
    /// Host events already queued before this call may still be delivered
    /// to the caller; they are discarded here.
    pub fn destroy(&mut self) {
        if !self.attached {
            return;
        }
        self.attached = false;
        self.mouse.end();
        self.touch.end();
        self.stop_button_rotation();
        let _ = self.zoom.take();
        log::debug!("input aggregator detached");
    }

    /// Whether [`destroy`](Self::destroy) has been called.
    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        !self.attached
    }

    fn pointer_mut(&mut self, channel: PointerChannel) -> &mut PointerState {
        match channel {
            PointerChannel::Mouse => &mut self.mouse,
            PointerChannel::Touch => &mut self.touch,
        }
    }
}

impl Default for InputAggregator {
    fn default() -> Self {
        Self::new(&InteractionOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-6;

    #[test]
    fn drag_move_scales_pixel_delta() {
        let mut input = InputAggregator::default();
        input.on_drag_start(PointerChannel::Mouse, 100.0, 50.0);
        let delta = input
            .on_drag_move(PointerChannel::Mouse, 110.0, 45.0)
            .unwrap();
        assert!((delta.yaw - 10.0 * 0.012).abs() < EPS);
        assert!((delta.pitch - -5.0 * 0.012).abs() < EPS);

        // Same coordinates again: zero delta, not a repeat.
        let again = input
            .on_drag_move(PointerChannel::Mouse, 110.0, 45.0)
            .unwrap();
        assert_eq!(again, DragDelta::default());
    }

    #[test]
    fn move_without_drag_is_ignored() {
        let mut input = InputAggregator::default();
        assert!(input.on_drag_move(PointerChannel::Mouse, 5.0, 5.0).is_none());
        input.on_drag_start(PointerChannel::Touch, 0.0, 0.0);
        // Touch drag does not make the mouse channel active.
        assert!(input.on_drag_move(PointerChannel::Mouse, 5.0, 5.0).is_none());
        assert!(input.on_drag_move(PointerChannel::Touch, 5.0, 5.0).is_some());
    }

    #[test]
    fn drag_end_is_idempotent() {
        let mut input = InputAggregator::default();
        input.on_drag_end(PointerChannel::Mouse);
        input.on_drag_start(PointerChannel::Mouse, 0.0, 0.0);
        assert!(input.is_dragging());
        input.on_drag_end(PointerChannel::Mouse);
        input.on_drag_end(PointerChannel::Mouse);
        assert!(!input.is_dragging());
    }

    #[test]
    fn wheel_accumulates_until_frame_drains() {
        let mut input = InputAggregator::default();
        assert!(input.handle_event(InputEvent::Wheel { delta_y: 100.0 }).is_none());
        assert!(input.handle_event(InputEvent::Wheel { delta_y: 50.0 }).is_none());
        assert!((input.pending_zoom() - 150.0 * 0.008).abs() < EPS);

        let frame = input.take_frame_input();
        assert!((frame.zoom - 1.2).abs() < EPS);
        assert_eq!(input.pending_zoom(), 0.0);
        assert_eq!(input.take_frame_input().zoom, 0.0);
    }

    #[test]
    fn frame_input_reports_button_and_drag() {
        let mut input = InputAggregator::default();
        input.start_button_rotation(ButtonDirection::Backward);
        input.on_drag_start(PointerChannel::Touch, 1.0, 1.0);
        let frame = input.take_frame_input();
        assert_eq!(frame.button, ButtonDirection::Backward);
        assert!(frame.dragging);

        input.stop_button_rotation();
        assert_eq!(input.button(), ButtonDirection::None);
    }

    #[test]
    fn releasing_one_of_two_buttons_keeps_the_other() {
        let mut input = InputAggregator::default();
        input.start_button_rotation(ButtonDirection::Backward);
        input.start_button_rotation(ButtonDirection::Forward);
        assert_eq!(input.button(), ButtonDirection::Forward);

        input.release_button_rotation(ButtonDirection::Backward);
        assert_eq!(input.button(), ButtonDirection::Forward);
        input.release_button_rotation(ButtonDirection::Forward);
        assert_eq!(input.button(), ButtonDirection::None);

        input.start_button_rotation(ButtonDirection::Backward);
        input.start_button_rotation(ButtonDirection::Forward);
        input.release_button_rotation(ButtonDirection::Forward);
        assert_eq!(input.button(), ButtonDirection::Backward);
    }

    #[test]
    fn destroy_silences_every_handler() {
        let mut input = InputAggregator::default();
        input.on_drag_start(PointerChannel::Mouse, 0.0, 0.0);
        input.start_button_rotation(ButtonDirection::Forward);
        input.on_wheel(10.0);
        input.destroy();

        assert!(input.is_destroyed());
        assert_eq!(input.take_frame_input(), FrameInput::default());

        input.on_drag_start(PointerChannel::Mouse, 0.0, 0.0);
        assert!(input.on_drag_move(PointerChannel::Mouse, 40.0, 40.0).is_none());
        input.on_wheel(10.0);
        input.start_button_rotation(ButtonDirection::Forward);
        assert_eq!(input.take_frame_input(), FrameInput::default());
    }

    #[test]
    fn handle_event_routes_pointer_lifecycle() {
        let mut input = InputAggregator::default();
        let channel = PointerChannel::Mouse;
        assert!(input
            .handle_event(InputEvent::PointerDown { channel, x: 0.0, y: 0.0 })
            .is_none());
        let delta = input
            .handle_event(InputEvent::PointerMoved { channel, x: 1.0, y: 2.0 })
            .unwrap();
        assert!((delta.yaw - 0.012).abs() < EPS);
        assert!((delta.pitch - 0.024).abs() < EPS);
        assert!(input.handle_event(InputEvent::PointerUp { channel }).is_none());
        assert!(!input.pointer(channel).active);
    }
}
