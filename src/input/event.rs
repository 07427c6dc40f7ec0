/// Platform-agnostic input events.
///
/// These are fed into an [`InputAggregator`](super::InputAggregator), which
/// turns them into immediate drag deltas and per-frame rotation/zoom state.
///
/// # Example
///
/// ```ignore
/// if let Some(delta) = aggregator.handle_event(InputEvent::PointerMoved {
///     channel: PointerChannel::Mouse,
///     x: 100.0,
///     y: 200.0,
/// }) {
///     let _ = rotation.apply_drag(delta);
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Primary button pressed or first touch contact began.
    PointerDown {
        /// Which pointer produced the event.
        channel: PointerChannel,
        /// Horizontal position in physical pixels.
        x: f32,
        /// Vertical position in physical pixels.
        y: f32,
    },
    /// Pointer or primary touch contact moved to an absolute position.
    PointerMoved {
        /// Which pointer produced the event.
        channel: PointerChannel,
        /// Horizontal position in physical pixels.
        x: f32,
        /// Vertical position in physical pixels.
        y: f32,
    },
    /// Primary button released or touch contact ended.
    PointerUp {
        /// Which pointer produced the event.
        channel: PointerChannel,
    },
    /// Scroll wheel (positive = away from the model).
    Wheel {
        /// Vertical scroll amount in pixels.
        delta_y: f32,
    },
}

/// Independent pointer sources, each with its own drag state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerChannel {
    /// Mouse or pen.
    Mouse,
    /// Primary touch contact.
    Touch,
}

#[cfg(feature = "viewer")]
impl From<winit::event::TouchPhase> for PointerPhase {
    fn from(phase: winit::event::TouchPhase) -> Self {
        match phase {
            winit::event::TouchPhase::Started => Self::Down,
            winit::event::TouchPhase::Moved => Self::Moved,
            winit::event::TouchPhase::Ended
            | winit::event::TouchPhase::Cancelled => Self::Up,
        }
    }
}

/// Lifecycle phase of a touch contact, used to build [`InputEvent`]s from
/// host touch events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerPhase {
    /// Contact began.
    Down,
    /// Contact moved.
    Moved,
    /// Contact ended or was cancelled.
    Up,
}

impl InputEvent {
    /// Build the event for a pointer in the given phase at `(x, y)`.
    #[must_use]
    pub fn pointer(
        channel: PointerChannel,
        phase: PointerPhase,
        x: f32,
        y: f32,
    ) -> Self {
        match phase {
            PointerPhase::Down => Self::PointerDown { channel, x, y },
            PointerPhase::Moved => Self::PointerMoved { channel, x, y },
            PointerPhase::Up => Self::PointerUp { channel },
        }
    }
}
