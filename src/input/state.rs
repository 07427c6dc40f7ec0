//! Input state channels shared between the aggregator and the rotation
//! engine.

use crate::error::ViewerError;

/// Drag tracking for one pointer channel.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PointerState {
    /// Whether a drag is in progress on this channel.
    pub active: bool,
    /// Horizontal position of the last sample.
    pub last_x: f32,
    /// Vertical position of the last sample.
    pub last_y: f32,
}

impl PointerState {
    /// Begin a drag at `(x, y)`.
    pub fn begin(&mut self, x: f32, y: f32) {
        self.active = true;
        self.last_x = x;
        self.last_y = y;
    }

    /// Move to `(x, y)`, returning the raw pixel delta since the last sample,
    /// or `None` if no drag is active.
    pub fn advance(&mut self, x: f32, y: f32) -> Option<(f32, f32)> {
        if !self.active {
            return None;
        }
        let delta = (x - self.last_x, y - self.last_y);
        self.last_x = x;
        self.last_y = y;
        Some(delta)
    }

    /// End the drag. Safe to call with no drag active.
    pub fn end(&mut self) {
        self.active = false;
    }
}

/// Held rotation button direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum ButtonDirection {
    /// Rotate toward negative yaw.
    Backward,
    /// No button held.
    #[default]
    None,
    /// Rotate toward positive yaw.
    Forward,
}

impl ButtonDirection {
    /// Signed multiplier for the button speed.
    #[must_use]
    pub fn sign(self) -> f32 {
        match self {
            Self::Backward => -1.0,
            Self::None => 0.0,
            Self::Forward => 1.0,
        }
    }

    /// Whether a button is held.
    #[must_use]
    pub fn is_held(self) -> bool {
        self != Self::None
    }
}

impl TryFrom<i32> for ButtonDirection {
    type Error = ViewerError;

    /// Only -1, 0 and 1 are accepted; anything else is a caller bug and is
    /// rejected rather than clamped.
    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            -1 => Ok(Self::Backward),
            0 => Ok(Self::None),
            1 => Ok(Self::Forward),
            other => Err(ViewerError::InvalidButtonDirection(other)),
        }
    }
}

/// Pending camera-distance change, drained once per frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ZoomAccumulator {
    pending: f32,
}

impl ZoomAccumulator {
    /// Add a zoom step.
    pub fn add(&mut self, delta: f32) {
        self.pending += delta;
    }

    /// Read the pending zoom and reset it to zero.
    pub fn take(&mut self) -> f32 {
        std::mem::take(&mut self.pending)
    }

    /// Pending zoom without draining.
    #[must_use]
    pub fn pending(&self) -> f32 {
        self.pending
    }
}

/// Rotation produced by one drag move, in radians.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DragDelta {
    /// Rotation about the vertical axis.
    pub yaw: f32,
    /// Rotation about the horizontal axis.
    pub pitch: f32,
}

/// Snapshot of the input state consumed by one frame tick.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameInput {
    /// Held rotation button.
    pub button: ButtonDirection,
    /// Whether any pointer channel is dragging.
    pub dragging: bool,
    /// Zoom drained from the accumulator for this frame.
    pub zoom: f32,
}
