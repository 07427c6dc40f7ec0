use std::cell::RefCell;
use std::rc::Rc;

use glam::{EulerRot, Mat4};

use super::{MeshData, NodeId};

/// Accumulated model rotation in radians.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Orientation {
    /// Rotation about the vertical (Y) axis.
    pub yaw: f32,
    /// Rotation about the horizontal (X) axis.
    pub pitch: f32,
}

impl Orientation {
    /// Model matrix for this orientation (X then Y Euler order).
    #[must_use]
    pub fn to_matrix(self) -> Mat4 {
        Mat4::from_euler(EulerRot::XYZ, self.pitch, self.yaw, 0.0)
    }
}

/// Anything the rotation engine can turn.
pub trait Rotatable {
    /// Add `d_yaw` and `d_pitch` radians to the current orientation.
    fn rotate(&mut self, d_yaw: f32, d_pitch: f32);

    /// Current orientation.
    fn orientation(&self) -> Orientation;
}

/// Surface parameters shared by every texture a model can wear.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    /// Microfacet roughness (0 = mirror, 1 = matte).
    pub roughness: f32,
    /// Metalness (0 = dielectric, 1 = metal).
    pub metalness: f32,
    /// RGBA color for the edge-line overlay, if the model draws one.
    pub edge_color: Option<[f32; 4]>,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            roughness: 0.45,
            metalness: 0.35,
            edge_color: None,
        }
    }
}

/// A swappable model: rotatable, texturable, and drawable.
///
/// Each model slot in the viewer implements this; the core only ever talks
/// to slots through it.
pub trait RotatableTexturedEntity: Rotatable {
    /// Scene node this model occupies when live.
    fn node(&self) -> NodeId;

    /// Switch to the texture at `index`. Unknown indices are ignored.
    fn apply_texture(&mut self, index: usize);

    /// Index of the texture currently applied.
    fn texture_index(&self) -> usize;

    /// Geometry to draw.
    fn mesh(&self) -> &MeshData;

    /// Surface parameters.
    fn material(&self) -> Material;

    /// Model-to-world transform.
    fn transform(&self) -> Mat4 {
        self.orientation().to_matrix()
    }
}

/// Shared handle to a model slot.
pub type SharedEntity = Rc<RefCell<dyn RotatableTexturedEntity>>;

/// Wrap a concrete model in a [`SharedEntity`].
pub fn shared(
    entity: impl RotatableTexturedEntity + 'static,
) -> SharedEntity {
    Rc::new(RefCell::new(entity))
}
