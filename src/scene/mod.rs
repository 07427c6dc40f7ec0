//! Scene: which nodes are visible, plus the models that can occupy them.
//!
//! The scene only tracks attachment. What a node looks like lives with
//! whoever allocated it: a [`ShapeModel`] slot, or the imported asset.

mod entity;
pub mod mesh;
mod model;

pub use entity::{
    shared, Material, Orientation, Rotatable, RotatableTexturedEntity,
    SharedEntity,
};
pub use mesh::{MeshData, Vertex};
pub use model::{ModelKind, ShapeModel};

use crate::options::DisplayOptions;

/// Handle to a scene node. Allocated by [`Scene::allocate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    /// Raw numeric id.
    #[must_use]
    pub fn raw(self) -> u32 {
        self.0
    }
}

/// Static ground plane that is transparent except where it receives the
/// key light's shadow.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ground {
    /// Height of the plane.
    pub y: f32,
    /// Edge length.
    pub size: f32,
    /// Opacity of a fully shadowed point.
    pub opacity: f32,
}

/// Everything drawn behind and around the models.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Backdrop {
    /// Clear color.
    pub background: [f32; 3],
    /// Exponential-squared fog color.
    pub fog_color: [f32; 3],
    /// Exponential-squared fog density.
    pub fog_density: f32,
    /// Whether the key light casts shadows.
    pub shadows: bool,
    /// Ground plane, if shown.
    pub ground: Option<Ground>,
}

impl From<&DisplayOptions> for Backdrop {
    fn from(d: &DisplayOptions) -> Self {
        Self {
            background: d.background,
            fog_color: d.fog_color,
            fog_density: d.fog_density,
            shadows: d.shadows,
            ground: d.show_ground.then_some(Ground {
                y: d.ground_y,
                size: d.ground_size,
                opacity: d.ground_opacity,
            }),
        }
    }
}

impl Default for Backdrop {
    fn default() -> Self {
        Self::from(&DisplayOptions::default())
    }
}

/// The visible scene graph: an ordered set of attached nodes plus the
/// backdrop they are drawn against.
#[derive(Debug, Default)]
pub struct Scene {
    /// Attached nodes in attachment order.
    attached: Vec<NodeId>,
    next_node: u32,
    /// Bumped on every attach/detach.
    generation: u64,
    backdrop: Backdrop,
}

impl Scene {
    /// Create an empty scene with the default backdrop.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty scene with the given backdrop.
    #[must_use]
    pub fn with_backdrop(backdrop: Backdrop) -> Self {
        Self {
            backdrop,
            ..Self::default()
        }
    }

    /// Background, fog and ground settings.
    #[must_use]
    pub fn backdrop(&self) -> &Backdrop {
        &self.backdrop
    }

    /// Replace the backdrop.
    pub fn set_backdrop(&mut self, backdrop: Backdrop) {
        self.backdrop = backdrop;
    }

    /// Allocate a fresh, detached node id.
    pub fn allocate(&mut self) -> NodeId {
        let id = NodeId(self.next_node);
        self.next_node += 1;
        id
    }

    /// Attach `node`. Returns `false` if it was already attached.
    pub fn attach(&mut self, node: NodeId) -> bool {
        if self.contains(node) {
            return false;
        }
        self.attached.push(node);
        self.generation += 1;
        true
    }

    /// Detach `node`. Returns `false` if it was not attached.
    pub fn detach(&mut self, node: NodeId) -> bool {
        let before = self.attached.len();
        self.attached.retain(|&n| n != node);
        let removed = self.attached.len() != before;
        if removed {
            self.generation += 1;
        }
        removed
    }

    /// Whether `node` is attached.
    #[must_use]
    pub fn contains(&self, node: NodeId) -> bool {
        self.attached.contains(&node)
    }

    /// Attached nodes in attachment order.
    #[must_use]
    pub fn attached(&self) -> &[NodeId] {
        &self.attached
    }

    /// Monotonic counter of attachment changes.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocated_ids_are_unique() {
        let mut scene = Scene::new();
        let a = scene.allocate();
        let b = scene.allocate();
        assert_ne!(a, b);
        assert!(scene.attached().is_empty());
    }

    #[test]
    fn attach_and_detach_track_membership() {
        let mut scene = Scene::new();
        let a = scene.allocate();
        let b = scene.allocate();
        assert!(scene.attach(a));
        assert!(!scene.attach(a));
        assert!(scene.attach(b));
        assert_eq!(scene.attached(), &[a, b]);

        assert!(scene.detach(a));
        assert!(!scene.detach(a));
        assert_eq!(scene.attached(), &[b]);
        assert_eq!(scene.generation(), 3);
    }

    #[test]
    fn backdrop_follows_display_options() {
        let mut display = DisplayOptions::default();
        let backdrop = Backdrop::from(&display);
        assert_eq!(backdrop.ground.map(|g| g.y), Some(-1.6));
        assert!(backdrop.shadows);

        display.show_ground = false;
        display.shadows = false;
        let scene = Scene::with_backdrop(Backdrop::from(&display));
        assert!(scene.backdrop().ground.is_none());
        assert_eq!(scene.backdrop().fog_density, 0.06);
        assert!(!scene.backdrop().shadows);
    }
}
