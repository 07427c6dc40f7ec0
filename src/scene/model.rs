use super::entity::{Material, Orientation, Rotatable, RotatableTexturedEntity};
use super::{MeshData, NodeId};

/// Edge overlay color for the cube (cyan at low opacity).
const CUBE_EDGE_COLOR: [f32; 4] = [0.0, 0.898, 1.0, 0.18];

/// Built-in procedural shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelKind {
    /// 2x2x2 box with an edge overlay.
    Cube,
    /// Sphere of radius 1.2.
    Sphere,
    /// Cylinder of radius 1 and height 2.
    Cylinder,
}

impl ModelKind {
    /// All kinds in panel order.
    pub const ALL: [ModelKind; 3] =
        [ModelKind::Cube, ModelKind::Sphere, ModelKind::Cylinder];

    /// Generate this kind's mesh.
    #[must_use]
    pub fn mesh(self) -> MeshData {
        match self {
            ModelKind::Cube => MeshData::cuboid(2.0, 2.0, 2.0),
            ModelKind::Sphere => MeshData::uv_sphere(1.2, 48, 32),
            ModelKind::Cylinder => MeshData::cylinder(1.0, 1.0, 2.0, 32),
        }
    }

    /// Human-readable name.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            ModelKind::Cube => "Cube",
            ModelKind::Sphere => "Sphere",
            ModelKind::Cylinder => "Cylinder",
        }
    }
}

/// One of the built-in swappable models.
#[derive(Debug)]
pub struct ShapeModel {
    kind: ModelKind,
    node: NodeId,
    mesh: MeshData,
    orientation: Orientation,
    texture: usize,
    texture_count: usize,
}

impl ShapeModel {
    /// Build a model of `kind` occupying `node`, wearing texture 0 out of
    /// `texture_count`.
    #[must_use]
    pub fn new(kind: ModelKind, node: NodeId, texture_count: usize) -> Self {
        Self {
            kind,
            node,
            mesh: kind.mesh(),
            orientation: Orientation::default(),
            texture: 0,
            texture_count,
        }
    }

    /// Which shape this is.
    #[must_use]
    pub fn kind(&self) -> ModelKind {
        self.kind
    }
}

impl Rotatable for ShapeModel {
    fn rotate(&mut self, d_yaw: f32, d_pitch: f32) {
        self.orientation.yaw += d_yaw;
        self.orientation.pitch += d_pitch;
    }

    fn orientation(&self) -> Orientation {
        self.orientation
    }
}

impl RotatableTexturedEntity for ShapeModel {
    fn node(&self) -> NodeId {
        self.node
    }

    fn apply_texture(&mut self, index: usize) {
        if index < self.texture_count {
            self.texture = index;
        } else {
            log::debug!(
                "{} ignoring texture {index} (have {})",
                self.kind.label(),
                self.texture_count
            );
        }
    }

    fn texture_index(&self) -> usize {
        self.texture
    }

    fn mesh(&self) -> &MeshData {
        &self.mesh
    }

    fn material(&self) -> Material {
        Material {
            edge_color: (self.kind == ModelKind::Cube)
                .then_some(CUBE_EDGE_COLOR),
            ..Material::default()
        }
    }
}
