//! CPU-side triangle meshes and the procedural generators for the built-in
//! shapes.

use std::f32::consts::{PI, TAU};

use glam::Vec3;

/// Interleaved vertex as uploaded to the GPU.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    /// Object-space position.
    pub position: [f32; 3],
    /// Object-space unit normal.
    pub normal: [f32; 3],
    /// Texture coordinate.
    pub uv: [f32; 2],
}

impl Vertex {
    fn new(position: Vec3, normal: Vec3, uv: [f32; 2]) -> Self {
        Self {
            position: position.to_array(),
            normal: normal.to_array(),
            uv,
        }
    }
}

/// Indexed triangle mesh with an optional line-list overlay.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    /// Vertex buffer contents.
    pub vertices: Vec<Vertex>,
    /// Triangle-list indices into `vertices`.
    pub indices: Vec<u32>,
    /// Line-list endpoints (pairs of positions) for the edge overlay.
    pub edges: Vec<[f32; 3]>,
}

impl MeshData {
    /// Number of triangles.
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Whether this mesh has nothing to draw.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Append `other`, rebasing its indices.
    pub fn append(&mut self, other: &MeshData) {
        let base = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&other.vertices);
        self.indices.extend(other.indices.iter().map(|i| i + base));
        self.edges.extend_from_slice(&other.edges);
    }

    /// Axis-aligned box centred at the origin, one quad per face so each
    /// face gets its own normals and full `0..1` UVs. Edges trace the
    /// twelve box edges.
    #[must_use]
    pub fn cuboid(width: f32, height: f32, depth: f32) -> Self {
        let h = Vec3::new(width, height, depth) * 0.5;
        // (normal, u axis, v axis)
        let faces = [
            (Vec3::X, Vec3::NEG_Z, Vec3::Y),
            (Vec3::NEG_X, Vec3::Z, Vec3::Y),
            (Vec3::Y, Vec3::X, Vec3::NEG_Z),
            (Vec3::NEG_Y, Vec3::X, Vec3::Z),
            (Vec3::Z, Vec3::X, Vec3::Y),
            (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
        ];

        let mut mesh = Self::default();
        for (normal, u, v) in faces {
            let base = mesh.vertices.len() as u32;
            let center = normal * h;
            let du = u * h;
            let dv = v * h;
            let corners = [
                (center - du - dv, [0.0, 1.0]),
                (center + du - dv, [1.0, 1.0]),
                (center + du + dv, [1.0, 0.0]),
                (center - du + dv, [0.0, 0.0]),
            ];
            for (p, uv) in corners {
                mesh.vertices.push(Vertex::new(p, normal, uv));
            }
            mesh.indices.extend_from_slice(&[
                base,
                base + 1,
                base + 2,
                base,
                base + 2,
                base + 3,
            ]);
        }

        let corner = |x: f32, y: f32, z: f32| [x * h.x, y * h.y, z * h.z];
        for (a, b) in [
            // bottom ring
            ((-1., -1., -1.), (1., -1., -1.)),
            ((1., -1., -1.), (1., -1., 1.)),
            ((1., -1., 1.), (-1., -1., 1.)),
            ((-1., -1., 1.), (-1., -1., -1.)),
            // top ring
            ((-1., 1., -1.), (1., 1., -1.)),
            ((1., 1., -1.), (1., 1., 1.)),
            ((1., 1., 1.), (-1., 1., 1.)),
            ((-1., 1., 1.), (-1., 1., -1.)),
            // verticals
            ((-1., -1., -1.), (-1., 1., -1.)),
            ((1., -1., -1.), (1., 1., -1.)),
            ((1., -1., 1.), (1., 1., 1.)),
            ((-1., -1., 1.), (-1., 1., 1.)),
        ] {
            mesh.edges.push(corner(a.0, a.1, a.2));
            mesh.edges.push(corner(b.0, b.1, b.2));
        }
        mesh
    }

    /// UV sphere centred at the origin.
    #[must_use]
    pub fn uv_sphere(radius: f32, segments: u32, rings: u32) -> Self {
        let segments = segments.max(3);
        let rings = rings.max(2);
        let mut mesh = Self::default();

        for ring in 0..=rings {
            let v = ring as f32 / rings as f32;
            let theta = v * PI;
            for seg in 0..=segments {
                let u = seg as f32 / segments as f32;
                let phi = u * TAU;
                let normal = Vec3::new(
                    -phi.cos() * theta.sin(),
                    theta.cos(),
                    phi.sin() * theta.sin(),
                );
                mesh.vertices
                    .push(Vertex::new(normal * radius, normal, [u, v]));
            }
        }

        let stride = segments + 1;
        for ring in 0..rings {
            for seg in 0..segments {
                let a = ring * stride + seg;
                let b = a + stride;
                if ring != 0 {
                    mesh.indices.extend_from_slice(&[a, b, a + 1]);
                }
                if ring != rings - 1 {
                    mesh.indices.extend_from_slice(&[a + 1, b, b + 1]);
                }
            }
        }
        mesh
    }

    /// Closed cylinder along Y, centred at the origin.
    #[must_use]
    pub fn cylinder(
        radius_top: f32,
        radius_bottom: f32,
        height: f32,
        segments: u32,
    ) -> Self {
        let segments = segments.max(3);
        let half = height * 0.5;
        let slope = (radius_bottom - radius_top) / height;
        let mut mesh = Self::default();

        // side
        for seg in 0..=segments {
            let u = seg as f32 / segments as f32;
            let theta = u * TAU;
            let (sin, cos) = theta.sin_cos();
            let normal = Vec3::new(sin, slope, cos).normalize();
            mesh.vertices.push(Vertex::new(
                Vec3::new(radius_top * sin, half, radius_top * cos),
                normal,
                [u, 0.0],
            ));
            mesh.vertices.push(Vertex::new(
                Vec3::new(radius_bottom * sin, -half, radius_bottom * cos),
                normal,
                [u, 1.0],
            ));
        }
        for seg in 0..segments {
            let top = seg * 2;
            let bottom = top + 1;
            let next_top = top + 2;
            let next_bottom = top + 3;
            mesh.indices
                .extend_from_slice(&[top, bottom, next_top]);
            mesh.indices
                .extend_from_slice(&[bottom, next_bottom, next_top]);
        }

        // caps
        for (y, radius, normal) in [
            (half, radius_top, Vec3::Y),
            (-half, radius_bottom, Vec3::NEG_Y),
        ] {
            let center = mesh.vertices.len() as u32;
            mesh.vertices.push(Vertex::new(
                Vec3::new(0.0, y, 0.0),
                normal,
                [0.5, 0.5],
            ));
            for seg in 0..=segments {
                let theta = seg as f32 / segments as f32 * TAU;
                let (sin, cos) = theta.sin_cos();
                mesh.vertices.push(Vertex::new(
                    Vec3::new(radius * sin, y, radius * cos),
                    normal,
                    [0.5 + 0.5 * sin, 0.5 - 0.5 * cos],
                ));
            }
            for seg in 0..segments {
                let a = center + 1 + seg;
                let b = a + 1;
                if normal.y > 0.0 {
                    mesh.indices.extend_from_slice(&[center, a, b]);
                } else {
                    mesh.indices.extend_from_slice(&[center, b, a]);
                }
            }
        }
        mesh
    }

    /// Horizontal square at height `y`, facing up.
    #[must_use]
    pub fn plane(size: f32, y: f32) -> Self {
        let h = size * 0.5;
        let vertices = [
            (Vec3::new(-h, y, h), [0.0, 1.0]),
            (Vec3::new(h, y, h), [1.0, 1.0]),
            (Vec3::new(h, y, -h), [1.0, 0.0]),
            (Vec3::new(-h, y, -h), [0.0, 0.0]),
        ]
        .into_iter()
        .map(|(p, uv)| Vertex::new(p, Vec3::Y, uv))
        .collect();
        Self {
            vertices,
            indices: vec![0, 1, 2, 0, 2, 3],
            edges: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn indices_in_range(mesh: &MeshData) -> bool {
        let n = mesh.vertices.len() as u32;
        mesh.indices.iter().all(|&i| i < n)
    }

    fn normals_are_unit(mesh: &MeshData) -> bool {
        mesh.vertices
            .iter()
            .all(|v| (Vec3::from(v.normal).length() - 1.0).abs() < 1e-4)
    }

    #[test]
    fn vertex_layout_is_tightly_packed() {
        assert_eq!(std::mem::size_of::<Vertex>(), 32);
    }

    #[test]
    fn cuboid_has_six_faces_and_twelve_edges() {
        let mesh = MeshData::cuboid(2.0, 2.0, 2.0);
        assert_eq!(mesh.vertices.len(), 24);
        assert_eq!(mesh.triangle_count(), 12);
        assert_eq!(mesh.edges.len(), 24);
        assert!(indices_in_range(&mesh));
        assert!(normals_are_unit(&mesh));
        assert!(mesh
            .vertices
            .iter()
            .flat_map(|v| v.position)
            .all(|c| c.abs() == 1.0));
    }

    #[test]
    fn cuboid_winding_faces_outward() {
        let mesh = MeshData::cuboid(2.0, 2.0, 2.0);
        for tri in mesh.indices.chunks(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]]
                .map(|i| Vec3::from(mesh.vertices[i as usize].position));
            let face_normal = (b - a).cross(c - a);
            let stored = Vec3::from(mesh.vertices[tri[0] as usize].normal);
            assert!(face_normal.dot(stored) > 0.0);
        }
    }

    #[test]
    fn sphere_vertices_lie_on_radius() {
        let mesh = MeshData::uv_sphere(1.2, 32, 16);
        assert!(indices_in_range(&mesh));
        assert!(normals_are_unit(&mesh));
        for v in &mesh.vertices {
            assert!((Vec3::from(v.position).length() - 1.2).abs() < 1e-4);
        }
        assert!(mesh.edges.is_empty());
    }

    #[test]
    fn cylinder_spans_height() {
        let mesh = MeshData::cylinder(1.0, 1.0, 2.0, 32);
        assert!(indices_in_range(&mesh));
        assert!(normals_are_unit(&mesh));
        let (min, max) = mesh.vertices.iter().fold(
            (f32::MAX, f32::MIN),
            |(lo, hi), v| (lo.min(v.position[1]), hi.max(v.position[1])),
        );
        assert_eq!((min, max), (-1.0, 1.0));
    }

    #[test]
    fn append_rebases_indices() {
        let mut mesh = MeshData::plane(1.0, 0.0);
        mesh.append(&MeshData::plane(1.0, 1.0));
        assert_eq!(mesh.vertices.len(), 8);
        assert_eq!(&mesh.indices[6..], &[4, 5, 6, 4, 6, 7]);
        assert!(indices_in_range(&mesh));
    }
}
