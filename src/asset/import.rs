//! glTF 2.0 reader.

use std::path::Path;

use glam::{Quat, Vec3};
use gltf::animation::util::ReadOutputs;
use gltf::image::Format;
use gltf::mesh::Mode;

use super::animation::{
    AnimationClip, Channel, ChannelValues, Interpolation, Trs,
};
use super::{AnimatedAsset, AssetMesh, AssetNode, AssetTexture};
use crate::error::ViewerError;
use crate::scene::{MeshData, Vertex};

fn import_error(path: &Path, msg: impl std::fmt::Display) -> ViewerError {
    ViewerError::AssetImport(format!("{}: {msg}", path.display()))
}

pub(super) fn import(path: &Path) -> Result<AnimatedAsset, ViewerError> {
    let (document, buffers, images) =
        gltf::import(path).map_err(|e| import_error(path, e))?;
    let data = |buffer: gltf::Buffer<'_>| {
        buffers.get(buffer.index()).map(|d| d.0.as_slice())
    };

    if document.skins().next().is_some() {
        log::warn!(
            "{}: skinning is not supported, drawing the bind pose",
            path.display()
        );
    }

    let textures: Vec<AssetTexture> =
        images.iter().map(to_rgba).collect();

    // Primitive index ranges per glTF mesh.
    let mut meshes = Vec::new();
    let mut mesh_ranges = Vec::new();
    for mesh in document.meshes() {
        let start = meshes.len();
        for primitive in mesh.primitives() {
            if primitive.mode() != Mode::Triangles {
                log::debug!(
                    "skipping {:?} primitive in mesh {}",
                    primitive.mode(),
                    mesh.index()
                );
                continue;
            }
            let reader = primitive.reader(data);
            let Some(positions) = reader.read_positions() else {
                continue;
            };
            let positions: Vec<[f32; 3]> = positions.collect();
            let normals: Option<Vec<[f32; 3]>> =
                reader.read_normals().map(Iterator::collect);
            let uvs: Option<Vec<[f32; 2]>> = reader
                .read_tex_coords(0)
                .map(|t| t.into_f32().collect());
            let indices: Vec<u32> = reader.read_indices().map_or_else(
                || (0..positions.len() as u32).collect(),
                |i| i.into_u32().collect(),
            );

            let pbr = primitive.material().pbr_metallic_roughness();
            let texture = pbr
                .base_color_texture()
                .map(|info| info.texture().source().index())
                .filter(|&i| i < textures.len());
            meshes.push(AssetMesh {
                mesh: build_mesh(&positions, normals.as_deref(), uvs.as_deref(), indices),
                base_color: pbr.base_color_factor(),
                texture,
            });
        }
        mesh_ranges.push(start..meshes.len());
    }

    let nodes: Vec<AssetNode> = document
        .nodes()
        .map(|node| {
            let (translation, rotation, scale) = node.transform().decomposed();
            AssetNode {
                rest: Trs {
                    translation: Vec3::from(translation),
                    rotation: Quat::from_array(rotation),
                    scale: Vec3::from(scale),
                },
                children: node.children().map(|c| c.index()).collect(),
                meshes: node
                    .mesh()
                    .and_then(|m| mesh_ranges.get(m.index()).cloned())
                    .map(Iterator::collect)
                    .unwrap_or_default(),
            }
        })
        .collect();

    let roots = document
        .default_scene()
        .or_else(|| document.scenes().next())
        .map(|scene| scene.nodes().map(|n| n.index()).collect())
        .unwrap_or_default();

    let clip = document.animations().next().map(|anim| {
        let channels = anim
            .channels()
            .filter_map(|channel| {
                let reader = channel.reader(data);
                let times: Vec<f32> = reader.read_inputs()?.collect();
                let values = match reader.read_outputs()? {
                    ReadOutputs::Translations(v) => ChannelValues::Translation(
                        v.map(Vec3::from).collect(),
                    ),
                    ReadOutputs::Rotations(v) => ChannelValues::Rotation(
                        v.into_f32().map(Quat::from_array).collect(),
                    ),
                    ReadOutputs::Scales(v) => {
                        ChannelValues::Scale(v.map(Vec3::from).collect())
                    }
                    ReadOutputs::MorphTargetWeights(_) => return None,
                };
                let interpolation = match channel.sampler().interpolation() {
                    gltf::animation::Interpolation::Step => Interpolation::Step,
                    gltf::animation::Interpolation::Linear => {
                        Interpolation::Linear
                    }
                    gltf::animation::Interpolation::CubicSpline => {
                        Interpolation::CubicSpline
                    }
                };
                Some(Channel {
                    node: channel.target().node().index(),
                    times,
                    values,
                    interpolation,
                })
            })
            .collect();
        AnimationClip::new(anim.name().map(str::to_owned), channels)
    });

    log::info!(
        "imported {}: {} nodes, {} primitives, {} animations",
        path.display(),
        nodes.len(),
        meshes.len(),
        document.animations().count()
    );
    Ok(AnimatedAsset::new(nodes, roots, meshes, textures, clip))
}

fn build_mesh(
    positions: &[[f32; 3]],
    normals: Option<&[[f32; 3]]>,
    uvs: Option<&[[f32; 2]]>,
    indices: Vec<u32>,
) -> MeshData {
    let n = positions.len();
    let indices: Vec<u32> = indices
        .chunks_exact(3)
        .filter(|tri| tri.iter().all(|&i| (i as usize) < n))
        .flatten()
        .copied()
        .collect();
    let normals = match normals {
        Some(normals) if normals.len() == n => normals.to_vec(),
        _ => smooth_normals(positions, &indices),
    };
    let vertices = (0..n)
        .map(|i| Vertex {
            position: positions[i],
            normal: normals[i],
            uv: uvs.and_then(|uv| uv.get(i)).copied().unwrap_or([0.0; 2]),
        })
        .collect();
    MeshData {
        vertices,
        indices,
        edges: Vec::new(),
    }
}

/// Area-weighted vertex normals for files that omit them.
fn smooth_normals(positions: &[[f32; 3]], indices: &[u32]) -> Vec<[f32; 3]> {
    let mut acc = vec![Vec3::ZERO; positions.len()];
    for tri in indices.chunks_exact(3) {
        let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| i as usize);
        let pa = Vec3::from(positions[a]);
        let face = (Vec3::from(positions[b]) - pa)
            .cross(Vec3::from(positions[c]) - pa);
        acc[a] += face;
        acc[b] += face;
        acc[c] += face;
    }
    acc.into_iter()
        .map(|n| n.normalize_or(Vec3::Y).to_array())
        .collect()
}

fn to_rgba(image: &gltf::image::Data) -> AssetTexture {
    let rgba = match image.format {
        Format::R8G8B8A8 => image.pixels.clone(),
        Format::R8G8B8 => image
            .pixels
            .chunks_exact(3)
            .flat_map(|p| [p[0], p[1], p[2], 255])
            .collect(),
        Format::R8G8 => image
            .pixels
            .chunks_exact(2)
            .flat_map(|p| [p[0], p[0], p[0], p[1]])
            .collect(),
        Format::R8 => image.pixels.iter().flat_map(|&l| [l, l, l, 255]).collect(),
        other => {
            log::warn!("unsupported image format {other:?}, using white");
            vec![255; (image.width * image.height * 4) as usize]
        }
    };
    AssetTexture {
        width: image.width,
        height: image.height,
        rgba,
    }
}
