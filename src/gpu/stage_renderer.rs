//! Draws a [`Stage`] into the surface.
//!
//! Two passes per frame. The shadow pass renders every lit mesh into the
//! key light's depth map. The main pass draws opaque models (built-in
//! shapes and the imported asset), then edge overlays, then the ground,
//! which only shows the shadows it receives. Per-draw data lives in one
//! dynamic-offset uniform buffer rebuilt every frame; meshes are uploaded
//! on first sight and cached by [`MeshKey`].

use std::num::NonZeroU64;

use glam::Mat4;
use rustc_hash::FxHashMap;
use wgpu::util::DeviceExt;

use super::dynamic_buffer::{DynamicBuffer, SlotPacker};
use super::pipeline_helpers::{
    comparison_sampler, create_mesh_pipeline, create_shadow_pipeline,
    depth_texture_2d, filtering_sampler, repeat_sampler, texture_2d,
    uniform_buffer, MeshBlend, MeshPipelineDesc,
};
use super::render_context::RenderContext;
use super::texture::{DepthTarget, SampledTexture, ShadowMap};
use crate::camera::CameraUniform;
use crate::engine::{FrameRenderer, Stage};
use crate::lighting::ShadowUniform;
use crate::scene::{MeshData, NodeId, Vertex};

/// Per-draw uniform block (96 bytes).
///
/// `material` packs roughness, metalness, a textured flag and opacity.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct DrawUniform {
    /// Object-to-world transform.
    pub model: [[f32; 4]; 4],
    /// Base color (edge color for line draws).
    pub base_color: [f32; 4],
    /// Roughness, metalness, textured flag, opacity.
    pub material: [f32; 4],
}

/// Cache key for an uploaded mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeshKey {
    /// A built-in shape, by scene node.
    Shape(NodeId),
    /// Primitive `usize` of the asset at a scene node.
    Asset(NodeId, usize),
    /// The ground plane.
    Ground,
}

struct GpuMesh {
    vertices: wgpu::Buffer,
    indices: wgpu::Buffer,
    index_count: u32,
    edges: Option<(wgpu::Buffer, u32)>,
}

impl GpuMesh {
    fn upload(device: &wgpu::Device, key: MeshKey, mesh: &MeshData) -> Self {
        let label = format!("{key:?}");
        let vertices =
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{label} Vertices")),
                contents: bytemuck::cast_slice(&mesh.vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });
        let indices =
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{label} Indices")),
                contents: bytemuck::cast_slice(&mesh.indices),
                usage: wgpu::BufferUsages::INDEX,
            });
        let edges = (!mesh.edges.is_empty()).then(|| {
            let buffer =
                device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(&format!("{label} Edges")),
                    contents: bytemuck::cast_slice(&mesh.edges),
                    usage: wgpu::BufferUsages::VERTEX,
                });
            (buffer, mesh.edges.len() as u32)
        });
        Self {
            vertices,
            indices,
            index_count: mesh.indices.len() as u32,
            edges,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum TextureSlot {
    None,
    Model(usize),
    Asset(usize),
}

#[derive(Debug, Clone, Copy)]
enum DrawKind {
    Lit(TextureSlot),
    Edges,
    Ground,
}

#[derive(Debug, Clone, Copy)]
struct DrawCall {
    mesh: MeshKey,
    offset: u32,
    kind: DrawKind,
}

const VERTEX_ATTRIBUTES: [wgpu::VertexAttribute; 3] =
    wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2];

const EDGE_ATTRIBUTES: [wgpu::VertexAttribute; 1] =
    wgpu::vertex_attr_array![0 => Float32x3];

/// GPU renderer for a [`Stage`]. Owns the [`RenderContext`].
pub struct StageRenderer {
    context: RenderContext,
    camera_uniform: CameraUniform,
    camera_buffer: wgpu::Buffer,
    lighting_buffer: wgpu::Buffer,
    shadow_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
    shadow_bind_group: wgpu::BindGroup,
    shadow_map: ShadowMap,
    draw_layout: wgpu::BindGroupLayout,
    draw_buffer: DynamicBuffer,
    draw_bind_group: wgpu::BindGroup,
    packer: SlotPacker,
    texture_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    white: wgpu::BindGroup,
    model_textures: Vec<wgpu::BindGroup>,
    asset_textures: Vec<wgpu::BindGroup>,
    asset_node: Option<NodeId>,
    lit_pipeline: wgpu::RenderPipeline,
    edge_pipeline: wgpu::RenderPipeline,
    ground_pipeline: wgpu::RenderPipeline,
    shadow_pipeline: wgpu::RenderPipeline,
    meshes: FxHashMap<MeshKey, GpuMesh>,
    depth: DepthTarget,
    draws: Vec<DrawCall>,
}

impl StageRenderer {
    /// Build pipelines and upload `stage`'s textures.
    #[must_use]
    pub fn new(context: RenderContext, stage: &Stage) -> Self {
        let device = &context.device;

        let frame_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Frame Layout"),
                entries: &[
                    uniform_buffer(0, false),
                    uniform_buffer(1, false),
                    uniform_buffer(2, false),
                    depth_texture_2d(3),
                    comparison_sampler(4),
                ],
            });
        let shadow_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Shadow Pass Layout"),
                entries: &[uniform_buffer(0, false)],
            });
        let draw_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Draw Layout"),
                entries: &[uniform_buffer(0, true)],
            });
        let texture_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Texture Layout"),
                entries: &[texture_2d(0), filtering_sampler(1)],
            });

        let camera_uniform = CameraUniform::new();
        let camera_buffer =
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Camera Uniform"),
                contents: bytemuck::bytes_of(&camera_uniform),
                usage: wgpu::BufferUsages::UNIFORM
                    | wgpu::BufferUsages::COPY_DST,
            });
        let lighting_buffer =
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Lighting Uniform"),
                contents: bytemuck::bytes_of(
                    stage.selection().lighting().uniform(),
                ),
                usage: wgpu::BufferUsages::UNIFORM
                    | wgpu::BufferUsages::COPY_DST,
            });
        let lighting = stage.selection().lighting();
        let display = &stage.options().display;
        let shadow_map = ShadowMap::new(device, display.shadow_map_size);
        let shadow_buffer =
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Shadow Uniform"),
                contents: bytemuck::bytes_of(&ShadowUniform::new(
                    lighting.key_direction(),
                    shadow_map.size(),
                    display.shadows,
                )),
                usage: wgpu::BufferUsages::UNIFORM
                    | wgpu::BufferUsages::COPY_DST,
            });
        let frame_bind_group =
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Frame Bind Group"),
                layout: &frame_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: camera_buffer.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: lighting_buffer.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: shadow_buffer.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 3,
                        resource: wgpu::BindingResource::TextureView(
                            &shadow_map.view,
                        ),
                    },
                    wgpu::BindGroupEntry {
                        binding: 4,
                        resource: wgpu::BindingResource::Sampler(
                            &shadow_map.sampler,
                        ),
                    },
                ],
            });
        let shadow_bind_group =
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Shadow Pass Bind Group"),
                layout: &shadow_layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: shadow_buffer.as_entire_binding(),
                }],
            });

        let alignment = device.limits().min_uniform_buffer_offset_alignment;
        let packer =
            SlotPacker::new(std::mem::size_of::<DrawUniform>(), alignment);
        let draw_buffer = DynamicBuffer::new(
            device,
            "Draw Uniforms",
            packer.stride() * 16,
            wgpu::BufferUsages::UNIFORM,
        );
        let draw_bind_group =
            Self::create_draw_bind_group(device, &draw_layout, &draw_buffer);

        let sampler = repeat_sampler(device, "Surface Sampler");
        let white = SampledTexture::white(device, &context.queue);
        let white = Self::create_texture_bind_group(
            device,
            &texture_layout,
            &white,
            &sampler,
        );
        let model_textures = stage
            .textures()
            .iter()
            .map(|image| {
                let texture =
                    SampledTexture::from_image(device, &context.queue, image);
                Self::create_texture_bind_group(
                    device,
                    &texture_layout,
                    &texture,
                    &sampler,
                )
            })
            .collect();

        let model_shader = device.create_shader_module(wgpu::include_wgsl!(
            "../../assets/shaders/raster/model.wgsl"
        ));
        let edge_shader = device.create_shader_module(wgpu::include_wgsl!(
            "../../assets/shaders/raster/edges.wgsl"
        ));
        let shadow_shader = device.create_shader_module(wgpu::include_wgsl!(
            "../../assets/shaders/raster/shadow.wgsl"
        ));
        let mesh_buffers = [wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &VERTEX_ATTRIBUTES,
        }];
        let edge_buffers = [wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<[f32; 3]>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &EDGE_ATTRIBUTES,
        }];
        let lit_layouts = [&frame_layout, &draw_layout, &texture_layout];
        let format = context.format();

        let lit_pipeline = create_mesh_pipeline(
            device,
            &MeshPipelineDesc {
                label: "Model",
                shader: &model_shader,
                fragment: "fs_main",
                format,
                bind_group_layouts: &lit_layouts,
                buffers: &mesh_buffers,
                topology: wgpu::PrimitiveTopology::TriangleList,
                blend: MeshBlend::Opaque,
                cull: true,
            },
        );
        let ground_pipeline = create_mesh_pipeline(
            device,
            &MeshPipelineDesc {
                label: "Ground",
                shader: &model_shader,
                fragment: "fs_ground",
                format,
                bind_group_layouts: &lit_layouts,
                buffers: &mesh_buffers,
                topology: wgpu::PrimitiveTopology::TriangleList,
                blend: MeshBlend::Translucent,
                cull: false,
            },
        );
        let edge_pipeline = create_mesh_pipeline(
            device,
            &MeshPipelineDesc {
                label: "Edges",
                shader: &edge_shader,
                fragment: "fs_main",
                format,
                bind_group_layouts: &[&frame_layout, &draw_layout],
                buffers: &edge_buffers,
                topology: wgpu::PrimitiveTopology::LineList,
                blend: MeshBlend::Translucent,
                cull: false,
            },
        );
        let shadow_pipeline = create_shadow_pipeline(
            device,
            &shadow_shader,
            &[&shadow_layout, &draw_layout],
            &mesh_buffers,
        );

        let (width, height) = context.size();
        let depth = DepthTarget::new(device, width, height);
        log::info!(
            "stage renderer ready: {} textures, {format:?}, {}px shadow map",
            stage.textures().len(),
            shadow_map.size()
        );

        Self {
            camera_uniform,
            camera_buffer,
            lighting_buffer,
            shadow_buffer,
            frame_bind_group,
            shadow_bind_group,
            shadow_map,
            draw_layout,
            draw_buffer,
            draw_bind_group,
            packer,
            texture_layout,
            sampler,
            white,
            model_textures,
            asset_textures: Vec::new(),
            asset_node: None,
            lit_pipeline,
            edge_pipeline,
            ground_pipeline,
            shadow_pipeline,
            meshes: FxHashMap::default(),
            depth,
            draws: Vec::new(),
            context,
        }
    }

    fn create_draw_bind_group(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        buffer: &DynamicBuffer,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Draw Bind Group"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: buffer.buffer(),
                    offset: 0,
                    size: NonZeroU64::new(
                        std::mem::size_of::<DrawUniform>() as u64
                    ),
                }),
            }],
        })
    }

    fn create_texture_bind_group(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        texture: &SampledTexture,
        sampler: &wgpu::Sampler,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Texture Bind Group"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&texture.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        })
    }

    /// The GPU context.
    #[must_use]
    pub fn context(&self) -> &RenderContext {
        &self.context
    }

    /// Resize the surface and depth target. Zero sizes are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if !self.context.resize(width, height) {
            return;
        }
        self.depth = DepthTarget::new(&self.context.device, width, height);
    }

    /// Number of meshes resident on the GPU.
    #[must_use]
    pub fn cached_meshes(&self) -> usize {
        self.meshes.len()
    }

    fn ensure_mesh(&mut self, key: MeshKey, mesh: impl FnOnce() -> MeshData) {
        let device = &self.context.device;
        let _ = self
            .meshes
            .entry(key)
            .or_insert_with(|| GpuMesh::upload(device, key, &mesh()));
    }

    /// Rebuild the asset's texture bind groups when a different asset
    /// becomes current, and drop the old asset's meshes.
    fn sync_asset(&mut self, stage: &Stage) {
        let node = stage.asset().map(|placed| placed.node);
        if node == self.asset_node {
            return;
        }
        if let Some(old) = self.asset_node {
            self.meshes
                .retain(|key, _| !matches!(key, MeshKey::Asset(n, _) if *n == old));
        }
        self.asset_textures.clear();
        if let Some(placed) = stage.asset() {
            let device = &self.context.device;
            for (i, t) in placed.asset.textures().iter().enumerate() {
                let texture = SampledTexture::from_rgba(
                    device,
                    &self.context.queue,
                    &format!("Asset Texture {i}"),
                    t.width,
                    t.height,
                    &t.rgba,
                );
                self.asset_textures.push(Self::create_texture_bind_group(
                    device,
                    &self.texture_layout,
                    &texture,
                    &self.sampler,
                ));
            }
        }
        self.asset_node = node;
    }

    fn push_draw(&mut self, mesh: MeshKey, kind: DrawKind, block: &DrawUniform) {
        let offset = self.packer.push(block);
        self.draws.push(DrawCall { mesh, offset, kind });
    }

    /// Collect this frame's draws, uploading any mesh not yet cached.
    fn build_draws(&mut self, stage: &Stage) {
        self.packer.clear();
        self.draws.clear();
        let scene = stage.scene();

        for slot in stage.selection().slots() {
            let Ok(model) = slot.try_borrow() else {
                continue;
            };
            let node = model.node();
            if !scene.contains(node) {
                continue;
            }
            let key = MeshKey::Shape(node);
            self.ensure_mesh(key, || model.mesh().clone());
            let material = model.material();
            let transform = model.transform().to_cols_array_2d();
            self.push_draw(
                key,
                DrawKind::Lit(TextureSlot::Model(model.texture_index())),
                &DrawUniform {
                    model: transform,
                    base_color: [1.0; 4],
                    material: [material.roughness, material.metalness, 1.0, 1.0],
                },
            );
            if let Some(color) = material.edge_color {
                self.push_draw(
                    key,
                    DrawKind::Edges,
                    &DrawUniform {
                        model: transform,
                        base_color: color,
                        material: [0.0; 4],
                    },
                );
            }
        }

        if let Some(placed) = stage.asset() {
            let meshes = placed.asset.meshes();
            for (index, world) in placed.asset.draw_list(placed.root) {
                let Some(mesh) = meshes.get(index) else {
                    continue;
                };
                let key = MeshKey::Asset(placed.node, index);
                self.ensure_mesh(key, || mesh.mesh.clone());
                let slot = mesh
                    .texture
                    .filter(|&t| t < self.asset_textures.len())
                    .map_or(TextureSlot::None, TextureSlot::Asset);
                let textured = matches!(slot, TextureSlot::Asset(_));
                self.push_draw(
                    key,
                    DrawKind::Lit(slot),
                    &DrawUniform {
                        model: world.to_cols_array_2d(),
                        base_color: mesh.base_color,
                        material: [0.6, 0.0, f32::from(u8::from(textured)), 1.0],
                    },
                );
            }
        }

        if let Some(ground) = scene.backdrop().ground {
            self.ensure_mesh(MeshKey::Ground, || {
                MeshData::plane(ground.size, ground.y)
            });
            self.push_draw(
                MeshKey::Ground,
                DrawKind::Ground,
                &DrawUniform {
                    model: Mat4::IDENTITY.to_cols_array_2d(),
                    base_color: [0.0, 0.0, 0.0, 1.0],
                    material: [1.0, 0.0, 0.0, ground.opacity],
                },
            );
        }
    }

    fn upload_uniforms(&mut self, stage: &mut Stage) {
        let backdrop = *stage.scene().backdrop();
        self.camera_uniform.update_view_proj(stage.camera());
        self.camera_uniform
            .update_fog(backdrop.fog_color, backdrop.fog_density);
        let queue = &self.context.queue;
        queue.write_buffer(
            &self.camera_buffer,
            0,
            bytemuck::bytes_of(&self.camera_uniform),
        );

        let lighting = stage.lighting_mut();
        if lighting.take_dirty() {
            queue.write_buffer(
                &self.lighting_buffer,
                0,
                bytemuck::bytes_of(lighting.uniform()),
            );
        }
        let shadow = ShadowUniform::new(
            lighting.key_direction(),
            self.shadow_map.size(),
            backdrop.shadows,
        );
        queue.write_buffer(
            &self.shadow_buffer,
            0,
            bytemuck::bytes_of(&shadow),
        );

        if self.draw_buffer.write_bytes(
            &self.context.device,
            queue,
            self.packer.bytes(),
        ) {
            self.draw_bind_group = Self::create_draw_bind_group(
                &self.context.device,
                &self.draw_layout,
                &self.draw_buffer,
            );
        }
    }

    fn texture_bind_group(&self, slot: TextureSlot) -> &wgpu::BindGroup {
        match slot {
            TextureSlot::None => None,
            TextureSlot::Model(i) => self.model_textures.get(i),
            TextureSlot::Asset(i) => self.asset_textures.get(i),
        }
        .unwrap_or(&self.white)
    }

    /// Depth of every lit mesh as seen from the key light.
    fn encode_shadow_pass(&self, encoder: &mut wgpu::CommandEncoder) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Shadow Pass"),
            color_attachments: &[],
            depth_stencil_attachment: Some(
                wgpu::RenderPassDepthStencilAttachment {
                    view: &self.shadow_map.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                },
            ),
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        pass.set_pipeline(&self.shadow_pipeline);
        pass.set_bind_group(0, &self.shadow_bind_group, &[]);
        for draw in &self.draws {
            if !matches!(draw.kind, DrawKind::Lit(_)) {
                continue;
            }
            let Some(mesh) = self.meshes.get(&draw.mesh) else {
                continue;
            };
            pass.set_bind_group(1, &self.draw_bind_group, &[draw.offset]);
            Self::draw_triangles(&mut pass, mesh);
        }
    }

    fn encode_pass(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        background: [f32; 3],
    ) {
        let [r, g, b] = background;
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Stage Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                depth_slice: None,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color {
                        r: f64::from(r),
                        g: f64::from(g),
                        b: f64::from(b),
                        a: 1.0,
                    }),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(
                wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                },
            ),
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        pass.set_bind_group(0, &self.frame_bind_group, &[]);

        // opaque first, then overlays, then the translucent ground
        let passes: [fn(&DrawKind) -> bool; 3] = [
            |k| matches!(k, DrawKind::Lit(_)),
            |k| matches!(k, DrawKind::Edges),
            |k| matches!(k, DrawKind::Ground),
        ];
        for wanted in passes {
            for draw in self.draws.iter().filter(|d| wanted(&d.kind)) {
                let Some(mesh) = self.meshes.get(&draw.mesh) else {
                    continue;
                };
                pass.set_bind_group(1, &self.draw_bind_group, &[draw.offset]);
                match draw.kind {
                    DrawKind::Lit(slot) => {
                        pass.set_pipeline(&self.lit_pipeline);
                        pass.set_bind_group(2, self.texture_bind_group(slot), &[]);
                        Self::draw_triangles(&mut pass, mesh);
                    }
                    DrawKind::Ground => {
                        pass.set_pipeline(&self.ground_pipeline);
                        pass.set_bind_group(2, &self.white, &[]);
                        Self::draw_triangles(&mut pass, mesh);
                    }
                    DrawKind::Edges => {
                        let Some((edges, count)) = &mesh.edges else {
                            continue;
                        };
                        pass.set_pipeline(&self.edge_pipeline);
                        pass.set_vertex_buffer(0, edges.slice(..));
                        pass.draw(0..*count, 0..1);
                    }
                }
            }
        }
    }

    fn draw_triangles(pass: &mut wgpu::RenderPass<'_>, mesh: &GpuMesh) {
        pass.set_vertex_buffer(0, mesh.vertices.slice(..));
        pass.set_index_buffer(mesh.indices.slice(..), wgpu::IndexFormat::Uint32);
        pass.draw_indexed(0..mesh.index_count, 0, 0..1);
    }
}

impl FrameRenderer<Stage> for StageRenderer {
    type Error = wgpu::SurfaceError;

    fn render(&mut self, stage: &mut Stage) -> Result<(), Self::Error> {
        let frame = match self.context.acquire_frame() {
            Ok(frame) => frame,
            Err(e @ (wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated)) => {
                self.context.reconfigure();
                return Err(e);
            }
            Err(e) => return Err(e),
        };
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.sync_asset(stage);
        self.build_draws(stage);
        self.upload_uniforms(stage);

        let backdrop = *stage.scene().backdrop();
        self.context.submit_frame(|encoder| {
            if backdrop.shadows {
                self.encode_shadow_pass(encoder);
            }
            self.encode_pass(encoder, &view, backdrop.background);
        });
        frame.present();
        Ok(())
    }
}
