//! Depth attachments, the key-light shadow map and sampled RGBA textures.

use crate::texture::TextureImage;

/// Depth buffer format shared by every pipeline.
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Depth attachment sized to the surface. Recreate it on resize.
pub struct DepthTarget {
    /// The depth texture.
    pub texture: wgpu::Texture,
    /// Full-texture view used as the pass attachment.
    pub view: wgpu::TextureView,
    size: (u32, u32),
}

impl DepthTarget {
    /// Depth texture of `width` x `height` (each clamped to at least 1).
    #[must_use]
    pub fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let size = (width.max(1), height.max(1));
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Depth Target"),
            size: wgpu::Extent3d {
                width: size.0,
                height: size.1,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            texture,
            view,
            size,
        }
    }

    /// Size the target was created with.
    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        self.size
    }
}

/// Square depth map rendered from the key light and sampled with a
/// comparison sampler.
pub struct ShadowMap {
    /// Attachment for the shadow pass and binding for the lit pass.
    pub view: wgpu::TextureView,
    /// Linear-filtered `LessEqual` comparison sampler.
    pub sampler: wgpu::Sampler,
    size: u32,
}

impl ShadowMap {
    /// `size`² shadow map (at least 1).
    #[must_use]
    pub fn new(device: &wgpu::Device, size: u32) -> Self {
        let size = size.max(1);
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Shadow Map"),
            size: wgpu::Extent3d {
                width: size,
                height: size,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Shadow Sampler"),
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            compare: Some(wgpu::CompareFunction::LessEqual),
            ..Default::default()
        });
        Self {
            view,
            sampler,
            size,
        }
    }

    /// Edge length in texels.
    #[must_use]
    pub fn size(&self) -> u32 {
        self.size
    }
}

/// An sRGB color texture uploaded once, with its view.
pub struct SampledTexture {
    /// The GPU texture.
    pub texture: wgpu::Texture,
    /// Full-texture view for binding.
    pub view: wgpu::TextureView,
}

impl SampledTexture {
    /// Upload tightly packed RGBA8 pixels.
    ///
    /// `rgba` must hold `width * height * 4` bytes; shorter input is
    /// padded with opaque white so a malformed image still binds.
    #[must_use]
    pub fn from_rgba(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        label: &str,
        width: u32,
        height: u32,
        rgba: &[u8],
    ) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        let expected = (width * height * 4) as usize;
        let padded;
        let data = if rgba.len() >= expected {
            &rgba[..expected]
        } else {
            log::warn!(
                "texture {label}: {} bytes for {width}x{height}, padding",
                rgba.len()
            );
            let mut buf = rgba.to_vec();
            buf.resize(expected, 255);
            padded = buf;
            &padded[..]
        };

        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            data,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(width * 4),
                rows_per_image: Some(height),
            },
            size,
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self { texture, view }
    }

    /// Upload a procedurally generated texture.
    #[must_use]
    pub fn from_image(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        image: &TextureImage,
    ) -> Self {
        Self::from_rgba(
            device,
            queue,
            image.label,
            image.size,
            image.size,
            &image.pixels,
        )
    }

    /// 1x1 white texture for untextured draws.
    #[must_use]
    pub fn white(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        Self::from_rgba(device, queue, "White", 1, 1, &[255; 4])
    }
}
