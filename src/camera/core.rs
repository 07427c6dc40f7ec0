use glam::{Mat4, Vec3};

use crate::options::CameraOptions;

/// Closest allowed camera distance.
pub const ZOOM_MIN: f32 = 2.5;
/// Farthest allowed camera distance.
pub const ZOOM_MAX: f32 = 9.0;

/// Perspective camera looking down -Z from `eye`.
///
/// The zoom distance is the eye's z coordinate; the model sits at the
/// origin.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    /// Eye (camera) position in world space.
    pub eye: Vec3,
    /// Viewing direction.
    pub forward: Vec3,
    /// Up direction vector.
    pub up: Vec3,
    /// Viewport aspect ratio (width / height).
    pub aspect: f32,
    /// Vertical field of view in degrees.
    pub fovy: f32,
    /// Near clipping plane distance.
    pub znear: f32,
    /// Far clipping plane distance.
    pub zfar: f32,
}

impl Camera {
    /// Camera at `distance` from the origin, raised by the configured
    /// eye height.
    #[must_use]
    pub fn new(options: &CameraOptions, aspect: f32, distance: f32) -> Self {
        Self {
            eye: Vec3::new(0.0, options.height, distance),
            forward: Vec3::NEG_Z,
            up: Vec3::Y,
            aspect,
            fovy: options.fovy,
            znear: options.znear,
            zfar: options.zfar,
        }
    }

    /// Current zoom distance.
    #[must_use]
    pub fn distance(&self) -> f32 {
        self.eye.z
    }

    /// Set the zoom distance without clamping.
    pub fn set_distance(&mut self, distance: f32) {
        self.eye.z = distance;
    }

    /// Add `delta` to the zoom distance, clamped to
    /// [`ZOOM_MIN`]..=[`ZOOM_MAX`].
    pub fn zoom_by(&mut self, delta: f32) {
        self.eye.z = (self.eye.z + delta).clamp(ZOOM_MIN, ZOOM_MAX);
    }

    /// Build the view matrix.
    #[must_use]
    pub fn build_view(&self) -> Mat4 {
        Mat4::look_to_rh(self.eye, self.forward, self.up)
    }

    /// Build the projection matrix.
    #[must_use]
    pub fn build_projection(&self) -> Mat4 {
        // perspective_rh already uses [0,1] depth range (wgpu/Vulkan
        // convention)
        Mat4::perspective_rh(
            self.fovy.to_radians(),
            self.aspect,
            self.znear,
            self.zfar,
        )
    }

    /// Build the combined view-projection matrix.
    #[must_use]
    pub fn build_matrix(&self) -> Mat4 {
        self.build_projection() * self.build_view()
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
/// GPU uniform buffer holding the view-projection matrix and fog settings.
pub struct CameraUniform {
    /// Combined view-projection matrix.
    pub view_proj: [[f32; 4]; 4],
    /// Camera world-space position.
    pub position: [f32; 3],
    /// Exponential-squared fog density.
    pub fog_density: f32,
    /// Fog color.
    pub fog_color: [f32; 3],
    /// Padding for GPU alignment.
    pub(crate) _pad: f32,
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new()
    }
}

impl CameraUniform {
    /// Create a new camera uniform with identity view-projection.
    #[must_use]
    pub fn new() -> Self {
        Self {
            view_proj: Mat4::IDENTITY.to_cols_array_2d(),
            position: [0.0; 3],
            fog_density: 0.0,
            fog_color: [0.0; 3],
            _pad: 0.0,
        }
    }

    /// Update uniform fields from the given camera's current state.
    pub fn update_view_proj(&mut self, camera: &Camera) {
        self.view_proj = camera.build_matrix().to_cols_array_2d();
        self.position = camera.eye.to_array();
    }

    /// Update the fog parameters.
    pub fn update_fog(&mut self, color: [f32; 3], density: f32) {
        self.fog_color = color;
        self.fog_density = density;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zoom_clamps_to_bounds() {
        let mut camera = Camera::new(&CameraOptions::default(), 1.0, 5.0);
        for _ in 0..100 {
            camera.zoom_by(0.7);
        }
        assert_eq!(camera.distance(), ZOOM_MAX);
        for _ in 0..100 {
            camera.zoom_by(-1.3);
        }
        assert_eq!(camera.distance(), ZOOM_MIN);
    }

    #[test]
    fn new_camera_uses_height_and_distance() {
        let camera = Camera::new(&CameraOptions::default(), 1.5, 9.0);
        assert_eq!(camera.eye, Vec3::new(0.0, 1.2, 9.0));
        assert_eq!(camera.aspect, 1.5);
    }

    #[test]
    fn origin_projects_in_front_of_camera() {
        let camera = Camera::new(&CameraOptions::default(), 1.0, 5.0);
        let clip = camera.build_matrix() * glam::Vec4::new(0.0, 0.0, 0.0, 1.0);
        let ndc_z = clip.z / clip.w;
        assert!(clip.w > 0.0);
        assert!((0.0..=1.0).contains(&ndc_z));
    }
}
