//! Lighting presets and the rig that applies them.
//!
//! The rig is four lights: one ambient, one directional key light and two
//! point lights (fill and rim). A preset sets color and intensity for all
//! four plus the positions of the three positional ones.
//!
//! The key light also casts shadows: [`ShadowUniform`] carries its
//! orthographic light-space transform and the sampling parameters.

use glam::{Mat4, Vec3};

/// Range of the two point lights, in world units.
pub const POINT_LIGHT_RANGE: f32 = 30.0;

/// Half-width of the key light's shadow frustum, in world units.
pub const SHADOW_EXTENT: f32 = 10.0;

/// Distance from the origin to the shadow camera.
const SHADOW_DISTANCE: f32 = 20.0;

/// Light-space depth offset subtracted before the shadow comparison.
const SHADOW_BIAS: f32 = 0.002;

/// One light's color, intensity and (for positional lights) position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightSpec {
    /// Linear-ish RGB in `0..=1`.
    pub color: [f32; 3],
    /// Scalar multiplier on `color`.
    pub intensity: f32,
    /// World position; `None` for the ambient light.
    pub position: Option<Vec3>,
}

impl LightSpec {
    const fn ambient(hex: u32, intensity: f32) -> Self {
        Self {
            color: rgb(hex),
            intensity,
            position: None,
        }
    }

    const fn at(hex: u32, intensity: f32, position: Vec3) -> Self {
        Self {
            color: rgb(hex),
            intensity,
            position: Some(position),
        }
    }

    /// `color * intensity`.
    #[must_use]
    pub fn radiance(&self) -> [f32; 3] {
        self.color.map(|c| c * self.intensity)
    }
}

/// Named lighting setup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightingPreset {
    /// Display name.
    pub label: &'static str,
    /// Ambient term.
    pub ambient: LightSpec,
    /// Directional key light; its position gives the direction.
    pub direct: LightSpec,
    /// Point fill light.
    pub fill: LightSpec,
    /// Point rim light.
    pub rim: LightSpec,
}

const fn rgb(hex: u32) -> [f32; 3] {
    [
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
    ]
}

const DIRECT_POS: Vec3 = Vec3::new(4.0, 6.0, 4.0);
const FILL_POS: Vec3 = Vec3::new(-3.0, 2.0, -3.0);
const RIM_POS: Vec3 = Vec3::new(0.0, -3.0, -4.0);

/// Built-in presets in panel order.
pub const PRESETS: [LightingPreset; 3] = [
    LightingPreset {
        label: "Warm",
        ambient: LightSpec::ambient(0xfff3d0, 0.7),
        direct: LightSpec::at(0xfff3d0, 0.7, DIRECT_POS),
        fill: LightSpec::at(0xfff3d0, 0.1, FILL_POS),
        rim: LightSpec::at(0xfff3d0, 0.1, RIM_POS),
    },
    LightingPreset {
        label: "Cold",
        ambient: LightSpec::ambient(0xd0e8ff, 0.35),
        direct: LightSpec::at(0xb3e5fc, 1.3, DIRECT_POS),
        fill: LightSpec::at(0x80d8ff, 0.6, FILL_POS),
        rim: LightSpec::at(0x0077ff, 0.4, RIM_POS),
    },
    LightingPreset {
        label: "Neon",
        ambient: LightSpec::ambient(0x1a001a, 0.2),
        direct: LightSpec::at(0xff80ab, 1.7, DIRECT_POS),
        fill: LightSpec::at(0xea80fc, 0.9, FILL_POS),
        rim: LightSpec::at(0x00e5ff, 0.6, RIM_POS),
    },
];

/// Something that can switch between indexed lighting presets.
pub trait LightingSubsystem {
    /// Apply preset `index`. Returns `false` and changes nothing when the
    /// index is unknown.
    fn apply_preset(&mut self, index: usize) -> bool;

    /// Index of the preset currently applied.
    fn current_preset(&self) -> usize;
}

/// GPU lighting block.
///
/// WGSL layout (every field a `vec4<f32>`, 112 bytes):
///   ambient        rgb = color * intensity
///   direct_dir     xyz = unit vector toward the key light
///   direct_color   rgb = color * intensity
///   fill_pos       xyz = position, w = range
///   fill_color     rgb = color * intensity
///   rim_pos        xyz = position, w = range
///   rim_color      rgb = color * intensity
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightingUniform {
    /// Ambient radiance.
    pub ambient: [f32; 4],
    /// Direction toward the key light.
    pub direct_dir: [f32; 4],
    /// Key light radiance.
    pub direct_color: [f32; 4],
    /// Fill light position and range.
    pub fill_pos: [f32; 4],
    /// Fill light radiance.
    pub fill_color: [f32; 4],
    /// Rim light position and range.
    pub rim_pos: [f32; 4],
    /// Rim light radiance.
    pub rim_color: [f32; 4],
}

impl From<&LightingPreset> for LightingUniform {
    fn from(p: &LightingPreset) -> Self {
        let c = |s: &LightSpec| {
            let [r, g, b] = s.radiance();
            [r, g, b, 0.0]
        };
        let pos = |s: &LightSpec| {
            let v = s.position.unwrap_or(Vec3::ZERO);
            [v.x, v.y, v.z, POINT_LIGHT_RANGE]
        };
        let dir = p.direct.position.unwrap_or(Vec3::Y).normalize_or(Vec3::Y);
        Self {
            ambient: c(&p.ambient),
            direct_dir: [dir.x, dir.y, dir.z, 0.0],
            direct_color: c(&p.direct),
            fill_pos: pos(&p.fill),
            fill_color: c(&p.fill),
            rim_pos: pos(&p.rim),
            rim_color: c(&p.rim),
        }
    }
}

/// Key-light shadow block.
///
/// WGSL layout (80 bytes):
///   view_proj  mat4x4  world to light clip space
///   params     vec4    x = depth bias, y = one shadow-map texel in uv,
///                      z = 1 when shadows are on
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ShadowUniform {
    /// World to light clip space.
    pub view_proj: [[f32; 4]; 4],
    /// Bias, texel size, enabled flag, unused.
    pub params: [f32; 4],
}

impl ShadowUniform {
    /// Shadow block for a key light shining from `toward_light` onto a
    /// `map_size`² depth map.
    #[must_use]
    pub fn new(toward_light: Vec3, map_size: u32, enabled: bool) -> Self {
        Self {
            view_proj: key_light_view_proj(toward_light).to_cols_array_2d(),
            params: [
                SHADOW_BIAS,
                1.0 / map_size.max(1) as f32,
                f32::from(u8::from(enabled)),
                0.0,
            ],
        }
    }
}

/// Orthographic projection looking from the key light at the origin,
/// covering [`SHADOW_EXTENT`] on each side.
#[must_use]
pub fn key_light_view_proj(toward_light: Vec3) -> Mat4 {
    let dir = toward_light.normalize_or(Vec3::Y);
    let up = if dir.y.abs() > 0.99 { Vec3::Z } else { Vec3::Y };
    let view = Mat4::look_at_rh(dir * SHADOW_DISTANCE, Vec3::ZERO, up);
    let proj = Mat4::orthographic_rh(
        -SHADOW_EXTENT,
        SHADOW_EXTENT,
        -SHADOW_EXTENT,
        SHADOW_EXTENT,
        0.1,
        SHADOW_DISTANCE * 2.0,
    );
    proj * view
}

/// The viewer's lighting: holds the active preset and its uniform.
#[derive(Debug, Clone)]
pub struct LightingRig {
    current: usize,
    uniform: LightingUniform,
    dirty: bool,
}

impl Default for LightingRig {
    fn default() -> Self {
        Self::new()
    }
}

impl LightingRig {
    /// Rig with preset 0 applied.
    #[must_use]
    pub fn new() -> Self {
        Self {
            current: 0,
            uniform: LightingUniform::from(&PRESETS[0]),
            dirty: true,
        }
    }

    /// The active preset.
    #[must_use]
    pub fn preset(&self) -> &'static LightingPreset {
        &PRESETS[self.current]
    }

    /// Uniform for the active preset.
    #[must_use]
    pub fn uniform(&self) -> &LightingUniform {
        &self.uniform
    }

    /// Unit vector toward the key light.
    #[must_use]
    pub fn key_direction(&self) -> Vec3 {
        let [x, y, z, _] = self.uniform.direct_dir;
        Vec3::new(x, y, z)
    }

    /// Returns `true` once after each change so the GPU copy can be
    /// refreshed.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }
}

impl LightingSubsystem for LightingRig {
    fn apply_preset(&mut self, index: usize) -> bool {
        let Some(preset) = PRESETS.get(index) else {
            return false;
        };
        self.current = index;
        self.uniform = LightingUniform::from(preset);
        self.dirty = true;
        log::debug!("lighting preset -> {}", preset.label);
        true
    }

    fn current_preset(&self) -> usize {
        self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_is_112_bytes() {
        assert_eq!(std::mem::size_of::<LightingUniform>(), 112);
    }

    #[test]
    fn hex_colors_decode() {
        assert_eq!(rgb(0xff0000), [1.0, 0.0, 0.0]);
        let warm = PRESETS[0].ambient.color;
        assert_eq!(warm[0], 1.0);
        assert!((warm[2] - 208.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn apply_preset_switches_and_marks_dirty() {
        let mut rig = LightingRig::new();
        assert!(rig.take_dirty());
        assert!(!rig.take_dirty());

        assert!(rig.apply_preset(2));
        assert_eq!(rig.current_preset(), 2);
        assert_eq!(rig.preset().label, "Neon");
        assert!(rig.take_dirty());
        let rim = rig.uniform().rim_color;
        assert!((rim[2] - 0.6).abs() < 1e-6);
    }

    #[test]
    fn unknown_preset_is_ignored() {
        let mut rig = LightingRig::new();
        assert!(rig.apply_preset(1));
        let before = *rig.uniform();
        let _ = rig.take_dirty();

        assert!(!rig.apply_preset(3));
        assert_eq!(rig.current_preset(), 1);
        assert_eq!(*rig.uniform(), before);
        assert!(!rig.take_dirty());
    }

    #[test]
    fn key_light_points_toward_its_position() {
        let u = LightingUniform::from(&PRESETS[1]);
        let dir = Vec3::new(u.direct_dir[0], u.direct_dir[1], u.direct_dir[2]);
        assert!((dir - DIRECT_POS.normalize()).length() < 1e-6);
        assert_eq!(u.fill_pos[3], POINT_LIGHT_RANGE);
    }

    #[test]
    fn shadow_uniform_is_80_bytes() {
        assert_eq!(std::mem::size_of::<ShadowUniform>(), 80);
    }

    #[test]
    fn shadow_frustum_covers_the_ground() {
        let rig = LightingRig::new();
        let m = key_light_view_proj(rig.key_direction());

        let origin = m.project_point3(Vec3::ZERO);
        assert!(origin.x.abs() < 1e-5 && origin.y.abs() < 1e-5);
        assert!((0.0..1.0).contains(&origin.z));

        for corner in [
            Vec3::new(6.0, -1.6, 6.0),
            Vec3::new(-6.0, -1.6, -6.0),
            Vec3::new(6.0, -1.6, -6.0),
        ] {
            let p = m.project_point3(corner);
            assert!(p.x.abs() <= 1.0 && p.y.abs() <= 1.0, "{corner}");
            assert!((0.0..=1.0).contains(&p.z), "{corner}");
        }

        // nearer the light means smaller depth
        let toward = m.project_point3(rig.key_direction());
        assert!(toward.z < origin.z);
    }

    #[test]
    fn shadow_params_encode_map_size_and_flag() {
        let on = ShadowUniform::new(Vec3::Y, 1024, true);
        assert_eq!(on.params[1], 1.0 / 1024.0);
        assert_eq!(on.params[2], 1.0);
        assert_eq!(ShadowUniform::new(Vec3::Y, 1024, false).params[2], 0.0);
    }
}
