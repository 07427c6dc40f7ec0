//! Keyframe clips over node transforms.

use glam::{Mat4, Quat, Vec3};

/// Translation / rotation / scale of one node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trs {
    /// Translation.
    pub translation: Vec3,
    /// Rotation.
    pub rotation: Quat,
    /// Non-uniform scale.
    pub scale: Vec3,
}

impl Default for Trs {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Trs {
    /// Local transform matrix (scale, then rotate, then translate).
    #[must_use]
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            self.scale,
            self.rotation,
            self.translation,
        )
    }
}

/// How values between keyframes are produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interpolation {
    /// Hold the previous keyframe.
    Step,
    /// Lerp (slerp for rotations).
    Linear,
    /// Cubic spline; tangents are dropped and keyframe values are
    /// interpolated linearly.
    CubicSpline,
}

/// Keyframe values for one animated property.
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelValues {
    /// Translation keyframes.
    Translation(Vec<Vec3>),
    /// Rotation keyframes.
    Rotation(Vec<Quat>),
    /// Scale keyframes.
    Scale(Vec<Vec3>),
}

/// One property of one node, animated over time.
#[derive(Debug, Clone, PartialEq)]
pub struct Channel {
    /// Index of the animated node.
    pub node: usize,
    /// Keyframe times in seconds, ascending.
    pub times: Vec<f32>,
    /// Keyframe values, one per time (three per time for cubic splines).
    pub values: ChannelValues,
    /// Interpolation mode.
    pub interpolation: Interpolation,
}

impl Channel {
    /// Keyframe pair bracketing `t` and the blend factor between them.
    fn bracket(&self, t: f32) -> Option<(usize, usize, f32)> {
        let last = self.times.len().checked_sub(1)?;
        if t <= self.times[0] {
            return Some((0, 0, 0.0));
        }
        if t >= self.times[last] {
            return Some((last, last, 0.0));
        }
        let next = self.times.partition_point(|&k| k <= t);
        let prev = next - 1;
        let span = self.times[next] - self.times[prev];
        let f = if span > 0.0 {
            (t - self.times[prev]) / span
        } else {
            0.0
        };
        match self.interpolation {
            Interpolation::Step => Some((prev, prev, 0.0)),
            Interpolation::Linear | Interpolation::CubicSpline => {
                Some((prev, next, f))
            }
        }
    }

    /// Index of keyframe `i`'s value in the output array.
    fn value_index(&self, i: usize) -> usize {
        match self.interpolation {
            // in-tangent, value, out-tangent
            Interpolation::CubicSpline => i * 3 + 1,
            _ => i,
        }
    }

    /// Write this channel's value at time `t` into `trs`.
    pub fn apply(&self, t: f32, trs: &mut Trs) {
        let Some((a, b, f)) = self.bracket(t) else {
            return;
        };
        let (a, b) = (self.value_index(a), self.value_index(b));
        match &self.values {
            ChannelValues::Translation(v) => {
                if let (Some(x), Some(y)) = (v.get(a), v.get(b)) {
                    trs.translation = x.lerp(*y, f);
                }
            }
            ChannelValues::Rotation(v) => {
                if let (Some(x), Some(y)) = (v.get(a), v.get(b)) {
                    trs.rotation = x.slerp(*y, f).normalize();
                }
            }
            ChannelValues::Scale(v) => {
                if let (Some(x), Some(y)) = (v.get(a), v.get(b)) {
                    trs.scale = x.lerp(*y, f);
                }
            }
        }
    }
}

/// A looping animation clip.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationClip {
    /// Clip name from the source file, if any.
    pub name: Option<String>,
    /// Length in seconds (last keyframe across all channels).
    pub duration: f32,
    /// Animated properties.
    pub channels: Vec<Channel>,
}

impl AnimationClip {
    /// Build a clip, deriving its duration from the channels.
    #[must_use]
    pub fn new(name: Option<String>, channels: Vec<Channel>) -> Self {
        let duration = channels
            .iter()
            .filter_map(|c| c.times.last().copied())
            .fold(0.0, f32::max);
        Self {
            name,
            duration,
            channels,
        }
    }

    /// Wrap `time` into the clip's range.
    #[must_use]
    pub fn wrap(&self, time: f32) -> f32 {
        if self.duration > 0.0 {
            time.rem_euclid(self.duration)
        } else {
            0.0
        }
    }

    /// Pose `locals` at `time` (already wrapped).
    pub fn sample(&self, time: f32, locals: &mut [Trs]) {
        for channel in &self.channels {
            if let Some(trs) = locals.get_mut(channel.node) {
                channel.apply(time, trs);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn translation_channel(interpolation: Interpolation) -> Channel {
        Channel {
            node: 0,
            times: vec![0.0, 1.0, 3.0],
            values: ChannelValues::Translation(vec![
                Vec3::ZERO,
                Vec3::X,
                Vec3::new(3.0, 0.0, 0.0),
            ]),
            interpolation,
        }
    }

    #[test]
    fn linear_interpolates_between_keys() {
        let ch = translation_channel(Interpolation::Linear);
        let mut trs = Trs::default();
        ch.apply(0.5, &mut trs);
        assert_eq!(trs.translation, Vec3::new(0.5, 0.0, 0.0));
        ch.apply(2.0, &mut trs);
        assert_eq!(trs.translation, Vec3::new(2.0, 0.0, 0.0));
    }

    #[test]
    fn step_holds_previous_key() {
        let ch = translation_channel(Interpolation::Step);
        let mut trs = Trs::default();
        ch.apply(2.9, &mut trs);
        assert_eq!(trs.translation, Vec3::X);
    }

    #[test]
    fn times_outside_range_clamp() {
        let ch = translation_channel(Interpolation::Linear);
        let mut trs = Trs::default();
        ch.apply(-1.0, &mut trs);
        assert_eq!(trs.translation, Vec3::ZERO);
        ch.apply(10.0, &mut trs);
        assert_eq!(trs.translation, Vec3::new(3.0, 0.0, 0.0));
    }

    #[test]
    fn cubic_spline_uses_middle_values() {
        let ch = Channel {
            node: 0,
            times: vec![0.0, 1.0],
            values: ChannelValues::Scale(vec![
                Vec3::splat(9.0),
                Vec3::ONE,
                Vec3::splat(9.0),
                Vec3::splat(9.0),
                Vec3::splat(3.0),
                Vec3::splat(9.0),
            ]),
            interpolation: Interpolation::CubicSpline,
        };
        let mut trs = Trs::default();
        ch.apply(0.5, &mut trs);
        assert_eq!(trs.scale, Vec3::splat(2.0));
    }

    #[test]
    fn clip_duration_and_wrap() {
        let clip = AnimationClip::new(
            Some("walk".into()),
            vec![translation_channel(Interpolation::Linear)],
        );
        assert_eq!(clip.duration, 3.0);
        assert!((clip.wrap(4.5) - 1.5).abs() < 1e-6);

        let mut locals = vec![Trs::default(); 2];
        clip.sample(0.5, &mut locals);
        assert_eq!(locals[0].translation.x, 0.5);
        assert_eq!(locals[1], Trs::default());
    }

    #[test]
    fn empty_clip_stays_at_zero() {
        let clip = AnimationClip::new(None, Vec::new());
        assert_eq!(clip.wrap(5.0), 0.0);
    }
}
