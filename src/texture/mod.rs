//! Procedural surface textures.
//!
//! Each texture is painted on a small CPU canvas into RGBA8 pixels that the
//! GPU layer uploads once at startup. Painting is seeded so the same
//! textures come out on every run.

use glam::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Default edge length of generated textures, in pixels.
pub const TEXTURE_SIZE: u32 = 256;

/// Square RGBA8 image, row-major, top row first.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureImage {
    /// Display name.
    pub label: &'static str,
    /// Edge length in pixels.
    pub size: u32,
    /// `size * size * 4` bytes of straight-alpha RGBA.
    pub pixels: Vec<u8>,
}

impl TextureImage {
    /// RGBA at pixel `(x, y)`.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = ((y * self.size + x) * 4) as usize;
        [
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ]
    }
}

/// Builds the ordered list of textures models can wear.
#[derive(Debug, Clone)]
pub struct TextureFactory {
    size: u32,
    seed: u64,
}

impl Default for TextureFactory {
    fn default() -> Self {
        Self {
            size: TEXTURE_SIZE,
            seed: 0x5eed,
        }
    }
}

impl TextureFactory {
    /// Factory producing `size`×`size` textures.
    #[must_use]
    pub fn with_size(size: u32) -> Self {
        Self {
            size: size.max(1),
            ..Self::default()
        }
    }

    /// All textures in panel order: brick, brushed metal, emerald.
    #[must_use]
    pub fn create_all(&self) -> Vec<TextureImage> {
        vec![self.brick(), self.metal(), self.emerald()]
    }

    /// Display labels in the same order as [`Self::create_all`].
    #[must_use]
    pub fn labels() -> [&'static str; 3] {
        ["Brick", "Metal", "Emerald"]
    }

    fn brick(&self) -> TextureImage {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut c = Canvas::new(self.size);
        let s = c.size as f32;
        let k = s / 256.0;
        c.fill([0xb5, 0x65, 0x1d], 1.0);

        let (bw, bh) = (64.0 * k, 28.0 * k);
        let mortar = [0x7a, 0x40, 0x11];
        let mut row = 0;
        while (row as f32) * bh < s + bh {
            let offset = if row % 2 == 0 { 0.0 } else { bw / 2.0 };
            let mut col = -1;
            while (col as f32) * bw < s + bw {
                c.stroke_rect(
                    col as f32 * bw + offset + 2.0 * k,
                    row as f32 * bh + 2.0 * k,
                    bw - 4.0 * k,
                    bh - 4.0 * k,
                    3.0 * k,
                    mortar,
                );
                col += 1;
            }
            row += 1;
        }

        // speckle
        for _ in 0..1200 {
            let alpha = rng.random::<f32>() * 0.12;
            let color = if rng.random::<f32>() > 0.5 {
                [255, 255, 255]
            } else {
                [0, 0, 0]
            };
            let x = rng.random::<f32>() * s;
            let y = rng.random::<f32>() * s;
            c.fill_rect(x, y, 1.5, 1.5, color, alpha);
        }
        c.finish("Brick")
    }

    fn metal(&self) -> TextureImage {
        let mut rng = StdRng::seed_from_u64(self.seed ^ 1);
        let mut c = Canvas::new(self.size);
        let s = c.size as f32;
        let dark = Vec2::ZERO;
        let edge = [0x1c, 0x2a, 0x3a];
        let mid = [0x3a, 0x6b, 0x9e];

        // diagonal gradient dark -> blue -> dark
        for y in 0..c.size {
            for x in 0..c.size {
                let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                let t = ((p - dark).dot(Vec2::ONE) / (2.0 * s)).clamp(0.0, 1.0);
                let w = 1.0 - (2.0 * t - 1.0).abs();
                c.blend(x, y, lerp_rgb(edge, mid, w), 1.0);
            }
        }

        // brushed lines every third row
        for y in (0..c.size).step_by(3) {
            let alpha = rng.random::<f32>() * 0.06;
            c.fill_rect(0.0, y as f32, s, 1.0, [255, 255, 255], alpha);
        }

        // horizontal shine peaking a little left of centre
        for x in 0..c.size {
            let t = (x as f32 + 0.5) / s;
            let alpha = if t < 0.45 {
                0.18 * t / 0.45
            } else {
                0.18 * (1.0 - t) / 0.55
            };
            for y in 0..c.size {
                c.blend(x, y, [255, 255, 255], alpha);
            }
        }
        c.finish("Metal")
    }

    fn emerald(&self) -> TextureImage {
        let mut c = Canvas::new(self.size);
        let s = c.size as f32;
        c.fill([0x1a, 0x47, 0x31], 1.0);

        let v = |x: f32, y: f32| Vec2::new(x * s, y * s);
        let apex = v(0.5, 1.0 / 3.0);
        let low = v(0.5, 0.67);
        let facets = [
            ([v(0., 0.), apex, v(0., 0.5)], [0x27, 0xae, 0x60]),
            ([v(1., 0.), apex, v(1., 0.5)], [0x1e, 0x84, 0x49]),
            ([v(0., 0.5), apex, v(0.5, 1.)], [0x2e, 0xcc, 0x71]),
            ([v(1., 0.5), apex, v(0.5, 1.)], [0x1a, 0x5e, 0x36]),
            ([v(0., 0.), v(0.5, 0.), apex], [0x23, 0x9b, 0x56]),
            ([v(0.5, 0.), v(1., 0.), apex], [0x14, 0x5a, 0x32]),
            ([v(0., 1.), v(0.5, 1.), low], [0x1e, 0x84, 0x49]),
            ([v(0.5, 1.), v(1., 1.), low], [0x27, 0xae, 0x60]),
        ];
        for (tri, color) in facets {
            c.fill_triangle(tri, color);
            for i in 0..3 {
                c.stroke_line(tri[i], tri[(i + 1) % 3], 1.0, [0, 0, 0], 0.25);
            }
        }

        // radial gloss
        let center = v(0.35, 0.3);
        let radius = 0.5 * s;
        for y in 0..c.size {
            for x in 0..c.size {
                let d = Vec2::new(x as f32 + 0.5, y as f32 + 0.5)
                    .distance(center);
                let alpha = 0.3 * (1.0 - d / radius).max(0.0);
                c.blend(x, y, [255, 255, 255], alpha);
            }
        }
        c.finish("Emerald")
    }
}

fn lerp_rgb(a: [u8; 3], b: [u8; 3], t: f32) -> [u8; 3] {
    let mix = |x: u8, y: u8| {
        (f32::from(x) + (f32::from(y) - f32::from(x)) * t).round() as u8
    };
    [mix(a[0], b[0]), mix(a[1], b[1]), mix(a[2], b[2])]
}

/// Opaque RGB canvas with source-over blending.
struct Canvas {
    size: u32,
    rgb: Vec<[f32; 3]>,
}

impl Canvas {
    fn new(size: u32) -> Self {
        Self {
            size,
            rgb: vec![[0.0; 3]; (size * size) as usize],
        }
    }

    fn blend(&mut self, x: u32, y: u32, color: [u8; 3], alpha: f32) {
        if x >= self.size || y >= self.size {
            return;
        }
        let alpha = alpha.clamp(0.0, 1.0);
        let px = &mut self.rgb[(y * self.size + x) as usize];
        for (dst, src) in px.iter_mut().zip(color) {
            *dst += (f32::from(src) - *dst) * alpha;
        }
    }

    fn fill(&mut self, color: [u8; 3], alpha: f32) {
        let s = self.size as f32;
        self.fill_rect(0.0, 0.0, s, s, color, alpha);
    }

    /// Fill pixels whose centres fall inside the rectangle.
    fn fill_rect(
        &mut self,
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        color: [u8; 3],
        alpha: f32,
    ) {
        let x0 = (x - 0.5).ceil().max(0.0) as u32;
        let y0 = (y - 0.5).ceil().max(0.0) as u32;
        let x1 = (x + w - 0.5).ceil().clamp(0.0, self.size as f32) as u32;
        let y1 = (y + h - 0.5).ceil().clamp(0.0, self.size as f32) as u32;
        for py in y0..y1 {
            for px in x0..x1 {
                self.blend(px, py, color, alpha);
            }
        }
    }

    fn stroke_rect(
        &mut self,
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        width: f32,
        color: [u8; 3],
    ) {
        let hw = width / 2.0;
        self.fill_rect(x - hw, y - hw, w + width, width, color, 1.0);
        self.fill_rect(x - hw, y + h - hw, w + width, width, color, 1.0);
        self.fill_rect(x - hw, y + hw, width, h - width, color, 1.0);
        self.fill_rect(x + w - hw, y + hw, width, h - width, color, 1.0);
    }

    fn fill_triangle(&mut self, tri: [Vec2; 3], color: [u8; 3]) {
        let min = tri[0].min(tri[1]).min(tri[2]).max(Vec2::ZERO);
        let max = tri[0]
            .max(tri[1])
            .max(tri[2])
            .min(Vec2::splat(self.size as f32));
        let edge = |a: Vec2, b: Vec2, p: Vec2| (b - a).perp_dot(p - a);
        let area = edge(tri[0], tri[1], tri[2]);
        if area == 0.0 {
            return;
        }
        for y in min.y as u32..max.y.ceil() as u32 {
            for x in min.x as u32..max.x.ceil() as u32 {
                let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                let w0 = edge(tri[1], tri[2], p) * area.signum();
                let w1 = edge(tri[2], tri[0], p) * area.signum();
                let w2 = edge(tri[0], tri[1], p) * area.signum();
                if w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0 {
                    self.blend(x, y, color, 1.0);
                }
            }
        }
    }

    fn stroke_line(
        &mut self,
        a: Vec2,
        b: Vec2,
        width: f32,
        color: [u8; 3],
        alpha: f32,
    ) {
        let steps = a.distance(b).ceil().max(1.0) as u32;
        let mut last = None;
        for i in 0..=steps {
            let p = a.lerp(b, i as f32 / steps as f32);
            let cell = (p.x.floor() as i64, p.y.floor() as i64);
            // blend each pixel once per line
            if last == Some(cell) {
                continue;
            }
            last = Some(cell);
            self.fill_rect(
                p.x - width / 2.0,
                p.y - width / 2.0,
                width,
                width,
                color,
                alpha,
            );
        }
    }

    fn finish(self, label: &'static str) -> TextureImage {
        let mut pixels = Vec::with_capacity(self.rgb.len() * 4);
        for [r, g, b] in self.rgb {
            pixels.extend_from_slice(&[
                r.round().clamp(0.0, 255.0) as u8,
                g.round().clamp(0.0, 255.0) as u8,
                b.round().clamp(0.0, 255.0) as u8,
                255,
            ]);
        }
        TextureImage {
            label,
            size: self.size,
            pixels,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creates_three_square_textures() {
        let textures = TextureFactory::default().create_all();
        assert_eq!(textures.len(), 3);
        for tex in &textures {
            assert_eq!(tex.size, TEXTURE_SIZE);
            assert_eq!(tex.pixels.len(), (TEXTURE_SIZE * TEXTURE_SIZE * 4) as usize);
            assert!(tex.pixels.chunks(4).all(|p| p[3] == 255));
        }
        let labels: Vec<_> = textures.iter().map(|t| t.label).collect();
        assert_eq!(labels, TextureFactory::labels());
    }

    #[test]
    fn generation_is_deterministic() {
        let factory = TextureFactory::with_size(64);
        assert_eq!(factory.create_all(), factory.create_all());
    }

    #[test]
    fn brick_is_mostly_orange() {
        let brick = &TextureFactory::default().create_all()[0];
        // inside the first brick, away from mortar and speckle-heavy edges
        let [r, g, b, _] = brick.pixel(30, 14);
        assert!(r > g && g > b, "got {r} {g} {b}");
    }

    #[test]
    fn emerald_is_green() {
        let emerald = &TextureFactory::default().create_all()[2];
        let [r, g, b, _] = emerald.pixel(200, 240);
        assert!(g > r && g > b);
    }

    #[test]
    fn canvas_triangle_fills_interior_only() {
        let mut c = Canvas::new(8);
        c.fill_triangle(
            [Vec2::new(0.0, 0.0), Vec2::new(8.0, 0.0), Vec2::new(0.0, 8.0)],
            [255, 0, 0],
        );
        let img = c.finish("t");
        assert_eq!(img.pixel(1, 1), [255, 0, 0, 255]);
        assert_eq!(img.pixel(7, 7), [0, 0, 0, 255]);
    }
}
