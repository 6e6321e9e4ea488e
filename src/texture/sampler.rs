use std::path::Path;
use std::sync::Arc;

use nalgebra as na;
use na::Vector3;

use super::Texture;

/// How texels are combined for a texture coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterMode {
    /// Closest texel.
    #[default]
    Nearest,
    /// Blend of the 2x2 texels around the coordinate.
    Bilinear,
}

/// What happens to coordinates outside of [0.0, 1.0].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WrapMode {
    #[default]
    ClampToEdge,
    Repeat,
    /// Reflects at 0 and 1, coordinates past [-1.0, 2.0] clamp to that range first.
    Mirror,
    /// Returns the fill color without touching the texture.
    Fill,
}

/// Reads colors from one texture with a filter and a wrap policy.
/// Texture coordinates have (0, 0) at texel (0, 0) and (1, 1) at the last texel.
#[derive(Debug)]
pub struct Sampler {
    texture: Arc<Texture>,
    filter_mode: FilterMode,
    wrap_mode: WrapMode,
    fill_color: Vector3<f32>,
}

impl Sampler {
    /// Takes an owned texture or one shared with other samplers.
    pub fn new(texture: impl Into<Arc<Texture>>, filter_mode: FilterMode, wrap_mode: WrapMode) -> Sampler {
        return Sampler {
            texture: texture.into(),
            filter_mode,
            wrap_mode,
            fill_color: Vector3::zeros(),
        };
    }

    /// Sampler over a texture file, see Texture::load for failure handling.
    pub fn from_file<P: AsRef<Path>>(path: P, filter_mode: FilterMode, wrap_mode: WrapMode) -> Sampler {
        return Sampler::new(Texture::load(path), filter_mode, wrap_mode);
    }

    pub fn texture(&self) -> &Texture {
        return &self.texture;
    }

    pub fn filter_mode(&self) -> FilterMode {
        return self.filter_mode;
    }

    pub fn set_filter_mode(&mut self, filter_mode: FilterMode) {
        self.filter_mode = filter_mode;
    }

    pub fn wrap_mode(&self) -> WrapMode {
        return self.wrap_mode;
    }

    pub fn set_wrap_mode(&mut self, wrap_mode: WrapMode) {
        self.wrap_mode = wrap_mode;
    }

    pub fn fill_color(&self) -> Vector3<f32> {
        return self.fill_color;
    }

    pub fn set_fill_color(&mut self, fill_color: Vector3<f32>) {
        self.fill_color = fill_color;
    }

    /// Color at texture coordinate (u, v), channels in [0.0, 1.0].
    pub fn sample(&self, u: f32, v: f32) -> Vector3<f32> {
        if self.texture.is_empty() {
            return self.fill_color;
        }

        let (mut u, mut v) = (u, v);
        // Both coordinates get wrapped as soon as one of them is out of range.
        if !(0.0..=1.0).contains(&u) || !(0.0..=1.0).contains(&v) {
            match self.wrap_mode {
                WrapMode::ClampToEdge => {
                    u = u.clamp(0.0, 1.0);
                    v = v.clamp(0.0, 1.0);
                }
                WrapMode::Repeat => {
                    u = repeat(u);
                    v = repeat(v);
                }
                WrapMode::Mirror => {
                    u = mirror(u);
                    v = mirror(v);
                }
                WrapMode::Fill => return self.fill_color,
            }
        }

        return match self.filter_mode {
            FilterMode::Nearest => self.sample_nearest(u, v),
            FilterMode::Bilinear => self.sample_bilinear(u, v),
        };
    }

    fn sample_nearest(&self, u: f32, v: f32) -> Vector3<f32> {
        let x = (u * (self.texture.width() - 1) as f32).round() as u32;
        let y = (v * (self.texture.height() - 1) as f32).round() as u32;
        return to_unit_color(self.texture.texel(x, y).cast::<f32>());
    }

    fn sample_bilinear(&self, u: f32, v: f32) -> Vector3<f32> {
        let (x1, x2, tx) = lerp_span(u, self.texture.width());
        let (y1, y2, ty) = lerp_span(v, self.texture.height());

        let c11 = self.texture.texel(x1, y1).cast::<f32>();
        let c12 = self.texture.texel(x1, y2).cast::<f32>();
        let c21 = self.texture.texel(x2, y1).cast::<f32>();
        let c22 = self.texture.texel(x2, y2).cast::<f32>();

        let blend = c11 * ((1.0 - tx) * (1.0 - ty))
            + c12 * ((1.0 - tx) * ty)
            + c21 * (tx * (1.0 - ty))
            + c22 * (tx * ty);
        return to_unit_color(blend.map(|c| c.round()));
    }
}

fn repeat(t: f32) -> f32 {
    let t = t % 1.0;
    return if t < 0.0 { t + 1.0 } else { t };
}

fn mirror(t: f32) -> f32 {
    let t = t.clamp(-1.0, 2.0);
    let t = if t < 0.0 { -t } else { t };
    return if t > 1.0 { 2.0 - t } else { t };
}

/// Lower and upper texel index around coordinate t in [0.0, 1.0] and the weight of the upper one.
/// The lower index stops one short of the last texel so the upper one stays in range.
fn lerp_span(t: f32, size: u32) -> (u32, u32, f32) {
    if size < 2 {
        return (0, 0, 0.0);
    }
    let scaled = t * (size - 1) as f32;
    let lower = (scaled.floor() as u32).min(size - 2);
    return (lower, lower + 1, scaled - lower as f32);
}

fn to_unit_color(texel: Vector3<f32>) -> Vector3<f32> {
    return texel / 255.0;
}
