/// Basic, configurable shading utilities.
/// Kept separate from the rasterizer so lighting models
/// can evolve independently of the rasterization pipeline.
use glam::Vec3;

/// Single fixed directional light with a constant floor.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ShadingConfig {
    /// Unit direction pointing towards the light (world space).
    pub light_dir: Vec3,
    /// Intensity of a face that receives no direct light, in [0, 1].
    pub base_intensity: f32,
}

impl Default for ShadingConfig {
    fn default() -> Self {
        Self {
            // Mostly from above, tilted towards -Z so the default view's
            // front faces are lit differently from the sides.
            light_dir: Vec3::new(0.3, 1.0, -0.5).normalize(),
            base_intensity: 0.5,
        }
    }
}

impl ShadingConfig {
    /// Flat intensity for a face with unit normal `normal`:
    /// `base + max(0, n . L) * (1 - base)`, clamped to [0, 1].
    #[inline]
    pub fn face_intensity(&self, normal: Vec3) -> f32 {
        let base = self.base_intensity.clamp(0.0, 1.0);
        let lambert = normal.dot(self.light_dir).max(0.0);
        let intensity = base + lambert * (1.0 - base);
        if intensity.is_nan() {
            base
        } else {
            intensity.clamp(0.0, 1.0)
        }
    }
}

/// Multiply the RGB channels of `base` by `light` (clamped to [0, 1]).
#[inline]
pub fn shade(base: u32, light: f32) -> u32 {
    // Unpack
    let r = (base >> 16) & 0xFF;
    let g = (base >> 8) & 0xFF;
    let b = base & 0xFF;

    // Convert light to fixed point 8.8 for faster multiply
    let light_fp = (light.clamp(0.0, 1.0) * 256.0) as u32;

    let r_lit = ((r * light_fp) >> 8).min(255);
    let g_lit = ((g * light_fp) >> 8).min(255);
    let b_lit = ((b * light_fp) >> 8).min(255);

    0xFF00_0000 | (r_lit << 16) | (g_lit << 8) | b_lit
}
