/// Geometry primitives shared by the camera, rasterizer and ray caster.
/// Storage types come from glam; every transform used by the pipeline
/// (axis rotations, projection, culling) is written out by hand.
pub mod cuboid;
pub mod direction;

pub use cuboid::{Cuboid, Face, FaceSet, FaceUvs, CUBOID_EDGES};
pub use direction::Direction;

use glam::Vec3;

/// Axis rotations on points and directions.
///
/// Angles are in radians. Each rotation returns a new value; the receiver
/// is never modified.
pub trait RotateExt {
    fn rotate_x(self, angle: f32) -> Self;
    fn rotate_y(self, angle: f32) -> Self;
    fn rotate_z(self, angle: f32) -> Self;

    /// Rotate by Euler angles `(pitch, yaw, roll)` stored in `x, y, z`,
    /// applied pitch first, then yaw, then roll.
    fn rotate_euler(self, angles: Vec3) -> Self;

    /// Exact inverse of [`RotateExt::rotate_euler`]: undoes roll, then yaw,
    /// then pitch.
    fn rotate_euler_inverse(self, angles: Vec3) -> Self;
}

impl RotateExt for Vec3 {
    #[inline]
    fn rotate_x(self, angle: f32) -> Self {
        let (sin, cos) = angle.sin_cos();
        Vec3::new(
            self.x,
            self.y * cos - self.z * sin,
            self.y * sin + self.z * cos,
        )
    }

    #[inline]
    fn rotate_y(self, angle: f32) -> Self {
        let (sin, cos) = angle.sin_cos();
        Vec3::new(
            self.x * cos + self.z * sin,
            self.y,
            -self.x * sin + self.z * cos,
        )
    }

    #[inline]
    fn rotate_z(self, angle: f32) -> Self {
        let (sin, cos) = angle.sin_cos();
        Vec3::new(
            self.x * cos - self.y * sin,
            self.x * sin + self.y * cos,
            self.z,
        )
    }

    #[inline]
    fn rotate_euler(self, angles: Vec3) -> Self {
        self.rotate_x(angles.x).rotate_y(angles.y).rotate_z(angles.z)
    }

    #[inline]
    fn rotate_euler_inverse(self, angles: Vec3) -> Self {
        self.rotate_z(-angles.z)
            .rotate_y(-angles.y)
            .rotate_x(-angles.x)
    }
}

/// Fractional bits carried by [`PixelPoint`] screen coordinates.
pub const SUBPIXEL_BITS: u32 = 8;
/// Sub-pixel steps per pixel.
pub const SUBPIXEL_SCALE: i32 = 1 << SUBPIXEL_BITS;

/// Rasterizer-space vertex.
///
/// `x`/`y` are integer screen coordinates in fixed point with
/// [`SUBPIXEL_BITS`] fractional bits, so the value `SUBPIXEL_SCALE * 3`
/// is the left/top boundary of pixel 3 and pixel 3's centre sits half a
/// pixel further in. `depth` is the camera-space z scaled by
/// `far / (far - near)`. When perspective correction is enabled `u`/`v`
/// hold atlas pixel coordinates already divided by `depth`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PixelPoint {
    pub x: i32,
    pub y: i32,
    pub depth: f32,
    pub u: f32,
    pub v: f32,
}

impl PixelPoint {
    /// Vertex on the whole-pixel boundary `(x, y)`.
    #[inline]
    pub const fn new(x: i32, y: i32, depth: f32, u: f32, v: f32) -> Self {
        Self {
            x: x.saturating_mul(SUBPIXEL_SCALE),
            y: y.saturating_mul(SUBPIXEL_SCALE),
            depth,
            u,
            v,
        }
    }

    /// Vertex at a continuous screen position, snapped to the nearest
    /// sub-pixel step. `as` saturates, so far off-screen points stay
    /// representable.
    #[inline]
    pub fn from_screen(x: f32, y: f32, depth: f32) -> Self {
        let scale = SUBPIXEL_SCALE as f32;
        Self {
            x: (x * scale).round() as i32,
            y: (y * scale).round() as i32,
            depth,
            u: 0.0,
            v: 0.0,
        }
    }

    /// Same position and depth with new texture coordinates.
    #[inline]
    pub const fn with_uv(self, u: f32, v: f32) -> Self {
        Self { u, v, ..self }
    }

    /// Continuous screen position in pixels.
    #[inline]
    pub fn screen_position(&self) -> (f32, f32) {
        let scale = SUBPIXEL_SCALE as f32;
        (self.x as f32 / scale, self.y as f32 / scale)
    }

    /// Nearest whole-pixel boundary, halves rounding up. Lines and other
    /// integer-only consumers snap here; triangle coverage keeps the
    /// sub-pixel position.
    #[inline]
    pub fn pixel(&self) -> (i32, i32) {
        let round = |v: i32| ((v as i64 + (SUBPIXEL_SCALE as i64 >> 1)) >> SUBPIXEL_BITS) as i32;
        (round(self.x), round(self.y))
    }
}

/// Unit normal of the triangle `(a, b, c)`, or zero for a degenerate triangle.
#[inline]
pub fn triangle_normal(a: Vec3, b: Vec3, c: Vec3) -> Vec3 {
    (b - a).cross(c - a).normalize_or_zero()
}
