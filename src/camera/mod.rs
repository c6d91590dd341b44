/// Camera with hand-written view transform and perspective projection.
///
/// Camera space: +X right, +Y up, +Z forward (into the screen). Rotation
/// is `(pitch, yaw, roll)` in radians. The camera's orientation rotates a
/// camera-space direction into the world with [`RotateExt::rotate_euler`];
/// world points are brought into camera space with the exact inverse.
/// Both the projection path and the depth-only path go through
/// [`Camera::to_camera_space`], so they always agree.
use crate::error::{Error, Result};
use crate::geometry::{PixelPoint, RotateExt};
use glam::{Vec2, Vec3};

#[derive(Clone, Debug, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    /// (pitch, yaw, roll) in radians
    pub rotation: Vec3,
    /// Vertical field of view in degrees
    pub fov: f32,
    /// `height / width`; multiplies the horizontal NDC coordinate
    pub aspect_ratio: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    pub fn new(
        position: Vec3,
        rotation: Vec3,
        fov: f32,
        aspect_ratio: f32,
        near: f32,
        far: f32,
    ) -> Result<Self> {
        let camera = Self {
            position,
            rotation,
            fov,
            aspect_ratio,
            near,
            far,
        };
        camera.validate()?;
        Ok(camera)
    }

    /// Default pose looking into the 16x16x16 grid from its front side.
    pub fn looking_at_grid(width: usize, height: usize) -> Self {
        Self {
            position: Vec3::new(3.5, 5.5, -4.0),
            rotation: Vec3::ZERO,
            fov: 90.0,
            aspect_ratio: Self::aspect_for(width, height),
            near: 0.1,
            far: 100.0,
        }
    }

    /// Aspect factor for an image of the given size.
    #[inline]
    pub fn aspect_for(width: usize, height: usize) -> f32 {
        if width == 0 {
            1.0
        } else {
            height as f32 / width as f32
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.near > 0.0) {
            return Err(Error::InvalidCamera(format!(
                "near plane must be positive, got {}",
                self.near
            )));
        }
        if !(self.far > self.near) {
            return Err(Error::InvalidCamera(format!(
                "far plane ({}) must lie beyond near plane ({})",
                self.far, self.near
            )));
        }
        if !(self.fov > 0.0 && self.fov < 180.0) {
            return Err(Error::InvalidCamera(format!(
                "field of view must be in (0, 180) degrees, got {}",
                self.fov
            )));
        }
        if !(self.aspect_ratio > 0.0) {
            return Err(Error::InvalidCamera(format!(
                "aspect ratio must be positive, got {}",
                self.aspect_ratio
            )));
        }
        Ok(())
    }

    /// Translate and rotate a world point into camera space.
    #[inline]
    pub fn to_camera_space(&self, point: Vec3) -> Vec3 {
        (point - self.position).rotate_euler_inverse(self.rotation)
    }

    /// Rotate a camera-space direction into world space.
    #[inline]
    pub fn to_world_direction(&self, direction: Vec3) -> Vec3 {
        direction.rotate_euler(self.rotation)
    }

    #[inline]
    fn focal_scale(&self) -> f32 {
        1.0 / (self.fov.to_radians() * 0.5).tan()
    }

    #[inline]
    fn depth_scale(&self) -> f32 {
        self.far / (self.far - self.near)
    }

    /// Scaled depth of a world point, or `None` when it lies in front of the
    /// near plane.
    pub fn depth_of(&self, point: Vec3) -> Option<f32> {
        let cam = self.to_camera_space(point);
        (cam.z >= self.near).then(|| cam.z * self.depth_scale())
    }

    /// Project a world point to normalized device coordinates plus depth.
    /// Points closer than the near plane (including anything behind the
    /// viewer) have no projection.
    pub fn project_to_ndc(&self, point: Vec3) -> Option<(Vec2, f32)> {
        let cam = self.to_camera_space(point);
        if !(cam.z >= self.near) {
            return None;
        }

        let focal = self.focal_scale();
        let ndc = Vec2::new(
            cam.x * focal * self.aspect_ratio / cam.z,
            cam.y * focal / cam.z,
        );
        if !ndc.is_finite() {
            return None;
        }
        Some((ndc, cam.z * self.depth_scale()))
    }

    /// Map a world point to sub-pixel screen coordinates and depth for a
    /// `width` x `height` image. Texture coordinates are left at zero.
    pub fn world_to_screen(&self, point: Vec3, width: usize, height: usize) -> Option<PixelPoint> {
        let (ndc, depth) = self.project_to_ndc(point)?;
        let screen = ndc_to_screen(ndc, width, height);
        Some(PixelPoint::from_screen(screen.x, screen.y, depth))
    }

    /// World-space direction of the ray through the centre of pixel `(px, py)`.
    pub fn screen_ray(&self, px: f32, py: f32, width: usize, height: usize) -> Vec3 {
        let half_w = (width.max(1) as f32) * 0.5;
        let half_h = (height.max(1) as f32) * 0.5;
        let ndc_x = (px + 0.5 - half_w) / half_w;
        let ndc_y = -(py + 0.5 - half_h) / half_h;

        let focal = self.focal_scale();
        let local = Vec3::new(ndc_x / (focal * self.aspect_ratio), ndc_y / focal, 1.0);
        self.to_world_direction(local).normalize_or_zero()
    }

    pub fn forward(&self) -> Vec3 {
        self.to_world_direction(Vec3::Z)
    }

    pub fn right(&self) -> Vec3 {
        self.to_world_direction(Vec3::X)
    }

    /// Mouse-look update. Positive `delta_y` (mouse moving down) looks down.
    pub fn rotate(&mut self, delta_yaw: f32, delta_pitch: f32) {
        self.rotation.y += delta_yaw;
        self.rotation.x += delta_pitch;

        const MAX_PITCH: f32 = std::f32::consts::FRAC_PI_2 - 0.01;
        self.rotation.x = self.rotation.x.clamp(-MAX_PITCH, MAX_PITCH);
    }

    /// Move in the horizontal plane relative to the current heading.
    pub fn move_local(&mut self, forward: f32, right: f32, up: f32, distance: f32) {
        let heading = Vec3::Z.rotate_y(self.rotation.y);
        let side = Vec3::X.rotate_y(self.rotation.y);
        let move_vec = heading * forward + side * right + Vec3::Y * up;
        self.position += move_vec * distance;
    }

    pub fn set_aspect_ratio(&mut self, width: usize, height: usize) {
        self.aspect_ratio = Self::aspect_for(width, height);
    }
}

/// Viewport mapping: NDC `[-1, 1]` to continuous screen coordinates, y
/// flipped so rows grow downwards. NDC `-1` lands on the left/top image
/// border and `1` on the right/bottom one.
///
/// No rounding happens here. Triangles keep the sub-pixel position through
/// [`PixelPoint::from_screen`]; integer consumers such as the wireframe
/// round to the nearest pixel boundary with [`PixelPoint::pixel`].
#[inline]
pub fn ndc_to_screen(ndc: Vec2, width: usize, height: usize) -> Vec2 {
    let half_w = width as f32 * 0.5;
    let half_h = height as f32 * 0.5;
    Vec2::new(ndc.x * half_w + half_w, -ndc.y * half_h + half_h)
}

/// Held-key state for FPS-style movement.
#[derive(Clone, Debug)]
pub struct CameraController {
    pub forward_pressed: bool,
    pub backward_pressed: bool,
    pub left_pressed: bool,
    pub right_pressed: bool,
    pub up_pressed: bool,
    pub down_pressed: bool,
    /// Units per second
    pub move_speed: f32,
    /// Radians per pixel of mouse motion
    pub mouse_sensitivity: f32,
}

impl Default for CameraController {
    fn default() -> Self {
        Self {
            forward_pressed: false,
            backward_pressed: false,
            left_pressed: false,
            right_pressed: false,
            up_pressed: false,
            down_pressed: false,
            move_speed: 4.0,
            mouse_sensitivity: 0.003,
        }
    }
}

impl CameraController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mouse_moved(&self, camera: &mut Camera, delta_x: f32, delta_y: f32) {
        camera.rotate(
            delta_x * self.mouse_sensitivity,
            delta_y * self.mouse_sensitivity,
        );
    }

    /// Update camera based on controller state
    pub fn update_camera(&self, camera: &mut Camera, dt: f32) {
        let axis = |positive: bool, negative: bool| match (positive, negative) {
            (true, false) => 1.0,
            (false, true) => -1.0,
            _ => 0.0,
        };

        let forward = axis(self.forward_pressed, self.backward_pressed);
        let right = axis(self.right_pressed, self.left_pressed);
        let up = axis(self.up_pressed, self.down_pressed);

        camera.move_local(forward, right, up, self.move_speed * dt);
    }
}
