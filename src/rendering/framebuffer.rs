/// Framebuffer for software rendering
/// Stores color and depth information
///
/// Colour and depth live in separate Vecs; the depth buffer holds the
/// smallest depth written so far, reset to `f64::INFINITY` every frame. Depth is kept in `f64` so
/// faces meeting at an edge stay ordered by their true planes.
use crate::error::{Error, Result};

pub struct Framebuffer {
    pub width: usize,
    pub height: usize,
    pub color_buffer: Vec<u32>, // ARGB format
    pub depth_buffer: Vec<f64>,
}

impl Framebuffer {
    pub fn new(width: usize, height: usize) -> Self {
        let pixel_count = width * height;
        Self {
            width,
            height,
            color_buffer: vec![0; pixel_count],
            depth_buffer: vec![f64::INFINITY; pixel_count],
        }
    }

    /// Like [`Framebuffer::new`] but refuses a zero-sized target.
    pub fn try_new(width: usize, height: usize) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::EmptyFramebuffer { width, height });
        }
        Ok(Self::new(width, height))
    }

    /// Clear color and depth buffers
    pub fn clear(&mut self, clear_color: u32) {
        self.color_buffer.fill(clear_color);
        self.clear_depth();
    }

    pub fn clear_depth(&mut self) {
        self.depth_buffer.fill(f64::INFINITY);
    }

    /// Linear index of `(x, y)`.
    ///
    /// Callers clip before indexing, so an out-of-range coordinate is a bug:
    /// it panics in debug builds and is clamped to the nearest edge otherwise.
    #[inline]
    pub fn index(&self, x: usize, y: usize) -> usize {
        debug_assert!(
            x < self.width && y < self.height,
            "pixel ({x}, {y}) outside {}x{} framebuffer",
            self.width,
            self.height
        );
        let x = x.min(self.width.saturating_sub(1));
        let y = y.min(self.height.saturating_sub(1));
        y * self.width + x
    }

    /// Depth-tested write. Passes only when `depth` is strictly nearer than
    /// the stored value.
    #[inline]
    pub fn test_and_set(&mut self, x: usize, y: usize, depth: f64, color: u32) -> bool {
        let index = self.index(x, y);
        if depth < self.depth_buffer[index] {
            self.color_buffer[index] = color;
            self.depth_buffer[index] = depth;
            true
        } else {
            false
        }
    }

    /// Depth test only, without writing. Lets the rasterizer skip texture
    /// sampling for hidden pixels.
    #[inline]
    pub fn depth_passes(&self, x: usize, y: usize, depth: f64) -> bool {
        depth < self.depth_buffer[self.index(x, y)]
    }

    /// Set pixel without depth test (for UI, etc.)
    #[inline]
    pub fn set_pixel_no_depth(&mut self, x: i32, y: i32, color: u32) {
        if self.contains(x, y) {
            let index = y as usize * self.width + x as usize;
            self.color_buffer[index] = color;
        }
    }

    /// Invert the RGB channels of a pixel, keeping alpha.
    #[inline]
    pub fn invert_pixel(&mut self, x: i32, y: i32) {
        if self.contains(x, y) {
            let index = y as usize * self.width + x as usize;
            let c = self.color_buffer[index];
            self.color_buffer[index] = (c & 0xFF00_0000) | (!c & 0x00FF_FFFF);
        }
    }

    #[inline]
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    pub fn pixel(&self, x: usize, y: usize) -> u32 {
        self.color_buffer[self.index(x, y)]
    }

    pub fn depth(&self, x: usize, y: usize) -> f64 {
        self.depth_buffer[self.index(x, y)]
    }

    /// Bresenham line without depth test; off-screen pixels are dropped.
    pub fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: u32) {
        // Far off-screen endpoints would make the walk arbitrarily long.
        let limit = 4 * (self.width + self.height) as i64;
        let span = (x1 as i64 - x0 as i64).abs().max((y1 as i64 - y0 as i64).abs());
        if span > limit {
            if let Some((a, b)) = self.clip_line(x0, y0, x1, y1) {
                self.bresenham(a, b, color);
            }
            return;
        }
        self.bresenham((x0, y0), (x1, y1), color);
    }

    fn bresenham(&mut self, (mut x, mut y): (i32, i32), (x1, y1): (i32, i32), color: u32) {
        let dx = (x1 - x).abs();
        let dy = -(y1 - y).abs();
        let sx = if x < x1 { 1 } else { -1 };
        let sy = if y < y1 { 1 } else { -1 };
        let mut err = dx + dy;

        loop {
            self.set_pixel_no_depth(x, y, color);
            if x == x1 && y == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    // Liang-Barsky against a one-pixel-padded viewport.
    fn clip_line(&self, x0: i32, y0: i32, x1: i32, y1: i32) -> Option<((i32, i32), (i32, i32))> {
        let (x0f, y0f) = (x0 as f64, y0 as f64);
        let dx = x1 as f64 - x0f;
        let dy = y1 as f64 - y0f;
        let (xmin, ymin) = (-1.0, -1.0);
        let (xmax, ymax) = (self.width as f64, self.height as f64);

        let mut t0 = 0.0f64;
        let mut t1 = 1.0f64;
        for (p, q) in [
            (-dx, x0f - xmin),
            (dx, xmax - x0f),
            (-dy, y0f - ymin),
            (dy, ymax - y0f),
        ] {
            if p == 0.0 {
                if q < 0.0 {
                    return None;
                }
                continue;
            }
            let r = q / p;
            if p < 0.0 {
                t0 = t0.max(r);
            } else {
                t1 = t1.min(r);
            }
            if t0 > t1 {
                return None;
            }
        }

        let at = |t: f64| ((x0f + dx * t).round() as i32, (y0f + dy * t).round() as i32);
        Some((at(t0), at(t1)))
    }

    /// Resize framebuffer
    pub fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        let pixel_count = width * height;
        self.color_buffer.resize(pixel_count, 0);
        self.depth_buffer.resize(pixel_count, f64::INFINITY);
    }
}
