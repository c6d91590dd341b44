/// Software rasterizer using scanline algorithm
///
/// Triangles are split at the middle vertex into a flat-bottom and a
/// flat-top half and filled row by row. Pixels are sampled at their centres
/// with half-open spans: a pixel belongs to a triangle when its centre lies
/// inside, or on a left/top edge. Vertices carry sub-pixel fixed-point
/// positions and span bounds are computed exactly from them, so two
/// triangles sharing an edge never both cover a pixel and never leave a gap
/// between them.
///
/// Depth is `1 / (1/z)` with `1/z` interpolated in `f64` without clamping.
/// It is the exact depth of the plane through the three vertices, so two
/// faces meeting at an edge compare by geometry rather than by which one
/// was drawn first. Sample centres lying exactly on a left or top edge are
/// evaluated a hair inside the triangle, which breaks the tie between a
/// face and the hidden face folded against it.
use super::framebuffer::Framebuffer;
use super::shading::shade;
use super::texture::TextureAtlas;
use crate::geometry::{PixelPoint, SUBPIXEL_SCALE};

/// Vertices at or in front of this depth are rejected.
const MIN_DEPTH: f32 = 1e-6;

const SCALE: i128 = SUBPIXEL_SCALE as i128;
const HALF: i128 = SCALE / 2;

/// How far inside the triangle, in sub-pixel units, a centre that lies
/// exactly on a left or top edge is evaluated.
const EDGE_NUDGE: f64 = 1.0 / 16.0;

/// Per-vertex attributes interpolated across the triangle. Positions are
/// in sub-pixel units.
#[derive(Copy, Clone, Debug)]
struct SpanVertex {
    x: f64,
    y: f64,
    inv_z: f64,
    u_over_w: f64,
    v_over_w: f64,
    inv_w: f64,
}

impl SpanVertex {
    #[inline]
    fn lerp(a: &SpanVertex, b: &SpanVertex, t: f64) -> SpanVertex {
        SpanVertex {
            x: a.x + (b.x - a.x) * t,
            y: a.y + (b.y - a.y) * t,
            inv_z: a.inv_z + (b.inv_z - a.inv_z) * t,
            u_over_w: a.u_over_w + (b.u_over_w - a.u_over_w) * t,
            v_over_w: a.v_over_w + (b.v_over_w - a.v_over_w) * t,
            inv_w: a.inv_w + (b.inv_w - a.inv_w) * t,
        }
    }

    /// Attributes where the line through `a` and `b` crosses the horizontal
    /// line `y`. Endpoints are taken in (y, x) order, so both triangles on
    /// a shared edge compute the same values.
    #[inline]
    fn on_edge(a: &SpanVertex, b: &SpanVertex, y: f64) -> SpanVertex {
        let (a, b) = if (a.y, a.x) <= (b.y, b.x) { (a, b) } else { (b, a) };
        let dy = b.y - a.y;
        let t = if dy != 0.0 { (y - a.y) / dy } else { 0.0 };
        SpanVertex::lerp(a, b, t)
    }
}

/// Screen-space edge with fixed-point endpoints, used for exact coverage.
/// Endpoints are stored in (y, x) order.
#[derive(Copy, Clone, Debug)]
struct Edge {
    x0: i128,
    y0: i128,
    x1: i128,
    y1: i128,
}

impl Edge {
    fn new(a: &PixelPoint, b: &PixelPoint) -> Self {
        let (a, b) = if (a.y, a.x) <= (b.y, b.x) { (a, b) } else { (b, a) };
        Self {
            x0: a.x as i128,
            y0: a.y as i128,
            x1: b.x as i128,
            y1: b.y as i128,
        }
    }

    /// First column whose centre lies at or right of this edge on `row`,
    /// and whether that centre lies exactly on the edge. Evaluated without
    /// rounding error.
    #[inline]
    fn first_column(&self, row: i128) -> (i128, bool) {
        let dy = self.y1 - self.y0;
        if dy == 0 {
            return (div_ceil(self.x0.min(self.x1) - HALF, SCALE), false);
        }
        // Centre column c satisfies c * S + S/2 >= x0 + dx * (yc - y0) / dy.
        let yc = row * SCALE + HALF;
        let num = self.x0 * dy + (self.x1 - self.x0) * (yc - self.y0) - HALF * dy;
        let den = SCALE * dy;
        let q = num.div_euclid(den);
        if num.rem_euclid(den) == 0 {
            (q, true)
        } else {
            (q + 1, false)
        }
    }
}

#[inline]
fn div_ceil(num: i128, den: i128) -> i128 {
    let q = num.div_euclid(den);
    if num.rem_euclid(den) == 0 {
        q
    } else {
        q + 1
    }
}

/// First pixel row whose centre lies at or below the sub-pixel line `y`.
#[inline]
fn first_row(y: i32) -> i128 {
    div_ceil(y as i128 - HALF, SCALE)
}

pub struct Rasterizer {
    /// Interpolate `u/w`, `v/w` and `1/w` instead of `u`, `v` directly.
    pub perspective_correct: bool,
}

impl Default for Rasterizer {
    fn default() -> Self {
        Self {
            perspective_correct: true,
        }
    }
}

impl Rasterizer {
    pub fn new(perspective_correct: bool) -> Self {
        Self {
            perspective_correct,
        }
    }

    /// Turn a projected point whose `u`/`v` are atlas pixel coordinates
    /// into a rasterizer vertex. With perspective correction enabled the
    /// texture coordinates are divided by depth here and recovered per
    /// pixel.
    #[inline]
    pub fn prepare_vertex(&self, point: PixelPoint) -> PixelPoint {
        if self.perspective_correct && point.depth > MIN_DEPTH {
            point.with_uv(point.u / point.depth, point.v / point.depth)
        } else {
            point
        }
    }

    #[inline]
    fn span_vertex(&self, p: &PixelPoint) -> Option<SpanVertex> {
        if !(p.depth > MIN_DEPTH) || !p.depth.is_finite() {
            return None;
        }
        let inv_z = 1.0 / p.depth as f64;
        let inv_w = if self.perspective_correct { inv_z } else { 1.0 };
        Some(SpanVertex {
            x: p.x as f64,
            y: p.y as f64,
            inv_z,
            u_over_w: p.u as f64,
            v_over_w: p.v as f64,
            inv_w,
        })
    }

    /// Fill one textured triangle into `fb`, depth-tested against its depth
    /// buffer. `intensity` scales the sampled texel. Returns the number of
    /// pixels written.
    pub fn fill_triangle(
        &self,
        fb: &mut Framebuffer,
        atlas: &TextureAtlas,
        v0: PixelPoint,
        v1: PixelPoint,
        v2: PixelPoint,
        intensity: f32,
    ) -> usize {
        if fb.width == 0 || fb.height == 0 {
            return 0;
        }

        let mut pts = [v0, v1, v2];
        pts.sort_by_key(|p| (p.y, p.x));
        let [p0, p1, p2] = pts;

        // Zero height: nothing has a pixel centre inside.
        if p0.y == p2.y {
            return 0;
        }

        // Which side of the long edge p0 -> p2 the middle vertex lies on.
        let cross = (p2.x as i128 - p0.x as i128) * (p1.y as i128 - p0.y as i128)
            - (p2.y as i128 - p0.y as i128) * (p1.x as i128 - p0.x as i128);
        if cross == 0 {
            return 0;
        }
        let middle_on_right = cross < 0;

        let (Some(s0), Some(s1), Some(s2)) = (
            self.span_vertex(&p0),
            self.span_vertex(&p1),
            self.span_vertex(&p2),
        ) else {
            return 0;
        };

        // Fourth vertex on the long edge at the middle vertex's row.
        let split = SpanVertex::on_edge(&s0, &s2, s1.y);

        let long = Edge::new(&p0, &p2);
        let top = p0.y as f64;
        let mut written = 0;

        // Flat-bottom half: apex p0, base p1/split.
        written += self.fill_half(
            fb,
            atlas,
            intensity,
            (first_row(p0.y), first_row(p1.y), top),
            (Edge::new(&p0, &p1), (s0, s1)),
            (long, (s0, split)),
            middle_on_right,
        );

        // Flat-top half: base p1/split, apex p2.
        written += self.fill_half(
            fb,
            atlas,
            intensity,
            (first_row(p1.y), first_row(p2.y), top),
            (Edge::new(&p1, &p2), (s1, s2)),
            (long, (split, s2)),
            middle_on_right,
        );

        written
    }

    /// Fill rows `[rows.0, rows.1)` between a short edge and the long edge.
    /// `rows.2` is the triangle's top in sub-pixel units.
    #[allow(clippy::too_many_arguments)]
    fn fill_half(
        &self,
        fb: &mut Framebuffer,
        atlas: &TextureAtlas,
        intensity: f32,
        rows: (i128, i128, f64),
        short: (Edge, (SpanVertex, SpanVertex)),
        long: (Edge, (SpanVertex, SpanVertex)),
        short_on_right: bool,
    ) -> usize {
        let row_start = rows.0.max(0);
        let row_end = rows.1.min(fb.height as i128);
        if row_start >= row_end {
            return 0;
        }

        let (left, right) = if short_on_right {
            (long, short)
        } else {
            (short, long)
        };
        let (left_edge, (la, lb)) = left;
        let (right_edge, (ra, rb)) = right;

        let mut written = 0;
        for row in row_start..row_end {
            let (first, on_left_edge) = left_edge.first_column(row);
            let (last, _) = right_edge.first_column(row);
            let col_start = first.max(0);
            let col_end = last.min(fb.width as i128);
            if col_start >= col_end {
                continue;
            }

            let mut yc = (row * SCALE + HALF) as f64;
            if yc == rows.2 {
                yc += EDGE_NUDGE;
            }
            let l = SpanVertex::on_edge(&la, &lb, yc);
            let r = SpanVertex::on_edge(&ra, &rb, yc);
            let span = r.x - l.x;

            for col in col_start..col_end {
                let mut xc = (col * SCALE + HALF) as f64;
                if on_left_edge && col == first {
                    xc += EDGE_NUDGE;
                }
                let s = if span != 0.0 { (xc - l.x) / span } else { 0.0 };

                let inv_z = l.inv_z + (r.inv_z - l.inv_z) * s;
                if !(inv_z > 0.0) {
                    continue;
                }
                let depth = 1.0 / inv_z;
                let (x, y) = (col as usize, row as usize);
                if !fb.depth_passes(x, y, depth) {
                    continue;
                }

                let inv_w = l.inv_w + (r.inv_w - l.inv_w) * s;
                if !(inv_w > 0.0) {
                    continue;
                }
                let u = (l.u_over_w + (r.u_over_w - l.u_over_w) * s) / inv_w;
                let v = (l.v_over_w + (r.v_over_w - l.v_over_w) * s) / inv_w;

                let color = shade(atlas.sample(u as f32, v as f32), intensity);
                if fb.test_and_set(x, y, depth, color) {
                    written += 1;
                }
            }
        }
        written
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rendering::texture::pack_rgb;
    use std::collections::HashMap;

    fn white_atlas() -> TextureAtlas {
        TextureAtlas::from_image(1, 1, vec![pack_rgb(255, 255, 255)], HashMap::new()).unwrap()
    }

    fn pt(x: i32, y: i32, depth: f32) -> PixelPoint {
        PixelPoint::new(x, y, depth, 0.0, 0.0)
    }

    #[test]
    fn edge_column_is_direction_independent() {
        let a = pt(3, 1, 1.0);
        let b = pt(17, 29, 1.0);
        for row in -5..40 {
            assert_eq!(
                Edge::new(&a, &b).first_column(row),
                Edge::new(&b, &a).first_column(row)
            );
        }
    }

    #[test]
    fn right_triangle_covers_half_square() {
        let mut fb = Framebuffer::new(16, 16);
        let raster = Rasterizer::default();
        let n = raster.fill_triangle(&mut fb, &white_atlas(), pt(0, 0, 1.0), pt(8, 0, 1.0), pt(0, 8, 1.0), 1.0);
        // Centres on the hypotenuse belong to the right edge and are excluded:
        // rows 0..8 hold 7, 6, ..., 0 pixels.
        assert_eq!(n, 28);
    }

    #[test]
    fn quad_halves_tile_without_overlap() {
        let mut fb = Framebuffer::new(32, 32);
        let raster = Rasterizer::default();
        let atlas = white_atlas();
        let (a, b, c, d) = (pt(2, 3, 1.0), pt(27, 5, 1.0), pt(25, 30, 1.0), pt(4, 26, 1.0));
        let first = raster.fill_triangle(&mut fb, &atlas, a, b, c, 1.0);
        fb.clear_depth();
        let second = raster.fill_triangle(&mut fb, &atlas, a, c, d, 1.0);

        let mut whole = Framebuffer::new(32, 32);
        let mut covered = 0;
        raster.fill_triangle(&mut whole, &atlas, a, b, c, 1.0);
        raster.fill_triangle(&mut whole, &atlas, a, c, d, 1.0);
        covered += whole.depth_buffer.iter().filter(|d| d.is_finite()).count();

        assert_eq!(first + second, covered);
    }

    #[test]
    fn degenerate_and_invalid_triangles_write_nothing() {
        let mut fb = Framebuffer::new(8, 8);
        let raster = Rasterizer::default();
        let atlas = white_atlas();
        // Collinear
        assert_eq!(raster.fill_triangle(&mut fb, &atlas, pt(0, 0, 1.0), pt(3, 3, 1.0), pt(6, 6, 1.0), 1.0), 0);
        // Zero height
        assert_eq!(raster.fill_triangle(&mut fb, &atlas, pt(0, 2, 1.0), pt(3, 2, 1.0), pt(6, 2, 1.0), 1.0), 0);
        // Zero depth vertex
        assert_eq!(raster.fill_triangle(&mut fb, &atlas, pt(0, 0, 0.0), pt(7, 0, 1.0), pt(0, 7, 1.0), 1.0), 0);
        // NaN depth
        assert_eq!(raster.fill_triangle(&mut fb, &atlas, pt(0, 0, f32::NAN), pt(7, 0, 1.0), pt(0, 7, 1.0), 1.0), 0);
        assert!(fb.depth_buffer.iter().all(|d| *d == f64::INFINITY));
    }

    #[test]
    fn huge_off_screen_triangle_is_clipped() {
        let mut fb = Framebuffer::new(10, 6);
        let raster = Rasterizer::default();
        let n = raster.fill_triangle(
            &mut fb,
            &white_atlas(),
            pt(-1_000_000, -1_000_000, 2.0),
            pt(i32::MAX, -1_000_000, 2.0),
            pt(-1_000_000, i32::MAX, 2.0),
            1.0,
        );
        assert_eq!(n, 60);
    }

    #[test]
    fn prepare_vertex_divides_only_with_perspective() {
        let p = Rasterizer::new(true).prepare_vertex(PixelPoint::new(1, 2, 4.0, 8.0, 12.0));
        assert_eq!((p.u, p.v), (2.0, 3.0));
        let a = Rasterizer::new(false).prepare_vertex(PixelPoint::new(1, 2, 4.0, 8.0, 12.0));
        assert_eq!((a.u, a.v), (8.0, 12.0));
    }

    #[test]
    fn sub_pixel_vertices_move_coverage() {
        // Same right triangle shifted by a quarter pixel: the column of
        // centres that sat on its left edge drops out.
        let shifted = |dx: f32| {
            let mut fb = Framebuffer::new(16, 16);
            let corner = |x: f32, y: f32| PixelPoint::from_screen(x + dx, y, 1.0);
            Rasterizer::default().fill_triangle(
                &mut fb,
                &white_atlas(),
                corner(0.5, 0.0),
                corner(8.5, 0.0),
                corner(0.5, 8.0),
                1.0,
            )
        };
        assert_eq!(shifted(0.0), 28 + 8);
        assert!(shifted(0.25) < shifted(0.0));
    }

    #[test]
    fn centre_on_top_edge_is_covered_once() {
        let raster = Rasterizer::default();
        let atlas = white_atlas();
        // Horizontal edge through the centres of row 3.
        let (a, b) = (PixelPoint::from_screen(0.0, 3.5, 1.0), PixelPoint::from_screen(8.0, 3.5, 1.0));

        let mut above = Framebuffer::new(8, 8);
        let n = raster.fill_triangle(&mut above, &atlas, a, b, PixelPoint::from_screen(4.0, 0.0, 1.0), 1.0);
        assert!(n > 0);
        assert!((0..8).all(|x| !above.depth(x, 3).is_finite()));

        // Row 3 lies on the top edge of the triangle below.
        let mut below = Framebuffer::new(8, 8);
        raster.fill_triangle(&mut below, &atlas, a, b, PixelPoint::from_screen(4.0, 7.0, 1.0), 1.0);
        assert!((0..8).all(|x| below.depth(x, 3).is_finite()));
    }

    /// A face folded behind another along a shared edge, with the edge
    /// running exactly through a column of pixel centres. The folded face
    /// is nearer nowhere, so drawing order must not matter.
    #[test]
    fn folded_face_loses_on_shared_edge() {
        let atlas = white_atlas();
        let raster = Rasterizer::default();
        let a = PixelPoint::from_screen(4.5, 0.0, 2.0);
        let b = PixelPoint::from_screen(4.5, 20.0, 3.0);
        let front = PixelPoint::from_screen(18.0, 10.0, 2.5);
        // Same screen side as `front`, further away.
        let folded = PixelPoint::from_screen(12.0, 12.0, 6.0);

        let render = |order: [(PixelPoint, f32); 2]| {
            let mut fb = Framebuffer::new(24, 24);
            fb.clear(0);
            for (third, light) in order {
                raster.fill_triangle(&mut fb, &atlas, a, b, third, light);
            }
            fb.color_buffer
        };
        let folded_first = render([(folded, 0.5), (front, 1.0)]);
        let front_first = render([(front, 1.0), (folded, 0.5)]);
        assert_eq!(folded_first, front_first);

        let lit = shade(atlas.sample(0.0, 0.0), 1.0);
        let dim = shade(atlas.sample(0.0, 0.0), 0.5);
        assert!(!front_first.contains(&dim));
        // Column 4 sits on the shared edge and is drawn by the front face.
        assert_eq!(front_first[5 * 24 + 4], lit);
    }
}
