/// Cuboid renderer: 6 faces -> 12 triangles with back-face rejection,
/// flat per-face shading, and neighbour-based face occlusion.
use super::framebuffer::Framebuffer;
use super::rasterizer::Rasterizer;
use super::shading::ShadingConfig;
use super::texture::TextureAtlas;
use crate::camera::Camera;
use crate::geometry::{triangle_normal, Cuboid, Face, FaceSet, PixelPoint, CUBOID_EDGES};
use crate::world::BlockSource;
use glam::IVec3;
use std::ops::AddAssign;

/// Quad corners -> two triangles sharing the 0-2 diagonal.
const QUAD_TRIANGLES: [[usize; 3]; 2] = [[0, 1, 2], [0, 2, 3]];

/// Work counters for one or more cuboids.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct CuboidStats {
    pub triangles_drawn: usize,
    pub triangles_backfacing: usize,
    /// Triangles with a corner behind the near plane.
    pub triangles_unprojectable: usize,
    /// Zero-area triangles (collapsed corners), in the world or once
    /// snapped to the sub-pixel grid.
    pub triangles_degenerate: usize,
    pub pixels_written: usize,
}

impl AddAssign for CuboidStats {
    fn add_assign(&mut self, other: Self) {
        self.triangles_drawn += other.triangles_drawn;
        self.triangles_backfacing += other.triangles_backfacing;
        self.triangles_unprojectable += other.triangles_unprojectable;
        self.triangles_degenerate += other.triangles_degenerate;
        self.pixels_written += other.pixels_written;
    }
}

/// Rasterize the requested faces of `cuboid`.
///
/// A triangle is drawn only when its outward normal points towards the
/// camera, i.e. `n . (camera - centroid) > 0`, and all its corners project.
/// A face seen almost exactly edge-on can snap to zero or reversed screen
/// area; such triangles are dropped as degenerate rather than drawn
/// inside out. Triangles are never clipped against the near plane, so
/// faces crossing it disappear at extreme angles.
pub fn draw_cuboid(
    rasterizer: &Rasterizer,
    cuboid: &Cuboid,
    camera: &Camera,
    fb: &mut Framebuffer,
    atlas: &TextureAtlas,
    faces: FaceSet,
    shading: &ShadingConfig,
) -> CuboidStats {
    let mut stats = CuboidStats::default();
    let (atlas_w, atlas_h) = (atlas.width as f32, atlas.height as f32);

    for face in faces.iter() {
        let corners = cuboid.face_vertices(face);
        let uvs = cuboid.uvs.face(face);

        // Project the quad's corners once; both triangles share them.
        let projected: [Option<PixelPoint>; 4] = std::array::from_fn(|i| {
            camera
                .world_to_screen(corners[i], fb.width, fb.height)
                .map(|p| rasterizer.prepare_vertex(p.with_uv(uvs[i].x * atlas_w, uvs[i].y * atlas_h)))
        });

        for [a, b, c] in QUAD_TRIANGLES {
            let normal = triangle_normal(corners[a], corners[b], corners[c]);
            if normal == glam::Vec3::ZERO {
                stats.triangles_degenerate += 1;
                continue;
            }

            let centroid = (corners[a] + corners[b] + corners[c]) / 3.0;
            if normal.dot(camera.position - centroid) <= 0.0 {
                stats.triangles_backfacing += 1;
                continue;
            }

            let (Some(p0), Some(p1), Some(p2)) = (projected[a], projected[b], projected[c]) else {
                stats.triangles_unprojectable += 1;
                continue;
            };
            // Facing the camera means positive area with y pointing down.
            if screen_area(&p0, &p1, &p2) <= 0 {
                stats.triangles_degenerate += 1;
                continue;
            }

            let intensity = shading.face_intensity(normal);
            stats.pixels_written += rasterizer.fill_triangle(fb, atlas, p0, p1, p2, intensity);
            stats.triangles_drawn += 1;
        }
    }

    stats
}

/// Twice the signed sub-pixel area of a projected triangle.
#[inline]
fn screen_area(a: &PixelPoint, b: &PixelPoint, c: &PixelPoint) -> i128 {
    let (ax, ay) = (a.x as i128, a.y as i128);
    (b.x as i128 - ax) * (c.y as i128 - ay) - (b.y as i128 - ay) * (c.x as i128 - ax)
}

/// Faces of `cell` that can possibly be seen. A face is dropped when this
/// cell is opaque towards a neighbour that is itself opaque back towards
/// this cell.
pub fn visible_faces<W: BlockSource + ?Sized>(world: &W, cell: IVec3) -> FaceSet {
    Face::ALL
        .into_iter()
        .filter(|face| {
            let direction = face.direction();
            let neighbour = cell + direction.to_ivec3();
            !(world.is_opaque(cell, direction) && world.is_opaque(neighbour, direction.opposite()))
        })
        .collect()
}

/// Outline the 12 edges of `cuboid` without depth testing. Edges with an
/// endpoint behind the near plane are skipped.
pub fn draw_cuboid_wireframe(cuboid: &Cuboid, camera: &Camera, fb: &mut Framebuffer, color: u32) {
    let screen: [Option<PixelPoint>; 8] =
        std::array::from_fn(|i| camera.world_to_screen(cuboid.vertices[i], fb.width, fb.height));

    for (a, b) in CUBOID_EDGES {
        if let (Some(p), Some(q)) = (screen[a], screen[b]) {
            let ((x0, y0), (x1, y1)) = (p.pixel(), q.pixel());
            fb.draw_line(x0, y0, x1, y1, color);
        }
    }
}
