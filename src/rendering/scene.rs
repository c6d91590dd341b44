/// Whole-frame rendering: clear, draw every occupied cell, then overlays.
///
/// Every opaque write is depth-tested, so cells are drawn in plain scan
/// order; no back-to-front sort is needed.
use super::cuboid::{draw_cuboid, draw_cuboid_wireframe, visible_faces, CuboidStats};
use super::framebuffer::Framebuffer;
use super::hud;
use super::rasterizer::Rasterizer;
use super::shading::ShadingConfig;
use super::texture::{pack_rgb, TextureAtlas};
use crate::camera::Camera;
use crate::geometry::{Cuboid, FaceSet, FaceUvs};
use crate::perf::PerfTimer;
use crate::raycast::{pick_from_camera, Selection};
use crate::world::BlockSource;
use glam::IVec3;

/// Order in which grid cells are submitted to the rasterizer. The finished
/// image is the same either way.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum ScanOrder {
    /// z, then y, then x, each ascending
    #[default]
    Forward,
    /// Exact reverse of `Forward`, including the cuboids inside a cell
    Reverse,
}

/// Per-frame rendering options.
#[derive(Clone, Debug)]
pub struct RenderConfig {
    /// ARGB clear colour
    pub sky_color: u32,
    /// Skip faces hidden between two opaque neighbours. Never changes the
    /// image, only the amount of work.
    pub occlusion_culling: bool,
    pub scan_order: ScanOrder,
    pub perspective_correct: bool,
    pub shading: ShadingConfig,
    /// Outline the block under the crosshair
    pub draw_highlight: bool,
    pub highlight_color: u32,
    /// How far the outline sits outside the block, in blocks
    pub highlight_margin: f32,
    pub draw_crosshair: bool,
    /// Crosshair half-length in pixels
    pub crosshair_arm: i32,
    pub draw_hud: bool,
    pub hud_color: u32,
    pub hud_scale: i32,
    /// Maximum pick distance in blocks
    pub pick_distance: f32,
    /// Log per-stage timings and frame counters at debug level
    pub profile: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            sky_color: pack_rgb(135, 190, 235),
            occlusion_culling: true,
            scan_order: ScanOrder::Forward,
            perspective_correct: true,
            shading: ShadingConfig::default(),
            draw_highlight: true,
            highlight_color: pack_rgb(20, 20, 20),
            highlight_margin: 0.002,
            draw_crosshair: true,
            crosshair_arm: 6,
            draw_hud: false,
            hud_color: pack_rgb(255, 255, 255),
            hud_scale: 2,
            pick_distance: 64.0,
            profile: false,
        }
    }
}

impl RenderConfig {
    /// Geometry only: no highlight, crosshair or HUD.
    pub fn without_overlays() -> Self {
        Self {
            draw_highlight: false,
            draw_crosshair: false,
            draw_hud: false,
            ..Self::default()
        }
    }
}

/// Counters collected while rendering one frame.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct FrameStats {
    pub cells_visited: usize,
    /// Cells that produced at least one cuboid
    pub cells_drawn: usize,
    pub faces_skipped_by_occlusion: usize,
    pub cuboids: CuboidStats,
    pub selection: Option<Selection>,
}

/// Receives finished frames, e.g. a window surface.
pub trait FrameSink {
    fn deliver(&mut self, color: &[u32], width: usize, height: usize);
}

impl<F: FnMut(&[u32], usize, usize)> FrameSink for F {
    fn deliver(&mut self, color: &[u32], width: usize, height: usize) {
        self(color, width, height)
    }
}

/// Render the full frame into `fb`: geometry, then highlight, crosshair and
/// HUD as enabled in `config`.
pub fn render_frame<W: BlockSource + ?Sized>(
    world: &W,
    camera: &Camera,
    fb: &mut Framebuffer,
    atlas: &TextureAtlas,
    config: &RenderConfig,
) -> FrameStats {
    let _frame_timer = PerfTimer::when("render_frame", config.profile);
    let mut stats = FrameStats::default();

    fb.clear(config.sky_color);

    {
        let _t = PerfTimer::when("draw_cells", config.profile);
        draw_cells(world, camera, fb, atlas, config, &mut stats);
    }

    {
        let _t = PerfTimer::when("pick", config.profile);
        stats.selection = pick_from_camera(world, camera, config.pick_distance);
    }

    if config.draw_highlight {
        if let Some(selection) = stats.selection {
            let outline = Cuboid::unit([0, 0, 0], FaceUvs::default())
                .translated(selection.selected.as_vec3())
                .expanded(config.highlight_margin);
            draw_cuboid_wireframe(&outline, camera, fb, config.highlight_color);
        }
    }

    if config.draw_crosshair {
        hud::draw_crosshair(fb, config.crosshair_arm);
    }

    if config.draw_hud {
        let lines = hud_lines(world, camera, &stats);
        hud::draw_text_block(fb, &lines, config.hud_color, pack_rgb(0, 0, 0), config.hud_scale);
    }

    if config.profile {
        log::debug!(
            "frame: {} cells drawn, {} faces culled, {} triangles ({} back-facing), {} pixels",
            stats.cells_drawn,
            stats.faces_skipped_by_occlusion,
            stats.cuboids.triangles_drawn,
            stats.cuboids.triangles_backfacing,
            stats.cuboids.pixels_written
        );
    }

    stats
}

fn draw_cells<W: BlockSource + ?Sized>(
    world: &W,
    camera: &Camera,
    fb: &mut Framebuffer,
    atlas: &TextureAtlas,
    config: &RenderConfig,
    stats: &mut FrameStats,
) {
    let rasterizer = Rasterizer::new(config.perspective_correct);
    let extent = world.extent();
    let count = (extent.x * extent.y * extent.z).max(0);

    for i in 0..count {
        let i = match config.scan_order {
            ScanOrder::Forward => i,
            ScanOrder::Reverse => count - 1 - i,
        };
        let cell = IVec3::new(i % extent.x, (i / extent.x) % extent.y, i / (extent.x * extent.y));
        stats.cells_visited += 1;

        let mut geometry = world.cell_geometry(cell, atlas);
        if geometry.is_empty() {
            continue;
        }

        let faces = if config.occlusion_culling {
            visible_faces(world, cell)
        } else {
            FaceSet::ALL
        };
        stats.faces_skipped_by_occlusion += 6 - faces.len();
        if faces.is_empty() {
            continue;
        }

        if config.scan_order == ScanOrder::Reverse {
            geometry.reverse();
        }
        let offset = cell.as_vec3();
        for prototype in geometry {
            let cuboid = prototype.translated(offset);
            stats.cuboids += draw_cuboid(&rasterizer, &cuboid, camera, fb, atlas, faces, &config.shading);
        }
        stats.cells_drawn += 1;
    }
}

fn hud_lines<W: BlockSource + ?Sized>(world: &W, camera: &Camera, stats: &FrameStats) -> Vec<String> {
    let p = camera.position;
    let mut lines = vec![
        format!("POS {:.1} {:.1} {:.1}", p.x, p.y, p.z),
        format!(
            "TRIS {} PX {}",
            stats.cuboids.triangles_drawn, stats.cuboids.pixels_written
        ),
    ];
    if let Some(selection) = stats.selection {
        let c = selection.selected;
        let name = world.describe(c).unwrap_or_default();
        lines.push(format!("SEL {} {} {} {}", c.x, c.y, c.z, name));
    }
    lines
}

/// Render one frame and hand it to `sink`.
pub fn render_once<W: BlockSource + ?Sized, S: FrameSink + ?Sized>(
    world: &W,
    camera: &Camera,
    fb: &mut Framebuffer,
    atlas: &TextureAtlas,
    config: &RenderConfig,
    sink: &mut S,
) -> FrameStats {
    let stats = render_frame(world, camera, fb, atlas, config);
    sink.deliver(&fb.color_buffer, fb.width, fb.height);
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{Block, World, WoolColor};

    #[test]
    fn empty_world_is_all_sky() {
        let world = World::new();
        let camera = Camera::looking_at_grid(32, 24);
        let mut fb = Framebuffer::new(32, 24);
        let config = RenderConfig::without_overlays();
        let stats = render_frame(&world, &camera, &mut fb, &TextureAtlas::procedural(), &config);

        assert!(fb.color_buffer.iter().all(|c| *c == config.sky_color));
        assert_eq!(stats.cells_visited, 16 * 16 * 16);
        assert_eq!(stats.cells_drawn, 0);
        assert_eq!(stats.selection, None);
    }

    #[test]
    fn sink_receives_the_rendered_frame() {
        let mut world = World::new();
        world.set(IVec3::new(3, 5, 2), Block::Wool(WoolColor::Red));
        let camera = Camera::looking_at_grid(40, 30);
        let mut fb = Framebuffer::new(40, 30);

        let mut delivered = Vec::new();
        let mut sink = |color: &[u32], w: usize, h: usize| {
            assert_eq!((w, h), (40, 30));
            delivered = color.to_vec();
        };
        render_once(
            &world,
            &camera,
            &mut fb,
            &TextureAtlas::procedural(),
            &RenderConfig::default(),
            &mut sink,
        );
        assert_eq!(delivered, fb.color_buffer);
    }
}
