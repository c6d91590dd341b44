/// End-to-end frame rendering tests.
use blockgrid_renderer::rendering::texture::{pack_rgb, unpack_rgb};
use blockgrid_renderer::*;
use glam::{IVec3, Vec3};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::HashMap;

const WIDTH: usize = 96;
const HEIGHT: usize = 72;

fn render(world: &World, camera: &Camera, config: &RenderConfig) -> (Vec<u32>, FrameStats) {
    let mut fb = Framebuffer::new(WIDTH, HEIGHT);
    let stats = render_frame(world, camera, &mut fb, &TextureAtlas::procedural(), config);
    (fb.color_buffer, stats)
}

#[test]
fn test_frame_is_idempotent() {
    let world = World::demo();
    let camera = Camera::looking_at_grid(WIDTH, HEIGHT);
    let config = RenderConfig {
        draw_hud: true,
        ..RenderConfig::default()
    };

    let (first, first_stats) = render(&world, &camera, &config);
    let (second, second_stats) = render(&world, &camera, &config);
    assert_eq!(first, second);
    assert_eq!(first_stats, second_stats);
    assert!(first_stats.cells_drawn > 0);
    assert!(first.iter().any(|c| *c != config.sky_color));
}

#[test]
fn test_reused_framebuffer_matches_fresh_one() {
    let world = World::demo();
    let camera = Camera::looking_at_grid(WIDTH, HEIGHT);
    let config = RenderConfig::default();
    let atlas = TextureAtlas::procedural();

    let mut fb = Framebuffer::new(WIDTH, HEIGHT);
    render_frame(&World::generate_terrain(3), &camera, &mut fb, &atlas, &config);
    render_frame(&world, &camera, &mut fb, &atlas, &config);

    let (fresh, _) = render(&world, &camera, &config);
    assert_eq!(fb.color_buffer, fresh);
}

#[test]
fn test_crosshair_selection_and_highlight() {
    let mut world = World::new();
    world.set(IVec3::new(3, 5, 4), Block::Wool(WoolColor::Black));
    let camera = Camera::looking_at_grid(WIDTH, HEIGHT);

    let (with_overlays, stats) = render(&world, &camera, &RenderConfig::default());
    let selection = stats.selection.unwrap();
    assert_eq!(selection.selected, IVec3::new(3, 5, 4));
    assert_eq!(selection.previous, Some(IVec3::new(3, 5, 3)));

    let (plain, _) = render(&world, &camera, &RenderConfig::without_overlays());
    assert_ne!(with_overlays, plain);
}

#[test]
fn test_random_viewpoints_render_safely() {
    let mut rng = ChaCha8Rng::seed_from_u64(2024);
    let world = World::demo();
    let config = RenderConfig {
        draw_hud: true,
        ..RenderConfig::default()
    };

    for _ in 0..12 {
        let camera = Camera::new(
            Vec3::new(
                rng.gen_range(-8.0..24.0),
                rng.gen_range(-4.0..20.0),
                rng.gen_range(-8.0..24.0),
            ),
            Vec3::new(
                rng.gen_range(-1.5..1.5),
                rng.gen_range(-3.2..3.2),
                rng.gen_range(-0.5..0.5),
            ),
            rng.gen_range(40.0..120.0),
            Camera::aspect_for(WIDTH, HEIGHT),
            0.1,
            100.0,
        )
        .unwrap();
        let (image, stats) = render(&world, &camera, &config);
        assert_eq!(image.len(), WIDTH * HEIGHT);
        assert_eq!(stats.cells_visited, 16 * 16 * 16);
    }
}

#[test]
fn test_published_edits_reach_the_next_frame() {
    let mut buffers = WorldBuffers::new(World::new());
    let camera = Camera::looking_at_grid(WIDTH, HEIGHT);
    let config = RenderConfig::without_overlays();

    let (empty, _) = render(&buffers.current(), &camera, &config);

    buffers.next_mut().set(IVec3::new(3, 5, 2), Block::RedstoneBlock);
    let (unpublished, _) = render(&buffers.current(), &camera, &config);
    assert_eq!(empty, unpublished);

    assert!(buffers.publish());
    assert_eq!(buffers.generation(), 1);
    let (published, stats) = render(&buffers.current(), &camera, &config);
    assert_ne!(empty, published);
    assert_eq!(stats.cells_drawn, 1);

    // Nothing pending: publishing again is a no-op.
    assert!(!buffers.publish());
    assert_eq!(buffers.generation(), 1);
}

#[test]
fn test_sink_gets_every_frame() {
    let world = World::demo();
    let camera = Camera::looking_at_grid(WIDTH, HEIGHT);
    let mut fb = Framebuffer::new(WIDTH, HEIGHT);
    let atlas = TextureAtlas::procedural();

    let mut frames = 0;
    let mut sink = |color: &[u32], w: usize, h: usize| {
        assert_eq!(color.len(), w * h);
        frames += 1;
    };
    for _ in 0..3 {
        render_once(&world, &camera, &mut fb, &atlas, &RenderConfig::default(), &mut sink);
    }
    assert_eq!(frames, 3);
}

/// A long floor seen at a grazing angle: the texel under a pixel must match
/// the texel at the point where that pixel's ray meets the floor.
#[test]
fn test_oblique_floor_texture_matches_ray_hit() {
    const SIZE: usize = 128;
    const TEX: usize = 64;

    // Red encodes the texel column, green the texel row.
    let pixels = (0..TEX * TEX)
        .map(|i| pack_rgb(((i % TEX) * 4) as u8, ((i / TEX) * 4) as u8, 0))
        .collect();
    let atlas = TextureAtlas::from_image(TEX, TEX, pixels, HashMap::new()).unwrap();

    let floor = Cuboid::axis_aligned(
        Vec3::new(-4.0, -1.0, 0.0),
        Vec3::new(4.0, 0.0, 40.0),
        [255, 255, 255],
        FaceUvs::single(AtlasRegion::FULL),
    );
    let camera = Camera::new(Vec3::new(0.0, 1.0, -1.0), Vec3::ZERO, 90.0, 1.0, 0.1, 100.0).unwrap();
    let unlit = ShadingConfig {
        base_intensity: 1.0,
        ..ShadingConfig::default()
    };
    let top: FaceSet = std::iter::once(Face::Top).collect();

    let texel_at = |perspective_correct: bool, px: usize, py: usize| {
        let mut fb = Framebuffer::new(SIZE, SIZE);
        fb.clear(0);
        draw_cuboid(
            &Rasterizer::new(perspective_correct),
            &floor,
            &camera,
            &mut fb,
            &atlas,
            top,
            &unlit,
        );
        let [r, g, _] = unpack_rgb(fb.pixel(px, py));
        (r as f32 / 4.0, g as f32 / 4.0)
    };

    let (px, py) = (64, 96);
    let ray = camera.screen_ray(px as f32, py as f32, SIZE, SIZE);
    let t = -camera.position.y / ray.y;
    let hit = camera.position + ray * t;
    // Top face: u grows with x, v shrinks with z.
    let expected_u = (hit.x + 4.0) / 8.0 * TEX as f32;
    let expected_v = (1.0 - hit.z / 40.0) * TEX as f32;

    let (u, v) = texel_at(true, px, py);
    assert!((u - expected_u).abs() <= 2.0, "u {u} vs {expected_u}");
    assert!((v - expected_v).abs() <= 2.0, "v {v} vs {expected_v}");

    let (_, affine_v) = texel_at(false, px, py);
    assert!((affine_v - expected_v).abs() > 10.0, "affine v {affine_v}");
}
