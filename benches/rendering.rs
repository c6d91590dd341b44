/// Benchmark suite for rendering pipeline
/// Whole frames over the demo and terrain grids plus the rasterizer and
/// framebuffer hot paths.
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use blockgrid_renderer::{
    render_frame, Camera, Framebuffer, PixelPoint, Rasterizer, RenderConfig, TextureAtlas, World,
};

fn bench_render_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("render_frame");
    let atlas = TextureAtlas::procedural();
    let camera = Camera::looking_at_grid(1280, 720);

    for (name, world) in [("demo", World::demo()), ("terrain", World::generate_terrain(12345))] {
        for occlusion_culling in [true, false] {
            let config = RenderConfig {
                occlusion_culling,
                ..RenderConfig::default()
            };
            let label = if occlusion_culling { "culled" } else { "unculled" };
            group.bench_with_input(BenchmarkId::new(name, label), &world, |b, world| {
                let mut framebuffer = Framebuffer::new(1280, 720);
                b.iter(|| {
                    black_box(render_frame(world, &camera, &mut framebuffer, &atlas, &config));
                });
            });
        }
    }
    group.finish();
}

fn bench_fill_triangle(c: &mut Criterion) {
    let atlas = TextureAtlas::procedural();

    for perspective_correct in [true, false] {
        let name = if perspective_correct {
            "fill_triangle_perspective"
        } else {
            "fill_triangle_affine"
        };
        c.bench_function(name, |b| {
            let rasterizer = Rasterizer::new(perspective_correct);
            let mut framebuffer = Framebuffer::new(1280, 720);
            let v0 = rasterizer.prepare_vertex(PixelPoint::from_screen(100.25, 80.5, 2.0));
            let v1 = rasterizer.prepare_vertex(PixelPoint::from_screen(900.0, 140.75, 6.0).with_uv(16.0, 0.0));
            let v2 = rasterizer.prepare_vertex(PixelPoint::from_screen(300.5, 650.0, 3.0).with_uv(0.0, 16.0));

            b.iter(|| {
                framebuffer.clear_depth();
                black_box(rasterizer.fill_triangle(
                    &mut framebuffer,
                    &atlas,
                    black_box(v0),
                    black_box(v1),
                    black_box(v2),
                    0.8,
                ));
            });
        });
    }
}

fn bench_small_triangles(c: &mut Criterion) {
    c.bench_function("fill_small_triangles", |b| {
        let atlas = TextureAtlas::procedural();
        let rasterizer = Rasterizer::default();
        let mut framebuffer = Framebuffer::new(1280, 720);
        let triangles: Vec<[PixelPoint; 3]> = (0..1000)
            .map(|i| {
                let x = (i * 37) % 1240;
                let y = (i * 53) % 690;
                [
                    PixelPoint::new(x, y, 1.0, 0.0, 0.0),
                    PixelPoint::new(x + 24, y + 3, 1.0, 0.5, 0.0),
                    PixelPoint::new(x + 5, y + 20, 1.0, 0.0, 0.5),
                ]
            })
            .collect();

        b.iter(|| {
            framebuffer.clear_depth();
            for [a, b_, c_] in &triangles {
                black_box(rasterizer.fill_triangle(&mut framebuffer, &atlas, *a, *b_, *c_, 1.0));
            }
        });
    });
}

fn bench_framebuffer_clear(c: &mut Criterion) {
    c.bench_function("framebuffer_clear", |b| {
        let mut framebuffer = Framebuffer::new(1280, 720);

        b.iter(|| {
            framebuffer.clear(black_box(0xFF87CEEB));
        });
    });
}

criterion_group!(
    benches,
    bench_render_frame,
    bench_fill_triangle,
    bench_small_triangles,
    bench_framebuffer_clear
);
criterion_main!(benches);
