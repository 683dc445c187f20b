use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rustorizer::bench::{cube_scene, triangle_fill_points, ViewportPoint};
use rustorizer::shading::ShadingModel;
use rustorizer::RenderingPipeline;

const BUFFER_WIDTH: usize = 800;
const BUFFER_HEIGHT: usize = 600;

fn corner(x: f64, y: f64) -> ViewportPoint {
    ViewportPoint { x, y, z: 0.0, inv_w: 1.0 }
}

fn benchmark_triangle_fill(c: &mut Criterion) {
    let mut group = c.benchmark_group("triangle_fill");

    for (name, points) in [
        ("small", (corner(100.0, 100.0), corner(120.0, 100.0), corner(110.0, 120.0))),
        ("medium", (corner(100.0, 100.0), corner(300.0, 100.0), corner(200.0, 300.0))),
        ("large", (corner(50.0, 50.0), corner(750.0, 100.0), corner(400.0, 550.0))),
    ] {
        group.bench_with_input(BenchmarkId::new("scanline", name), &points, |b, (p0, p1, p2)| {
            b.iter(|| black_box(triangle_fill_points(p0, p1, p2)));
        });
    }

    group.finish();
}

fn benchmark_cube_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("cube_render");
    let mut out = vec![0u8; BUFFER_WIDTH * BUFFER_HEIGHT * 4];

    group.bench_function("rasterize_flat", |b| {
        let mut pipeline = RenderingPipeline::new(cube_scene());
        pipeline.set_rasterize_polygons(true);
        pipeline.set_orbit_camera_distance(6.0);
        b.iter(|| pipeline.render(black_box(BUFFER_WIDTH), black_box(BUFFER_HEIGHT), &mut out));
    });

    group.bench_function("rasterize_zbuffered_phong", |b| {
        let mut pipeline = RenderingPipeline::new(cube_scene());
        pipeline.set_rasterize_polygons(true);
        pipeline.set_enable_z_buffering(true);
        pipeline.set_shading_model(ShadingModel::Phong);
        pipeline.set_orbit_camera_distance(6.0);
        b.iter(|| pipeline.render(black_box(BUFFER_WIDTH), black_box(BUFFER_HEIGHT), &mut out));
    });

    group.finish();
}

criterion_group!(benches, benchmark_triangle_fill, benchmark_cube_render);
criterion_main!(benches);
