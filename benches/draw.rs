//! Rasterization throughput of a textured perspective quad.

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use nalgebra as na;
use na::{point, vector, Matrix4, Point3, Vector2, Vector3, Vector4};

use tiny_rasterizer::scene::util::{look_at, projection_matrix, to_hom_point};
use tiny_rasterizer::{ClipPosition, FilterMode, Sampler, Scene, ShaderProgram, Texture, WrapMode};

struct Vertex {
    position: Vector3<f32>,
    uv: Vector2<f32>,
}

struct Varying {
    position: Vector4<f32>,
    uv: Vector2<f32>,
}

impl ClipPosition for Varying {
    fn position(&self) -> Vector4<f32> {
        return self.position;
    }

    fn set_position(&mut self, position: Vector4<f32>) {
        self.position = position;
    }
}

struct QuadProgram {
    vp_matrix: Matrix4<f32>,
    sampler: Sampler,
}

impl ShaderProgram for QuadProgram {
    type Vertex = Vertex;
    type Varying = Varying;

    fn vertex(&self, vertex: &Vertex) -> Varying {
        return Varying {
            position: self.vp_matrix * to_hom_point(vertex.position),
            uv: vertex.uv,
        };
    }

    fn fragment(&self, varying: &Varying) -> Vector3<f32> {
        return self.sampler.sample(varying.uv.x, varying.uv.y);
    }

    fn interpolate(&self, a: &Varying, b: &Varying, c: &Varying, bar: Vector3<f32>) -> Varying {
        return Varying {
            position: Vector4::zeros(),
            uv: a.uv * bar.x + b.uv * bar.y + c.uv * bar.z,
        };
    }
}

fn quad_program(filter_mode: FilterMode) -> QuadProgram {
    let texture = Texture::checkerboard(256, 256, 32, vector![255, 255, 255], vector![0, 0, 0]);
    let view = look_at(point![0.0, 5.0, 7.0], Point3::origin(), Vector3::y());
    let projection = projection_matrix(90.0, 1.0, 0.1, 100.0);
    return QuadProgram {
        vp_matrix: projection * view,
        sampler: Sampler::new(texture, filter_mode, WrapMode::Mirror),
    };
}

fn quad_vertices() -> Vec<Vertex> {
    return vec![
        Vertex { position: vector![-5.0, 0.0, -20.0], uv: vector![0.0, 0.0] },
        Vertex { position: vector![5.0, 0.0, -20.0], uv: vector![1.0, 0.0] },
        Vertex { position: vector![-5.0, 0.0, 5.0], uv: vector![0.0, 1.0] },
        Vertex { position: vector![5.0, 0.0, 5.0], uv: vector![1.0, 1.0] },
    ];
}

fn bench_textured_quad(c: &mut Criterion) {
    let mut group = c.benchmark_group("textured_quad");
    let (width, height) = (512, 512);
    group.throughput(Throughput::Elements((width * height) as u64));

    let vertices = quad_vertices();
    let indices = [0, 2, 1, 1, 2, 3];

    for (name, filter_mode) in [("nearest", FilterMode::Nearest), ("bilinear", FilterMode::Bilinear)] {
        let program = quad_program(filter_mode);
        let mut scene = Scene::new(width, height);
        group.bench_function(name, |b| {
            b.iter(|| {
                scene.clear();
                black_box(scene.draw(&program, &vertices, &indices));
            })
        });
    }

    group.finish();
}

fn bench_clear(c: &mut Criterion) {
    let mut scene = Scene::new(1920, 1080);
    c.bench_function("clear_1080p", |b| b.iter(|| scene.clear()));
}

criterion_group!(benches, bench_textured_quad, bench_clear);
criterion_main!(benches);
