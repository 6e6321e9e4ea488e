use log::warn;
use nalgebra as na;
use na::{point, vector, Matrix4, Point3, Vector2, Vector3, Vector4};

use tiny_rasterizer::scene::util::{look_at, projection_matrix, to_hom_point};
use tiny_rasterizer::{ClipPosition, FilterMode, Sampler, Scene, ShaderProgram, Texture, WrapMode};

use super::{aspect_ratio, submit};
use crate::app::Params;

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

struct TextureProgram {
    vp_matrix: Matrix4<f32>,
    sampler: Sampler,
}

impl ShaderProgram for TextureProgram {
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

pub fn render(scene: &mut Scene, params: &Params) -> anyhow::Result<()> {
    let texture_path = params.asset_path.join("checkerboard.png");
    let mut texture = Texture::load(&texture_path);
    if texture.is_empty() {
        warn!("Using a generated checkerboard instead of {}", texture_path.display());
        texture = Texture::checkerboard(512, 512, 64, vector![255, 255, 255], vector![0, 0, 0]);
    }

    let view = look_at(point![0.0, 5.0, 7.0], Point3::origin(), Vector3::y());
    let projection = projection_matrix(90.0, aspect_ratio(scene), 0.1, 100.0);
    let program = TextureProgram {
        vp_matrix: projection * view,
        sampler: Sampler::new(texture, FilterMode::Bilinear, WrapMode::Mirror),
    };

    // Plane stretching away from the camera.
    let vertices = [
        Vertex { position: vector![-5.0, 0.0, -20.0], uv: vector![0.0, 0.0] },
        Vertex { position: vector![5.0, 0.0, -20.0], uv: vector![1.0, 0.0] },
        Vertex { position: vector![-5.0, 0.0, 5.0], uv: vector![0.0, 1.0] },
        Vertex { position: vector![5.0, 0.0, 5.0], uv: vector![1.0, 1.0] },
    ];
    let indices = [0, 2, 1, 1, 2, 3];

    submit(scene, params, &program, &vertices, &indices);

    return Ok(());
}
