use nalgebra as na;
use na::{point, vector, Matrix4, Point3, Vector3, Vector4};

use tiny_rasterizer::scene::util::{look_at, projection_matrix, to_hom_point};
use tiny_rasterizer::{ClipPosition, Scene, ShaderProgram};

use super::{aspect_ratio, submit};
use crate::app::Params;

struct Vertex {
    position: Vector3<f32>,
    color: Vector3<f32>,
}

struct Varying {
    position: Vector4<f32>,
    color: Vector3<f32>,
}

impl ClipPosition for Varying {
    fn position(&self) -> Vector4<f32> {
        return self.position;
    }

    fn set_position(&mut self, position: Vector4<f32>) {
        self.position = position;
    }
}

/// Passes vertex colors through, interpolated over the triangle.
struct ColorProgram {
    vp_matrix: Matrix4<f32>,
}

impl ShaderProgram for ColorProgram {
    type Vertex = Vertex;
    type Varying = Varying;

    fn vertex(&self, vertex: &Vertex) -> Varying {
        return Varying {
            position: self.vp_matrix * to_hom_point(vertex.position),
            color: vertex.color,
        };
    }

    fn fragment(&self, varying: &Varying) -> Vector3<f32> {
        return varying.color;
    }

    fn interpolate(&self, a: &Varying, b: &Varying, c: &Varying, bar: Vector3<f32>) -> Varying {
        return Varying {
            position: Vector4::zeros(),
            color: a.color * bar.x + b.color * bar.y + c.color * bar.z,
        };
    }
}

pub fn render(scene: &mut Scene, params: &Params) -> anyhow::Result<()> {
    let view = look_at(point![0.0, 0.0, 6.0], Point3::origin(), Vector3::y());
    let projection = projection_matrix(60.0, aspect_ratio(scene), 0.1, 100.0);
    let program = ColorProgram { vp_matrix: projection * view };

    #[rustfmt::skip]
    let vertices = [
        // The second triangle pierces the first one.
        Vertex { position: vector![-3.0, -2.0, 0.0],  color: vector![1.0, 0.0, 0.0] },
        Vertex { position: vector![1.0, 0.0, 1.5],    color: vector![0.0, 1.0, 0.0] },
        Vertex { position: vector![-2.0, 2.0, 0.0],   color: vector![0.0, 0.0, 1.0] },
        Vertex { position: vector![4.0, -1.0, -1.0],  color: vector![1.0, 1.0, 0.0] },
        Vertex { position: vector![4.0, 3.0, -1.0],   color: vector![0.0, 1.0, 1.0] },
        Vertex { position: vector![-2.0, 0.0, 2.0],   color: vector![1.0, 0.0, 1.0] },
    ];
    let indices = [0, 1, 2, 3, 4, 5];

    submit(scene, params, &program, &vertices, &indices);

    return Ok(());
}
