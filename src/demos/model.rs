use std::fs::File;
use std::io::BufReader;

use anyhow::Context;
use log::info;
use nalgebra as na;
use na::{point, vector, Matrix3, Matrix4, Point3, Vector2, Vector3, Vector4};
use obj::{load_obj, Obj, TexturedVertex};

use tiny_rasterizer::scene::util::{look_at, projection_matrix, to_hom_point};
use tiny_rasterizer::{ClipPosition, FilterMode, Sampler, Scene, ShaderProgram, WrapMode};

use super::{aspect_ratio, submit};
use crate::app::Params;

struct Vertex {
    position: Vector3<f32>,
    normal: Vector3<f32>,
    uv: Vector2<f32>,
    tangent: Vector3<f32>,
}

/// Lighting vectors are carried in tangent space so normal map samples can be used as they are.
struct Varying {
    position: Vector4<f32>,
    uv: Vector2<f32>,
    t_camera_position: Vector3<f32>,
    t_light_direction: Vector3<f32>,
    t_world_position: Vector3<f32>,
}

impl ClipPosition for Varying {
    fn position(&self) -> Vector4<f32> {
        return self.position;
    }

    fn set_position(&mut self, position: Vector4<f32>) {
        self.position = position;
    }
}

/// Blinn-Phong with diffuse, normal, specular and ambient occlusion maps.
struct ModelProgram {
    m_matrix: Matrix4<f32>,
    vpm_matrix: Matrix4<f32>,
    camera_position: Vector3<f32>,
    light_direction: Vector3<f32>, // Direction to the light.
    diffuse: Sampler,
    normal: Sampler,
    specular: Sampler,
    occlusion: Sampler,
}

impl ShaderProgram for ModelProgram {
    type Vertex = Vertex;
    type Varying = Varying;

    fn vertex(&self, vertex: &Vertex) -> Varying {
        let t = self.m_matrix.transform_vector(&vertex.tangent).normalize();
        let n = self.m_matrix.transform_vector(&vertex.normal).normalize();
        let b = n.cross(&t);
        // Rows are the tangent space axes, so this maps world space to tangent space.
        let tbn = Matrix3::from_rows(&[t.transpose(), b.transpose(), n.transpose()]);
        let world_position = self.m_matrix.transform_point(&Point3::from(vertex.position));

        return Varying {
            position: self.vpm_matrix * to_hom_point(vertex.position),
            uv: vertex.uv,
            t_camera_position: tbn * self.camera_position,
            t_light_direction: tbn * self.light_direction,
            t_world_position: tbn * world_position.coords,
        };
    }

    fn fragment(&self, varying: &Varying) -> Vector3<f32> {
        let (u, v) = (varying.uv.x, varying.uv.y);
        let normal = (self.normal.sample(u, v) * 2.0 - Vector3::repeat(1.0)).normalize();

        let diff_coef = varying.t_light_direction.dot(&normal).max(0.0);

        let view_direction = (varying.t_camera_position - varying.t_world_position).normalize();
        let halfway = (view_direction + varying.t_light_direction).normalize();
        let spec_coef = normal.dot(&halfway).max(0.0).powf(16.0) * 0.5;

        let color = self.diffuse.sample(u, v) * diff_coef
            + (Vector3::repeat(1.0) - self.specular.sample(u, v)) * spec_coef;
        return color.component_mul(&self.occlusion.sample(u, v));
    }

    fn interpolate(&self, a: &Varying, b: &Varying, c: &Varying, bar: Vector3<f32>) -> Varying {
        return Varying {
            position: Vector4::zeros(),
            uv: a.uv * bar.x + b.uv * bar.y + c.uv * bar.z,
            t_camera_position: a.t_camera_position * bar.x
                + b.t_camera_position * bar.y
                + c.t_camera_position * bar.z,
            t_light_direction: a.t_light_direction * bar.x
                + b.t_light_direction * bar.y
                + c.t_light_direction * bar.z,
            t_world_position: a.t_world_position * bar.x
                + b.t_world_position * bar.y
                + c.t_world_position * bar.z,
        };
    }
}

/// Sampler over one of the model maps. `missing` is what a map that failed to load reads as.
fn map_sampler(params: &Params, file_name: &str, missing: Vector3<f32>) -> Sampler {
    let mut sampler = Sampler::from_file(
        params.asset_path.join(file_name),
        FilterMode::Bilinear,
        WrapMode::ClampToEdge,
    );
    sampler.set_fill_color(missing);
    return sampler;
}

/// OBJ files carry no tangents. Accumulates the tangent of every triangle, derived from its
/// uv deltas, on its corners and orthogonalizes the sums against the vertex normals.
fn compute_tangents(vertices: &mut [Vertex], indices: &[u32]) {
    let mut tangents = vec![Vector3::<f32>::zeros(); vertices.len()];
    for triangle in indices.chunks_exact(3) {
        let [a, b, c] = [triangle[0], triangle[1], triangle[2]].map(|index| index as usize);
        let edge_1 = vertices[b].position - vertices[a].position;
        let edge_2 = vertices[c].position - vertices[a].position;
        let delta_uv_1 = vertices[b].uv - vertices[a].uv;
        let delta_uv_2 = vertices[c].uv - vertices[a].uv;

        let det = delta_uv_1.x * delta_uv_2.y - delta_uv_2.x * delta_uv_1.y;
        if det.abs() < f32::EPSILON {
            continue;
        }
        let tangent = (edge_1 * delta_uv_2.y - edge_2 * delta_uv_1.y) / det;
        for index in [a, b, c] {
            tangents[index] += tangent;
        }
    }

    for (vertex, tangent) in vertices.iter_mut().zip(tangents) {
        let normal = vertex.normal;
        let orthogonal = tangent - normal * normal.dot(&tangent);
        vertex.tangent = orthogonal.try_normalize(1.0e-6).unwrap_or_else(|| {
            let axis = if normal.x.abs() < 0.9 { Vector3::x() } else { Vector3::y() };
            normal.cross(&axis).normalize()
        });
    }
}

/// Reads `model.obj` from the asset directory, normals and texture coordinates are required.
fn load_model(params: &Params) -> anyhow::Result<(Vec<Vertex>, Vec<u32>)> {
    let path = params.asset_path.join("model.obj");
    let file = File::open(&path).with_context(|| format!("failed to open {}", path.display()))?;
    let model: Obj<TexturedVertex, u32> = load_obj(BufReader::new(file))
        .with_context(|| format!("failed to parse {}", path.display()))?;
    info!("Number of vertices - {}", model.vertices.len());
    info!("Number of indices  - {}", model.indices.len());

    let mut vertices: Vec<Vertex> = model
        .vertices
        .iter()
        .map(|vertex| Vertex {
            position: Vector3::from(vertex.position),
            normal: Vector3::from(vertex.normal),
            uv: vector![vertex.texture[0], vertex.texture[1]],
            tangent: Vector3::zeros(),
        })
        .collect();
    compute_tangents(&mut vertices, &model.indices);

    return Ok((vertices, model.indices));
}

pub fn render(scene: &mut Scene, params: &Params) -> anyhow::Result<()> {
    let (vertices, indices) = load_model(params)?;

    let m_matrix = Matrix4::new_scaling(0.5);
    let camera_position = point![0.0, 10.0, 20.0];
    let view = look_at(camera_position, point![0.0, 2.5, 0.0], Vector3::y());
    let projection = projection_matrix(60.0, aspect_ratio(scene), 0.1, 100.0);
    let program = ModelProgram {
        m_matrix,
        vpm_matrix: projection * view * m_matrix,
        camera_position: camera_position.coords,
        light_direction: vector![2.0, 2.0, 5.0].normalize(),
        diffuse: map_sampler(params, "diffuse.png", Vector3::repeat(0.8)),
        normal: map_sampler(params, "normal.png", vector![0.5, 0.5, 1.0]),
        specular: map_sampler(params, "specular.png", Vector3::repeat(1.0)),
        occlusion: map_sampler(params, "ao.png", Vector3::repeat(1.0)),
    };

    submit(scene, params, &program, &vertices, &indices);

    return Ok(());
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    fn vertex(position: Vector3<f32>, uv: Vector2<f32>) -> Vertex {
        return Vertex {
            position,
            normal: Vector3::z(),
            uv,
            tangent: Vector3::zeros(),
        };
    }

    #[test]
    fn tangent_follows_u_axis() {
        let mut vertices = vec![
            vertex(vector![0.0, 0.0, 0.0], vector![0.0, 0.0]),
            vertex(vector![2.0, 0.0, 0.0], vector![1.0, 0.0]),
            vertex(vector![0.0, 2.0, 0.0], vector![0.0, 1.0]),
        ];
        compute_tangents(&mut vertices, &[0, 1, 2]);
        for vertex in &vertices {
            assert!((vertex.tangent - Vector3::x()).norm() < 1e-6);
        }
    }

    #[test]
    fn degenerate_uvs_give_orthogonal_tangent() {
        let mut vertices = vec![
            vertex(vector![0.0, 0.0, 0.0], vector![0.5, 0.5]),
            vertex(vector![1.0, 0.0, 0.0], vector![0.5, 0.5]),
            vertex(vector![0.0, 1.0, 0.0], vector![0.5, 0.5]),
        ];
        compute_tangents(&mut vertices, &[0, 1, 2]);
        for vertex in &vertices {
            assert!(vertex.tangent.dot(&vertex.normal).abs() < 1e-6);
            assert!((vertex.tangent.norm() - 1.0).abs() < 1e-6);
        }
    }
}
