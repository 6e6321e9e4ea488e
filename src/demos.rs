use clap::ValueEnum;
use nalgebra as na;
use na::vector;

use tiny_rasterizer::{Scene, ShaderProgram};

use crate::app::Params;

mod basic;
mod checkerboard;
mod model;

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Demo {
    /// Two overlapping triangles with vertex colors.
    Basic,
    /// Checkerboard plane seen at a grazing angle, bilinear filtering and mirrored wrapping.
    Checkerboard,
    /// Textured OBJ model with normal mapping and Blinn-Phong lighting.
    Model,
}

pub fn render(scene: &mut Scene, params: &Params) -> anyhow::Result<()> {
    return match params.demo {
        Demo::Basic => basic::render(scene, params),
        Demo::Checkerboard => checkerboard::render(scene, params),
        Demo::Model => model::render(scene, params),
    };
}

/// Draws shaded triangles, or just their edges in white for a wireframe run.
fn submit<P: ShaderProgram>(
    scene: &mut Scene,
    params: &Params,
    program: &P,
    vertices: &[P::Vertex],
    indices: &[u32],
) {
    if params.wireframe {
        scene.draw_wireframe(program, vertices, indices, vector![255, 255, 255]);
    } else {
        scene.draw(program, vertices, indices);
    }
}

/// Width over height of the rendered frame.
fn aspect_ratio(scene: &Scene) -> f32 {
    return scene.width() as f32 / scene.height().max(1) as f32;
}
