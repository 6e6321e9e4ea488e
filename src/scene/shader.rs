// A shader program is a bundle of data (uniforms, samplers) and three functions the pipeline calls:
// the vertex shader once per vertex, then, for every fragment that survives coverage and depth tests,
// interpolate followed by the fragment shader. The pipeline never looks inside the user types except
// for the homogeneous position of a varying.

use nalgebra as na;
use na::{Vector3, Vector4};

/// Access to the homogeneous position every varying has to carry.
///
/// The vertex shader writes the clip space position here. Vertex processing replaces it in place with
/// the screen space position (x, y in pixels, z in [0.0, 1.0], w holding 1 / clip w). On the varying
/// handed to the fragment shader it holds the fragment coordinate (x, y, z, w) in the same layout.
pub trait ClipPosition {
    fn position(&self) -> Vector4<f32>;
    fn set_position(&mut self, position: Vector4<f32>);
}

/// User implemented shading stages, generic over the vertex and varying layout.
pub trait ShaderProgram {
    /// Per-vertex input read from the vertex buffer.
    type Vertex;
    /// Output of the vertex shader and input of the fragment shader.
    type Varying: ClipPosition;

    /// Transforms a vertex to clip space. Must set the position of the returned varying.
    fn vertex(&self, vertex: &Self::Vertex) -> Self::Varying;

    /// Computes the linear color of a fragment, channels nominally in [0.0, 1.0].
    fn fragment(&self, varying: &Self::Varying) -> Vector3<f32>;

    /// Combines every field except the position of three varyings with the weights in `bar`,
    /// which sum to 1. The position of the result is overwritten by the pipeline.
    fn interpolate(
        &self,
        a: &Self::Varying,
        b: &Self::Varying,
        c: &Self::Varying,
        bar: Vector3<f32>,
    ) -> Self::Varying;
}
