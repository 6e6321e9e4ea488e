use nalgebra as na;
use na::{vector, Vector4};

use super::shader::{ClipPosition, ShaderProgram};

/// Runs the vertex stage over a vertex buffer: vertex shader, perspective divide and viewport
/// transform. Returns one varying per vertex, in the same order.
/// No clipping happens here, vertices behind the camera give meaningless positions that are
/// rejected later by the depth range check.
pub fn process_vertices<P: ShaderProgram>(
    program: &P,
    vertices: &[P::Vertex],
    width: u32,
    height: u32,
) -> Vec<P::Varying> {
    return vertices
        .iter()
        .map(|vertex| {
            let mut varying = program.vertex(vertex);
            varying.set_position(to_screen_space(varying.position(), width, height));
            varying
        })
        .collect();
}

/// Clip space to screen space.
/// x, y, z are divided by w and w is replaced by its reciprocal, which the rasterizer needs for
/// perspective correct interpolation. Then x is mapped from [-1.0, 1.0] to [0.0, width],
/// y to [0.0, height] and z to [0.0, 1.0].
pub fn to_screen_space(clip: Vector4<f32>, width: u32, height: u32) -> Vector4<f32> {
    let x = clip.x / clip.w;
    let y = clip.y / clip.w;
    let z = clip.z / clip.w;
    return vector![
        (x + 1.0) * width as f32 / 2.0,
        (y + 1.0) * height as f32 / 2.0,
        (z + 1.0) * 0.5,
        1.0 / clip.w
    ];
}

#[cfg(test)]
mod tests {
    use super::*;
    use na::Vector3;
    use test_log::test;

    struct Varying {
        position: Vector4<f32>,
        tag: usize,
    }

    impl ClipPosition for Varying {
        fn position(&self) -> Vector4<f32> {
            return self.position;
        }
        fn set_position(&mut self, position: Vector4<f32>) {
            self.position = position;
        }
    }

    /// Passes clip positions through untouched.
    struct Identity;

    impl ShaderProgram for Identity {
        type Vertex = (Vector4<f32>, usize);
        type Varying = Varying;

        fn vertex(&self, vertex: &Self::Vertex) -> Varying {
            return Varying { position: vertex.0, tag: vertex.1 };
        }
        fn fragment(&self, _varying: &Varying) -> Vector3<f32> {
            return Vector3::zeros();
        }
        fn interpolate(&self, a: &Varying, _b: &Varying, _c: &Varying, _bar: Vector3<f32>) -> Varying {
            return Varying { position: a.position, tag: a.tag };
        }
    }

    #[test]
    fn ndc_corners_map_to_viewport_corners() {
        let low = to_screen_space(vector![-1.0, -1.0, -1.0, 1.0], 640, 480);
        let high = to_screen_space(vector![1.0, 1.0, 1.0, 1.0], 640, 480);
        assert_eq!(low, vector![0.0, 0.0, 0.0, 1.0]);
        assert_eq!(high, vector![640.0, 480.0, 1.0, 1.0]);
    }

    #[test]
    fn divide_stores_reciprocal_w() {
        let screen = to_screen_space(vector![2.0, -2.0, 0.0, 4.0], 8, 8);
        assert_eq!(screen, vector![6.0, 2.0, 0.5, 0.25]);
    }

    #[test]
    fn processing_keeps_order_and_payload() {
        let vertices = vec![
            (vector![0.0, 0.0, 0.0, 1.0], 7),
            (vector![1.0, 1.0, 0.0, 2.0], 8),
            (vector![-1.0, 0.0, 1.0, 1.0], 9),
        ];
        let processed = process_vertices(&Identity, &vertices, 10, 20);
        assert_eq!(processed.len(), 3);
        assert_eq!(processed.iter().map(|v| v.tag).collect::<Vec<_>>(), vec![7, 8, 9]);
        assert_eq!(processed[0].position, vector![5.0, 10.0, 0.5, 1.0]);
        assert_eq!(processed[1].position, vector![7.5, 15.0, 0.5, 0.5]);
        assert_eq!(processed[2].position, vector![0.0, 10.0, 1.0, 1.0]);
    }

    #[test]
    fn vertex_behind_camera_does_not_panic() {
        let screen = to_screen_space(vector![1.0, 1.0, 1.0, 0.0], 8, 8);
        assert!(!screen.w.is_finite());
    }
}
