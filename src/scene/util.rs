use nalgebra as na;
use na::{matrix, vector, Matrix4, Point3, Vector3, Vector4};

/// Transformation of a point to homogenous coordinates.
pub fn to_hom_point(v: Vector3<f32>) -> Vector4<f32> {
    return vector![v.x, v.y, v.z, 1.0];
}

/// Transformation of a point from homogenous coordinates, the perspective divide.
pub fn from_hom_point(v: Vector4<f32>) -> Vector3<f32> {
    return vector![v.x / v.w, v.y / v.w, v.z / v.w];
}

/// Same as `from_hom_point`, named after the pipeline stage it performs.
pub fn perspective_divide(v: Vector4<f32>) -> Vector3<f32> {
    return from_hom_point(v);
}

/// OpenGL style perspective projection from camera space to clip space.
/// Camera looks down -z, clip w ends up as -z of the camera space point.
/// `fov` is the vertical field of view in degrees.
pub fn projection_matrix(fov: f32, aspect_ratio: f32, near: f32, far: f32) -> Matrix4<f32> {
    let f = 1.0 / (fov.to_radians() / 2.0).tan();
    let a = (near + far) / (near - far);
    let b = (2.0 * near * far) / (near - far);
    return matrix![f / aspect_ratio, 0.0, 0.0,  0.0;
                   0.0,              f,   0.0,  0.0;
                   0.0,              0.0, a,    b;
                   0.0,              0.0, -1.0, 0.0];
}

/// Right handed view matrix for a camera at `eye` looking at `target`.
pub fn look_at(eye: Point3<f32>, target: Point3<f32>, up: Vector3<f32>) -> Matrix4<f32> {
    return Matrix4::look_at_rh(&eye, &target, &up);
}

/// Conversion of a linear color with channels nominally in [0.0, 1.0] to rgb8.
/// Adds 0.5 and truncates, so values round to the nearest integer; out of range channels saturate.
pub fn to_rgb8(color: Vector3<f32>) -> Vector3<u8> {
    return color.map(|c| (c * 255.0 + 0.5) as u8);
}

#[cfg(test)]
mod tests {
    use super::*;
    use na::point;
    use test_log::test;

    #[test]
    fn projection_matches_nalgebra_perspective() {
        let ours = projection_matrix(60.0, 16.0 / 9.0, 0.1, 100.0);
        let reference = Matrix4::new_perspective(16.0 / 9.0, 60f32.to_radians(), 0.1, 100.0);
        assert!((ours - reference).abs().max() < 1e-5);
    }

    #[test]
    fn near_and_far_planes_map_to_ndc_bounds() {
        let projection = projection_matrix(90.0, 1.0, 1.0, 10.0);
        let near = perspective_divide(projection * vector![0.0, 0.0, -1.0, 1.0]);
        let far = perspective_divide(projection * vector![0.0, 0.0, -10.0, 1.0]);
        assert!((near.z + 1.0).abs() < 1e-5);
        assert!((far.z - 1.0).abs() < 1e-5);
    }

    #[test]
    fn hom_point_round_trip() {
        let v = vector![1.0, -2.0, 3.0];
        assert_eq!(from_hom_point(to_hom_point(v)), v);
        assert_eq!(perspective_divide(vector![2.0, 4.0, 6.0, 2.0]), vector![1.0, 2.0, 3.0]);
    }

    #[test]
    fn look_at_puts_target_on_negative_z() {
        let view = look_at(point![0.0, 0.0, 6.0], point![0.0, 0.0, 0.0], Vector3::y());
        let target = from_hom_point(view * vector![0.0, 0.0, 0.0, 1.0]);
        assert!((target - vector![0.0, 0.0, -6.0]).norm() < 1e-5);
    }

    #[test]
    fn rgb8_conversion_rounds_and_saturates() {
        assert_eq!(to_rgb8(vector![0.0, 1.0, 0.5]), vector![0, 255, 128]);
        assert_eq!(to_rgb8(vector![-0.3, 2.0, 0.2]), vector![0, 255, 51]);
    }
}
