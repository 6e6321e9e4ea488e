use std::cmp::{max, min};

use image::RgbImage;
use log::{debug, trace};
use nalgebra as na;
use na::{vector, Vector2, Vector3, Vector4};

pub mod buffer;
pub mod shader;
pub mod util;
pub mod vertex;

use buffer::{Depth, FrameBuffer, ZBuffer, DEPTH_MAX};
use shader::{ClipPosition, ShaderProgram};
use util::to_rgb8;
use vertex::process_vertices;

/// Rounded corner coordinates are saturated to this magnitude so edge function products fit in i64.
const COORD_LIMIT: f32 = (1 << 28) as f32;

/// Edge function: twice the signed area of the triangle (p0, p1, p2).
/// Positive if p2 lies to the left of the directed edge p0 -> p1, so every edge of a counter-clockwise
/// triangle gives a non-negative value for points inside it.
pub fn edge(p0: Vector2<i64>, p1: Vector2<i64>, p2: Vector2<i64>) -> i64 {
    return (p1.x - p0.x) * (p2.y - p0.y) - (p1.y - p0.y) * (p2.x - p0.x);
}

/// Snaps a screen space position to the integer pixel grid.
fn to_raster_coord(position: Vector4<f32>) -> Vector2<i64> {
    return vector![
        position.x.round().clamp(-COORD_LIMIT, COORD_LIMIT) as i64,
        position.y.round().clamp(-COORD_LIMIT, COORD_LIMIT) as i64
    ];
}

/// Rasterization target, owning a frame buffer and a z-buffer of the same size.
/// Pixel (0, 0) is the bottom left of the rendered image, buffers store it first.
pub struct Scene {
    width: u32,
    height: u32,
    frame_buffer: FrameBuffer, // Color of the closest fragment drawn so far.
    z_buffer: ZBuffer,         // Fixed point depth of the closest fragment, DEPTH_MAX if none.
}

impl Scene {
    /// Generates new Scene with black frame buffer and cleared z-buffer.
    pub fn new(width: u32, height: u32) -> Scene {
        return Scene {
            width,
            height,
            frame_buffer: FrameBuffer::new(width, height, Vector3::zeros()),
            z_buffer: ZBuffer::new(width, height, DEPTH_MAX),
        };
    }

    pub fn width(&self) -> u32 {
        return self.width;
    }

    pub fn height(&self) -> u32 {
        return self.height;
    }

    pub fn frame_buffer(&self) -> &FrameBuffer {
        return &self.frame_buffer;
    }

    pub fn z_buffer(&self) -> &ZBuffer {
        return &self.z_buffer;
    }

    /// Sets all rendered pixels to black and clears the z-buffer.
    pub fn clear(&mut self) {
        self.clear_with(Vector3::zeros());
    }

    /// Sets all rendered pixels to `color` and clears the z-buffer.
    pub fn clear_with(&mut self, color: Vector3<u8>) {
        self.frame_buffer.fill(color);
        self.z_buffer.fill(DEPTH_MAX);
    }

    /// Rendered frame as an image, flipped so that (0, 0) ends up in the bottom left.
    pub fn to_image(&self) -> RgbImage {
        return self.frame_buffer.to_image();
    }

    /// Image visualizing the z-buffer, see ZBuffer::to_image.
    pub fn depth_image(&self) -> RgbImage {
        return self.z_buffer.to_image();
    }

    /// Sets pixel to a color, ignoring the z-buffer. Coordinates outside of the scene are skipped.
    pub fn set_pixel(&mut self, p: Vector2<i64>, color: Vector3<u8>) {
        if p.x < 0 || p.y < 0 || p.x >= self.width as i64 || p.y >= self.height as i64 {
            return;
        }
        self.frame_buffer.set(p.x as u32, p.y as u32, color);
    }

    /// Draws indexed triangles with a shader program and returns the frame buffer.
    ///
    /// Vertices go through the vertex stage once, then every consecutive index triple is rasterized
    /// in order. Trailing indices, which don't form a full triangle, are ignored.
    /// Panics if an index is out of range of the vertex buffer.
    pub fn draw<P: ShaderProgram>(
        &mut self,
        program: &P,
        vertices: &[P::Vertex],
        indices: &[u32],
    ) -> &FrameBuffer {
        let processed = process_vertices(program, vertices, self.width, self.height);

        let mut rasterized = 0;
        for triangle in indices.chunks_exact(3) {
            let a = &processed[triangle[0] as usize];
            let b = &processed[triangle[1] as usize];
            let c = &processed[triangle[2] as usize];
            if self.draw_triangle(program, a, b, c) {
                rasterized += 1;
            }
        }
        debug!(
            "Draw call: {} vertices, {} triangles, {} rasterized",
            vertices.len(),
            indices.len() / 3,
            rasterized
        );

        return &self.frame_buffer;
    }

    /// Rasterizes one triangle of processed varyings (screen space positions with reciprocal w).
    ///
    /// Pixels covered by the triangle are depth tested against the z-buffer, ties pass, so the
    /// last of several coplanar triangles wins. Surviving pixels write their depth, then get their
    /// varyings interpolated with perspective correct weights and colored by the fragment shader.
    /// Returns false without drawing if the triangle is degenerate or back facing, i.e. not wound
    /// counter-clockwise on screen.
    pub fn draw_triangle<P: ShaderProgram>(
        &mut self,
        program: &P,
        a: &P::Varying,
        b: &P::Varying,
        c: &P::Varying,
    ) -> bool {
        // Simple local bounding box struct for convenience.
        #[derive(Debug)]
        struct BoundingBox {
            ll: Vector2<i64>, // lower left corner
            ur: Vector2<i64>, // upper right corner
        }

        // Helper used to find bounding box of a triangle.
        fn get_triangle_bounding_box(
            coord_a: Vector2<i64>,
            coord_b: Vector2<i64>,
            coord_c: Vector2<i64>,
        ) -> BoundingBox {
            return BoundingBox {
                ll: vector![
                    min(min(coord_a.x, coord_b.x), coord_c.x),
                    min(min(coord_a.y, coord_b.y), coord_c.y)
                ],
                ur: vector![
                    max(max(coord_a.x, coord_b.x), coord_c.x),
                    max(max(coord_a.y, coord_b.y), coord_c.y)
                ],
            };
        }

        let position_a = a.position();
        let position_b = b.position();
        let position_c = c.position();
        // No sub-pixel precision, corners are snapped to the pixel grid.
        let coord_a = to_raster_coord(position_a);
        let coord_b = to_raster_coord(position_b);
        let coord_c = to_raster_coord(position_c);

        let area = edge(coord_a, coord_b, coord_c);
        if area <= 0 {
            trace!("Culled triangle {:?} {:?} {:?}, area {}", coord_a, coord_b, coord_c, area);
            return false;
        }
        let norm_factor = 1.0 / area as f32;

        // Clipping bounding box to the scene.
        let mut bbox = get_triangle_bounding_box(coord_a, coord_b, coord_c);
        bbox.ll.x = max(bbox.ll.x, 0);
        bbox.ll.y = max(bbox.ll.y, 0);
        bbox.ur.x = min(bbox.ur.x, self.width as i64 - 1);
        bbox.ur.y = min(bbox.ur.y, self.height as i64 - 1);

        let z_values = vector![position_a.z, position_b.z, position_c.z];
        let w_values = vector![position_a.w, position_b.w, position_c.w];

        for y in bbox.ll.y..=bbox.ur.y {
            for x in bbox.ll.x..=bbox.ur.x {
                let p = vector![x, y];
                let raw_bar = vector![
                    edge(coord_b, coord_c, p),
                    edge(coord_c, coord_a, p),
                    edge(coord_a, coord_b, p)
                ];
                if raw_bar.x < 0 || raw_bar.y < 0 || raw_bar.z < 0 {
                    continue;
                }
                let bar = raw_bar.map(|e| e as f32 * norm_factor);

                // Depth is linear in screen space after the perspective divide, no correction needed.
                let z = bar.dot(&z_values);
                // Late z clipping in place of near and far plane clipping.
                if !(0.0..=1.0).contains(&z) {
                    continue;
                }
                // Interpolated 1 / w, not positive behind the camera.
                let w = bar.dot(&w_values);
                let inv_w = 1.0 / w;
                if w <= 0.0 || !w.is_finite() || !inv_w.is_finite() {
                    continue;
                }

                let z_fixed = (z * DEPTH_MAX as f32 + 0.5) as Depth;
                let (px, py) = (x as u32, y as u32);
                if z_fixed > self.z_buffer.get(px, py) {
                    continue;
                }
                self.z_buffer.set(px, py, z_fixed);

                // Screen space weights are not linear in camera space under perspective, rescaling
                // them by the interpolated reciprocal w fixes that.
                let corrected_bar = bar.component_mul(&w_values) * inv_w;
                let mut varying = program.interpolate(a, b, c, corrected_bar);
                varying.set_position(vector![x as f32, y as f32, z, w]);
                let color = program.fragment(&varying);
                self.frame_buffer.set(px, py, to_rgb8(color));
            }
        }

        return true;
    }

    /// Draws a line between a and b with specified color via Bresenham's algorithm as presented in
    /// https://en.wikipedia.org/wiki/Bresenham%27s_line_algorithm
    /// Draws over anything and leaves the z-buffer untouched.
    pub fn draw_line(&mut self, a: Vector2<i64>, b: Vector2<i64>, color: Vector3<u8>) {
        let mut x_0 = a.x;
        let x_1 = b.x;
        let mut y_0 = a.y;
        let y_1 = b.y;
        let dx = (x_1 - x_0).abs();
        let sx = if x_0 < x_1 { 1 } else { -1 };
        let dy = -(y_1 - y_0).abs();
        let sy = if y_0 < y_1 { 1 } else { -1 };
        let mut error = dx + dy;

        loop {
            self.set_pixel(vector![x_0, y_0], color);
            if x_0 == x_1 && y_0 == y_1 {
                break;
            }
            let e2 = 2 * error;
            if e2 >= dy {
                if x_0 == x_1 {
                    break;
                }
                error += dy;
                x_0 += sx;
            }
            if e2 <= dx {
                if y_0 == y_1 {
                    break;
                }
                error += dx;
                y_0 += sy;
            }
        }
    }

    /// Draws the edges of indexed triangles after running them through the vertex stage.
    /// Triangles with a corner outside of the depth range are skipped as a whole.
    pub fn draw_wireframe<P: ShaderProgram>(
        &mut self,
        program: &P,
        vertices: &[P::Vertex],
        indices: &[u32],
        color: Vector3<u8>,
    ) -> &FrameBuffer {
        let processed = process_vertices(program, vertices, self.width, self.height);

        for triangle in indices.chunks_exact(3) {
            let corners = [triangle[0], triangle[1], triangle[2]]
                .map(|index| processed[index as usize].position());
            if corners.iter().any(|corner| !(0.0..=1.0).contains(&corner.z)) {
                continue;
            }
            let coords = corners.map(to_raster_coord);
            for i in 0..3 {
                self.draw_line(coords[i], coords[(i + 1) % 3], color);
            }
        }

        return &self.frame_buffer;
    }
}
