use image::{Rgb, RgbImage};
use na::Vector3;
use nalgebra as na;

/// Depth sample type. Fixed point over the whole u16 range.
pub type Depth = u16;

/// Depth value meaning "infinitely far", the value a cleared z-buffer holds.
pub const DEPTH_MAX: Depth = Depth::MAX;

/// Frame buffer with one rgb8 sample per pixel.
pub type FrameBuffer = Buffer<Vector3<u8>>;

/// Z-buffer with one fixed point depth sample per pixel.
pub type ZBuffer = Buffer<Depth>;

/// Flat per-pixel storage of a fixed width and height, addressed as `y * width + x`.
/// (0, 0) is the first element, rows follow each other without padding.
#[derive(Debug, Clone, PartialEq)]
pub struct Buffer<T> {
    width: u32,
    height: u32,
    data: Vec<T>,
}

impl<T: Copy> Buffer<T> {
    /// Allocates width * height samples, all set to `value`.
    pub fn new(width: u32, height: u32, value: T) -> Self {
        let size = width as usize * height as usize;
        return Self {
            width,
            height,
            data: vec![value; size],
        };
    }

    pub fn width(&self) -> u32 {
        return self.width;
    }

    pub fn height(&self) -> u32 {
        return self.height;
    }

    /// Flat index of the sample at (x, y).
    #[inline]
    pub fn index(&self, x: u32, y: u32) -> usize {
        return y as usize * self.width as usize + x as usize;
    }

    /// Sample at (x, y). Panics if the coordinate is outside of the buffer.
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> T {
        return self.data[self.index(x, y)];
    }

    #[inline]
    pub fn set(&mut self, x: u32, y: u32, value: T) {
        let index = self.index(x, y);
        self.data[index] = value;
    }

    /// Overwrites every sample with `value`.
    pub fn fill(&mut self, value: T) {
        self.data.fill(value);
    }

    pub fn as_slice(&self) -> &[T] {
        return &self.data[..];
    }
}

impl FrameBuffer {
    /// Copies the frame into an image with (0, 0) in the bottom left corner,
    /// i.e. buffer row 0 becomes the last image row.
    pub fn to_image(&self) -> RgbImage {
        return RgbImage::from_fn(self.width, self.height, |x, y| {
            let color = self.get(x, self.height - 1 - y);
            Rgb([color.x, color.y, color.z])
        });
    }
}

impl ZBuffer {
    /// Grayscale picture of the written depth samples, nearest is brightest.
    /// Samples still holding DEPTH_MAX are left black.
    /// Same orientation as FrameBuffer::to_image.
    pub fn to_image(&self) -> RgbImage {
        let written = self.data.iter().copied().filter(|&z| z != DEPTH_MAX);
        let (z_min, z_max) = written.fold((DEPTH_MAX, 0), |(lo, hi), z| (lo.min(z), hi.max(z)));
        let scale = (z_max.saturating_sub(z_min) as f32).max(1.0);
        return RgbImage::from_fn(self.width, self.height, |x, y| {
            let z = self.get(x, self.height - 1 - y);
            if z == DEPTH_MAX {
                return Rgb([0, 0, 0]);
            }
            let value = (255.0 - (z - z_min) as f32 / scale * 255.0).round() as u8;
            Rgb([value, value, value])
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use na::vector;
    use test_log::test;

    #[test]
    fn new_buffer_is_filled() {
        let buffer = ZBuffer::new(3, 2, DEPTH_MAX);
        assert_eq!(buffer.as_slice().len(), 6);
        assert!(buffer.as_slice().iter().all(|&z| z == DEPTH_MAX));
    }

    #[test]
    fn samples_are_row_major() {
        let mut buffer = Buffer::new(4, 3, 0u8);
        buffer.set(1, 2, 7);
        assert_eq!(buffer.index(1, 2), 9);
        assert_eq!(buffer.as_slice()[9], 7);
        assert_eq!(buffer.get(1, 2), 7);
    }

    #[test]
    fn frame_image_is_flipped() {
        let mut frame = FrameBuffer::new(2, 2, vector![0, 0, 0]);
        frame.set(0, 0, vector![255, 0, 0]);
        let image = frame.to_image();
        // Buffer row 0 is the bottom image row.
        assert_eq!(image.get_pixel(0, 1), &Rgb([255, 0, 0]));
        assert_eq!(image.get_pixel(0, 0), &Rgb([0, 0, 0]));
    }

    #[test]
    fn depth_image_ignores_untouched_samples() {
        let mut depth = ZBuffer::new(3, 1, DEPTH_MAX);
        depth.set(0, 0, 100);
        depth.set(1, 0, 200);
        let image = depth.to_image();
        assert_eq!(image.get_pixel(0, 0), &Rgb([255, 255, 255]));
        assert_eq!(image.get_pixel(1, 0), &Rgb([0, 0, 0]));
        assert_eq!(image.get_pixel(2, 0), &Rgb([0, 0, 0]));
    }
}
