use std::path::{Path, PathBuf};

use image::{Rgb, RgbImage};
use log::{error, info};
use nalgebra as na;
use na::{vector, Vector3};
use thiserror::Error;

pub mod sampler;

#[derive(Error, Debug)]
pub enum TextureError {
    #[error("failed to load texture {}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Grid of rgb8 texels. Row 0 is v = 0, i.e. the bottom row of the source picture.
#[derive(Debug, Clone, PartialEq)]
pub struct Texture {
    image: RgbImage,
}

impl Texture {
    /// Texture without texels, sampling it gives the sampler fill color.
    pub fn empty() -> Texture {
        return Texture { image: RgbImage::new(0, 0) };
    }

    /// Decodes an image file, flipping it so that texel row 0 is the bottom of the picture.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Texture, TextureError> {
        let path = path.as_ref();
        let image = image::open(path).map_err(|source| TextureError::Decode {
            path: path.to_path_buf(),
            source,
        })?;
        let texture = Texture { image: image.flipv().to_rgb8() };
        info!(
            "Loaded texture {} ({}x{})",
            path.display(),
            texture.width(),
            texture.height()
        );
        return Ok(texture);
    }

    /// Same as `from_file`, but a failure is logged and gives an empty texture.
    pub fn load<P: AsRef<Path>>(path: P) -> Texture {
        return match Texture::from_file(path) {
            Ok(texture) => texture,
            Err(TextureError::Decode { path, source }) => {
                error!("Failed to load texture {}: {}", path.display(), source);
                Texture::empty()
            }
        };
    }

    /// Replaces the texels with the contents of another file. Empty afterwards if loading fails.
    pub fn reload<P: AsRef<Path>>(&mut self, path: P) {
        *self = Texture::load(path);
    }

    /// Two color checkerboard with square cells of `cell` texels, `a` in the corner cell.
    pub fn checkerboard(width: u32, height: u32, cell: u32, a: Vector3<u8>, b: Vector3<u8>) -> Texture {
        let cell = cell.max(1);
        let image = RgbImage::from_fn(width, height, |x, y| {
            let color = if ((x / cell) + (y / cell)) % 2 == 0 { a } else { b };
            Rgb([color.x, color.y, color.z])
        });
        return Texture { image };
    }

    pub fn width(&self) -> u32 {
        return self.image.width();
    }

    pub fn height(&self) -> u32 {
        return self.image.height();
    }

    pub fn is_empty(&self) -> bool {
        return self.width() == 0 || self.height() == 0;
    }

    /// Texel at column x, row y. Panics outside of the texture.
    #[inline]
    pub fn texel(&self, x: u32, y: u32) -> Vector3<u8> {
        let Rgb([r, g, b]) = *self.image.get_pixel(x, y);
        return vector![r, g, b];
    }
}

impl From<RgbImage> for Texture {
    /// Takes the image rows as they are, row 0 becomes v = 0.
    fn from(image: RgbImage) -> Self {
        return Texture { image };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn missing_file_is_an_error() {
        let result = Texture::from_file("does/not/exist.png");
        assert!(matches!(result, Err(TextureError::Decode { .. })));
    }

    #[test]
    fn load_falls_back_to_empty() {
        let texture = Texture::load("does/not/exist.png");
        assert!(texture.is_empty());
        assert_eq!(texture.width(), 0);
    }

    #[test]
    fn reload_failure_empties_texture() {
        let mut texture = Texture::checkerboard(4, 4, 2, vector![255, 255, 255], vector![0, 0, 0]);
        texture.reload("does/not/exist.png");
        assert!(texture.is_empty());
    }

    #[test]
    fn checkerboard_alternates_cells() {
        let white = vector![255, 255, 255];
        let black = vector![0, 0, 0];
        let texture = Texture::checkerboard(8, 4, 2, white, black);
        assert_eq!((texture.width(), texture.height()), (8, 4));
        assert_eq!(texture.texel(0, 0), white);
        assert_eq!(texture.texel(1, 1), white);
        assert_eq!(texture.texel(2, 0), black);
        assert_eq!(texture.texel(2, 2), white);
        assert_eq!(texture.texel(7, 3), white);
    }

    #[test]
    fn clone_is_independent() {
        let texture = Texture::from(RgbImage::from_pixel(2, 2, Rgb([1, 2, 3])));
        let mut copy = texture.clone();
        copy.reload("does/not/exist.png");
        assert_eq!(texture.texel(1, 1), vector![1, 2, 3]);
        assert!(copy.is_empty());
    }

    #[test]
    fn file_rows_are_flipped() {
        let mut image = RgbImage::new(1, 2);
        image.put_pixel(0, 0, Rgb([255, 0, 0])); // top row of the picture
        image.put_pixel(0, 1, Rgb([0, 0, 255]));
        let path = std::env::temp_dir().join(format!("tiny_rasterizer_flip_{}.png", std::process::id()));
        image.save(&path).unwrap();

        let texture = Texture::from_file(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(texture.texel(0, 0), vector![0, 0, 255]);
        assert_eq!(texture.texel(0, 1), vector![255, 0, 0]);
    }
}
